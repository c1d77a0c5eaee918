use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Query, Request},
    http::header::CONTENT_TYPE,
    Form,
};

use crate::models::user::LoginForm;

/// Reads login parameters the way a servlet parameter lookup would: query
/// string first, then an urlencoded or multipart body. Any other body, or one
/// that fails to parse, contributes nothing, so the login fails with 401
/// instead of an extractor rejection.
#[async_trait]
impl<S> FromRequest<S> for LoginForm
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let query = Query::<LoginForm>::try_from_uri(req.uri())
            .map(|Query(form)| form)
            .unwrap_or_default();

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let body = if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<LoginForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .unwrap_or_default()
        } else if content_type.starts_with("multipart/form-data") {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => read_multipart(multipart).await,
                Err(e) => {
                    tracing::debug!("unreadable multipart login body: {}", e);
                    LoginForm::default()
                }
            }
        } else {
            LoginForm::default()
        };

        Ok(query.or(body))
    }
}

async fn read_multipart(mut multipart: Multipart) -> LoginForm {
    let mut form = LoginForm::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let slot = match field.name() {
            Some("username") => &mut form.username,
            Some("password") => &mut form.password,
            _ => continue,
        };
        if slot.is_none() {
            *slot = field.text().await.ok();
        }
    }

    form
}
