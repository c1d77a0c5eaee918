use axum::{
    extract::State,
    http::{header::AUTHORIZATION, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    auth::{
        middleware::{bearer_auth, BEARER_PREFIX},
        password, Credentials, Principal,
    },
    error::AppError,
    models::user::{JoinRequest, LoginForm, NewUser, DEFAULT_ROLE},
    AppState,
};

pub const LOGIN_PATH: &str = "/api/login";

pub async fn join(
    State(state): State<AppState>,
    Json(req): Json<JoinRequest>,
) -> Result<&'static str, AppError> {
    tracing::debug!("join request for {}", req.username);

    if state.store.exists_by_username(&req.username).await? {
        return Err(AppError::UsernameTaken);
    }

    state
        .store
        .insert(NewUser {
            username: req.username,
            password: password::hash(&req.password)?,
            role: DEFAULT_ROLE.to_string(),
        })
        .await?;

    Ok("ok")
}

/// Verifies the submitted parameters through the configured authenticator
/// and, on success, answers with an `Authorization: Bearer` header and no body.
pub async fn login(
    State(state): State<AppState>,
    form: LoginForm,
) -> Result<impl IntoResponse, AppError> {
    let credentials = Credentials::new(
        form.username.unwrap_or_default(),
        form.password.unwrap_or_default(),
    );
    let username = credentials.username.clone();

    let principal = match state.authenticator.authenticate(credentials).await {
        Ok(principal) => principal,
        Err(e) => {
            tracing::warn!("login failed for {}: {}", username, e);
            return Err(e.into());
        }
    };

    let Some(role) = principal.primary_role() else {
        tracing::warn!("login failed for {}: no granted role", principal.username);
        return Err(AppError::LoginFail);
    };

    let token = state.tokens.issue(&principal.username, role)?;
    tracing::info!("login succeeded for {}", principal.username);

    Ok((
        StatusCode::OK,
        [(AUTHORIZATION, format!("{BEARER_PREFIX}{token}"))],
    ))
}

pub async fn main_page(principal: Principal) -> String {
    format!("Main Controller : {}", principal.username)
}

pub fn router(state: AppState, cors: Option<CorsLayer>) -> Router {
    let router = Router::new()
        .route("/api/join", post(join))
        .route(LOGIN_PATH, post(login))
        .route("/api/", get(main_page))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn_with_state(state.clone(), bearer_auth)),
        )
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}
