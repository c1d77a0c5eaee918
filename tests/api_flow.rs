use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use csquiz::{
    auth::{token::TokenIssuer, StoreAuthenticator},
    rest,
    store::UserStore,
    AppState,
};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

const SECRET: &str = "flow-secret";

async fn app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    let store = UserStore::new(pool);
    store.migrate().await.expect("migrate");

    let state = AppState {
        authenticator: Arc::new(StoreAuthenticator::new(store.clone())),
        store,
        tokens: TokenIssuer::new(SECRET),
    };
    rest::router(state, None)
}

fn join(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/join")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

fn login(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

fn main_page(authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/api/");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn join_login_and_greet() {
    let app = app().await;

    let response = app.clone().oneshot(join("alice", "pw1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");

    let response = app.clone().oneshot(login("alice", "pw1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let authorization = response.headers()[AUTHORIZATION]
        .to_str()
        .unwrap()
        .to_string();
    let token = authorization.strip_prefix("Bearer ").unwrap();
    assert!(!token.is_empty());

    let claims = TokenIssuer::new(SECRET).verify(token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.role, "ROLE_USER");

    let response = app.oneshot(main_page(Some(&authorization))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Main Controller : alice");
}

#[tokio::test]
async fn wrong_password_and_unknown_user_are_401() {
    let app = app().await;
    app.clone().oneshot(join("alice", "pw1")).await.unwrap();

    let response = app.clone().oneshot(login("alice", "wrong")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(AUTHORIZATION).is_none());

    let response = app.oneshot(login("nobody", "pw1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn main_page_needs_authentication() {
    let app = app().await;

    let response = app.oneshot(main_page(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn duplicate_join_is_rejected() {
    let app = app().await;

    let first = app.clone().oneshot(join("bob", "pw1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(join("bob", "other")).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    // The original password still works.
    let response = app.oneshot(login("bob", "pw1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn json_login_is_401_not_an_extractor_error() {
    let app = app().await;
    app.clone().oneshot(join("alice", "pw1")).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/login")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"alice","password":"pw1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(AUTHORIZATION).is_none());
}
