pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod models;
pub mod rest;
pub mod store;

use std::sync::Arc;

use auth::{token::TokenIssuer, Authenticator};
use store::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub store: UserStore,
    pub authenticator: Arc<dyn Authenticator>,
    pub tokens: TokenIssuer,
}
