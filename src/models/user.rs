use serde::Deserialize;

pub const DEFAULT_ROLE: &str = "ROLE_USER";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: chrono::NaiveDateTime,
}

/// Insert payload for the user table. `password` is already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub username: String,
    pub password: String,
}

/// Login parameters gathered from the query string and the request body.
/// Absent fields stay `None` and fail authentication.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl LoginForm {
    /// Fills fields missing from `self` with the ones from `other`.
    pub fn or(self, other: LoginForm) -> LoginForm {
        LoginForm {
            username: self.username.or(other.username),
            password: self.password.or(other.password),
        }
    }
}
