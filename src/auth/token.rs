//! Signed bearer tokens issued at login.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Ten hours.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60 * 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, username: &str, role: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };

        self.sign(&claims)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::errors::ErrorKind;

    #[test]
    fn issued_token_carries_subject_role_and_ten_hour_expiry() {
        let issuer = TokenIssuer::new("secret");
        let token = issuer.issue("alice", "ROLE_USER").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, "ROLE_USER");
        assert_eq!(claims.exp - claims.iat, 36000);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = TokenIssuer::new("one").issue("alice", "ROLE_USER").unwrap();

        let err = TokenIssuer::new("two").verify(&token).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidSignature);
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new("secret");
        let now = Utc::now().timestamp();
        let token = issuer
            .sign(&Claims {
                sub: "alice".to_string(),
                role: "ROLE_USER".to_string(),
                iat: now - 2 * TOKEN_LIFETIME_SECS,
                exp: now - TOKEN_LIFETIME_SECS,
            })
            .unwrap();

        let err = issuer.verify(&token).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ExpiredSignature);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(TokenIssuer::new("secret").verify("not.a.token").is_err());
    }
}
