//! Authentication service implementation
//!
//! Verifies HS256 bearer tokens issued by the identity provider and turns
//! their claims into the caller's identity.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::config::AuthConfig;
use crate::models::user::UserIdentity;
use crate::utils::errors::{BaropotError, Result};
use crate::utils::helpers::is_valid_email;

/// Access token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse::<i64>()
            .map_err(|_| BaropotError::Unauthorized("token subject is not a user id".to_string()))
    }

    /// Identity used to get-or-create the user row
    pub fn identity(&self) -> Result<UserIdentity> {
        let id = self.user_id()?;
        Ok(UserIdentity {
            id,
            name: self.name.clone().unwrap_or_else(|| format!("user{id}")),
            email: self
                .email
                .clone()
                .filter(|email| is_valid_email(email))
                .unwrap_or_else(|| format!("{id}@users.baropot.invalid")),
        })
    }
}

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub identity: UserIdentity,
}

/// Authentication service for bearer token verification
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: Option<String>,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
        }
    }

    /// Verify a bearer token and extract the caller
    pub fn verify(&self, token: &str) -> Result<AuthContext> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let identity = data.claims.identity()?;

        debug!(user_id = identity.id, "Access token verified");
        Ok(AuthContext {
            user_id: identity.id,
            identity,
        })
    }

    /// Verify the value of an `Authorization` header
    pub fn verify_header(&self, header: &str) -> Result<AuthContext> {
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| BaropotError::Unauthorized("expected a bearer token".to_string()))?;

        self.verify(token.trim())
    }

    /// Sign a token for the given user; used by tooling and tests
    pub fn issue(&self, user_id: i64, name: Option<&str>, email: Option<&str>, ttl: chrono::Duration) -> Result<String> {
        let exp = (chrono::Utc::now() + ttl).timestamp().max(0) as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            exp,
            iss: self.issuer.clone(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service(secret: &str) -> AuthService {
        AuthService::new(&AuthConfig {
            jwt_secret: secret.to_string(),
            issuer: Some("baropot-idp".to_string()),
            leeway_seconds: 0,
        })
    }

    #[test]
    fn test_issued_token_verifies() {
        let auth = service("secret");
        let token = auth.issue(42, Some("Minji"), Some("minji@example.com"), chrono::Duration::minutes(5)).unwrap();

        let context = auth.verify(&token).unwrap();
        assert_eq!(context.user_id, 42);
        assert_eq!(context.identity.name, "Minji");
        assert_eq!(context.identity.email, "minji@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("secret").issue(1, None, None, chrono::Duration::minutes(5)).unwrap();
        assert_matches!(service("other").verify(&token), Err(BaropotError::Jwt(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = service("secret");
        let token = auth.issue(1, None, None, chrono::Duration::minutes(-10)).unwrap();
        assert_matches!(auth.verify(&token), Err(BaropotError::Jwt(_)));
    }

    #[test]
    fn test_header_requires_bearer_scheme() {
        let auth = service("secret");
        let token = auth.issue(5, None, None, chrono::Duration::minutes(5)).unwrap();

        assert_eq!(auth.verify_header(&format!("Bearer {token}")).unwrap().user_id, 5);
        assert_matches!(auth.verify_header(&token), Err(BaropotError::Unauthorized(_)));
    }

    #[test]
    fn test_identity_defaults() {
        let claims = Claims { sub: "9".into(), name: None, email: None, exp: 0, iss: None };
        let identity = claims.identity().unwrap();
        assert_eq!(identity.name, "user9");
        assert!(identity.email.starts_with("9@"));

        let malformed = Claims { email: Some("not-an-email".into()), ..claims.clone() };
        assert!(malformed.identity().unwrap().email.ends_with(".invalid"));

        let bad = Claims { sub: "abc".into(), ..claims };
        assert_matches!(bad.identity(), Err(BaropotError::Unauthorized(_)));
    }
}
