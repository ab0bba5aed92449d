//! Authentication extractors
//!
//! `AuthUser` requires a valid bearer token and makes sure the caller has a
//! user row. `OptionalAuthUser` is for public routes that personalize their
//! output when a token is present.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{debug, warn};
use crate::models::user::UserIdentity;
use crate::services::{AuthService, UserService};
use crate::utils::errors::BaropotError;

/// Authenticated caller with a registered user row
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub identity: UserIdentity,
}

fn authorization_header(parts: &Parts) -> Option<&str> {
    parts.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
    UserService: FromRef<S>,
{
    type Rejection = BaropotError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = authorization_header(parts)
            .ok_or_else(|| BaropotError::Unauthorized("missing authorization header".to_string()))?;

        let context = AuthService::from_ref(state).verify_header(header).map_err(|e| {
            warn!(path = %parts.uri.path(), error = %e, "Rejected access token");
            e
        })?;

        UserService::from_ref(state).ensure_user(&context.identity).await?;

        Ok(Self {
            user_id: context.user_id,
            identity: context.identity,
        })
    }
}

/// Caller id when a valid token is supplied; invalid tokens count as anonymous
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalAuthUser(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = authorization_header(parts) else {
            return Ok(Self(None));
        };

        match AuthService::from_ref(state).verify_header(header) {
            Ok(context) => Ok(Self(Some(context.user_id))),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid token on public route");
                Ok(Self(None))
            }
        }
    }
}
