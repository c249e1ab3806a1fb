//! Access control against the external authorization service
//!
//! The service itself is opaque: [`AccessVerifier`] validates bearer credentials and
//! checks permissions, [`HttpAccessVerifier`] talks to the real service, and
//! [`AccessLayer`] runs the checks before a handler is reached.

pub mod http;
pub mod middleware;

pub use self::http::HttpAccessVerifier;
pub use self::middleware::{authorize, AccessLayer, Requirement};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AppError;

/// Whatever the authorization service returned for a valid credential
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actor(pub serde_json::Value);

impl Actor {
    /// Best-effort identifier for log fields
    pub fn id(&self) -> Option<&str> {
        ["id", "_id", "user_id", "sub"]
            .iter()
            .find_map(|key| self.0.get(*key).and_then(|v| v.as_str()))
    }
}

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Missing or malformed bearer credential")]
    MissingCredential,

    #[error("Invalid or expired credential")]
    InvalidCredential,

    #[error("Missing required permission: {0}")]
    PermissionDenied(String),

    #[error("Authorization service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authorization service answered with status {0}")]
    UnexpectedStatus(u16),
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::MissingCredential | AccessError::InvalidCredential => {
                AppError::Unauthorized(err.to_string())
            },
            AccessError::PermissionDenied(_) => AppError::Forbidden(err.to_string()),
            AccessError::Transport(_) | AccessError::UnexpectedStatus(_) => {
                AppError::Internal(err.to_string())
            },
        }
    }
}

#[async_trait]
pub trait AccessVerifier: Send + Sync {
    /// Resolve a bearer credential into the actor it belongs to
    async fn validate_credential(&self, credential: &str) -> Result<Actor, AccessError>;

    /// Succeed only if the credential holds every permission
    async fn check_permission(
        &self,
        credential: &str,
        permissions: &[String],
    ) -> Result<(), AccessError>;
}

/// Credential from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
