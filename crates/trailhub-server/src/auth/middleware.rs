//! Access gate middleware
//!
//! Runs the credential or permission check before the wrapped service. A request
//! that fails the check is answered with the error envelope and never reaches the
//! handler, so the store is never touched.
//!
//! ```rust,ignore
//! let read_gate = AccessLayer::require_permissions(verifier.clone(), vec!["trailhub:can-read-trail".into()]);
//! let router = Router::new().route("/", get(list_logs).route_layer(read_gate));
//! ```

use axum::{
    extract::Request,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tower::{Layer, Service};
use tracing::debug;

use super::{bearer_token, AccessError, AccessVerifier, Actor};
use crate::error::AppError;

/// What the gate demands from the caller
#[derive(Debug, Clone)]
pub enum Requirement {
    /// A credential the authorization service accepts
    Credential,
    /// A credential holding every listed permission
    Permissions(Arc<[String]>),
}

#[derive(Clone)]
pub struct AccessLayer {
    verifier: Arc<dyn AccessVerifier>,
    requirement: Requirement,
}

impl AccessLayer {
    pub fn require_credential(verifier: Arc<dyn AccessVerifier>) -> Self {
        Self {
            verifier,
            requirement: Requirement::Credential,
        }
    }

    pub fn require_permissions(verifier: Arc<dyn AccessVerifier>, permissions: Vec<String>) -> Self {
        Self {
            verifier,
            requirement: Requirement::Permissions(permissions.into()),
        }
    }
}

impl<S> Layer<S> for AccessLayer {
    type Service = AccessMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessMiddleware {
            inner,
            verifier: self.verifier.clone(),
            requirement: self.requirement.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AccessMiddleware<S> {
    inner: S,
    verifier: Arc<dyn AccessVerifier>,
    requirement: Requirement,
}

impl<S> Service<Request> for AccessMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let mut inner = self.inner.clone();
        let verifier = self.verifier.clone();
        let requirement = self.requirement.clone();

        Box::pin(async move {
            let headers = request.headers().clone();
            match authorize(verifier.as_ref(), &requirement, &headers).await {
                Ok(actor) => {
                    request.extensions_mut().insert(actor);
                    inner.call(request).await
                },
                Err(e) => Ok(AppError::from(e).into_response()),
            }
        })
    }
}

/// Check the request headers against a requirement
///
/// A missing or malformed `Authorization` header fails without calling the
/// authorization service.
pub async fn authorize(
    verifier: &dyn AccessVerifier,
    requirement: &Requirement,
    headers: &HeaderMap,
) -> Result<Actor, AccessError> {
    let credential = bearer_token(headers).ok_or(AccessError::MissingCredential)?;

    match requirement {
        Requirement::Credential => {
            let actor = verifier.validate_credential(credential).await?;
            debug!(actor = ?actor.id(), "Credential accepted");
            Ok(actor)
        },
        Requirement::Permissions(permissions) => {
            verifier.check_permission(credential, permissions).await?;
            debug!(permissions = ?permissions, "Permission granted");
            Ok(Actor::default())
        },
    }
}
