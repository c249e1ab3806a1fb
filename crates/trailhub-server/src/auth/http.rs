//! HTTP client for the authorization service

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{AccessError, AccessVerifier, Actor};
use crate::config::AuthConfig;

#[derive(Debug, Clone)]
pub struct HttpAccessVerifier {
    client: Client,
    validate_url: Url,
    check_url: Url,
}

impl HttpAccessVerifier {
    pub fn new(validate_url: Url, check_url: Url, timeout: Duration) -> Result<Self, AccessError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            validate_url,
            check_url,
        })
    }

    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.validate_token_url()?,
            config.check_access_url()?,
            config.timeout(),
        )?)
    }
}

#[async_trait]
impl AccessVerifier for HttpAccessVerifier {
    #[tracing::instrument(skip_all, fields(url = %self.validate_url))]
    async fn validate_credential(&self, credential: &str) -> Result<Actor, AccessError> {
        let response = self
            .client
            .get(self.validate_url.clone())
            .bearer_auth(credential)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                let actor = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
                debug!("Credential validated");
                Ok(Actor(actor))
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AccessError::InvalidCredential),
            status => Err(AccessError::UnexpectedStatus(status.as_u16())),
        }
    }

    #[tracing::instrument(skip(self, credential), fields(url = %self.check_url))]
    async fn check_permission(
        &self,
        credential: &str,
        permissions: &[String],
    ) -> Result<(), AccessError> {
        let response = self
            .client
            .post(self.check_url.clone())
            .bearer_auth(credential)
            .json(&json!({ "permissions": permissions }))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AccessError::PermissionDenied(permissions.join(", ")))
            },
            status => Err(AccessError::UnexpectedStatus(status.as_u16())),
        }
    }
}
