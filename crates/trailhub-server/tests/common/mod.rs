//! Common test utilities for TrailHub server integration tests
//!
//! - [`InMemoryLogStore`]: `LogStore` with call counting, no database needed
//! - [`StubVerifier`]: scripted `AccessVerifier` that records every call
//! - [`TestApp`]: the full router wired to the doubles above
//! - [`TestMongo`]: MongoDB container for the tests marked `requires Docker`
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestApp;
//!
//! #[tokio::test]
//! async fn test_ping() {
//!     let app = TestApp::builder().build();
//!     let (status, body) = app.get("/trailhub/@ping", None).await;
//! }
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use bson::{oid::ObjectId, Document};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mongo::Mongo;
use tower::ServiceExt;
use tracing::info;

use trailhub_server::{
    api,
    auth::{AccessError, AccessVerifier, Actor},
    client_info::{MacResolver, NoopMacResolver},
    config::{
        AppConfig, AuthConfig, Config, CorsConfig, DatabaseConfig, LogsConfig, ServerConfig,
    },
    features::{
        logs::{
            FilterMode, LogDocument, LogStore, PageRequest, SortOrder, StoreError, StoredPage,
        },
        FeatureState, LogsPolicy,
    },
};

pub const VALID_TOKEN: &str = "valid-token";
pub const READER_TOKEN: &str = "reader-token";

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct InMemoryLogStore {
    documents: Mutex<Vec<LogDocument>>,
    calls: AtomicUsize,
}

impl InMemoryLogStore {
    /// Number of store operations performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn documents(&self) -> Vec<LogDocument> {
        self.documents.lock().unwrap().clone()
    }

    /// Seed a document without counting it as a call
    pub fn seed(&self, document: LogDocument) {
        self.documents.lock().unwrap().push(document);
    }

    fn matches(document: &LogDocument, filter: &Document) -> bool {
        let stored = bson::to_document(document).unwrap();
        filter.iter().all(|(key, value)| stored.get(key) == Some(value))
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn insert(&self, document: LogDocument) -> Result<LogDocument, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<LogDocument>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.documents.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn find_page(&self, request: PageRequest) -> Result<StoredPage, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut found: Vec<LogDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| Self::matches(d, &request.filter))
            .cloned()
            .collect();

        found.sort_by_key(|d| d.created);
        if request.sort == SortOrder::Desc {
            found.reverse();
        }

        let total = found.len() as u64;
        let documents = found
            .into_iter()
            .skip(request.skip as usize)
            .take(request.limit as usize)
            .collect();

        Ok(StoredPage { documents, total })
    }
}

// ============================================================================
// Access verifier double
// ============================================================================

/// Accepts [`VALID_TOKEN`] and [`READER_TOKEN`]; only the reader holds permissions
#[derive(Default)]
pub struct StubVerifier {
    validate_calls: AtomicUsize,
    check_calls: AtomicUsize,
    seen_permissions: Mutex<Vec<String>>,
}

impl StubVerifier {
    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    pub fn check_calls(&self) -> usize {
        self.check_calls.load(Ordering::SeqCst)
    }

    pub fn seen_permissions(&self) -> Vec<String> {
        self.seen_permissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccessVerifier for StubVerifier {
    async fn validate_credential(&self, credential: &str) -> Result<Actor, AccessError> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        match credential {
            VALID_TOKEN | READER_TOKEN => Ok(Actor(serde_json::json!({ "id": "u-42" }))),
            _ => Err(AccessError::InvalidCredential),
        }
    }

    async fn check_permission(
        &self,
        credential: &str,
        permissions: &[String],
    ) -> Result<(), AccessError> {
        self.check_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_permissions.lock().unwrap().extend_from_slice(permissions);
        match credential {
            READER_TOKEN => Ok(()),
            VALID_TOKEN => Err(AccessError::PermissionDenied(permissions.join(", "))),
            _ => Err(AccessError::InvalidCredential),
        }
    }
}

/// Always resolves to the same hardware address
pub struct FixedMac(pub &'static str);

#[async_trait]
impl MacResolver for FixedMac {
    async fn resolve(&self, _ip: Option<&str>) -> Option<String> {
        Some(self.0.to_string())
    }
}

// ============================================================================
// Application
// ============================================================================

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            name: "TrailHub".to_string(),
            reload: false,
            access_log: true,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 1993,
            shutdown_timeout_secs: 1,
        },
        database: DatabaseConfig {
            uri: "mongodb://localhost:27017".to_string(),
            name: "trailhub_test".to_string(),
            collection: "logs".to_string(),
            timeout_secs: 5,
            fail_fast: false,
        },
        auth: AuthConfig {
            base_url: "http://auth.test/".to_string(),
            validate_token_endpoint: "token/validate".to_string(),
            check_access_endpoint: "access/check".to_string(),
            timeout_secs: 1,
            read_permission: "trailhub:can-read-trail".to_string(),
        },
        logs: LogsConfig {
            allow_anonymous_push: false,
            strip_source_spaces: true,
            filter_mode: FilterMode::Conjunctive,
        },
        cors: CorsConfig {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: false,
        },
    }
}

pub struct TestAppBuilder {
    config: Config,
    mac_resolver: Arc<dyn MacResolver>,
}

impl TestAppBuilder {
    pub fn allow_anonymous_push(mut self, allow: bool) -> Self {
        self.config.logs.allow_anonymous_push = allow;
        self
    }

    pub fn strip_source_spaces(mut self, strip: bool) -> Self {
        self.config.logs.strip_source_spaces = strip;
        self
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.config.logs.filter_mode = mode;
        self
    }

    pub fn mac_resolver(mut self, resolver: impl MacResolver + 'static) -> Self {
        self.mac_resolver = Arc::new(resolver);
        self
    }

    pub fn build(self) -> TestApp {
        let store = Arc::new(InMemoryLogStore::default());
        let verifier = Arc::new(StubVerifier::default());

        let state = FeatureState {
            store: store.clone(),
            verifier: verifier.clone(),
            mac_resolver: self.mac_resolver,
            policy: LogsPolicy::from_config(&self.config),
        };

        TestApp {
            router: api::create_router(state, &self.config),
            store,
            verifier,
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryLogStore>,
    pub verifier: Arc<StubVerifier>,
}

impl TestApp {
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder {
            config: test_config(),
            mac_resolver: Arc::new(NoopMacResolver),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::String(
                String::from_utf8_lossy(&body).into_owned(),
            ))
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_log(&self, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(post_log_request(body, token).build()).await
    }
}

/// Request builder for `POST /logs`
pub fn post_log_request(body: Value, token: Option<&str>) -> PostLog {
    PostLog {
        body,
        token: token.map(str::to_string),
        headers: Vec::new(),
        peer: None,
    }
}

pub struct PostLog {
    body: Value,
    token: Option<String>,
    headers: Vec<(String, String)>,
    peer: Option<SocketAddr>,
}

impl PostLog {
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn peer(mut self, addr: &str) -> Self {
        self.peer = Some(addr.parse().unwrap());
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/logs")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut request = builder.body(Body::from(self.body.to_string())).unwrap();
        if let Some(peer) = self.peer {
            request.extensions_mut().insert(ConnectInfo(peer));
        }
        request
    }
}

// ============================================================================
// MongoDB Test Container
// ============================================================================

pub struct TestMongo {
    container: ContainerAsync<Mongo>,
    uri: String,
}

impl TestMongo {
    pub async fn start() -> Result<Self> {
        info!("Starting MongoDB test container...");

        let container = Mongo::default()
            .start()
            .await
            .context("Failed to start MongoDB container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(27017.tcp())
            .await
            .context("Failed to get container port")?;

        let uri = format!("mongodb://{}:{}/?directConnection=true", host, port);

        Ok(Self { container, uri })
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn database_config(&self, database: &str) -> DatabaseConfig {
        DatabaseConfig {
            uri: self.uri.clone(),
            name: database.to_string(),
            collection: "logs".to_string(),
            timeout_secs: 10,
            fail_fast: true,
        }
    }
}
