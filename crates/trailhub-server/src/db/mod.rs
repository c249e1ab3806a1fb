//! Document store gateway
//!
//! [`MongoGateway`] owns the MongoDB client for the lifetime of the process. The entry
//! point creates it, calls [`MongoGateway::connect`] during startup and
//! [`MongoGateway::close`] on shutdown; handlers only ever see the collection through
//! [`crate::features::logs::LogStore`].

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Database,
};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;

/// Gateway errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// The deployment did not answer a ping
    #[error("MongoDB is unreachable: {0}")]
    Unreachable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Holds at most one client and hands out clones of it
pub struct MongoGateway {
    config: DatabaseConfig,
    app_name: String,
    client: Mutex<Option<Client>>,
}

impl MongoGateway {
    pub fn new(config: DatabaseConfig, app_name: impl Into<String>) -> Self {
        Self {
            config,
            app_name: app_name.into(),
            client: Mutex::new(None),
        }
    }

    /// Return a client, reusing the current one while it answers pings
    ///
    /// A new client that fails its first ping is still returned unless
    /// `fail_fast` is set; later operations then fail with store errors.
    #[tracing::instrument(skip(self), fields(database = %self.config.name))]
    pub async fn connect(&self) -> DbResult<Client> {
        let mut slot = self.client.lock().await;

        if let Some(client) = slot.as_ref() {
            match ping(client, self.config.timeout()).await {
                Ok(()) => {
                    debug!("Reusing healthy MongoDB client");
                    return Ok(client.clone());
                },
                Err(e) => warn!(error = %e, "MongoDB client failed its ping, reconnecting"),
            }
        }

        let client = self.build_client().await?;

        match ping(&client, self.config.timeout()).await {
            Ok(()) => info!("Pinged deployment, MongoDB connection established"),
            Err(e) if self.config.fail_fast => return Err(e),
            Err(e) => warn!(error = %e, "MongoDB ping failed, continuing with an unverified client"),
        }

        *slot = Some(client.clone());
        Ok(client)
    }

    /// Handle to the configured database, connecting first if needed
    pub async fn database(&self) -> DbResult<Database> {
        let client = self.connect().await?;
        Ok(client.database(&self.config.name))
    }

    /// Release the client; only meant for process shutdown
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            client.shutdown().await;
            info!("MongoDB client closed");
        }
    }

    async fn build_client(&self) -> DbResult<Client> {
        let mut options = ClientOptions::parse(&self.config.uri).await?;
        options.app_name = Some(self.app_name.clone());
        options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());
        options.connect_timeout = Some(self.config.timeout());
        options.server_selection_timeout = Some(self.config.timeout());

        Ok(Client::with_options(options)?)
    }
}

async fn ping(client: &Client, timeout: Duration) -> DbResult<()> {
    let admin = client.database("admin");
    let command = admin.run_command(doc! { "ping": 1 }, None);

    match tokio::time::timeout(timeout, command).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(DbError::Unreachable(e.to_string())),
        Err(_) => Err(DbError::Unreachable(format!(
            "ping timed out after {}s",
            timeout.as_secs()
        ))),
    }
}
