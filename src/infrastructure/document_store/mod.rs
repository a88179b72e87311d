//! Document store access.

pub mod criteria;
pub mod events;
pub mod projection;

pub use criteria::CriteriaError;
pub use events::EventLoader;

use bson::doc;
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Database};

use crate::config::DatabaseConfig;

/// A connected document store client, scoped to one database.
pub struct StoreHandle {
    client: Client,
    pub database: Database,
}

impl StoreHandle {
    /// Connect with the configured credentials and verify the connection
    /// with a ping.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(StoreError::Connect)?;
        options.credential = Some(
            Credential::builder()
                .username(config.user.clone())
                .password(config.password.clone())
                .build(),
        );

        let client = Client::with_options(options).map_err(StoreError::Connect)?;
        let database = client.database(&config.name);

        tracing::info!(database = %config.name, "connecting to document store");
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connect)?;
        tracing::info!("connected to document store");

        Ok(Self { client, database })
    }

    /// Shut down the client. Called on every exit path of the pipeline.
    pub async fn disconnect(self) {
        self.client.shutdown().await;
    }
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to document store: {0}")]
    Connect(#[source] mongodb::error::Error),

    #[error("document store query failed: {0}")]
    Query(#[source] mongodb::error::Error),

    #[error("failed to decode criteria document: {0}")]
    DecodeCriteria(#[source] bson::de::Error),

    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}
