use std::time::Duration;

#[cfg(feature = "mongodb")]
use mongodb::{Client, Collection, Database, bson::doc, options::ClientOptions};

#[cfg(feature = "mongodb")]
use super::document::PostDocument;

/// Configuration for the document database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string (e.g., mongodb://localhost:27017)
    pub url: String,
    pub database: String,
    pub collection: String,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: "blog".to_string(),
            collection: "posts".to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Handle to the document database and the posts collection.
#[cfg(feature = "mongodb")]
pub struct DatabaseConnections {
    pub client: Client,
    pub database: Database,
    collection: String,
}

#[cfg(feature = "mongodb")]
impl DatabaseConnections {
    /// Connect and verify the server answers a ping.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        tracing::info!("Initializing database connection...");

        let mut options = ClientOptions::parse(&config.url).await?;
        options.app_name = Some("blog-api".to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(
            database = %config.database,
            collection = %config.collection,
            "Database connected"
        );

        Ok(Self {
            client,
            database,
            collection: config.collection.clone(),
        })
    }

    pub fn posts(&self) -> Collection<PostDocument> {
        self.database.collection(&self.collection)
    }
}
