pub mod models;
pub mod queries;

use std::{fmt, time::Duration};

use mongodb::{Client, bson::doc, options::ClientOptions};

use crate::error::{AppError, AppResult};

/// Database and collection a record is written to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub database: String,
    pub collection: String,
}

impl Namespace {
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            collection: collection.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

/// Live MongoDB client plus the deadline used to open and release it.
///
/// Consumed by [`Connection::release`], so a released handle can't be reused.
pub struct Connection {
    client: Client,
    deadline: Duration,
}

impl Connection {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Shut the client down. Fails if shutdown outlives the deadline.
    pub async fn release(self) -> AppResult<()> {
        let Connection { client, deadline } = self;

        tokio::time::timeout(deadline, client.shutdown())
            .await
            .map_err(|_| {
                AppError::Disconnect(format!(
                    "shutdown did not finish within {}s",
                    deadline.as_secs()
                ))
            })?;

        tracing::info!("MongoDB connection released");
        Ok(())
    }
}

/// Create MongoDB connection
///
/// The whole handshake (URI parsing, client creation, ping) is bounded by
/// `deadline`.
pub async fn connect(uri: &str, deadline: Duration) -> AppResult<Connection> {
    let client = tokio::time::timeout(deadline, create_client(uri, deadline))
        .await
        .map_err(|_| {
            AppError::Connection(format!("handshake exceeded {}s", deadline.as_secs()))
        })??;

    tracing::info!("Successfully connected to MongoDB");
    Ok(Connection { client, deadline })
}

async fn create_client(uri: &str, deadline: Duration) -> AppResult<Client> {
    let mut options = ClientOptions::parse(uri)
        .await
        .map_err(|e| AppError::Connection(format!("invalid connection string: {}", e)))?;

    options.app_name.get_or_insert_with(|| "ticketing-server".to_string());
    options.connect_timeout.get_or_insert(deadline);
    options.server_selection_timeout.get_or_insert(deadline);

    let client =
        Client::with_options(options).map_err(|e| AppError::Connection(e.to_string()))?;

    // Ping to verify connection
    client
        .database("admin")
        .run_command(doc! {"ping": 1})
        .await
        .map_err(|e| AppError::Connection(format!("ping failed: {}", e)))?;

    Ok(client)
}
