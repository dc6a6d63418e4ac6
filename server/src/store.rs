use std::time::Duration;

use async_trait::async_trait;
use mongodb::{
    Client,
    bson::{Bson, Document, doc},
};

use crate::{
    db_mongo::{Namespace, queries},
    error::{AppError, AppResult},
};

/// Document sink shared by every request handler.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn insert_one(&self, target: &Namespace, record: Document) -> AppResult<Bson>;

    async fn insert_many(&self, target: &Namespace, records: Vec<Document>) -> AppResult<Vec<Bson>>;

    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    operation_timeout: Duration,
}

impl MongoStore {
    pub fn new(client: Client, operation_timeout: Duration) -> Self {
        Self {
            client,
            operation_timeout,
        }
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert_one(&self, target: &Namespace, record: Document) -> AppResult<Bson> {
        queries::insert_one(&self.client, target, record, self.operation_timeout).await
    }

    async fn insert_many(&self, target: &Namespace, records: Vec<Document>) -> AppResult<Vec<Bson>> {
        queries::insert_many(&self.client, target, records, self.operation_timeout).await
    }

    async fn ping(&self) -> AppResult<()> {
        tokio::time::timeout(
            self.operation_timeout,
            self.client.database("admin").run_command(doc! {"ping": 1}),
        )
        .await
        .map_err(|_| AppError::Connection("ping timed out".to_string()))?
        .map_err(|e| AppError::Connection(e.to_string()))?;
        Ok(())
    }
}
