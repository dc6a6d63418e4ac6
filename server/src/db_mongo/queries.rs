use std::{collections::HashMap, time::Duration};

use mongodb::{
    Client,
    bson::{Bson, Document},
};

use super::Namespace;
use crate::error::{AppError, AppResult};

pub async fn insert_one(
    client: &Client,
    target: &Namespace,
    record: Document,
    deadline: Duration,
) -> AppResult<Bson> {
    let collection = client
        .database(&target.database)
        .collection::<Document>(&target.collection);

    let result = tokio::time::timeout(deadline, collection.insert_one(record))
        .await
        .map_err(|_| deadline_exceeded(target, deadline))?
        .map_err(AppError::persistence)?;

    tracing::debug!(namespace = %target, id = %result.inserted_id, "inserted document");
    Ok(result.inserted_id)
}

/// Insert a batch and return the generated ids in input order.
pub async fn insert_many(
    client: &Client,
    target: &Namespace,
    records: Vec<Document>,
    deadline: Duration,
) -> AppResult<Vec<Bson>> {
    let collection = client
        .database(&target.database)
        .collection::<Document>(&target.collection);

    let expected = records.len();
    let result = tokio::time::timeout(deadline, collection.insert_many(records))
        .await
        .map_err(|_| deadline_exceeded(target, deadline))?
        .map_err(AppError::persistence)?;

    let ids = ordered_ids(result.inserted_ids);
    if ids.len() != expected {
        return Err(AppError::Persistence(format!(
            "expected {} ids from {}, got {}",
            expected,
            target,
            ids.len()
        )));
    }

    tracing::debug!(namespace = %target, count = ids.len(), "inserted documents");
    Ok(ids)
}

/// The driver reports ids keyed by input index; flatten them back into that order.
pub fn ordered_ids(inserted_ids: HashMap<usize, Bson>) -> Vec<Bson> {
    let mut pairs: Vec<(usize, Bson)> = inserted_ids.into_iter().collect();
    pairs.sort_by_key(|(index, _)| *index);
    pairs.into_iter().map(|(_, id)| id).collect()
}

fn deadline_exceeded(target: &Namespace, deadline: Duration) -> AppError {
    AppError::Persistence(format!(
        "write to {} exceeded {}s deadline",
        target,
        deadline.as_secs()
    ))
}
