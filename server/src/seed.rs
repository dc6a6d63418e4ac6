//! Demonstration marks inserted into `gfg.marks` when `SEED_DEMO_DATA` is set.

use mongodb::bson::Bson;

use crate::{
    db_mongo::{
        Namespace,
        models::{MarksRecord, to_document},
    },
    error::AppResult,
    store::RecordStore,
};

pub const MARKS_DATABASE: &str = "gfg";
pub const MARKS_COLLECTION: &str = "marks";

#[derive(Debug)]
pub struct SeedReport {
    pub single_id: Bson,
    pub batch_ids: Vec<Bson>,
}

pub fn single_record() -> MarksRecord {
    MarksRecord::new(175, 80, 90, 95)
}

pub fn batch_records() -> Vec<MarksRecord> {
    vec![
        MarksRecord::new(153, 65, 59, 55),
        MarksRecord::new(162, 86, 80, 69),
    ]
}

pub async fn run_demo_inserts(store: &dyn RecordStore) -> AppResult<SeedReport> {
    let target = Namespace::new(MARKS_DATABASE, MARKS_COLLECTION);

    let single_id = store
        .insert_one(&target, to_document(&single_record())?)
        .await?;
    tracing::info!(namespace = %target, id = %single_id, "seeded single marks record");

    let batch = batch_records()
        .iter()
        .map(to_document)
        .collect::<AppResult<Vec<_>>>()?;
    let batch_ids = store.insert_many(&target, batch).await?;
    for id in &batch_ids {
        tracing::info!(namespace = %target, id = %id, "seeded batch marks record");
    }

    Ok(SeedReport {
        single_id,
        batch_ids,
    })
}
