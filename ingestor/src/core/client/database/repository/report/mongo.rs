use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;
use std::sync::Arc;
use tracing::{debug, warn};

use super::r#trait::ReportRepository;
use crate::core::client::database::constant::REPORTS_COLLECTION;
use crate::core::client::database::error::DatabaseError;
use crate::core::client::database::mongo_client::helpers::to_bson_int;
use crate::core::client::database::mongo_client::MongoClient;
use crate::types::jobs::{Checkpoint, JobKey, JobReport, ReportUpdates, Resolution};

pub struct MongoReportRepository {
    client: Arc<MongoClient>,
}

impl MongoReportRepository {
    pub fn new(client: Arc<MongoClient>) -> Self {
        Self { client }
    }

    /// Unique index backing the natural key of a report.
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let index = IndexModel::builder()
            .keys(doc! { "job": 1, "coverage": 1, "start_date": 1, "end_date": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.client.create_indexes::<JobReport>(REPORTS_COLLECTION, vec![index]).await
    }
}

/// Builds the update document for `updates`.
///
/// Counters are set. A [`Checkpoint::Set`] is written with `$set`, a
/// [`Checkpoint::Raise`] with `$max` and a [`Checkpoint::Clear`] with `$unset`.
/// Errors are appended with `$push` and the resolved set is edited with
/// `$addToSet`/`$pull`.
pub fn report_update_document(updates: &ReportUpdates, now: DateTime<Utc>) -> Result<Document, DatabaseError> {
    let mut set_doc = doc! { "updated_at": Bson::DateTime(now.round_subsecs(0).into()) };
    if let Some(status) = updates.status {
        set_doc.insert("status", bson::to_bson(&status)?);
    }
    if let Some(total) = updates.total_polygons {
        set_doc.insert("summary.total_polygons", to_bson_int(total)?);
    }
    if let Some(success) = updates.success {
        set_doc.insert("summary.success", to_bson_int(success)?);
    }
    if let Some(failed) = updates.failed {
        set_doc.insert("summary.failed", to_bson_int(failed)?);
    }
    if let Some(Checkpoint::Set(index)) = updates.checkpoint {
        set_doc.insert("summary.last_processed_index", to_bson_int(index)?);
    }

    let mut update_doc = doc! { "$set": set_doc };
    match updates.checkpoint {
        Some(Checkpoint::Raise(index)) => {
            update_doc.insert("$max", doc! { "summary.last_processed_index": to_bson_int(index)? });
        }
        Some(Checkpoint::Clear) => {
            update_doc.insert("$unset", doc! { "summary.last_processed_index": "" });
        }
        _ => {}
    }
    if !updates.errors.is_empty() {
        update_doc.insert("$push", doc! { "errors": { "$each": bson::to_bson(&updates.errors)? } });
    }
    match updates.resolution {
        Some(Resolution::Resolve(index)) => {
            update_doc.insert("$addToSet", doc! { "resolved_indexes": to_bson_int(index)? });
        }
        Some(Resolution::Reopen(index)) => {
            update_doc.insert("$pull", doc! { "resolved_indexes": to_bson_int(index)? });
        }
        None => {}
    }
    Ok(update_doc)
}

#[async_trait]
impl ReportRepository for MongoReportRepository {
    async fn get(&self, key: &JobKey) -> Result<Option<JobReport>, DatabaseError> {
        self.client.find_one(REPORTS_COLLECTION, key.filter()).await
    }

    async fn create_if_absent(&self, key: &JobKey, initial: JobReport) -> Result<bool, DatabaseError> {
        let created = self.client.insert_if_not_exists(REPORTS_COLLECTION, key.filter(), initial).await?;
        if created {
            debug!(job_key = %key, "Report created");
        } else {
            debug!(job_key = %key, "Report already exists, keeping it");
        }
        Ok(created)
    }

    async fn apply_update(&self, key: &JobKey, updates: &ReportUpdates) -> Result<(), DatabaseError> {
        let update_doc = report_update_document(updates, Utc::now())?;
        let result = self.client.update_one::<JobReport>(REPORTS_COLLECTION, key.filter(), update_doc).await?;
        if result.matched_count == 0 {
            warn!(job_key = %key, "Report update matched no document");
            return Err(DatabaseError::UpdateFailed(format!("No report found for {key}")));
        }
        Ok(())
    }
}
