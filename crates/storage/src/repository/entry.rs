use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::MetricEntry;

/// Repository for measurement entries. Reads keep insertion order
/// (entry_id ASC) because that order decides the winner when one
/// participant has several entries for the same day.
pub struct EntryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EntryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record one measurement. Duplicate (participant, day) rows are
    /// accepted on purpose.
    pub async fn insert(
        &self,
        marathon_id: Uuid,
        participant_id: Uuid,
        day: i32,
        entry_date: NaiveDate,
        weight: Option<Decimal>,
        height: Option<Decimal>,
    ) -> Result<MetricEntry> {
        let entry = sqlx::query_as::<_, MetricEntry>(
            r#"
            INSERT INTO marathon_entries (marathon_id, participant_id, day, entry_date, weight, height)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING entry_id, marathon_id, participant_id, day, entry_date, weight, height, created_at
            "#,
        )
        .bind(marathon_id)
        .bind(participant_id)
        .bind(day)
        .bind(entry_date)
        .bind(weight)
        .bind(height)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_foreign_key_violation() {
                return StorageError::ConstraintViolation(
                    "Participant was removed from the marathon".to_string(),
                );
            }
            err
        })?;

        Ok(entry)
    }

    /// All entries of a marathon in insertion order
    pub async fn list_for_marathon(&self, marathon_id: Uuid) -> Result<Vec<MetricEntry>> {
        let entries = sqlx::query_as::<_, MetricEntry>(
            r#"
            SELECT entry_id, marathon_id, participant_id, day, entry_date, weight, height, created_at
            FROM marathon_entries
            WHERE marathon_id = $1
            ORDER BY entry_id ASC
            "#,
        )
        .bind(marathon_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    /// One participant's entries in insertion order
    pub async fn list_for_participant(
        &self,
        marathon_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<MetricEntry>> {
        let entries = sqlx::query_as::<_, MetricEntry>(
            r#"
            SELECT entry_id, marathon_id, participant_id, day, entry_date, weight, height, created_at
            FROM marathon_entries
            WHERE marathon_id = $1 AND participant_id = $2
            ORDER BY entry_id ASC
            "#,
        )
        .bind(marathon_id)
        .bind(participant_id)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }
}
