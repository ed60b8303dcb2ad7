use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// One recorded observation for a participant. `day` is the zero-based
/// offset from the marathon's `from_date`. Several entries may share a day;
/// readers pick a deterministic winner by insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MetricEntry {
    pub entry_id: i64,
    pub marathon_id: Uuid,
    pub participant_id: Uuid,
    pub day: i32,
    pub entry_date: NaiveDate,
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub created_at: chrono::NaiveDateTime,
}
