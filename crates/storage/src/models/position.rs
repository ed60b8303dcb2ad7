use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Ranking snapshot written once when a marathon is marked finished.
/// Live standings are always recomputed from entries; this is the
/// historical record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct FrozenPosition {
    pub marathon_id: Uuid,
    pub participant_id: Uuid,
    pub position: i32,
    pub net_change: Decimal,
    pub frozen_at: chrono::NaiveDateTime,
}
