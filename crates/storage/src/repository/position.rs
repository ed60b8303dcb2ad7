use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::FrozenPosition;

/// Repository for the frozen final standings of finished marathons. The
/// rows are written by the finish transition in `MarathonRepository`; this
/// side only reads them.
pub struct PositionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PositionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Frozen positions of a marathon, best first. Empty for marathons that
    /// were never finished.
    pub async fn list_for_marathon(&self, marathon_id: Uuid) -> Result<Vec<FrozenPosition>> {
        let positions = sqlx::query_as::<_, FrozenPosition>(
            r#"
            SELECT marathon_id, participant_id, position, net_change, frozen_at
            FROM marathon_positions
            WHERE marathon_id = $1
            ORDER BY position ASC, participant_id ASC
            "#,
        )
        .bind(marathon_id)
        .fetch_all(self.pool)
        .await?;

        Ok(positions)
    }
}
