use sqlx::PgPool;
use storage::{
    dto::standings::{ChartResponse, LeaderboardResponse},
    services::standings,
};
use uuid::Uuid;

use crate::error::WebResult;

/// Standings are recomputed from the full snapshot on every read. Entry
/// writes are rejected once a marathon leaves the active state, so repeated
/// reads of a finished marathon stay identical to the frozen record.
pub async fn get_standings(pool: &PgPool, marathon_id: Uuid) -> WebResult<LeaderboardResponse> {
    let snapshot = standings::load_snapshot(pool, marathon_id).await?;

    Ok(standings::build_leaderboard(&snapshot))
}

pub async fn get_chart(pool: &PgPool, marathon_id: Uuid) -> WebResult<ChartResponse> {
    let snapshot = standings::load_snapshot(pool, marathon_id).await?;

    Ok(standings::build_chart(&snapshot))
}
