use chrono::Utc;
use sqlx::PgPool;
use storage::{
    dto::marathon::{CreateMarathonRequest, ListMarathonsFilter, MarathonDetailResponse},
    models::{Marathon, MarathonState},
    repository::{marathon::MarathonRepository, position::PositionRepository},
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

pub async fn list_marathons(
    pool: &PgPool,
    filter: &ListMarathonsFilter,
) -> WebResult<(Vec<Marathon>, i64)> {
    let repo = MarathonRepository::new(pool);
    Ok(repo.list(filter).await?)
}

/// Marathon header plus roster, and the frozen standings once finished.
pub async fn get_marathon_detail(pool: &PgPool, id: Uuid) -> WebResult<MarathonDetailResponse> {
    let repo = MarathonRepository::new(pool);
    let marathon = repo.find_by_id(id).await?;
    let participants = repo.list_participants(id).await?;
    let positions = PositionRepository::new(pool).list_for_marathon(id).await?;

    let today = Utc::now().date_naive();
    Ok(MarathonDetailResponse::new(
        marathon,
        participants,
        positions,
        today,
    ))
}

pub async fn create_marathon(
    pool: &PgPool,
    req: &CreateMarathonRequest,
) -> WebResult<MarathonDetailResponse> {
    let (marathon, participants) = MarathonRepository::new(pool).create(req).await?;

    let today = Utc::now().date_naive();
    Ok(MarathonDetailResponse::new(
        marathon,
        participants,
        Vec::new(),
        today,
    ))
}

/// Mark an active marathon as finished once its end date has passed,
/// freezing the final standings. The state flip and the freeze run in one
/// repository transaction; a marathon that lost a concurrent transition
/// gets no positions written.
pub async fn finish_marathon(pool: &PgPool, id: Uuid) -> WebResult<Marathon> {
    let repo = MarathonRepository::new(pool);
    let marathon = repo.find_by_id(id).await?;

    if !marathon.state.is_active() {
        return Err(WebError::Conflict(format!(
            "Marathon is {} and cannot be finished",
            marathon.state.as_str()
        )));
    }

    let today = Utc::now().date_naive();
    if !marathon.has_ended(today) {
        return Err(WebError::BadRequest(format!(
            "Marathon runs until {}; it cannot be finished yet",
            marathon.to_date
        )));
    }

    let (finished, ranked) = repo.finish(id).await?;

    tracing::info!(
        marathon_id = %id,
        positions = ranked.len(),
        "Marathon finished, final standings frozen"
    );

    Ok(finished)
}

pub async fn cancel_marathon(pool: &PgPool, id: Uuid) -> WebResult<Marathon> {
    let repo = MarathonRepository::new(pool);
    let marathon = repo.find_by_id(id).await?;

    if !marathon.state.is_active() {
        return Err(WebError::Conflict(format!(
            "Marathon is {} and cannot be cancelled",
            marathon.state.as_str()
        )));
    }

    let cancelled = repo
        .set_state(id, MarathonState::Active, MarathonState::Cancelled)
        .await?;

    Ok(cancelled)
}

pub async fn delete_marathon(pool: &PgPool, id: Uuid) -> WebResult<()> {
    MarathonRepository::new(pool).delete(id).await?;
    Ok(())
}
