use sqlx::PgPool;
use storage::{
    dto::{
        marathon::{EntryResponse, RecordEntryRequest},
        standings::ParticipantSeriesResponse,
    },
    models::MetricEntry,
    repository::{entry::EntryRepository, marathon::MarathonRepository},
    services::standings,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};

/// Record a measurement against an active marathon. The day offset is
/// derived server-side from the entry date, never taken from the caller.
pub async fn record_entry(
    pool: &PgPool,
    marathon_id: Uuid,
    req: &RecordEntryRequest,
) -> WebResult<MetricEntry> {
    let marathons = MarathonRepository::new(pool);
    let marathon = marathons.find_by_id(marathon_id).await?;

    if !marathon.state.is_active() {
        return Err(WebError::Conflict(format!(
            "Marathon is {}; entries can only be recorded while it is active",
            marathon.state.as_str()
        )));
    }

    // 404 when the participant is not on this marathon's roster.
    marathons
        .find_participant(marathon_id, req.participant_id)
        .await?;

    if req.entry_date < marathon.from_date || req.entry_date > marathon.to_date {
        return Err(WebError::BadRequest(format!(
            "Entry date {} is outside the marathon range {} to {}",
            req.entry_date, marathon.from_date, marathon.to_date
        )));
    }

    let day = (req.entry_date - marathon.from_date).num_days() as i32;

    let entry = EntryRepository::new(pool)
        .insert(
            marathon_id,
            req.participant_id,
            day,
            req.entry_date,
            req.weight,
            req.height,
        )
        .await?;

    Ok(entry)
}

pub async fn get_participant_series(
    pool: &PgPool,
    marathon_id: Uuid,
    participant_id: Uuid,
) -> WebResult<ParticipantSeriesResponse> {
    let marathons = MarathonRepository::new(pool);
    let marathon = marathons.find_by_id(marathon_id).await?;
    let participant = marathons
        .find_participant(marathon_id, participant_id)
        .await?;

    let entries = EntryRepository::new(pool)
        .list_for_participant(marathon_id, participant_id)
        .await?;
    let summary = standings::progress_summary(&entries, marathon.kind);

    Ok(ParticipantSeriesResponse {
        marathon_id,
        participant_id,
        name: participant.name,
        summary,
        entries: entries.into_iter().map(EntryResponse::from).collect(),
    })
}
