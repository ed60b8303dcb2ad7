use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        marathon::{EntryResponse, RecordEntryRequest},
        standings::ParticipantSeriesResponse,
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    post,
    path = "/api/marathons/{id}/entries",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    request_body = RecordEntryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Entry recorded successfully", body = EntryResponse),
        (status = 400, description = "Validation error or entry date outside the marathon range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Marathon or participant not found"),
        (status = 409, description = "Marathon is not active")
    ),
    tag = "entries"
)]
pub async fn record_entry(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<RecordEntryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = services::record_entry(db.pool(), id, &req).await?;

    Ok((StatusCode::CREATED, Json(EntryResponse::from(entry))).into_response())
}

#[utoipa::path(
    get,
    path = "/api/marathons/{id}/entries/{participant_id}",
    params(
        ("id" = Uuid, Path, description = "Marathon ID"),
        ("participant_id" = Uuid, Path, description = "Participant ID")
    ),
    responses(
        (status = 200, description = "Participant measurement series", body = ParticipantSeriesResponse),
        (status = 404, description = "Marathon or participant not found")
    ),
    tag = "entries"
)]
pub async fn get_participant_series(
    State(db): State<Database>,
    Path((id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, WebError> {
    let series = services::get_participant_series(db.pool(), id, participant_id).await?;

    Ok(Json(series).into_response())
}
