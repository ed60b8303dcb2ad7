use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::standings::{ChartResponse, LeaderboardResponse},
};
use uuid::Uuid;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/marathons/{id}/standings",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    responses(
        (status = 200, description = "Current standings with podium and table rows", body = LeaderboardResponse),
        (status = 404, description = "Marathon not found")
    ),
    tag = "standings"
)]
pub async fn get_standings(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let standings = services::get_standings(db.pool(), id).await?;

    Ok(Json(standings).into_response())
}

#[utoipa::path(
    get,
    path = "/api/marathons/{id}/chart",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    responses(
        (status = 200, description = "Weight series per participant aligned to the day axis", body = ChartResponse),
        (status = 404, description = "Marathon not found")
    ),
    tag = "standings"
)]
pub async fn get_chart(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let chart = services::get_chart(db.pool(), id).await?;

    Ok(Json(chart).into_response())
}
