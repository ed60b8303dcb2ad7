use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        marathon::{
            CreateMarathonRequest, ListMarathonsFilter, MarathonDetailResponse, MarathonResponse,
        },
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/marathons",
    params(ListMarathonsFilter),
    responses(
        (status = 200, description = "Marathons listed successfully", body = PaginatedResponse<MarathonResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "marathons"
)]
pub async fn list_marathons(
    State(db): State<Database>,
    Query(filter): Query<ListMarathonsFilter>,
) -> Result<Response, WebError> {
    filter.validate().map_err(WebError::BadRequest)?;

    let (marathons, total_items) = services::list_marathons(db.pool(), &filter).await?;

    let response = PaginatedResponse::new(
        marathons.into_iter().map(MarathonResponse::from).collect(),
        filter.page,
        filter.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/marathons/{id}",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    responses(
        (status = 200, description = "Marathon found", body = MarathonDetailResponse),
        (status = 404, description = "Marathon not found")
    ),
    tag = "marathons"
)]
pub async fn get_marathon(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let marathon = services::get_marathon_detail(db.pool(), id).await?;

    Ok(Json(marathon).into_response())
}

#[utoipa::path(
    post,
    path = "/api/marathons",
    request_body = CreateMarathonRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Marathon created successfully", body = MarathonDetailResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "marathons"
)]
pub async fn create_marathon(
    State(db): State<Database>,
    Json(req): Json<CreateMarathonRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    req.validate_dates()
        .map_err(|e| WebError::BadRequest(e.to_string()))?;

    let marathon = services::create_marathon(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(marathon)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/marathons/{id}/finish",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Marathon finished and final standings frozen", body = MarathonResponse),
        (status = 400, description = "End date has not passed yet"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Marathon not found"),
        (status = 409, description = "Marathon is not active")
    ),
    tag = "marathons"
)]
pub async fn finish_marathon(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let marathon = services::finish_marathon(db.pool(), id).await?;

    Ok(Json(MarathonResponse::from(marathon)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/marathons/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Marathon cancelled", body = MarathonResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Marathon not found"),
        (status = 409, description = "Marathon is not active")
    ),
    tag = "marathons"
)]
pub async fn cancel_marathon(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let marathon = services::cancel_marathon(db.pool(), id).await?;

    Ok(Json(MarathonResponse::from(marathon)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/marathons/{id}",
    params(
        ("id" = Uuid, Path, description = "Marathon ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Marathon deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Marathon not found")
    ),
    tag = "marathons"
)]
pub async fn delete_marathon(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_marathon(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use storage::models::MarathonState;

    fn parse(uri: &str) -> ListMarathonsFilter {
        let uri: Uri = uri.parse().unwrap();
        let Query(filter) = Query::<ListMarathonsFilter>::try_from_uri(&uri).unwrap();
        filter
    }

    #[test]
    fn test_list_query_accepts_explicit_paging() {
        let filter = parse("/api/marathons?page=2&page_size=10");

        assert_eq!(filter.page, 2);
        assert_eq!(filter.page_size, 10);
        assert!(filter.state.is_none());
    }

    #[test]
    fn test_list_query_defaults_when_absent() {
        let filter = parse("/api/marathons");

        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 25);
    }

    #[test]
    fn test_list_query_combines_state_and_paging() {
        let filter = parse("/api/marathons?state=active&page=3");

        assert_eq!(filter.page, 3);
        assert_eq!(filter.state, Some(MarathonState::Active));
    }
}
