use axum::{
    Router, middleware,
    routing::{get, post},
};
use storage::Database;

use super::handlers::{get_participant_series, record_entry};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/:id/entries", post(record_entry))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:id/entries/:participant_id", get(get_participant_series))
        .merge(protected)
}
