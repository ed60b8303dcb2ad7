use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use storage::Database;

use super::handlers::{
    cancel_marathon, create_marathon, delete_marathon, finish_marathon, get_marathon,
    list_marathons,
};
use crate::middleware::auth::{ApiKeys, require_auth};

pub fn routes(api_keys: ApiKeys) -> Router<Database> {
    let protected = Router::new()
        .route("/", post(create_marathon))
        .route("/:id", delete(delete_marathon))
        .route("/:id/finish", post(finish_marathon))
        .route("/:id/cancel", post(cancel_marathon))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_marathons))
        .route("/:id", get(get_marathon))
        .merge(protected)
}
