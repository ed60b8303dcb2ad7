use axum::{Router, routing::get};
use storage::Database;

use super::handlers::{get_chart, get_standings};

pub fn routes() -> Router<Database> {
    Router::new()
        .route("/:id/standings", get(get_standings))
        .route("/:id/chart", get(get_chart))
}
