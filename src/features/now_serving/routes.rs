use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::now_serving::handlers;
use crate::features::now_serving::services::NowServingPublisher;

/// Create routes for the display signals
///
/// Note: Public, polled by kiosks and display boards
pub fn routes(publisher: Arc<NowServingPublisher>) -> Router {
    Router::new()
        .route(
            "/queue/currently-serving",
            get(handlers::get_currently_serving).post(handlers::set_currently_serving),
        )
        .route("/queue/latest-updates", get(handlers::get_latest_updates))
        .route(
            "/queue/latest-update/{department_id}",
            get(handlers::get_latest_update),
        )
        .with_state(publisher)
}
