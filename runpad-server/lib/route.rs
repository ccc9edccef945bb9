//! Router assembly for the runpad server.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::{handler, middleware as app_middleware, state::AppState};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Create the application router: the JSON API plus the static frontend.
pub fn create_router(state: AppState) -> Router {
    let frontend = ServeDir::new(state.get_config().get_server().get_frontend_dir());

    Router::new()
        .route("/run", post(handler::run_code))
        .route("/saveCode", post(handler::save_code))
        .route("/getCode", post(handler::get_code))
        .route("/health", get(handler::health))
        .fallback_service(frontend)
        .layer(middleware::from_fn(app_middleware::logging_middleware))
        .with_state(state)
}
