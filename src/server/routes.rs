//! Router wiring for the bulletin API

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::server::handlers;
use crate::server::state::AppState;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/boletines",
            get(handlers::list_boletines).post(handlers::create_boletin),
        )
        .route("/api/boletines/estado", get(handlers::estado_boletines))
        .route("/api/boletines/{id}", get(handlers::get_boletin))
        .route("/api/boletines/{id}", put(handlers::update_boletin))
        .route("/api/boletines/{id}", delete(handlers::delete_boletin))
        .with_state(state)
}
