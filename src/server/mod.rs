//! HTTP surface for the bulletin resource

pub mod handlers;
pub mod routes;
pub mod state;
pub mod validation;

pub use routes::build_router;
pub use state::AppState;
