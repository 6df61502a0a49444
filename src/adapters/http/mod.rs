//! HTTP adapter - axum routes, handlers, and middleware.

mod dto;
mod handlers;
mod middleware;
mod routes;

pub use handlers::AppState;
pub use middleware::{auth_middleware, AuthState, RequireAuth};
pub use routes::app_router;
