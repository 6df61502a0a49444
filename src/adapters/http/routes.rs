//! Axum routing table.

use std::time::Duration;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    get_check_ins, get_journal_entries, get_milestones, get_state, health, post_check_in,
    post_journal_entry, post_turn, AppState,
};
use super::middleware::{auth_middleware, AuthState};

/// Builds the API routes.
///
/// - `POST /api/companion/turn` - run one turn (SSE reply stream)
/// - `GET  /api/companion/state` - rehydrate client state
/// - `POST /api/check-ins` / `GET /api/check-ins`
/// - `POST /api/journal-entries` / `GET /api/journal-entries`
/// - `GET  /api/milestones`
/// - `GET  /health`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/companion/turn", post(post_turn))
        .route("/companion/state", get(get_state))
        .route("/check-ins", post(post_check_in).get(get_check_ins))
        .route(
            "/journal-entries",
            post(post_journal_entry).get(get_journal_entries),
        )
        .route("/milestones", get(get_milestones))
}

/// Assembles the full application router with middleware layers.
pub fn app_router(state: AppState, verifier: AuthState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(middleware::from_fn_with_state(verifier, auth_middleware))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(120)))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_routes_creates_valid_router() {
        let _routes = api_routes();
    }
}
