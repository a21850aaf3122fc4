//! Route table.

use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the application router. Vote and unvote are POST; both mutate
/// the ledger.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/entries/{id}",
            get(handlers::get_entry).delete(handlers::delete_entry),
        )
        .route("/entries/{id}/comments", post(handlers::create_comment))
        .route("/vote", post(handlers::cast_vote))
        .route("/unvote", post(handlers::retract_vote))
        .route("/site", get(handlers::get_site).put(handlers::update_site))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
