use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub mod board;
pub mod generate;
pub mod health;
pub mod plan_sprint;
pub mod sprints;
pub mod tickets;

pub fn router(state: AppState) -> Router {
    let base_routes = Router::new()
        .route("/health", get(health::health_check))
        .merge(board::router())
        .merge(tickets::router())
        .merge(sprints::router())
        .merge(generate::router())
        .merge(plan_sprint::router())
        .with_state(state);

    Router::new()
        .nest("/api", base_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
