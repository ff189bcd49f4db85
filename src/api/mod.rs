mod classes;
mod error;
mod habits;
mod identity;
mod reservations;
mod schedule;
mod validation;

pub use error::{ApiError, ErrorCode, ValidationErrorBuilder};
pub use identity::CurrentUser;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Schedule & reservations
        .route("/schedule", get(schedule::get_schedule))
        .route("/slots/:id/reservations", post(reservations::create_reservation))
        .route("/reservations/:id", delete(reservations::cancel_reservation))
        // Classes
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route("/classes/:id/slots", post(classes::create_time_slot))
        // Habits
        .route("/habits", get(habits::list_habits).post(habits::create_habit))
        .route("/habits/:id/logs", put(habits::upsert_habit_log));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
