use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::services::AppointmentCoordinator;

pub fn appointment_routes(coordinator: Arc<AppointmentCoordinator>) -> Router {
    Router::new()
        .route("/", get(handlers::list_bookings))
        .route("/book", post(handlers::book_appointment))
        .with_state(coordinator)
}

/// Webhook the conversational agent calls for its action groups.
pub fn agent_routes(coordinator: Arc<AppointmentCoordinator>) -> Router {
    Router::new()
        .route("/actions", post(handlers::dispatch_agent_action))
        .with_state(coordinator)
}
