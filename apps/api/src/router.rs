use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::{agent_routes, appointment_routes};
use appointment_cell::services::AppointmentCoordinator;
use doctor_cell::handlers::DoctorState;
use doctor_cell::router::doctor_routes;

use crate::stores::Stores;

pub fn create_router(stores: Stores) -> Router {
    let doctor_state = Arc::new(DoctorState::new(
        Arc::clone(&stores.directory),
        Arc::clone(&stores.schedule),
    ));

    let coordinator = Arc::new(AppointmentCoordinator::new(
        stores.directory,
        stores.schedule,
        stores.bookings,
        stores.summaries,
        stores.notifier,
    ));

    Router::new()
        .route("/", get(|| async { "MediBook API is running!" }))
        .nest("/doctors", doctor_routes(doctor_state))
        .nest("/appointments", appointment_routes(Arc::clone(&coordinator)))
        .nest("/agent", agent_routes(coordinator))
}
