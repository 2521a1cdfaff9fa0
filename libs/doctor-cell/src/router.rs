use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use crate::handlers::{self, DoctorState};

pub fn doctor_routes(state: Arc<DoctorState>) -> Router {
    Router::new()
        .route("/search", get(handlers::search_doctors))
        .route("/timeslots", get(handlers::get_doctor_timeslots))
        .with_state(state)
}
