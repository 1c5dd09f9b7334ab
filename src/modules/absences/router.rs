use crate::modules::absences::controller::{
    delete_absence, get_absence, get_absences, record_absence, set_justification,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_absences_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_absence).get(get_absences))
        .route("/{id}", get(get_absence).delete(delete_absence))
        .route("/{id}/justification", put(set_justification))
}
