use crate::modules::leaves::controller::{
    approve_leave_request, cancel_leave_request, create_leave_request, get_leave_request,
    get_leave_requests, reject_leave_request,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn init_leaves_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_leave_request).get(get_leave_requests))
        .route("/{id}", get(get_leave_request))
        .route("/{id}/approve", put(approve_leave_request))
        .route("/{id}/reject", put(reject_leave_request))
        .route("/{id}/cancel", put(cancel_leave_request))
}
