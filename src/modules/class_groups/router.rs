use crate::modules::class_groups::controller::{
    assign_student, create_class_group, delete_class_group, get_class_group, get_class_groups,
    update_class_group,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_class_groups_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class_group).get(get_class_groups))
        .route(
            "/{id}",
            get(get_class_group)
                .put(update_class_group)
                .delete(delete_class_group),
        )
        .route("/{id}/students", post(assign_student))
}
