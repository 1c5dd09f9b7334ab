use crate::modules::courses::controller::{
    create_course, delete_course, get_course, get_course_students, get_courses, update_course,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course).get(get_courses))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{id}/students", get(get_course_students))
}
