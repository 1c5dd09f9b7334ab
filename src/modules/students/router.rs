use crate::modules::students::controller::{
    create_student, delete_student, enroll_course, get_results, get_student, get_students,
    unenroll_course, update_student,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route(
            "/{id}/courses/{course_id}",
            post(enroll_course).delete(unenroll_course),
        )
        .route("/{id}/results", get(get_results))
}
