use crate::modules::grades::controller::{
    get_course_records, get_student_records, record_exam_score, record_tp_score,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, put},
};

pub fn init_grades_router() -> Router<AppState> {
    Router::new()
        .route("/tp", put(record_tp_score))
        .route("/exam", put(record_exam_score))
        .route("/students/{student_id}", get(get_student_records))
        .route("/courses/{course_id}", get(get_course_records))
}
