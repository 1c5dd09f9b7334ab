pub mod absences;
pub mod class_groups;
pub mod courses;
pub mod grades;
pub mod leaves;
pub mod standing;
pub mod students;
pub mod teachers;
