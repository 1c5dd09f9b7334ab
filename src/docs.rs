use utoipa::OpenApi;

use crate::modules::absences::model::{Absence, JustifyAbsenceDto, RecordAbsenceDto};
use crate::modules::class_groups::model::{
    AssignStudentDto, ClassGroup, CreateClassGroupDto, UpdateClassGroupDto,
};
use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::modules::grades::model::{GradeRecordRow, RecordScoreDto};
use crate::modules::leaves::model::{
    CreateLeaveRequestDto, LeaveDecisionDto, LeaveRequest, LeaveStatus, LeaveType,
};
use crate::modules::students::controller::ErrorResponse;
use crate::modules::students::model::{
    CourseResult, CreateStudentDto, PaginatedStudentsResponse, PaginationMeta, Student,
    StudentResultsResponse, StudentStatus, UpdateStudentDto,
};
use crate::modules::teachers::model::{
    CreateTeacherDto, Teacher, TeacherStatus, UpdateTeacherDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::enroll_course,
        crate::modules::students::controller::unenroll_course,
        crate::modules::students::controller::get_results,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::teachers::controller::get_teacher_courses,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::get_course_students,
        crate::modules::class_groups::controller::create_class_group,
        crate::modules::class_groups::controller::get_class_groups,
        crate::modules::class_groups::controller::get_class_group,
        crate::modules::class_groups::controller::update_class_group,
        crate::modules::class_groups::controller::delete_class_group,
        crate::modules::class_groups::controller::assign_student,
        crate::modules::grades::controller::record_tp_score,
        crate::modules::grades::controller::record_exam_score,
        crate::modules::grades::controller::get_student_records,
        crate::modules::grades::controller::get_course_records,
        crate::modules::absences::controller::record_absence,
        crate::modules::absences::controller::get_absences,
        crate::modules::absences::controller::get_absence,
        crate::modules::absences::controller::set_justification,
        crate::modules::absences::controller::delete_absence,
        crate::modules::leaves::controller::create_leave_request,
        crate::modules::leaves::controller::get_leave_requests,
        crate::modules::leaves::controller::get_leave_request,
        crate::modules::leaves::controller::approve_leave_request,
        crate::modules::leaves::controller::reject_leave_request,
        crate::modules::leaves::controller::cancel_leave_request,
    ),
    components(
        schemas(
            Student,
            StudentStatus,
            CreateStudentDto,
            UpdateStudentDto,
            PaginatedStudentsResponse,
            PaginationMeta,
            CourseResult,
            StudentResultsResponse,
            Teacher,
            TeacherStatus,
            CreateTeacherDto,
            UpdateTeacherDto,
            Course,
            CreateCourseDto,
            UpdateCourseDto,
            ClassGroup,
            CreateClassGroupDto,
            UpdateClassGroupDto,
            AssignStudentDto,
            RecordScoreDto,
            GradeRecordRow,
            Absence,
            RecordAbsenceDto,
            JustifyAbsenceDto,
            LeaveRequest,
            LeaveStatus,
            LeaveType,
            CreateLeaveRequestDto,
            LeaveDecisionDto,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Students", description = "Student management and standing views"),
        (name = "Teachers", description = "Teacher management"),
        (name = "Courses", description = "Course management"),
        (name = "Classes", description = "Class group management"),
        (name = "Grades", description = "Grade recording through the standing engine"),
        (name = "Absences", description = "Absence events and justification"),
        (name = "Leaves", description = "Teacher leave-request workflow"),
    ),
    info(
        title = "Educore API",
        description = "School administration backend: students, teachers, courses, grades, absences, leave requests, and the academic standing engine.",
    )
)]
pub struct ApiDoc;
