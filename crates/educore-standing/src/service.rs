//! Orchestration of the standing recomputation chain.
//!
//! Every public operation is one atomic unit per student: it takes the
//! student's keyed lock, reads the current standing, recomputes through the
//! policies, aggregates, and writes back in a single store call. Operations
//! on different students run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, instrument};

use educore_models::{AbsenceId, CourseId, StudentId, TeacherId};

use crate::aggregate::aggregate_elimination;
use crate::config::StandingConfig;
use crate::notify::Notifier;
use crate::record::GradeRecord;
use crate::store::{
    AbsenceEvent, CourseSnapshot, NewAbsence, StandingStore, StoreError, StudentSnapshot,
};

/// Failure taxonomy of the standing engine.
///
/// All variants except `Store` are caller errors: the operation performed no
/// write and can be retried with corrected input.
#[derive(Debug, Error)]
pub enum StandingError {
    #[error("score {0} is out of range, expected a value between 0 and 20")]
    InvalidScore(f64),
    #[error("absence date {0} is in the future")]
    InvalidAbsenceDate(NaiveDate),
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("course {0} not found")]
    CourseNotFound(CourseId),
    #[error("absence {0} not found")]
    AbsenceNotFound(AbsenceId),
    #[error("teacher {teacher} is not assigned to course {course}")]
    ForbiddenAssociation {
        teacher: TeacherId,
        course: CourseId,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Keyed mutex granting one in-flight mutation per student.
#[derive(Default)]
struct StudentLocks {
    inner: Mutex<HashMap<StudentId, Arc<tokio::sync::Mutex<()>>>>,
}

impl StudentLocks {
    async fn acquire(&self, student_id: StudentId) -> tokio::sync::OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap();
            Arc::clone(map.entry(student_id).or_default())
        };
        lock.lock_owned().await
    }
}

enum ScoreKind {
    Tp,
    Exam,
}

impl ScoreKind {
    fn label(&self) -> &'static str {
        match self {
            Self::Tp => "TP",
            Self::Exam => "exam",
        }
    }
}

/// The academic standing engine.
///
/// Generic over its persistence and notification collaborators so the whole
/// recomputation chain can run against the in-memory store in tests.
#[derive(Clone)]
pub struct AcademicStandingService<S, N> {
    store: S,
    notifier: N,
    config: StandingConfig,
    locks: Arc<StudentLocks>,
}

impl<S, N> AcademicStandingService<S, N>
where
    S: StandingStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, config: StandingConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            locks: Arc::new(StudentLocks::default()),
        }
    }

    pub fn config(&self) -> &StandingConfig {
        &self.config
    }

    /// Record a TP (coursework) score for one (student, course) pair.
    #[instrument(skip(self))]
    pub async fn record_tp_score(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        score: f64,
    ) -> Result<GradeRecord, StandingError> {
        self.apply_score(student_id, course_id, score, ScoreKind::Tp)
            .await
    }

    /// Record an exam score for one (student, course) pair.
    #[instrument(skip(self))]
    pub async fn record_exam_score(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        score: f64,
    ) -> Result<GradeRecord, StandingError> {
        self.apply_score(student_id, course_id, score, ScoreKind::Exam)
            .await
    }

    /// Record an absence filed by `teacher_id` for a course it must own,
    /// then recount and re-derive the pair's standing.
    #[instrument(skip(self, reason))]
    pub async fn record_absence(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        teacher_id: TeacherId,
        date: NaiveDate,
        justified: bool,
        reason: Option<String>,
    ) -> Result<AbsenceEvent, StandingError> {
        let today = chrono::Utc::now().date_naive();
        if date > today {
            return Err(StandingError::InvalidAbsenceDate(date));
        }

        let _guard = self.locks.acquire(student_id).await;

        let mut student = self
            .store
            .load_student(student_id)
            .await?
            .ok_or(StandingError::StudentNotFound(student_id))?;
        let course = self
            .store
            .load_course(course_id)
            .await?
            .ok_or(StandingError::CourseNotFound(course_id))?;
        if course.teacher_id != teacher_id {
            return Err(StandingError::ForbiddenAssociation {
                teacher: teacher_id,
                course: course_id,
            });
        }

        let event = self
            .store
            .insert_absence(NewAbsence {
                student_id,
                course_id,
                teacher_id,
                date,
                justified,
                reason,
            })
            .await?;

        self.recount_into(&mut student, &course).await?;
        Ok(event)
    }

    /// Flip the justified flag on an absence, in either direction, and rerun
    /// the recount chain. Justifying an absence can reverse an elimination.
    #[instrument(skip(self, reason))]
    pub async fn set_absence_justification(
        &self,
        absence_id: AbsenceId,
        justified: bool,
        reason: Option<String>,
    ) -> Result<GradeRecord, StandingError> {
        let absence = self
            .store
            .load_absence(absence_id)
            .await?
            .ok_or(StandingError::AbsenceNotFound(absence_id))?;

        let _guard = self.locks.acquire(absence.student_id).await;

        self.store
            .update_absence_justification(absence_id, justified, reason)
            .await?;

        self.refresh_pair(absence.student_id, absence.course_id)
            .await
    }

    /// Delete an absence event and rerun the recount chain. The count is
    /// always recounted from the surviving events, never decremented.
    #[instrument(skip(self))]
    pub async fn delete_absence(
        &self,
        absence_id: AbsenceId,
    ) -> Result<GradeRecord, StandingError> {
        let absence = self
            .store
            .load_absence(absence_id)
            .await?
            .ok_or(StandingError::AbsenceNotFound(absence_id))?;

        let _guard = self.locks.acquire(absence.student_id).await;

        self.store.delete_absence(absence_id).await?;

        self.refresh_pair(absence.student_id, absence.course_id)
            .await
    }

    /// Drop the grade record for one pair and recompute the global flag from
    /// whatever records remain. Returns the recomputed global flag.
    #[instrument(skip(self))]
    pub async fn remove_course_association(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StandingError> {
        let _guard = self.locks.acquire(student_id).await;

        let mut student = self
            .store
            .load_student(student_id)
            .await?
            .ok_or(StandingError::StudentNotFound(student_id))?;

        student.records.remove(&course_id);
        self.store.delete_record(student_id, course_id).await?;

        student.eliminated =
            aggregate_elimination(student.records.values().map(GradeRecord::eliminated));
        self.store.save_standing(&student).await?;

        debug!(%student_id, %course_id, eliminated = student.eliminated, "course association removed");
        Ok(student.eliminated)
    }

    /// Read-only view of a student's standing.
    #[instrument(skip(self))]
    pub async fn student_standing(
        &self,
        student_id: StudentId,
    ) -> Result<StudentSnapshot, StandingError> {
        self.store
            .load_student(student_id)
            .await?
            .ok_or(StandingError::StudentNotFound(student_id))
    }

    async fn apply_score(
        &self,
        student_id: StudentId,
        course_id: CourseId,
        score: f64,
        kind: ScoreKind,
    ) -> Result<GradeRecord, StandingError> {
        if !score.is_finite() || !(0.0..=20.0).contains(&score) {
            return Err(StandingError::InvalidScore(score));
        }

        let _guard = self.locks.acquire(student_id).await;

        let mut student = self
            .store
            .load_student(student_id)
            .await?
            .ok_or(StandingError::StudentNotFound(student_id))?;
        let course = self
            .store
            .load_course(course_id)
            .await?
            .ok_or(StandingError::CourseNotFound(course_id))?;

        let record = student.records.entry(course_id).or_default();
        let was_eliminated = record.eliminated();
        match kind {
            ScoreKind::Tp => record.record_tp(score, &self.config),
            ScoreKind::Exam => record.record_exam(score, &self.config),
        }
        let updated = record.clone();

        student.eliminated =
            aggregate_elimination(student.records.values().map(GradeRecord::eliminated));
        self.store.save_standing(&student).await?;

        // Dispatch after the save so a notification can never precede the
        // state it reports, and failures stay invisible to the caller.
        if let Some(teacher_email) = &course.teacher_email {
            self.notifier.notify(
                teacher_email,
                &format!("{} score recorded for {}", kind.label(), course.name),
                &format!(
                    "A {} score of {:.2} was recorded for {} in {}. The course average is now {:.2}.",
                    kind.label(),
                    score,
                    student.full_name,
                    course.name,
                    updated.average()
                ),
            );
        }
        if !was_eliminated && updated.eliminated() {
            self.notify_elimination(&student, &course, &updated);
        }

        Ok(updated)
    }

    /// Recount unjustified absences for `(student, course)` and push the
    /// result through the derivation chain. Must be called with the
    /// student's lock held.
    async fn refresh_pair(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<GradeRecord, StandingError> {
        let mut student = self
            .store
            .load_student(student_id)
            .await?
            .ok_or(StandingError::StudentNotFound(student_id))?;
        let course = self
            .store
            .load_course(course_id)
            .await?
            .ok_or(StandingError::CourseNotFound(course_id))?;

        self.recount_into(&mut student, &course).await
    }

    async fn recount_into(
        &self,
        student: &mut StudentSnapshot,
        course: &CourseSnapshot,
    ) -> Result<GradeRecord, StandingError> {
        let count = self
            .store
            .count_unjustified_absences(student.id, course.id)
            .await?;

        let record = student.records.entry(course.id).or_default();
        let was_eliminated = record.eliminated();
        record.set_absence_count(count, &self.config);
        let updated = record.clone();

        student.eliminated =
            aggregate_elimination(student.records.values().map(GradeRecord::eliminated));
        self.store.save_standing(student).await?;

        if !was_eliminated && updated.eliminated() {
            self.notify_elimination(student, course, &updated);
        }

        Ok(updated)
    }

    fn notify_elimination(
        &self,
        student: &StudentSnapshot,
        course: &CourseSnapshot,
        record: &GradeRecord,
    ) {
        self.notifier.notify(
            &student.email,
            &format!("Elimination notice for {}", course.name),
            &format!(
                "You have been eliminated from {} (average {:.2}, {} unjustified absences).",
                course.name,
                record.average(),
                record.absence_count()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::recording::RecordingNotifier;
    use crate::store::memory::MemoryStandingStore;

    fn service() -> AcademicStandingService<MemoryStandingStore, RecordingNotifier> {
        AcademicStandingService::new(
            MemoryStandingStore::new(),
            RecordingNotifier::default(),
            StandingConfig::default(),
        )
    }

    fn seed_student(
        svc: &AcademicStandingService<MemoryStandingStore, RecordingNotifier>,
    ) -> StudentId {
        let id = StudentId::new();
        svc.store.put_student(StudentSnapshot {
            id,
            full_name: "Lina Mansour".to_string(),
            email: "lina@example.com".to_string(),
            eliminated: false,
            records: HashMap::new(),
        });
        id
    }

    fn seed_course(
        svc: &AcademicStandingService<MemoryStandingStore, RecordingNotifier>,
        teacher_id: TeacherId,
    ) -> CourseId {
        let id = CourseId::new();
        svc.store.put_course(CourseSnapshot {
            id,
            name: "Algèbre".to_string(),
            teacher_id,
            teacher_email: Some("teacher@example.com".to_string()),
        });
        id
    }

    #[tokio::test]
    async fn rejects_out_of_range_score_without_touching_state() {
        let svc = service();
        let student = seed_student(&svc);
        let course = seed_course(&svc, TeacherId::new());

        let err = svc.record_tp_score(student, course, 25.0).await.unwrap_err();
        assert!(matches!(err, StandingError::InvalidScore(s) if s == 25.0));

        let stored = svc.store.student(student).unwrap();
        assert!(stored.records.is_empty());
        assert!(svc.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_student_is_not_found() {
        let svc = service();
        let course = seed_course(&svc, TeacherId::new());
        let err = svc
            .record_exam_score(StudentId::new(), course, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, StandingError::StudentNotFound(_)));
    }

    #[tokio::test]
    async fn lazily_creates_record_and_notifies_teacher() {
        let svc = service();
        let student = seed_student(&svc);
        let course = seed_course(&svc, TeacherId::new());

        let record = svc.record_exam_score(student, course, 15.0).await.unwrap();
        assert_eq!(record.exam_score(), 15.0);

        let sent = svc.notifier.sent.lock().unwrap();
        assert!(
            sent.iter()
                .any(|(recipient, _)| recipient == "teacher@example.com")
        );
    }

    #[tokio::test]
    async fn wrong_teacher_cannot_record_absence() {
        let svc = service();
        let student = seed_student(&svc);
        let owner = TeacherId::new();
        let course = seed_course(&svc, owner);

        let err = svc
            .record_absence(
                student,
                course,
                TeacherId::new(),
                chrono::Utc::now().date_naive(),
                false,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StandingError::ForbiddenAssociation { .. }));
    }

    #[tokio::test]
    async fn future_absence_date_is_rejected() {
        let svc = service();
        let student = seed_student(&svc);
        let teacher = TeacherId::new();
        let course = seed_course(&svc, teacher);

        let tomorrow = chrono::Utc::now().date_naive() + chrono::Duration::days(1);
        let err = svc
            .record_absence(student, course, teacher, tomorrow, false, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StandingError::InvalidAbsenceDate(_)));
    }
}
