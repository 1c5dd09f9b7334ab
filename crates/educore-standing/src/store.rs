//! Storage abstraction so the engine can be exercised in isolation.
//!
//! The engine never talks SQL. It loads snapshots, recomputes, and hands the
//! whole standing back through [`StandingStore::save_standing`], which the
//! backend must apply atomically: either every record and the global flag
//! are visible to other readers, or none are.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;

use educore_models::{AbsenceId, CourseId, StudentId, TeacherId};

use crate::record::GradeRecord;

/// A student's full standing as loaded from storage: identity, contact
/// address for notifications, the derived global flag, and every grade
/// record keyed by course.
#[derive(Debug, Clone)]
pub struct StudentSnapshot {
    pub id: StudentId,
    pub full_name: String,
    pub email: String,
    pub eliminated: bool,
    pub records: HashMap<CourseId, GradeRecord>,
}

/// The slice of a course the engine needs: ownership and the owning
/// teacher's contact address.
#[derive(Debug, Clone)]
pub struct CourseSnapshot {
    pub id: CourseId,
    pub name: String,
    pub teacher_id: TeacherId,
    pub teacher_email: Option<String>,
}

/// A persisted absence event.
#[derive(Debug, Clone, PartialEq)]
pub struct AbsenceEvent {
    pub id: AbsenceId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    pub justified: bool,
    pub reason: Option<String>,
}

/// Payload for inserting a new absence event.
#[derive(Debug, Clone)]
pub struct NewAbsence {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
    pub justified: bool,
    pub reason: Option<String>,
}

/// Backend failure. Surfaced as-is to the caller; a storage failure aborts
/// the whole mutation.
#[derive(Debug, Error)]
#[error("storage backend failure: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self(err.to_string())
    }
}

/// Persistence collaborator for the standing engine.
#[allow(async_fn_in_trait)]
pub trait StandingStore: Send + Sync {
    /// Load a student with their complete grade record map. `None` when the
    /// student does not exist or is soft-deleted.
    async fn load_student(&self, id: StudentId) -> Result<Option<StudentSnapshot>, StoreError>;

    async fn load_course(&self, id: CourseId) -> Result<Option<CourseSnapshot>, StoreError>;

    async fn load_absence(&self, id: AbsenceId) -> Result<Option<AbsenceEvent>, StoreError>;

    async fn insert_absence(&self, absence: NewAbsence) -> Result<AbsenceEvent, StoreError>;

    async fn update_absence_justification(
        &self,
        id: AbsenceId,
        justified: bool,
        reason: Option<String>,
    ) -> Result<(), StoreError>;

    async fn delete_absence(&self, id: AbsenceId) -> Result<(), StoreError>;

    /// Count the unjustified absences currently on file for the pair.
    async fn count_unjustified_absences(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<u32, StoreError>;

    /// Persist a student's standing: every grade record in the snapshot plus
    /// the global flag, all-or-nothing.
    async fn save_standing(&self, snapshot: &StudentSnapshot) -> Result<(), StoreError>;

    /// Remove the grade record for one pair. The caller persists the
    /// recomputed global flag separately through [`Self::save_standing`].
    async fn delete_record(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<(), StoreError>;
}

pub mod memory {
    //! In-memory store used by the engine's tests and for local development
    //! without a database.

    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct Inner {
        students: HashMap<StudentId, StudentSnapshot>,
        courses: HashMap<CourseId, CourseSnapshot>,
        absences: HashMap<AbsenceId, AbsenceEvent>,
    }

    /// A [`StandingStore`] holding everything in process memory. Clones
    /// share the same underlying state, mirroring how a pool-backed store
    /// shares its database.
    #[derive(Default, Clone)]
    pub struct MemoryStandingStore {
        inner: Arc<Mutex<Inner>>,
    }

    impl MemoryStandingStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a student. Overwrites any existing snapshot with the same id.
        pub fn put_student(&self, snapshot: StudentSnapshot) {
            self.inner
                .lock()
                .unwrap()
                .students
                .insert(snapshot.id, snapshot);
        }

        /// Seed a course.
        pub fn put_course(&self, snapshot: CourseSnapshot) {
            self.inner
                .lock()
                .unwrap()
                .courses
                .insert(snapshot.id, snapshot);
        }

        /// Direct read of a stored student, for assertions.
        pub fn student(&self, id: StudentId) -> Option<StudentSnapshot> {
            self.inner.lock().unwrap().students.get(&id).cloned()
        }

        /// Direct read of a stored absence, for assertions.
        pub fn absence(&self, id: AbsenceId) -> Option<AbsenceEvent> {
            self.inner.lock().unwrap().absences.get(&id).cloned()
        }
    }

    impl StandingStore for MemoryStandingStore {
        async fn load_student(
            &self,
            id: StudentId,
        ) -> Result<Option<StudentSnapshot>, StoreError> {
            Ok(self.inner.lock().unwrap().students.get(&id).cloned())
        }

        async fn load_course(&self, id: CourseId) -> Result<Option<CourseSnapshot>, StoreError> {
            Ok(self.inner.lock().unwrap().courses.get(&id).cloned())
        }

        async fn load_absence(&self, id: AbsenceId) -> Result<Option<AbsenceEvent>, StoreError> {
            Ok(self.inner.lock().unwrap().absences.get(&id).cloned())
        }

        async fn insert_absence(&self, absence: NewAbsence) -> Result<AbsenceEvent, StoreError> {
            let event = AbsenceEvent {
                id: AbsenceId::new(),
                student_id: absence.student_id,
                course_id: absence.course_id,
                teacher_id: absence.teacher_id,
                date: absence.date,
                justified: absence.justified,
                reason: absence.reason,
            };
            self.inner
                .lock()
                .unwrap()
                .absences
                .insert(event.id, event.clone());
            Ok(event)
        }

        async fn update_absence_justification(
            &self,
            id: AbsenceId,
            justified: bool,
            reason: Option<String>,
        ) -> Result<(), StoreError> {
            let mut inner = self.inner.lock().unwrap();
            let event = inner
                .absences
                .get_mut(&id)
                .ok_or_else(|| StoreError::backend("absence vanished"))?;
            event.justified = justified;
            if reason.is_some() {
                event.reason = reason;
            }
            Ok(())
        }

        async fn delete_absence(&self, id: AbsenceId) -> Result<(), StoreError> {
            self.inner.lock().unwrap().absences.remove(&id);
            Ok(())
        }

        async fn count_unjustified_absences(
            &self,
            student_id: StudentId,
            course_id: CourseId,
        ) -> Result<u32, StoreError> {
            let inner = self.inner.lock().unwrap();
            let count = inner
                .absences
                .values()
                .filter(|a| {
                    a.student_id == student_id && a.course_id == course_id && !a.justified
                })
                .count();
            Ok(count as u32)
        }

        async fn save_standing(&self, snapshot: &StudentSnapshot) -> Result<(), StoreError> {
            self.inner
                .lock()
                .unwrap()
                .students
                .insert(snapshot.id, snapshot.clone());
            Ok(())
        }

        async fn delete_record(
            &self,
            student_id: StudentId,
            course_id: CourseId,
        ) -> Result<(), StoreError> {
            let mut inner = self.inner.lock().unwrap();
            if let Some(student) = inner.students.get_mut(&student_id) {
                student.records.remove(&course_id);
            }
            Ok(())
        }
    }
}
