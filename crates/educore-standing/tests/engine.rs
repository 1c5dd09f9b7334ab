//! End-to-end tests of the standing engine over the in-memory store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use educore_models::{CourseId, StudentId, TeacherId};
use educore_standing::{
    AcademicStandingService, CourseSnapshot, MemoryStandingStore, Notifier, StandingConfig,
    StandingError, StudentSnapshot,
};

#[derive(Debug, Default, Clone)]
struct CapturingNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl Notifier for CapturingNotifier {
    fn notify(&self, recipient: &str, subject: &str, _body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string()));
    }
}

struct Harness {
    store: MemoryStandingStore,
    notifier: CapturingNotifier,
    service: AcademicStandingService<MemoryStandingStore, CapturingNotifier>,
    student: StudentId,
    teacher: TeacherId,
    course_a: CourseId,
    course_b: CourseId,
}

fn harness() -> Harness {
    let store = MemoryStandingStore::new();
    let notifier = CapturingNotifier::default();
    let service = AcademicStandingService::new(
        store.clone(),
        notifier.clone(),
        StandingConfig::default(),
    );

    let student = StudentId::new();
    store.put_student(StudentSnapshot {
        id: student,
        full_name: "Yassine Trabelsi".to_string(),
        email: "yassine@example.com".to_string(),
        eliminated: false,
        records: HashMap::new(),
    });

    let teacher = TeacherId::new();
    let course_a = CourseId::new();
    let course_b = CourseId::new();
    store.put_course(CourseSnapshot {
        id: course_a,
        name: "Analyse".to_string(),
        teacher_id: teacher,
        teacher_email: Some("prof.analyse@example.com".to_string()),
    });
    store.put_course(CourseSnapshot {
        id: course_b,
        name: "Physique".to_string(),
        teacher_id: teacher,
        teacher_email: Some("prof.physique@example.com".to_string()),
    });

    Harness {
        store,
        notifier,
        service,
        student,
        teacher,
        course_a,
        course_b,
    }
}

#[tokio::test]
async fn low_average_eliminates_and_better_exam_reverses_it() {
    let h = harness();

    // 12 * 0.4 + 8 * 0.6 = 9.6, just under the 10.0 floor.
    h.service
        .record_tp_score(h.student, h.course_a, 12.0)
        .await
        .unwrap();
    let record = h
        .service
        .record_exam_score(h.student, h.course_a, 8.0)
        .await
        .unwrap();
    assert!((record.average() - 9.6).abs() < 1e-9);
    assert!(record.eliminated());

    let stored = h.store.student(h.student).unwrap();
    assert!(stored.eliminated);

    // A better exam lifts the average back over the floor; the global flag
    // follows on the same mutation, not on the next read.
    let record = h
        .service
        .record_exam_score(h.student, h.course_a, 10.0)
        .await
        .unwrap();
    assert!(!record.eliminated());
    assert!(!h.store.student(h.student).unwrap().eliminated);
}

#[tokio::test]
async fn fourth_unjustified_absence_eliminates_regardless_of_average() {
    let h = harness();

    h.service
        .record_tp_score(h.student, h.course_a, 18.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 18.0)
        .await
        .unwrap();

    let today = Utc::now().date_naive();
    for _ in 0..3 {
        let record_state = h
            .service
            .record_absence(h.student, h.course_a, h.teacher, today, false, None)
            .await
            .unwrap();
        assert!(!h
            .store
            .student(h.student)
            .unwrap()
            .records[&h.course_a]
            .eliminated());
        // Events accumulate one at a time.
        assert_eq!(record_state.course_id, h.course_a);
    }

    h.service
        .record_absence(h.student, h.course_a, h.teacher, today, false, None)
        .await
        .unwrap();

    let stored = h.store.student(h.student).unwrap();
    assert!(stored.records[&h.course_a].eliminated());
    assert!(stored.eliminated);
}

#[tokio::test]
async fn justified_absences_never_count() {
    let h = harness();
    let today = Utc::now().date_naive();

    h.service
        .record_tp_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();

    for _ in 0..6 {
        h.service
            .record_absence(
                h.student,
                h.course_a,
                h.teacher,
                today,
                true,
                Some("certificat médical".to_string()),
            )
            .await
            .unwrap();
    }

    let stored = h.store.student(h.student).unwrap();
    assert_eq!(stored.records[&h.course_a].absence_count(), 0);
    assert!(!stored.eliminated);
}

#[tokio::test]
async fn justify_then_revert_round_trips() {
    let h = harness();
    let today = Utc::now().date_naive();

    h.service
        .record_tp_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();

    let mut last = None;
    for _ in 0..4 {
        last = Some(
            h.service
                .record_absence(h.student, h.course_a, h.teacher, today, false, None)
                .await
                .unwrap(),
        );
    }
    let absence = last.unwrap();

    let before = h.store.student(h.student).unwrap();
    assert_eq!(before.records[&h.course_a].absence_count(), 4);
    assert!(before.eliminated);

    // Justifying the fourth absence drops the count under the limit and
    // reverses the elimination.
    let record = h
        .service
        .set_absence_justification(absence.id, true, Some("convocation".to_string()))
        .await
        .unwrap();
    assert_eq!(record.absence_count(), 3);
    assert!(!record.eliminated());
    assert!(!h.store.student(h.student).unwrap().eliminated);

    // Reverting restores exactly the pre-justification standing.
    let record = h
        .service
        .set_absence_justification(absence.id, false, None)
        .await
        .unwrap();
    assert_eq!(record.absence_count(), 4);
    assert!(record.eliminated());
    assert!(h.store.student(h.student).unwrap().eliminated);
}

#[tokio::test]
async fn deleting_an_absence_recounts_instead_of_decrementing() {
    let h = harness();
    let today = Utc::now().date_naive();

    h.service
        .record_tp_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..5 {
        events.push(
            h.service
                .record_absence(h.student, h.course_a, h.teacher, today, false, None)
                .await
                .unwrap(),
        );
    }
    assert!(h.store.student(h.student).unwrap().eliminated);

    h.service.delete_absence(events[0].id).await.unwrap();
    let record = h.service.delete_absence(events[1].id).await.unwrap();

    assert_eq!(record.absence_count(), 3);
    assert!(h.store.absence(events[0].id).is_none());
    assert!(!h.store.student(h.student).unwrap().eliminated);
}

#[tokio::test]
async fn elimination_in_one_course_sets_the_global_flag() {
    let h = harness();

    // Solid in course B.
    h.service
        .record_tp_score(h.student, h.course_b, 16.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_b, 14.0)
        .await
        .unwrap();

    // Failing in course A.
    h.service
        .record_tp_score(h.student, h.course_a, 4.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 5.0)
        .await
        .unwrap();

    let stored = h.store.student(h.student).unwrap();
    assert!(stored.records[&h.course_a].eliminated());
    assert!(!stored.records[&h.course_b].eliminated());
    assert!(stored.eliminated);
}

#[tokio::test]
async fn removing_the_only_eliminating_course_clears_the_global_flag() {
    let h = harness();

    h.service
        .record_tp_score(h.student, h.course_b, 16.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_b, 14.0)
        .await
        .unwrap();
    h.service
        .record_exam_score(h.student, h.course_a, 2.0)
        .await
        .unwrap();
    assert!(h.store.student(h.student).unwrap().eliminated);

    let global = h
        .service
        .remove_course_association(h.student, h.course_a)
        .await
        .unwrap();
    assert!(!global);

    let stored = h.store.student(h.student).unwrap();
    assert!(!stored.records.contains_key(&h.course_a));
    assert!(!stored.eliminated);
}

#[tokio::test]
async fn invalid_score_leaves_the_record_untouched() {
    let h = harness();

    h.service
        .record_tp_score(h.student, h.course_a, 12.0)
        .await
        .unwrap();
    let before = h.store.student(h.student).unwrap();

    let err = h
        .service
        .record_tp_score(h.student, h.course_a, 25.0)
        .await
        .unwrap_err();
    assert!(matches!(err, StandingError::InvalidScore(_)));

    let after = h.store.student(h.student).unwrap();
    assert_eq!(
        before.records[&h.course_a],
        after.records[&h.course_a]
    );
}

#[tokio::test]
async fn recording_the_same_score_twice_is_idempotent() {
    let h = harness();

    let first = h
        .service
        .record_tp_score(h.student, h.course_a, 13.5)
        .await
        .unwrap();
    let second = h
        .service
        .record_tp_score(h.student, h.course_a, 13.5)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        h.store.student(h.student).unwrap().records[&h.course_a],
        second
    );
}

#[tokio::test]
async fn elimination_flip_notifies_the_student_once() {
    let h = harness();
    let today = Utc::now().date_naive();

    // Exam first: 17 * 0.6 = 10.2 keeps the average above the floor at
    // every step, so the only flip in this test comes from absences.
    h.service
        .record_exam_score(h.student, h.course_a, 17.0)
        .await
        .unwrap();
    h.service
        .record_tp_score(h.student, h.course_a, 15.0)
        .await
        .unwrap();

    for _ in 0..5 {
        h.service
            .record_absence(h.student, h.course_a, h.teacher, today, false, None)
            .await
            .unwrap();
    }

    let sent = h.notifier.sent.lock().unwrap();
    let elimination_notices = sent
        .iter()
        .filter(|(recipient, subject)| {
            recipient == "yassine@example.com" && subject.contains("Elimination")
        })
        .count();
    // The flag flips once, on the fourth absence; the fifth does not re-notify.
    assert_eq!(elimination_notices, 1);
}

#[tokio::test]
async fn standing_view_reflects_the_latest_mutation() {
    let h = harness();

    assert_eq!(h.service.config().thresholds.max_absences, 3);

    h.service
        .record_tp_score(h.student, h.course_a, 11.0)
        .await
        .unwrap();

    let standing = h.service.student_standing(h.student).await.unwrap();
    assert_eq!(standing.id, h.student);
    assert_eq!(standing.records.len(), 1);
    assert_eq!(standing.records[&h.course_a].tp_score(), 11.0);

    let missing = h.service.student_standing(StudentId::new()).await;
    assert!(matches!(
        missing,
        Err(StandingError::StudentNotFound(_))
    ));
}

#[tokio::test]
async fn operations_on_distinct_students_run_concurrently() {
    let store = MemoryStandingStore::new();
    let service = AcademicStandingService::new(
        store.clone(),
        CapturingNotifier::default(),
        StandingConfig::default(),
    );

    let teacher = TeacherId::new();
    let course = CourseId::new();
    store.put_course(CourseSnapshot {
        id: course,
        name: "Chimie".to_string(),
        teacher_id: teacher,
        teacher_email: None,
    });

    let students: Vec<StudentId> = (0..8)
        .map(|i| {
            let id = StudentId::new();
            store.put_student(StudentSnapshot {
                id,
                full_name: format!("Student {i}"),
                email: format!("student{i}@example.com"),
                eliminated: false,
                records: HashMap::new(),
            });
            id
        })
        .collect();

    let mut handles = Vec::new();
    for &student in &students {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.record_exam_score(student, course, 12.0).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for &student in &students {
        let stored = store.student(student).unwrap();
        assert_eq!(stored.records[&course].exam_score(), 12.0);
    }
}
