//! Tests for exam and assignment scheduling.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rstest::rstest;

use super::*;
use crate::domain::ports::{MockCourseRepository, MockProfileRepository, MockScheduleRepository};
use crate::domain::{
    Affiliation, Course, CourseDraft, DisplayName, Email, ErrorCode, Profile, ProfileIdentity,
    RegNumber, StudentDetails,
};

fn at(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time")
}

fn code() -> CourseCode {
    CourseCode::new("CS101").expect("valid code")
}

fn course() -> Course {
    Course::new(CourseDraft {
        code: code(),
        title: "Programming".to_owned(),
        credits: 3,
        year: 1,
        semester: 1,
        lecturers: Vec::new(),
    })
    .expect("valid course")
}

fn draft(start: u32, end: u32) -> ExamDraft {
    ExamDraft {
        course_code: code(),
        group_id: "G1".to_owned(),
        exam_date: NaiveDate::from_ymd_opt(2026, 5, 4).expect("valid date"),
        start_time: at(start),
        end_time: at(end),
        venue: Some("Hall A".to_owned()),
    }
}

fn identity(user_id: UserId) -> ProfileIdentity {
    ProfileIdentity {
        user_id,
        email: Email::new("perera@cs.lk").expect("valid email"),
        display_name: DisplayName::new("Dr Perera").expect("valid name"),
        phone: None,
        affiliation: Affiliation {
            department: "Computer Science".to_owned(),
            faculty: "Faculty of Computing".to_owned(),
        },
    }
}

fn assignment_draft(assigned_by: UserId) -> AssignmentDraft {
    AssignmentDraft {
        course_code: code(),
        title: "Lab report".to_owned(),
        description: None,
        due_date: NaiveDate::from_ymd_opt(2026, 5, 10)
            .expect("valid date")
            .and_time(at(23)),
        assigned_by,
    }
}

fn service(
    schedule: MockScheduleRepository,
    profiles: MockProfileRepository,
    courses: MockCourseRepository,
) -> ScheduleService<MockScheduleRepository, MockProfileRepository, MockCourseRepository> {
    ScheduleService::new(Arc::new(schedule), Arc::new(profiles), Arc::new(courses))
}

fn courses_with_course() -> MockCourseRepository {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_code()
        .returning(|_| Ok(Some(course())));
    courses
}

#[rstest]
#[case(10, 12, true)]
#[case(11, 13, false)]
#[tokio::test]
async fn schedule_exam_checks_group_clashes(
    #[case] start: u32,
    #[case] end: u32,
    #[case] clashes: bool,
) {
    let existing = Exam::from_draft(Uuid::new_v4(), draft(9, 11));
    let mut schedule = MockScheduleRepository::new();
    schedule
        .expect_exams_for_group_on()
        .withf(|group, _| group == "G1")
        .return_once(move |_, _| Ok(vec![existing]));
    schedule
        .expect_insert_exam()
        .times(usize::from(!clashes))
        .returning(|_| Ok(()));

    let result = service(schedule, MockProfileRepository::new(), courses_with_course())
        .schedule_exam(draft(start, end))
        .await;

    match result {
        Err(error) if clashes => {
            assert_eq!(error.code(), ErrorCode::Conflict);
            assert_eq!(error.message(), EXAM_CLASH_MESSAGE);
        }
        Ok(exam) if !clashes => assert_eq!(exam.start_time, at(start)),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn update_exam_ignores_its_own_slot() {
    let id = Uuid::new_v4();
    let current = Exam::from_draft(id, draft(9, 11));
    let same_slot = current.clone();
    let mut schedule = MockScheduleRepository::new();
    schedule
        .expect_find_exam()
        .return_once(move |_| Ok(Some(current)));
    schedule
        .expect_exams_for_group_on()
        .return_once(move |_, _| Ok(vec![same_slot]));
    schedule
        .expect_update_exam()
        .withf(|exam| exam.end_time == at(12))
        .times(1)
        .return_once(|_| Ok(true));

    let update = ExamUpdate {
        end_time: Some(at(12)),
        ..ExamUpdate::default()
    };
    let exam = service(
        schedule,
        MockProfileRepository::new(),
        MockCourseRepository::new(),
    )
    .update_exam(&id, update)
    .await
    .expect("update succeeds");
    assert_eq!(exam.id, id);
}

#[tokio::test]
async fn delete_missing_exam_is_not_found() {
    let mut schedule = MockScheduleRepository::new();
    schedule.expect_delete_exam().return_once(|_| Ok(false));

    let error = service(
        schedule,
        MockProfileRepository::new(),
        MockCourseRepository::new(),
    )
    .delete_exam(&Uuid::new_v4())
    .await
    .expect_err("missing");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn create_assignment_requires_lecturer() {
    let student_id = UserId::random();
    let student = Profile::student(
        identity(student_id.clone()),
        StudentDetails {
            reg_number: RegNumber::new("220001").expect("valid reg"),
            year_of_study: 4,
            semester: 1,
        },
    );
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(student)));
    let mut schedule = MockScheduleRepository::new();
    schedule.expect_insert_assignment().times(0);

    let error = service(schedule, profiles, MockCourseRepository::new())
        .create_assignment(assignment_draft(student_id))
        .await
        .expect_err("not a lecturer");
    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn create_assignment_requires_existing_course() {
    let lecturer_id = UserId::random();
    let lecturer = Profile::lecturer(identity(lecturer_id.clone()), "lecturer");
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(lecturer)));
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_code().return_once(|_| Ok(None));

    let error = service(MockScheduleRepository::new(), profiles, courses)
        .create_assignment(assignment_draft(lecturer_id))
        .await
        .expect_err("unknown course");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_assignment_persists_for_lecturer() {
    let lecturer_id = UserId::random();
    let lecturer = Profile::lecturer(identity(lecturer_id.clone()), "lecturer");
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(lecturer)));
    let mut schedule = MockScheduleRepository::new();
    schedule
        .expect_insert_assignment()
        .times(1)
        .return_once(|_| Ok(()));

    let assignment = service(schedule, profiles, courses_with_course())
        .create_assignment(assignment_draft(lecturer_id.clone()))
        .await
        .expect("created");
    assert_eq!(assignment.assigned_by, lecturer_id);
    assert_eq!(assignment.title, "Lab report");
}
