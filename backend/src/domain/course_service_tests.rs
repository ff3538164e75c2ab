//! Tests for the course service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockCourseRepository, MockProfileRepository};
use crate::domain::{
    Affiliation, DisplayName, Email, ErrorCode, ProfileIdentity, StudentDetails,
};

fn identity(user_id: UserId, email: &str) -> ProfileIdentity {
    ProfileIdentity {
        user_id,
        email: Email::new(email).expect("valid email"),
        display_name: DisplayName::new("Campus Member").expect("valid name"),
        phone: None,
        affiliation: Affiliation {
            department: "Computer Science".to_owned(),
            faculty: "Faculty of Computing".to_owned(),
        },
    }
}

fn student(semester: u8) -> Profile {
    Profile::student(
        identity(UserId::random(), "nimal.22@cs.lk"),
        StudentDetails {
            reg_number: reg(),
            year_of_study: 4,
            semester,
        },
    )
}

fn lecturer(user_id: UserId) -> Profile {
    Profile::lecturer(identity(user_id, "perera@cs.lk"), "lecturer")
}

fn reg() -> RegNumber {
    RegNumber::new("220001").expect("valid reg")
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

fn service(
    courses: MockCourseRepository,
    profiles: MockProfileRepository,
) -> CourseService<MockCourseRepository, MockProfileRepository> {
    CourseService::new(Arc::new(courses), Arc::new(profiles))
}

#[tokio::test]
async fn eligible_courses_follow_student_semester() {
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_reg_number()
        .return_once(|_| Ok(Some(student(2))));
    let mut courses = MockCourseRepository::new();
    courses
        .expect_list_by_semester()
        .withf(|semester| *semester == 2)
        .times(1)
        .return_once(|_| Ok(vec![course()]));

    let eligible = service(courses, profiles)
        .eligible_courses(&reg())
        .await
        .expect("eligible courses");
    assert_eq!(eligible.len(), 1);
}

#[tokio::test]
async fn eligible_courses_require_known_student() {
    let mut profiles = MockProfileRepository::new();
    profiles.expect_find_by_reg_number().return_once(|_| Ok(None));
    let mut courses = MockCourseRepository::new();
    courses.expect_list_by_semester().times(0);

    let error = service(courses, profiles)
        .eligible_courses(&reg())
        .await
        .expect_err("unknown student");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_course_rejects_non_lecturer_assignment() {
    let student = student(1);
    let student_id = student.user_id().clone();
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(student)));
    let mut courses = MockCourseRepository::new();
    courses.expect_create().times(0);

    let draft = CourseDraft {
        lecturers: vec![student_id],
        ..course().into_draft()
    };
    let error = service(courses, profiles)
        .add_course(draft)
        .await
        .expect_err("not a lecturer");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn add_course_maps_duplicate_to_conflict() {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_create()
        .return_once(|_| Err(CourseRepositoryError::duplicate("CS101")));

    let error = service(courses, MockProfileRepository::new())
        .add_course(course().into_draft())
        .await
        .expect_err("duplicate");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), "Course CS101 already exists");
}

#[tokio::test]
async fn update_course_applies_partial_fields() {
    let lecturer_id = UserId::random();
    let assigned = lecturer(lecturer_id.clone());
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(assigned)));
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_code()
        .return_once(|_| Ok(Some(course())));
    courses
        .expect_update()
        .withf(|course| course.credits() == 4 && course.title() == "Programming")
        .times(1)
        .return_once(|_| Ok(()));

    let update = CourseUpdate {
        credits: Some(4),
        lecturers: Some(vec![lecturer_id.clone()]),
        ..CourseUpdate::default()
    };
    let updated = service(courses, profiles)
        .update_course(&code(), update)
        .await
        .expect("update succeeds");
    assert!(updated.is_taught_by(&lecturer_id));
}

#[tokio::test]
async fn enroll_maps_duplicate_to_conflict() {
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_reg_number()
        .return_once(|_| Ok(Some(student(1))));
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_code()
        .return_once(|_| Ok(Some(course())));
    courses
        .expect_enroll()
        .return_once(|_, _| Err(CourseRepositoryError::duplicate("220001/CS101")));

    let error = service(courses, profiles)
        .enroll(&reg(), &code())
        .await
        .expect_err("already enrolled");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn enroll_requires_existing_course() {
    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_reg_number()
        .return_once(|_| Ok(Some(student(1))));
    let mut courses = MockCourseRepository::new();
    courses.expect_find_by_code().return_once(|_| Ok(None));
    courses.expect_enroll().times(0);

    let error = service(courses, profiles)
        .enroll(&reg(), &code())
        .await
        .expect_err("unknown course");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn unenroll_reports_missing_enrolment() {
    let mut courses = MockCourseRepository::new();
    courses.expect_unenroll().return_once(|_, _| Ok(false));

    let error = service(courses, MockProfileRepository::new())
        .unenroll(&reg(), &code())
        .await
        .expect_err("not enrolled");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn assigned_lecturers_skip_missing_profiles() {
    let known = UserId::random();
    let missing = UserId::random();
    let with_lecturers = Course::new(CourseDraft {
        lecturers: vec![known.clone(), missing],
        ..course().into_draft()
    })
    .expect("valid course");

    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_by_code()
        .return_once(move |_| Ok(Some(with_lecturers)));
    let mut profiles = MockProfileRepository::new();
    let known_for_lookup = known.clone();
    profiles.expect_find_by_id().times(2).returning(move |id| {
        Ok((id == &known_for_lookup).then(|| lecturer(known_for_lookup.clone())))
    });

    let lecturers = service(courses, profiles)
        .assigned_lecturers(&code())
        .await
        .expect("lecturers");
    assert_eq!(lecturers.len(), 1);
    assert_eq!(lecturers[0].user_id(), &known);
}
