//! HTTP inbound adapter exposing the `/api-gateway` REST surface.

use actix_web::web;

pub mod attendance;
pub mod courses;
pub mod error;
pub mod health;
pub mod notifications;
pub mod schedule;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod user_profiles;
pub mod validation;

pub use error::ApiResult;

/// Register the gateway scope and its extractor error handlers.
///
/// Literal course routes are registered before `/courses/{course_id}` so
/// `all` is never captured as a course code.
pub fn configure_gateway(cfg: &mut web::ServiceConfig) {
    cfg.app_data(error::json_config())
        .app_data(error::query_config())
        .app_data(error::path_config())
        .service(
            web::scope("/api-gateway")
                .service(user_profiles::sign_up)
                .service(user_profiles::sign_in)
                .service(user_profiles::sign_out)
                .service(user_profiles::get_user)
                .service(user_profiles::update_profile)
                .service(user_profiles::list_lecturers)
                .service(courses::enrolled_courses)
                .service(courses::eligible_courses)
                .service(courses::assigned_courses)
                .service(courses::all_courses)
                .service(courses::enroll)
                .service(courses::unenroll)
                .service(courses::add_course)
                .service(courses::assigned_lecturers)
                .service(courses::get_course)
                .service(courses::update_course)
                .service(attendance::mark)
                .service(attendance::can_mark)
                .service(attendance::stats)
                .service(attendance::mark_absent)
                .service(attendance::course_report)
                .service(attendance::register_face)
                .service(notifications::send)
                .service(notifications::for_user)
                .service(notifications::sent)
                .service(notifications::get_notification)
                .service(schedule::schedule_exam)
                .service(schedule::list_exams)
                .service(schedule::get_exam)
                .service(schedule::update_exam)
                .service(schedule::delete_exam)
                .service(schedule::create_assignment)
                .service(schedule::list_assignments)
                .service(schedule::get_assignment)
                .service(schedule::update_assignment)
                .service(schedule::delete_assignment),
        );
}
