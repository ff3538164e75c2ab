//! Diesel table definitions.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Student and lecturer profiles. Student-only columns are null for
    /// lecturers and vice versa.
    profiles (user_id) {
        user_id -> Uuid,
        email -> Varchar,
        display_name -> Varchar,
        phone -> Nullable<Varchar>,
        role -> Varchar,
        department -> Varchar,
        faculty -> Varchar,
        reg_number -> Nullable<Varchar>,
        /// Numeric value of `reg_number`, for batch range lookups.
        reg_value -> Nullable<Int8>,
        year_of_study -> Nullable<Int4>,
        semester -> Nullable<Int2>,
        designation -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    courses (code) {
        code -> Varchar,
        title -> Varchar,
        credits -> Int2,
        year -> Int2,
        semester -> Int2,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Lecturer assignments; `position` keeps the submitted order.
    course_lecturers (course_code, lecturer_id) {
        course_code -> Varchar,
        lecturer_id -> Uuid,
        position -> Int2,
    }
}

diesel::table! {
    enrollments (course_code, reg_number) {
        course_code -> Varchar,
        reg_number -> Varchar,
        enrolled_at -> Timestamptz,
    }
}

diesel::table! {
    attendance_records (id) {
        id -> Uuid,
        reg_number -> Varchar,
        status -> Varchar,
        method -> Varchar,
        course_code -> Varchar,
        location -> Nullable<Varchar>,
        confidence -> Nullable<Float8>,
        marked_at -> Timestamptz,
    }
}

diesel::table! {
    notifications (id) {
        id -> Uuid,
        recipient_id -> Uuid,
        sender_id -> Uuid,
        title -> Varchar,
        message -> Text,
        course_code -> Varchar,
        priority -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    exams (id) {
        id -> Uuid,
        course_code -> Varchar,
        group_id -> Varchar,
        exam_date -> Date,
        start_time -> Time,
        end_time -> Time,
        venue -> Nullable<Varchar>,
    }
}

diesel::table! {
    assignments (id) {
        id -> Uuid,
        course_code -> Varchar,
        title -> Varchar,
        description -> Nullable<Text>,
        due_date -> Timestamp,
        assigned_by -> Uuid,
    }
}

diesel::joinable!(course_lecturers -> courses (course_code));
diesel::joinable!(enrollments -> courses (course_code));

diesel::allow_tables_to_appear_in_same_query!(courses, course_lecturers, enrollments);
