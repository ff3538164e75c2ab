//! Exams and assignments scheduled against courses.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::domain::{CourseCode, UserId};

/// Validation errors for schedule entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    EmptyGroup,
    InvalidTimeRange,
    EmptyTitle,
}

impl fmt::Display for ScheduleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup => write!(f, "group_id is required"),
            Self::InvalidTimeRange => write!(f, "start_time must be before end_time"),
            Self::EmptyTitle => write!(f, "title is required"),
        }
    }
}

impl std::error::Error for ScheduleValidationError {}

/// Exam fields before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamDraft {
    pub course_code: CourseCode,
    pub group_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: Option<String>,
}

impl ExamDraft {
    /// Trim text fields and check the time range.
    pub fn validate(self) -> Result<Self, ScheduleValidationError> {
        let group_id = self.group_id.trim().to_owned();
        if group_id.is_empty() {
            return Err(ScheduleValidationError::EmptyGroup);
        }
        if self.start_time >= self.end_time {
            return Err(ScheduleValidationError::InvalidTimeRange);
        }
        Ok(Self {
            group_id,
            venue: self
                .venue
                .map(|venue| venue.trim().to_owned())
                .filter(|venue| !venue.is_empty()),
            ..self
        })
    }
}

/// A scheduled exam sitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exam {
    pub id: Uuid,
    pub course_code: CourseCode,
    pub group_id: String,
    pub exam_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: Option<String>,
}

impl Exam {
    pub fn from_draft(id: Uuid, draft: ExamDraft) -> Self {
        Self {
            id,
            course_code: draft.course_code,
            group_id: draft.group_id,
            exam_date: draft.exam_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            venue: draft.venue,
        }
    }

    pub fn to_draft(&self) -> ExamDraft {
        ExamDraft {
            course_code: self.course_code.clone(),
            group_id: self.group_id.clone(),
            exam_date: self.exam_date,
            start_time: self.start_time,
            end_time: self.end_time,
            venue: self.venue.clone(),
        }
    }

    /// Whether this exam occupies the same group slot as `draft`.
    ///
    /// Touching intervals do not clash.
    ///
    /// # Examples
    /// ```
    /// use campus_backend::domain::{CourseCode, Exam, ExamDraft};
    /// use chrono::{NaiveDate, NaiveTime};
    /// use uuid::Uuid;
    ///
    /// let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
    /// let draft = ExamDraft {
    ///     course_code: CourseCode::new("CS101").unwrap(),
    ///     group_id: "G1".into(),
    ///     exam_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
    ///     start_time: at(9),
    ///     end_time: at(11),
    ///     venue: None,
    /// };
    /// let existing = Exam::from_draft(Uuid::new_v4(), draft.clone());
    /// let later = ExamDraft { start_time: at(11), end_time: at(12), ..draft };
    /// assert!(!existing.clashes_with(&later));
    /// ```
    pub fn clashes_with(&self, draft: &ExamDraft) -> bool {
        self.group_id == draft.group_id
            && self.exam_date == draft.exam_date
            && !(draft.end_time <= self.start_time || draft.start_time >= self.end_time)
    }
}

/// Assignment fields before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub course_code: CourseCode,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDateTime,
    pub assigned_by: UserId,
}

impl AssignmentDraft {
    pub fn validate(self) -> Result<Self, ScheduleValidationError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(ScheduleValidationError::EmptyTitle);
        }
        Ok(Self { title, ..self })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: Uuid,
    pub course_code: CourseCode,
    pub title: String,
    pub description: Option<String>,
    pub due_date: NaiveDateTime,
    pub assigned_by: UserId,
}

impl Assignment {
    pub fn from_draft(id: Uuid, draft: AssignmentDraft) -> Self {
        Self {
            id,
            course_code: draft.course_code,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            assigned_by: draft.assigned_by,
        }
    }

    pub fn to_draft(&self) -> AssignmentDraft {
        AssignmentDraft {
            course_code: self.course_code.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date,
            assigned_by: self.assigned_by.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Exam clash and draft validation coverage.

    use super::*;
    use rstest::{fixture, rstest};

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
    }

    #[fixture]
    fn draft() -> ExamDraft {
        ExamDraft {
            course_code: CourseCode::new("CS101").expect("valid code"),
            group_id: "G1".to_owned(),
            exam_date: NaiveDate::from_ymd_opt(2026, 5, 4).expect("valid date"),
            start_time: at(9, 0),
            end_time: at(11, 0),
            venue: Some("Hall A".to_owned()),
        }
    }

    #[rstest]
    #[case(at(10, 0), at(12, 0), true)]
    #[case(at(8, 0), at(9, 30), true)]
    #[case(at(9, 30), at(10, 0), true)]
    #[case(at(8, 0), at(12, 0), true)]
    #[case(at(11, 0), at(12, 0), false)]
    #[case(at(7, 0), at(9, 0), false)]
    fn clash_detection(
        draft: ExamDraft,
        #[case] start: NaiveTime,
        #[case] end: NaiveTime,
        #[case] clashes: bool,
    ) {
        let existing = Exam::from_draft(Uuid::new_v4(), draft.clone());
        let candidate = ExamDraft {
            start_time: start,
            end_time: end,
            ..draft
        };
        assert_eq!(existing.clashes_with(&candidate), clashes);
    }

    #[rstest]
    fn other_groups_and_dates_never_clash(draft: ExamDraft) {
        let existing = Exam::from_draft(Uuid::new_v4(), draft.clone());
        let other_group = ExamDraft {
            group_id: "G2".to_owned(),
            ..draft.clone()
        };
        let other_day = ExamDraft {
            exam_date: NaiveDate::from_ymd_opt(2026, 5, 5).expect("valid date"),
            ..draft
        };
        assert!(!existing.clashes_with(&other_group));
        assert!(!existing.clashes_with(&other_day));
    }

    #[rstest]
    fn validate_rejects_inverted_range(draft: ExamDraft) {
        let inverted = ExamDraft {
            start_time: at(11, 0),
            end_time: at(9, 0),
            ..draft
        };
        assert_eq!(
            inverted.validate(),
            Err(ScheduleValidationError::InvalidTimeRange)
        );
    }

    #[rstest]
    fn validate_trims_group_and_drops_blank_venue(draft: ExamDraft) {
        let padded = ExamDraft {
            group_id: " G1 ".to_owned(),
            venue: Some("  ".to_owned()),
            ..draft
        };
        let validated = padded.validate().expect("valid draft");
        assert_eq!(validated.group_id, "G1");
        assert!(validated.venue.is_none());
    }

    #[rstest]
    fn assignment_requires_title() {
        let draft = AssignmentDraft {
            course_code: CourseCode::new("CS101").expect("valid code"),
            title: " ".to_owned(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2026, 5, 4)
                .expect("valid date")
                .and_time(at(23, 59)),
            assigned_by: UserId::random(),
        };
        assert_eq!(draft.validate(), Err(ScheduleValidationError::EmptyTitle));
    }
}
