//! Course catalogue model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Validation errors for course values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseValidationError {
    InvalidCode,
    EmptyTitle,
    CreditsOutOfRange { min: u8, max: u8 },
    YearOutOfRange { min: u8, max: u8 },
    SemesterOutOfRange,
}

impl fmt::Display for CourseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCode => write!(
                f,
                "course code must be 2 to 12 letters or digits"
            ),
            Self::EmptyTitle => write!(f, "course title must not be empty"),
            Self::CreditsOutOfRange { min, max } => {
                write!(f, "credits must be between {min} and {max}")
            }
            Self::YearOutOfRange { min, max } => {
                write!(f, "year must be between {min} and {max}")
            }
            Self::SemesterOutOfRange => write!(f, "semester must be 1 or 2"),
        }
    }
}

impl std::error::Error for CourseValidationError {}

/// Course code normalised to upper case, e.g. `CS3012`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode(String);

impl CourseCode {
    /// Validate and normalise a course code.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CourseValidationError> {
        let trimmed = code.as_ref().trim();
        if !(2..=12).contains(&trimmed.len())
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CourseValidationError::InvalidCode);
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<CourseCode> for String {
    fn from(value: CourseCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for CourseCode {
    type Error = CourseValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

pub const CREDITS_MIN: u8 = 1;
pub const CREDITS_MAX: u8 = 10;
pub const YEAR_MIN: u8 = 1;
pub const YEAR_MAX: u8 = 4;

/// Unvalidated course fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub code: CourseCode,
    pub title: String,
    pub credits: u8,
    pub year: u8,
    pub semester: u8,
    pub lecturers: Vec<UserId>,
}

/// Course offered in a given year and semester.
///
/// ## Invariants
/// - `title` is non-blank.
/// - `credits`, `year` and `semester` are within their documented ranges.
/// - `lecturers` holds no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    code: CourseCode,
    title: String,
    credits: u8,
    year: u8,
    semester: u8,
    lecturers: Vec<UserId>,
}

impl Course {
    /// Validate a draft into a course.
    pub fn new(draft: CourseDraft) -> Result<Self, CourseValidationError> {
        let CourseDraft {
            code,
            title,
            credits,
            year,
            semester,
            lecturers,
        } = draft;
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseValidationError::EmptyTitle);
        }
        if !(CREDITS_MIN..=CREDITS_MAX).contains(&credits) {
            return Err(CourseValidationError::CreditsOutOfRange {
                min: CREDITS_MIN,
                max: CREDITS_MAX,
            });
        }
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(CourseValidationError::YearOutOfRange {
                min: YEAR_MIN,
                max: YEAR_MAX,
            });
        }
        if !(1..=2).contains(&semester) {
            return Err(CourseValidationError::SemesterOutOfRange);
        }
        let mut unique = Vec::with_capacity(lecturers.len());
        for lecturer in lecturers {
            if !unique.contains(&lecturer) {
                unique.push(lecturer);
            }
        }
        Ok(Self {
            code,
            title,
            credits,
            year,
            semester,
            lecturers: unique,
        })
    }

    pub fn code(&self) -> &CourseCode {
        &self.code
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn credits(&self) -> u8 {
        self.credits
    }

    pub fn year(&self) -> u8 {
        self.year
    }

    pub fn semester(&self) -> u8 {
        self.semester
    }

    pub fn lecturers(&self) -> &[UserId] {
        &self.lecturers
    }

    /// Whether the lecturer is assigned to this course.
    pub fn is_taught_by(&self, lecturer: &UserId) -> bool {
        self.lecturers.contains(lecturer)
    }

    /// Convert back to a draft for partial updates.
    pub fn into_draft(self) -> CourseDraft {
        CourseDraft {
            code: self.code,
            title: self.title,
            credits: self.credits,
            year: self.year,
            semester: self.semester,
            lecturers: self.lecturers,
        }
    }
}
