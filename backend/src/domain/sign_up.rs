//! Sign-up rules derived from institutional email addresses.
//!
//! Students sign up as `name.NN@dept.lk`, where `NN` is the two-digit intake
//! batch; lecturers sign up as `name@dept.lk`. The department code picks the
//! department and faculty from the [`DepartmentDirectory`].

use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Utc};
use regex::Regex;

use crate::domain::{Affiliation, Email, RegNumber, Role};

/// Errors raised while applying sign-up rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpRuleError {
    UnrecognisedEmail,
    UnknownDepartment { code: String },
    RegNumberExhausted { batch: u8 },
}

impl fmt::Display for SignUpRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedEmail => write!(
                f,
                "Email must be in the format name.22@dep.lk or name@dep.lk"
            ),
            Self::UnknownDepartment { .. } => write!(f, "Invalid department"),
            Self::RegNumberExhausted { batch } => {
                write!(f, "no registration numbers left for batch {batch}")
            }
        }
    }
}

impl std::error::Error for SignUpRuleError {}

/// Role and department extracted from a sign-up email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailClass {
    Student { batch: u8, department_code: String },
    Lecturer { department_code: String },
}

impl EmailClass {
    pub fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Lecturer { .. } => Role::Lecturer,
        }
    }

    pub fn department_code(&self) -> &str {
        match self {
            Self::Student {
                department_code, ..
            }
            | Self::Lecturer { department_code } => department_code.as_str(),
        }
    }
}

static STUDENT_EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static LECTURER_EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn student_email_regex() -> &'static Regex {
    STUDENT_EMAIL_RE.get_or_init(|| {
        Regex::new(r"^([a-zA-Z]+)\.(\d{2})@([a-z]+)\.lk$")
            .unwrap_or_else(|error| panic!("student email regex failed to compile: {error}"))
    })
}

fn lecturer_email_regex() -> &'static Regex {
    LECTURER_EMAIL_RE.get_or_init(|| {
        Regex::new(r"^([a-zA-Z]+)@([a-z]+)\.lk$")
            .unwrap_or_else(|error| panic!("lecturer email regex failed to compile: {error}"))
    })
}

/// Classify a sign-up email as student or lecturer.
///
/// # Examples
/// ```
/// use campus_backend::domain::{Email, EmailClass, classify_email};
///
/// let email = Email::new("nimal.22@cs.lk").unwrap();
/// assert_eq!(
///     classify_email(&email).unwrap(),
///     EmailClass::Student { batch: 22, department_code: "cs".to_owned() }
/// );
/// ```
pub fn classify_email(email: &Email) -> Result<EmailClass, SignUpRuleError> {
    let raw = email.as_ref();
    if let Some(captures) = student_email_regex().captures(raw) {
        let batch = captures
            .get(2)
            .and_then(|m| m.as_str().parse::<u8>().ok())
            .ok_or(SignUpRuleError::UnrecognisedEmail)?;
        let department_code = captures
            .get(3)
            .map(|m| m.as_str().to_owned())
            .ok_or(SignUpRuleError::UnrecognisedEmail)?;
        return Ok(EmailClass::Student {
            batch,
            department_code,
        });
    }

    lecturer_email_regex()
        .captures(raw)
        .and_then(|captures| captures.get(2))
        .map(|m| EmailClass::Lecturer {
            department_code: m.as_str().to_owned(),
        })
        .ok_or(SignUpRuleError::UnrecognisedEmail)
}

/// Department lookup keyed by the email domain code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentDirectory {
    entries: BTreeMap<String, Affiliation>,
}

impl DepartmentDirectory {
    /// Build a directory from `(code, department, faculty)` triples.
    pub fn from_entries<I, C, D, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, D, F)>,
        C: Into<String>,
        D: Into<String>,
        F: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(code, department, faculty)| {
                (
                    code.into(),
                    Affiliation {
                        department: department.into(),
                        faculty: faculty.into(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Resolve a department code.
    pub fn resolve(&self, code: &str) -> Result<&Affiliation, SignUpRuleError> {
        self.entries
            .get(code)
            .ok_or_else(|| SignUpRuleError::UnknownDepartment {
                code: code.to_owned(),
            })
    }
}

impl Default for DepartmentDirectory {
    fn default() -> Self {
        const COMPUTING: &str = "Faculty of Computing";
        const ENGINEERING: &str = "Faculty of Engineering";
        const MANAGEMENT: &str = "Faculty of Management";
        Self::from_entries([
            ("cs", "Computer Science", COMPUTING),
            ("se", "Software Engineering", COMPUTING),
            ("is", "Information Systems", COMPUTING),
            ("ee", "Electrical and Electronic Engineering", ENGINEERING),
            ("ce", "Civil Engineering", ENGINEERING),
            ("me", "Mechanical Engineering", ENGINEERING),
            ("mgt", "Business Management", MANAGEMENT),
        ])
    }
}

/// Year of study and current semester for a student intake batch.
///
/// The academic year starts in January; semester two begins in July.
pub fn academic_standing(batch: u8, now: DateTime<Utc>) -> (i32, u8) {
    let year_of_study = now.year() - (2000 + i32::from(batch));
    let semester = if now.month() < 7 { 1 } else { 2 };
    (year_of_study, semester)
}

/// Allocate the registration number following `latest` within a batch.
///
/// Batch `22` starts at `220001`.
pub fn next_reg_number(
    batch: u8,
    latest: Option<&RegNumber>,
) -> Result<RegNumber, SignUpRuleError> {
    let bounds = batch_bounds(batch);
    let next = match latest {
        Some(latest) => latest.value().saturating_add(1).max(*bounds.start()),
        None => *bounds.start(),
    };
    if !bounds.contains(&next) {
        return Err(SignUpRuleError::RegNumberExhausted { batch });
    }
    RegNumber::new(next.to_string()).map_err(|_| SignUpRuleError::RegNumberExhausted { batch })
}

/// Registration numbers belonging to a batch.
pub fn batch_bounds(batch: u8) -> RangeInclusive<u64> {
    let base = u64::from(batch) * 10_000;
    (base + 1)..=(base + 9_999)
}

#[cfg(test)]
mod tests {
    //! Coverage for sign-up classification and allocation rules.

    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn email(raw: &str) -> Email {
        Email::new(raw).expect("valid email")
    }

    #[rstest]
    #[case("nimal.22@cs.lk", EmailClass::Student { batch: 22, department_code: "cs".to_owned() })]
    #[case("Kamal.19@ee.lk", EmailClass::Student { batch: 19, department_code: "ee".to_owned() })]
    #[case("perera@se.lk", EmailClass::Lecturer { department_code: "se".to_owned() })]
    fn classifies_supported_formats(#[case] raw: &str, #[case] expected: EmailClass) {
        assert_eq!(classify_email(&email(raw)), Ok(expected));
    }

    #[rstest]
    #[case("nimal.2022@cs.lk")]
    #[case("nimal.22@cs.com")]
    #[case("nimal.22@CS.lk")]
    #[case("nimal_22@cs.lk")]
    fn rejects_other_formats(#[case] raw: &str) {
        let error = classify_email(&email(raw)).expect_err("unsupported format");
        assert_eq!(
            error.to_string(),
            "Email must be in the format name.22@dep.lk or name@dep.lk"
        );
    }

    #[rstest]
    fn unknown_department_is_rejected() {
        let directory = DepartmentDirectory::default();
        let error = directory.resolve("zz").expect_err("unknown code");
        assert_eq!(error.to_string(), "Invalid department");
    }

    #[rstest]
    fn resolves_known_department() {
        let directory = DepartmentDirectory::from_entries([("cs", "Computer Science", "Computing")]);
        let affiliation = directory.resolve("cs").expect("known code");
        assert_eq!(affiliation.department, "Computer Science");
        assert_eq!(affiliation.faculty, "Computing");
    }

    #[rstest]
    #[case(6, 1)]
    #[case(7, 2)]
    #[case(12, 2)]
    fn standing_follows_calendar(#[case] month: u32, #[case] semester: u8) {
        let now = Utc
            .with_ymd_and_hms(2026, month, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(academic_standing(22, now), (4, semester));
    }

    #[rstest]
    fn first_reg_number_in_batch() {
        let reg = next_reg_number(22, None).expect("allocates");
        assert_eq!(reg.as_ref(), "220001");
    }

    #[rstest]
    fn increments_latest_reg_number() {
        let latest = RegNumber::new("220041").expect("valid reg");
        let reg = next_reg_number(22, Some(&latest)).expect("allocates");
        assert_eq!(reg.as_ref(), "220042");
    }

    #[rstest]
    fn exhausted_batch_is_reported() {
        let latest = RegNumber::new("229999").expect("valid reg");
        assert_eq!(
            next_reg_number(22, Some(&latest)),
            Err(SignUpRuleError::RegNumberExhausted { batch: 22 })
        );
    }

    #[rstest]
    fn single_digit_batches_use_five_digit_numbers() {
        assert_eq!(batch_bounds(5), 50_001..=59_999);
        let reg = next_reg_number(5, None).expect("allocates");
        assert_eq!(reg.as_ref(), "50001");
    }
}
