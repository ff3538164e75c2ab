//! Campus user identities and profiles.
//!
//! A profile is created at sign-up from the institutional email address and
//! carries the academic details later used for course eligibility and
//! attendance.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyDisplayName,
    DisplayNameTooShort { min: usize },
    DisplayNameTooLong { max: usize },
    DisplayNameInvalidCharacters,
    InvalidEmail,
    InvalidPhoneNumber,
    InvalidRegNumber,
    UnknownRole,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooShort { min } => {
                write!(f, "display name must be at least {min} characters")
            }
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, underscores, dots, apostrophes, or hyphens",
            ),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::InvalidPhoneNumber => {
                write!(f, "phone number must contain 7 to 15 digits with an optional leading +")
            }
            Self::InvalidRegNumber => write!(f, "registration number must contain only digits"),
            Self::UnknownRole => write!(f, "role must be student or lecturer"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Wrap an already parsed UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }

        let parsed = Uuid::parse_str(&id).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed, id))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        let UserId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Minimum allowed length for a display name.
pub const DISPLAY_NAME_MIN: usize = 3;
/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 32;

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = r"^[A-Za-z0-9_ .'\-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        Self::from_owned(display_name.into())
    }

    fn from_owned(display_name: String) -> Result<Self, UserValidationError> {
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }

        let length = display_name.chars().count();
        if length < DISPLAY_NAME_MIN {
            return Err(UserValidationError::DisplayNameTooShort {
                min: DISPLAY_NAME_MIN,
            });
        }
        if length > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }

        if !display_name_regex().is_match(&display_name) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }

        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Institutional email address, trimmed but otherwise stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate the rough shape of an address (`local@domain.tld`).
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Contact phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Accepts 7 to 15 digits, optionally prefixed with `+`.
    pub fn new(phone: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = phone.as_ref().trim();
        let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if !(7..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidPhoneNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Student registration number, e.g. `220014`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegNumber(String);

/// Maximum number of digits accepted in a registration number.
pub const REG_NUMBER_MAX_DIGITS: usize = 12;

impl RegNumber {
    /// Validate a purely numeric registration number.
    pub fn new(reg_number: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = reg_number.as_ref().trim();
        if trimmed.is_empty()
            || trimmed.len() > REG_NUMBER_MAX_DIGITS
            || !trimmed.chars().all(|c| c.is_ascii_digit())
        {
            return Err(UserValidationError::InvalidRegNumber);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Numeric value of the registration number.
    pub fn value(&self) -> u64 {
        // Construction guarantees at most twelve ASCII digits.
        self.0.parse().unwrap_or_default()
    }
}

impl AsRef<str> for RegNumber {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RegNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<RegNumber> for String {
    fn from(value: RegNumber) -> Self {
        value.0
    }
}

impl TryFrom<String> for RegNumber {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Campus role derived from the sign-up email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
}

impl Role {
    /// Wire representation of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "lecturer" => Ok(Self::Lecturer),
            _ => Err(UserValidationError::UnknownRole),
        }
    }
}

/// Academic details carried by student profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDetails {
    pub reg_number: RegNumber,
    pub year_of_study: i32,
    pub semester: u8,
}

/// Department and faculty a profile belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affiliation {
    pub department: String,
    pub faculty: String,
}

/// Campus member profile.
///
/// ## Invariants
/// - student profiles always carry [`StudentDetails`]; lecturer profiles
///   never do and carry a designation instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    user_id: UserId,
    email: Email,
    display_name: DisplayName,
    phone: Option<PhoneNumber>,
    affiliation: Affiliation,
    kind: ProfileKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ProfileKind {
    Student(StudentDetails),
    Lecturer { designation: String },
}

/// Identity fields shared by every profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileIdentity {
    pub user_id: UserId,
    pub email: Email,
    pub display_name: DisplayName,
    pub phone: Option<PhoneNumber>,
    pub affiliation: Affiliation,
}

impl Profile {
    /// Build a student profile.
    pub fn student(identity: ProfileIdentity, details: StudentDetails) -> Self {
        Self::from_parts(identity, ProfileKind::Student(details))
    }

    /// Build a lecturer profile with the given designation.
    pub fn lecturer(identity: ProfileIdentity, designation: impl Into<String>) -> Self {
        Self::from_parts(
            identity,
            ProfileKind::Lecturer {
                designation: designation.into(),
            },
        )
    }

    fn from_parts(identity: ProfileIdentity, kind: ProfileKind) -> Self {
        let ProfileIdentity {
            user_id,
            email,
            display_name,
            phone,
            affiliation,
        } = identity;
        Self {
            user_id,
            email,
            display_name,
            phone,
            affiliation,
            kind,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    pub fn affiliation(&self) -> &Affiliation {
        &self.affiliation
    }

    pub fn role(&self) -> Role {
        match self.kind {
            ProfileKind::Student(_) => Role::Student,
            ProfileKind::Lecturer { .. } => Role::Lecturer,
        }
    }

    /// Academic details for student profiles.
    pub fn student_details(&self) -> Option<&StudentDetails> {
        match &self.kind {
            ProfileKind::Student(details) => Some(details),
            ProfileKind::Lecturer { .. } => None,
        }
    }

    /// Registration number for student profiles.
    pub fn reg_number(&self) -> Option<&RegNumber> {
        self.student_details().map(|details| &details.reg_number)
    }

    /// Designation for lecturer profiles.
    pub fn designation(&self) -> Option<&str> {
        match &self.kind {
            ProfileKind::Student(_) => None,
            ProfileKind::Lecturer { designation } => Some(designation.as_str()),
        }
    }

    /// Return a copy with updated contact fields.
    #[must_use]
    pub fn with_contact(
        mut self,
        display_name: Option<DisplayName>,
        phone: Option<PhoneNumber>,
    ) -> Self {
        if let Some(name) = display_name {
            self.display_name = name;
        }
        if let Some(phone) = phone {
            self.phone = Some(phone);
        }
        self
    }
}
