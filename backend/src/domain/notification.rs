//! Course notifications sent by lecturers to enrolled students.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CourseCode, UserId};

/// Validation errors for notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    EmptyTitle,
    EmptyMessage,
    UnknownPriority { value: String },
}

impl fmt::Display for NotificationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::EmptyMessage => write!(f, "message is required"),
            Self::UnknownPriority { value } => write!(f, "unknown priority: {value}"),
        }
    }
}

impl std::error::Error for NotificationValidationError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = NotificationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(NotificationValidationError::UnknownPriority {
                value: s.to_owned(),
            }),
        }
    }
}

/// Title and body shared by every copy of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    title: String,
    message: String,
    priority: Priority,
}

impl NotificationContent {
    pub fn new(
        title: impl AsRef<str>,
        message: impl AsRef<str>,
        priority: Priority,
    ) -> Result<Self, NotificationValidationError> {
        let title = title.as_ref().trim();
        if title.is_empty() {
            return Err(NotificationValidationError::EmptyTitle);
        }
        let message = message.as_ref().trim();
        if message.is_empty() {
            return Err(NotificationValidationError::EmptyMessage);
        }
        Ok(Self {
            title: title.to_owned(),
            message: message.to_owned(),
            priority,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// One delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: UserId,
    pub sender_id: UserId,
    pub title: String,
    pub message: String,
    pub course_code: CourseCode,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Address a copy of `content` to one recipient.
    pub fn addressed(
        content: &NotificationContent,
        recipient_id: UserId,
        sender_id: UserId,
        course_code: CourseCode,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            sender_id,
            title: content.title.clone(),
            message: content.message.clone(),
            course_code,
            priority: content.priority,
            created_at,
        }
    }

    /// Whether `user` sent or received this notification.
    pub fn is_visible_to(&self, user: &UserId) -> bool {
        &self.recipient_id == user || &self.sender_id == user
    }
}
