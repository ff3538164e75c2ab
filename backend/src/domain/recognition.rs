//! Face-recognition frames and their reconciliation into attendance.
//!
//! The engine reports every detected face with its closest enrolled student
//! and an embedding distance. This module decides which faces count as
//! recognised and in which order students are marked.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CourseCode, RegNumber};

/// Default distance threshold applied when a frame omits one.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Default largest decoded frame, in bytes.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 2 * 1024 * 1024;

/// Validation failures for inbound frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameValidationError {
    MissingCourseCode,
    InvalidCourseCode,
    ThresholdOutOfRange,
    InvalidImage,
    EmptyImage,
    ImageTooLarge { max: usize },
}

impl fmt::Display for FrameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCourseCode => write!(f, "course_code is required"),
            Self::InvalidCourseCode => write!(f, "course_code is not a valid course code"),
            Self::ThresholdOutOfRange => write!(f, "threshold must be greater than 0 and at most 1"),
            Self::InvalidImage => write!(f, "image_base64 is not valid base64"),
            Self::EmptyImage => write!(f, "image_base64 must not be empty"),
            Self::ImageTooLarge { max } => write!(f, "image exceeds {max} bytes"),
        }
    }
}

impl std::error::Error for FrameValidationError {}

/// Recognition distance threshold in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, FrameValidationError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(FrameValidationError::ThresholdOutOfRange)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

/// Decode a base64 image, accepting an optional `data:` URL prefix.
///
/// # Examples
/// ```
/// use campus_backend::domain::decode_image;
///
/// let bytes = decode_image("data:image/jpeg;base64,aGVsbG8=", 1024).unwrap();
/// assert_eq!(bytes, b"hello");
/// ```
pub fn decode_image(raw: &str, max_bytes: usize) -> Result<Vec<u8>, FrameValidationError> {
    let trimmed = raw.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };
    if payload.is_empty() {
        return Err(FrameValidationError::EmptyImage);
    }
    // Cheap upper bound before allocating the decoded buffer.
    if payload.len() / 4 * 3 > max_bytes.saturating_add(3) {
        return Err(FrameValidationError::ImageTooLarge { max: max_bytes });
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| FrameValidationError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(FrameValidationError::EmptyImage);
    }
    if bytes.len() > max_bytes {
        return Err(FrameValidationError::ImageTooLarge { max: max_bytes });
    }
    Ok(bytes)
}

/// Limits applied while validating frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLimits {
    pub default_threshold: Threshold,
    pub max_frame_bytes: usize,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            default_threshold: Threshold::default(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// A validated camera frame ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionFrame {
    pub image: Vec<u8>,
    pub threshold: Threshold,
    pub location: Option<String>,
    pub course_code: CourseCode,
}

impl RecognitionFrame {
    /// Validate raw frame fields against the configured limits.
    pub fn parse(
        image_base64: &str,
        threshold: Option<f64>,
        location: Option<String>,
        course_code: Option<&str>,
        limits: FrameLimits,
    ) -> Result<Self, FrameValidationError> {
        let code = course_code
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .ok_or(FrameValidationError::MissingCourseCode)?;
        let course_code =
            CourseCode::new(code).map_err(|_| FrameValidationError::InvalidCourseCode)?;
        let threshold = threshold
            .map(Threshold::new)
            .transpose()?
            .unwrap_or(limits.default_threshold);
        let image = decode_image(image_base64, limits.max_frame_bytes)?;
        let location = location
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        Ok(Self {
            image,
            threshold,
            location,
            course_code,
        })
    }
}

/// One face reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceDetection {
    pub candidate: Option<RegNumber>,
    pub distance: f64,
}

/// A unique student recognised in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognisedStudent {
    pub reg_number: RegNumber,
    pub distance: f64,
}

impl RecognisedStudent {
    pub fn confidence(&self) -> f64 {
        (1.0 - self.distance).clamp(0.0, 1.0)
    }
}

/// Faces in a frame split into recognised students and unknown faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub total_faces: usize,
    pub unknown_count: usize,
    /// Unique students in ascending distance order.
    pub students: Vec<RecognisedStudent>,
}

/// Apply the threshold and collapse duplicate matches to the closest face.
pub fn reconcile(detections: &[FaceDetection], threshold: Threshold) -> Reconciliation {
    let mut closest: BTreeMap<&RegNumber, f64> = BTreeMap::new();
    let mut unknown_count = 0;
    for detection in detections {
        match &detection.candidate {
            Some(reg_number) if detection.distance <= threshold.value() => {
                closest
                    .entry(reg_number)
                    .and_modify(|best| *best = best.min(detection.distance))
                    .or_insert(detection.distance);
            }
            _ => unknown_count += 1,
        }
    }
    let mut students: Vec<RecognisedStudent> = closest
        .into_iter()
        .map(|(reg_number, distance)| RecognisedStudent {
            reg_number: reg_number.clone(),
            distance,
        })
        .collect();
    students.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Reconciliation {
        total_faces: detections.len(),
        unknown_count,
        students,
    }
}

/// Per-student status in a frame reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Marked,
    AlreadyMarked,
    Error,
}

/// What happened to one recognised student.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentOutcome {
    pub reg_number: RegNumber,
    pub name: Option<String>,
    pub status: OutcomeStatus,
    pub message: String,
    pub confidence: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Summary of a processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub total_faces_detected: usize,
    pub recognized_count: usize,
    pub unknown_count: usize,
    pub attendance_results: Vec<StudentOutcome>,
}

#[cfg(test)]
mod tests {
    //! Threshold, decoding and reconciliation coverage.

    use super::*;
    use rstest::rstest;

    fn reg(raw: &str) -> RegNumber {
        RegNumber::new(raw).expect("valid reg")
    }

    fn face(candidate: Option<&str>, distance: f64) -> FaceDetection {
        FaceDetection {
            candidate: candidate.map(reg),
            distance,
        }
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(0.01, true)]
    #[case(1.0, true)]
    #[case(1.2, false)]
    #[case(f64::NAN, false)]
    fn threshold_bounds(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(Threshold::new(value).is_ok(), valid);
    }

    #[rstest]
    #[case("aGVsbG8=")]
    #[case("  data:image/png;base64,aGVsbG8= ")]
    fn decodes_plain_and_data_url(#[case] raw: &str) {
        assert_eq!(decode_image(raw, 64).expect("decodes"), b"hello");
    }

    #[rstest]
    #[case("", FrameValidationError::EmptyImage)]
    #[case("data:image/png;base64,", FrameValidationError::EmptyImage)]
    #[case("not base64!", FrameValidationError::InvalidImage)]
    #[case("aGVsbG8=", FrameValidationError::ImageTooLarge { max: 4 })]
    fn rejects_bad_images(#[case] raw: &str, #[case] expected: FrameValidationError) {
        assert_eq!(decode_image(raw, 4), Err(expected));
    }

    #[rstest]
    fn frame_uses_default_threshold_and_normalises_fields() {
        let frame = RecognitionFrame::parse(
            "aGVsbG8=",
            None,
            Some("  ".to_owned()),
            Some(" cs101 "),
            FrameLimits::default(),
        )
        .expect("valid frame");

        assert_eq!(frame.threshold, Threshold::default());
        assert_eq!(frame.course_code.as_ref(), "CS101");
        assert!(frame.location.is_none());
    }

    #[rstest]
    #[case(None, Some(0.5), FrameValidationError::MissingCourseCode)]
    #[case(Some("   "), Some(0.5), FrameValidationError::MissingCourseCode)]
    #[case(Some("CS-1"), Some(0.5), FrameValidationError::InvalidCourseCode)]
    #[case(Some("CS101"), Some(1.5), FrameValidationError::ThresholdOutOfRange)]
    fn frame_rejects_invalid_fields(
        #[case] course_code: Option<&str>,
        #[case] threshold: Option<f64>,
        #[case] expected: FrameValidationError,
    ) {
        let result = RecognitionFrame::parse(
            "aGVsbG8=",
            threshold,
            None,
            course_code,
            FrameLimits::default(),
        );
        assert_eq!(result, Err(expected));
    }

    #[rstest]
    fn reconcile_applies_threshold_inclusively() {
        let detections = [
            face(Some("220001"), 0.6),
            face(Some("220002"), 0.61),
            face(None, 0.1),
        ];
        let outcome = reconcile(&detections, Threshold::new(0.6).expect("valid"));

        assert_eq!(outcome.total_faces, 3);
        assert_eq!(outcome.unknown_count, 2);
        assert_eq!(outcome.students.len(), 1);
        assert_eq!(outcome.students[0].reg_number, reg("220001"));
    }

    #[rstest]
    fn reconcile_collapses_duplicates_to_closest_and_sorts() {
        let detections = [
            face(Some("220002"), 0.4),
            face(Some("220001"), 0.5),
            face(Some("220002"), 0.2),
            face(Some("220003"), 0.3),
        ];
        let outcome = reconcile(&detections, Threshold::default());

        let order: Vec<(&str, f64)> = outcome
            .students
            .iter()
            .map(|s| (s.reg_number.as_ref(), s.distance))
            .collect();
        assert_eq!(
            order,
            vec![("220002", 0.2), ("220003", 0.3), ("220001", 0.5)]
        );
        assert_eq!(outcome.unknown_count, 0);
    }

    #[rstest]
    fn confidence_is_complement_of_distance() {
        let student = RecognisedStudent {
            reg_number: reg("220001"),
            distance: 0.25,
        };
        assert!((student.confidence() - 0.75).abs() < f64::EPSILON);
    }
}
