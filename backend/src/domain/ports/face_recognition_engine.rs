//! Port for the external face-recognition engine.
//!
//! The engine owns face embeddings. It detects faces in a frame and reports
//! the closest enrolled student for each one; matching thresholds are applied
//! by the domain.

use async_trait::async_trait;

use crate::domain::{FaceDetection, RegNumber};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recognition engine adapters.
    pub enum FaceRecognitionEngineError {
        /// The engine did not answer in time.
        Timeout { message: String } =>
            "recognition engine timed out: {message}",
        /// The engine could not be reached or is not configured.
        Unavailable { message: String } =>
            "recognition engine unavailable: {message}",
        /// The engine refused the image, e.g. no face found while enrolling.
        Rejected { message: String } =>
            "recognition engine rejected the image: {message}",
        /// The engine answered with a payload that could not be decoded.
        Decode { message: String } =>
            "recognition engine response invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceRecognitionEngine: Send + Sync {
    /// Detect faces in an encoded image.
    async fn identify(&self, image: &[u8]) -> Result<Vec<FaceDetection>, FaceRecognitionEngineError>;

    /// Store a reference face for a student.
    async fn enroll(
        &self,
        reg_number: &RegNumber,
        image: &[u8],
    ) -> Result<(), FaceRecognitionEngineError>;
}

/// Engine used when no recognition service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredRecognitionEngine;

#[async_trait]
impl FaceRecognitionEngine for UnconfiguredRecognitionEngine {
    async fn identify(
        &self,
        _image: &[u8],
    ) -> Result<Vec<FaceDetection>, FaceRecognitionEngineError> {
        Err(FaceRecognitionEngineError::unavailable(
            "no recognition engine configured",
        ))
    }

    async fn enroll(
        &self,
        _reg_number: &RegNumber,
        _image: &[u8],
    ) -> Result<(), FaceRecognitionEngineError> {
        Err(FaceRecognitionEngineError::unavailable(
            "no recognition engine configured",
        ))
    }
}
