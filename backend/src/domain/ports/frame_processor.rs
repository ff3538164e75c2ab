//! Driving port for real-time recognition frames.

use async_trait::async_trait;

use crate::domain::{Error, FrameReport};

/// Raw frame fields as received from a camera client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRequest {
    pub image_base64: String,
    pub threshold: Option<f64>,
    pub location: Option<String>,
    pub course_code: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameProcessor: Send + Sync {
    /// Validate a frame, identify faces and mark recognised students.
    async fn process_frame(&self, request: FrameRequest) -> Result<FrameReport, Error>;
}
