//! Wire types exchanged with the recognition engine.
//!
//! `POST {base}/identify` takes `{"image_base64": ".."}` and answers
//! `{"faces": [{"reg_number": "220001" | null, "distance": 0.31}]}`.
//! `POST {base}/enroll` takes `{"reg_number": "..", "image_base64": ".."}`.

use serde::{Deserialize, Serialize};

use crate::domain::{FaceDetection, RegNumber};

#[derive(Debug, Serialize)]
pub(super) struct IdentifyRequestDto<'a> {
    pub(super) image_base64: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct EnrollRequestDto<'a> {
    pub(super) reg_number: &'a str,
    pub(super) image_base64: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct IdentifyResponseDto {
    #[serde(default)]
    pub(super) faces: Vec<FaceDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct FaceDto {
    pub(super) reg_number: Option<String>,
    pub(super) distance: f64,
}

impl IdentifyResponseDto {
    pub(super) fn into_detections(self) -> Result<Vec<FaceDetection>, String> {
        self.faces.into_iter().map(FaceDto::into_detection).collect()
    }
}

impl FaceDto {
    fn into_detection(self) -> Result<FaceDetection, String> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(format!("face distance {} is not a valid distance", self.distance));
        }
        let candidate = match self.reg_number.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                RegNumber::new(raw)
                    .map_err(|err| format!("face candidate {raw:?} is invalid: {err}"))?,
            ),
        };
        Ok(FaceDetection {
            candidate,
            distance: self.distance,
        })
    }
}
