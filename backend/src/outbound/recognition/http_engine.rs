//! Reqwest-backed recognition engine adapter.
//!
//! Transport details only: request serialisation, timeout and status
//! mapping, and decoding into domain detections.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use super::dto::{EnrollRequestDto, IdentifyRequestDto, IdentifyResponseDto};
use crate::domain::ports::{FaceRecognitionEngine, FaceRecognitionEngineError};
use crate::domain::{FaceDetection, RegNumber};

/// Recognition engine reached over HTTP.
pub struct HttpRecognitionEngine {
    client: Client,
    identify_url: Url,
    enroll_url: Url,
}

impl HttpRecognitionEngine {
    /// Build an adapter for the engine rooted at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error when the endpoint URLs cannot be derived from `base`
    /// or the reqwest client cannot be constructed.
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, FaceRecognitionEngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FaceRecognitionEngineError::unavailable(err.to_string()))?;
        Ok(Self {
            client,
            identify_url: endpoint(base, "identify")?,
            enroll_url: endpoint(base, "enroll")?,
        })
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> Result<Vec<u8>, FaceRecognitionEngineError> {
        let response = self
            .client
            .post(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

fn endpoint(base: &Url, path: &str) -> Result<Url, FaceRecognitionEngineError> {
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let with_slash = format!("{}/", root.path());
        root.set_path(&with_slash);
    }
    root.join(path)
        .map_err(|err| FaceRecognitionEngineError::unavailable(format!("invalid engine url: {err}")))
}

#[async_trait]
impl FaceRecognitionEngine for HttpRecognitionEngine {
    async fn identify(
        &self,
        image: &[u8],
    ) -> Result<Vec<FaceDetection>, FaceRecognitionEngineError> {
        let encoded = STANDARD.encode(image);
        let body = self
            .post(
                &self.identify_url,
                &IdentifyRequestDto {
                    image_base64: &encoded,
                },
            )
            .await?;
        parse_detections(&body)
    }

    async fn enroll(
        &self,
        reg_number: &RegNumber,
        image: &[u8],
    ) -> Result<(), FaceRecognitionEngineError> {
        let encoded = STANDARD.encode(image);
        self.post(
            &self.enroll_url,
            &EnrollRequestDto {
                reg_number: reg_number.as_ref(),
                image_base64: &encoded,
            },
        )
        .await?;
        Ok(())
    }
}

fn parse_detections(body: &[u8]) -> Result<Vec<FaceDetection>, FaceRecognitionEngineError> {
    let decoded: IdentifyResponseDto = serde_json::from_slice(body).map_err(|error| {
        FaceRecognitionEngineError::decode(format!("invalid engine JSON payload: {error}"))
    })?;
    decoded
        .into_detections()
        .map_err(FaceRecognitionEngineError::decode)
}

fn map_transport_error(error: reqwest::Error) -> FaceRecognitionEngineError {
    if error.is_timeout() {
        FaceRecognitionEngineError::timeout(error.to_string())
    } else {
        FaceRecognitionEngineError::unavailable(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> FaceRecognitionEngineError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            FaceRecognitionEngineError::timeout(message)
        }
        _ if status.is_client_error() => FaceRecognitionEngineError::rejected(message),
        _ => FaceRecognitionEngineError::unavailable(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
