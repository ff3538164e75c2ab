//! Face-recognition engine adapters.
//!
//! The engine is an external HTTP service; this module owns the wire format
//! and error mapping for the [`FaceRecognitionEngine`] port.
//!
//! [`FaceRecognitionEngine`]: crate::domain::ports::FaceRecognitionEngine

mod dto;
mod http_engine;

pub use http_engine::HttpRecognitionEngine;
