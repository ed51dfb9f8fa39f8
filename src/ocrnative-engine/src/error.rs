//! Pipeline error types

use crate::status::OcrStatus;
use thiserror::Error;

/// Errors raised while turning image bytes into recognized text
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("apartment initialization failed: {0}")]
    Apartment(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("image decode error: {0}")]
    Decode(String),

    #[error("image {width}x{height} exceeds maximum OCR dimension {max}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("failed to allocate {bytes} bytes for output text")]
    OutOfMemory {
        bytes: usize,
    },

    #[error("windows API error: {0}")]
    Platform(String),
}

#[cfg(windows)]
impl From<windows::core::Error> for OcrError {
    fn from(e: windows::core::Error) -> Self {
        OcrError::Platform(e.to_string())
    }
}

impl OcrError {
    /// Status reported across the foreign-function boundary for this error
    pub fn status(&self) -> OcrStatus {
        match self {
            OcrError::InvalidArgument(_) => OcrStatus::InvalidArgument,
            OcrError::EngineUnavailable(_) => OcrStatus::EngineUnavailable,
            OcrError::OutOfMemory { .. } => OcrStatus::OutOfMemory,
            OcrError::Apartment(_)
            | OcrError::Stream(_)
            | OcrError::Decode(_)
            | OcrError::ImageTooLarge { .. }
            | OcrError::Recognition(_)
            | OcrError::Platform(_) => OcrStatus::PipelineFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
