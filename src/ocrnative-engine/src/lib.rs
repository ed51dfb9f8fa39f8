//! Windows OCR pipeline for OcrNative
//!
//! Decodes encoded image bytes (PNG, JPEG, BMP, ...) with the platform image
//! decoder and recognizes text with Windows.Media.Ocr. All work is synchronous
//! from the caller's point of view. On other targets the crate builds, but the
//! platform recognizer always reports the engine as unavailable.

mod error;
mod recognizer;
mod status;
#[cfg(windows)]
mod winrt;

pub use error::{OcrError, Result};
pub use recognizer::{
    available_languages, is_language_supported, EngineOptions, PlatformRecognizer, Recognizer,
};
pub use status::{OcrStatus, E_FAIL, E_INVALIDARG, E_OUTOFMEMORY, S_FALSE, S_OK};

