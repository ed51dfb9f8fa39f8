//! Recognizer seam between the exported boundary and the platform OCR service

use crate::error::{OcrError, Result};
use tracing::debug;

/// Turns encoded image bytes into recognized text.
///
/// Implementations block the calling thread until recognition completes.
/// The returned text is UTF-16 exactly as the engine produced it, without a
/// terminator.
pub trait Recognizer {
    fn recognize(&self, image: &[u8]) -> Result<Vec<u16>>;
}

/// Engine selection for the platform recognizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// BCP-47 language tag (e.g. "en-US"); `None` uses the user profile languages
    pub language: Option<String>,
}

impl EngineOptions {
    /// Options that follow the user's installed profile languages
    pub fn user_profile() -> Self {
        Self::default()
    }

    /// Options pinned to a single recognition language
    pub fn with_language(tag: impl Into<String>) -> Self {
        Self {
            language: Some(tag.into()),
        }
    }

    /// Reject an explicitly empty language tag
    pub fn validate(&self) -> Result<()> {
        match self.language.as_deref() {
            Some(tag) if tag.trim().is_empty() => Err(OcrError::InvalidArgument(
                "language tag must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Recognizer backed by the operating system OCR engine.
///
/// Every call builds its own stream, bitmap and engine instance; nothing is
/// cached between calls.
#[derive(Debug, Clone, Default)]
pub struct PlatformRecognizer {
    options: EngineOptions,
}

impl PlatformRecognizer {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

impl Recognizer for PlatformRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<Vec<u16>> {
        if image.is_empty() {
            return Err(OcrError::InvalidArgument("image buffer is empty".to_string()));
        }
        self.options.validate()?;

        debug!(
            "recognizing {} bytes (container: {:?})",
            image.len(),
            image::guess_format(image).ok()
        );

        #[cfg(windows)]
        {
            crate::winrt::recognize(image, &self.options)
        }

        #[cfg(not(windows))]
        {
            Err(OcrError::EngineUnavailable(
                "Windows.Media.Ocr is only available on Windows".to_string(),
            ))
        }
    }
}

/// Installed recognizer language tags
pub fn available_languages() -> Result<Vec<String>> {
    #[cfg(windows)]
    {
        crate::winrt::available_languages()
    }

    #[cfg(not(windows))]
    {
        Err(OcrError::EngineUnavailable(
            "Windows.Media.Ocr is only available on Windows".to_string(),
        ))
    }
}

/// Whether a recognizer can be created for the given language tag
pub fn is_language_supported(tag: &str) -> Result<bool> {
    EngineOptions::with_language(tag).validate()?;

    #[cfg(windows)]
    {
        crate::winrt::is_language_supported(tag)
    }

    #[cfg(not(windows))]
    {
        Err(OcrError::EngineUnavailable(
            "Windows.Media.Ocr is only available on Windows".to_string(),
        ))
    }
}
