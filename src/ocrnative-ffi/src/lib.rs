//! OcrNative - C ABI for Windows OCR
//!
//! Exports a small set of `extern "system"` functions (stdcall on 32-bit x86)
//! that a host runtime binds through its foreign-function layer:
//!
//! ```text
//! int32_t OcrExtractText(const uint8_t* data, int32_t length, wchar_t** outText);
//! int32_t OcrExtractTextWithLanguage(const uint8_t* data, int32_t length,
//!                                    const wchar_t* language, wchar_t** outText);
//! int32_t OcrIsLanguageSupported(const wchar_t* language);
//! int32_t OcrAvailableLanguages(wchar_t** outText);
//! void    OcrFreeText(wchar_t* text);
//! ```
//!
//! Every call blocks the calling thread until decoding and recognition finish.
//! Status codes are HRESULTs: `S_OK`, `E_INVALIDARG`, `E_FAIL`,
//! `E_OUTOFMEMORY` (and `S_FALSE` for a negative language query). On success
//! `*outText` receives a null-terminated UTF-16 buffer allocated with
//! `CoTaskMemAlloc`; the caller owns it and releases it with `OcrFreeText`,
//! `CoTaskMemFree` or `Marshal.FreeCoTaskMem`. On failure `*outText` is left
//! exactly as the caller passed it.

#![allow(non_snake_case)]

mod bridge;
mod buffer;

use ocrnative_engine::{EngineOptions, PlatformRecognizer, E_FAIL, E_INVALIDARG};
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Longest language tag accepted from callers, in UTF-16 units
const MAX_LANGUAGE_TAG_UNITS: usize = 128;

/// Recognize text in an encoded image using the user's profile languages.
///
/// # Safety
///
/// `data` must be null or readable for `length` bytes; `out_text` must be null
/// or valid for a pointer-sized write.
#[no_mangle]
pub unsafe extern "system" fn OcrExtractText(
    data: *const u8,
    length: i32,
    out_text: *mut *mut u16,
) -> i32 {
    debug!("OcrExtractText: {} bytes", length);
    bridge::extract_text(&PlatformRecognizer::default(), data, length, out_text)
}

/// Recognize text with an explicit BCP-47 language tag.
///
/// A null `language` behaves like [`OcrExtractText`]. An empty tag, a tag
/// longer than 128 units or one that is not valid UTF-16 is `E_INVALIDARG`.
/// A tag that does not parse as BCP-47 or has no installed language pack is
/// `E_FAIL`.
///
/// # Safety
///
/// As for [`OcrExtractText`]; `language` must be null or a null-terminated
/// UTF-16 string.
#[no_mangle]
pub unsafe extern "system" fn OcrExtractTextWithLanguage(
    data: *const u8,
    length: i32,
    language: *const u16,
    out_text: *mut *mut u16,
) -> i32 {
    let options = if language.is_null() {
        EngineOptions::user_profile()
    } else {
        match buffer::read_wide(language, MAX_LANGUAGE_TAG_UNITS) {
            Some(tag) if !tag.trim().is_empty() => EngineOptions::with_language(tag),
            _ => return E_INVALIDARG,
        }
    };

    debug!("OcrExtractTextWithLanguage: {} bytes, {:?}", length, options.language);
    bridge::extract_text(&PlatformRecognizer::new(options), data, length, out_text)
}

/// Query whether a recognition language is installed.
///
/// Returns `S_OK` if supported, `S_FALSE` if not.
///
/// # Safety
///
/// `language` must be null or a null-terminated UTF-16 string.
#[no_mangle]
pub unsafe extern "system" fn OcrIsLanguageSupported(language: *const u16) -> i32 {
    let Some(tag) = buffer::read_wide(language, MAX_LANGUAGE_TAG_UNITS) else {
        return E_INVALIDARG;
    };

    panic::catch_unwind(AssertUnwindSafe(|| {
        bridge::language_status(ocrnative_engine::is_language_supported(&tag))
    }))
    .unwrap_or(E_FAIL)
}

/// Installed recognizer languages as one `;`-separated owned string.
///
/// # Safety
///
/// `out_text` must be null or valid for a pointer-sized write.
#[no_mangle]
pub unsafe extern "system" fn OcrAvailableLanguages(out_text: *mut *mut u16) -> i32 {
    if out_text.is_null() {
        return E_INVALIDARG;
    }

    bridge::deliver(out_text, || {
        let tags = ocrnative_engine::available_languages()?;
        Ok(tags.join(";").encode_utf16().collect())
    })
}

/// Release text returned by any of the functions above. Null is ignored.
///
/// # Safety
///
/// `text` must be null or a buffer returned by this library that has not been
/// released yet.
#[no_mangle]
pub unsafe extern "system" fn OcrFreeText(text: *mut u16) {
    buffer::free_wide(text);
}
