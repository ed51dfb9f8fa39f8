//! Boundary logic shared by every export: argument checks, panic containment,
//! status mapping and hand-off of the output buffer.

use crate::buffer;
use ocrnative_engine::{OcrError, Recognizer, E_FAIL, E_INVALIDARG, S_OK};
use std::panic::{self, AssertUnwindSafe};
use std::ptr::NonNull;
use tracing::warn;

/// Run `body` and convert its outcome to an HRESULT.
///
/// On success the produced buffer is stored in `out_text`; on any failure,
/// panic included, `out_text` is not written and nothing stays allocated.
///
/// # Safety
///
/// `out_text` must be valid for a pointer-sized write.
pub(crate) unsafe fn deliver<F>(out_text: *mut *mut u16, body: F) -> i32
where
    F: FnOnce() -> ocrnative_engine::Result<Vec<u16>>,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> ocrnative_engine::Result<NonNull<u16>> {
        let text = body()?;
        buffer::alloc_wide(&text)
    }));

    match outcome {
        Ok(Ok(text)) => {
            out_text.write(text.as_ptr());
            S_OK
        }
        Ok(Err(err)) => {
            warn!("OCR call failed: {}", err);
            err.status().hresult()
        }
        Err(_) => {
            warn!("OCR call panicked");
            E_FAIL
        }
    }
}

/// Validate the raw arguments and recognize the referenced image.
///
/// # Safety
///
/// When non-null, `data` must be readable for `length` bytes and `out_text`
/// must be valid for a pointer-sized write.
pub(crate) unsafe fn extract_text<R>(
    recognizer: &R,
    data: *const u8,
    length: i32,
    out_text: *mut *mut u16,
) -> i32
where
    R: Recognizer + ?Sized,
{
    if data.is_null() || length <= 0 || out_text.is_null() {
        warn!(
            "rejecting OCR call: data null={}, length={}, out null={}",
            data.is_null(),
            length,
            out_text.is_null()
        );
        return E_INVALIDARG;
    }

    let image = std::slice::from_raw_parts(data, length as usize);
    deliver(out_text, || recognizer.recognize(image))
}

/// Map a language-query outcome to its status code
pub(crate) fn language_status(outcome: ocrnative_engine::Result<bool>) -> i32 {
    match outcome {
        Ok(true) => S_OK,
        Ok(false) => ocrnative_engine::S_FALSE,
        Err(err @ OcrError::InvalidArgument(_)) => err.status().hresult(),
        Err(err) => {
            warn!("language query failed: {}", err);
            err.status().hresult()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{free_wide, wide_to_vec};
    use ocrnative_engine::{OcrStatus, Result, E_OUTOFMEMORY, S_FALSE};
    use std::cell::Cell;

    const SENTINEL: *mut u16 = 0x1000 as *mut u16;

    /// Recognizer that replays a fixed outcome and counts calls
    struct Scripted<F: Fn(&[u8]) -> Result<Vec<u16>>> {
        respond: F,
        calls: Cell<usize>,
    }

    impl<F: Fn(&[u8]) -> Result<Vec<u16>>> Scripted<F> {
        fn new(respond: F) -> Self {
            Self { respond, calls: Cell::new(0) }
        }
    }

    impl<F: Fn(&[u8]) -> Result<Vec<u16>>> Recognizer for Scripted<F> {
        fn recognize(&self, image: &[u8]) -> Result<Vec<u16>> {
            self.calls.set(self.calls.get() + 1);
            (self.respond)(image)
        }
    }

    fn text(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_null_data_is_invalid() {
        let recognizer = Scripted::new(|_| Ok(text("unused")));
        let mut out = SENTINEL;

        let status = unsafe { extract_text(&recognizer, std::ptr::null(), 16, &mut out) };

        assert_eq!(status, E_INVALIDARG);
        assert_eq!(out, SENTINEL);
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_non_positive_length_is_invalid() {
        let recognizer = Scripted::new(|_| Ok(text("unused")));
        let image = [0u8; 4];
        let mut out = SENTINEL;

        for length in [0, -1, i32::MIN] {
            let status = unsafe { extract_text(&recognizer, image.as_ptr(), length, &mut out) };
            assert_eq!(status, E_INVALIDARG, "length {length}");
        }

        assert_eq!(out, SENTINEL);
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_null_output_slot_is_invalid() {
        let recognizer = Scripted::new(|_| Ok(text("unused")));
        let image = [0u8; 4];

        let status = unsafe {
            extract_text(&recognizer, image.as_ptr(), 4, std::ptr::null_mut())
        };

        assert_eq!(status, E_INVALIDARG);
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_success_hands_over_terminated_text() {
        let image = b"fake image bytes";
        let recognizer = Scripted::new(|bytes| {
            assert_eq!(bytes, b"fake image bytes");
            Ok(text("Hello\r\nWorld"))
        });
        let mut out = SENTINEL;

        let status = unsafe {
            extract_text(&recognizer, image.as_ptr(), image.len() as i32, &mut out)
        };

        assert_eq!(status, S_OK);
        assert_ne!(out, SENTINEL);
        assert_eq!(wide_to_vec(out), text("Hello\r\nWorld"));
        unsafe { free_wide(out) };
    }

    #[test]
    fn test_empty_recognition_is_only_terminator() {
        let image = [1u8];
        let recognizer = Scripted::new(|_| Ok(Vec::new()));
        let mut out = SENTINEL;

        let status = unsafe { extract_text(&recognizer, image.as_ptr(), 1, &mut out) };

        assert_eq!(status, S_OK);
        assert_eq!(unsafe { *out }, 0);
        unsafe { free_wide(out) };
    }

    #[test]
    fn test_engine_unavailable_leaves_slot() {
        let image = [1u8; 8];
        let recognizer = Scripted::new(|_| {
            Err(OcrError::EngineUnavailable("no language pack".into()))
        });
        let mut out = SENTINEL;

        let status = unsafe { extract_text(&recognizer, image.as_ptr(), 8, &mut out) };

        assert_eq!(status, E_FAIL);
        assert_eq!(out, SENTINEL);
    }

    #[test]
    fn test_pipeline_failure_leaves_slot() {
        let image = [1u8; 8];
        let recognizer = Scripted::new(|_| Err(OcrError::Decode("corrupt".into())));
        let mut out = SENTINEL;

        let status = unsafe { extract_text(&recognizer, image.as_ptr(), 8, &mut out) };

        assert_eq!(status, E_FAIL);
        assert_eq!(out, SENTINEL);
        assert_eq!(recognizer.calls.get(), 1);
    }

    #[test]
    fn test_out_of_memory_status() {
        let mut out = SENTINEL;
        let status = unsafe {
            deliver(&mut out, || Err(OcrError::OutOfMemory { bytes: 1 << 40 }))
        };

        assert_eq!(status, E_OUTOFMEMORY);
        assert_eq!(out, SENTINEL);
    }

    #[test]
    fn test_panic_is_contained() {
        let image = [1u8; 8];
        let recognizer = Scripted::new(|_| -> Result<Vec<u16>> { panic!("engine blew up") });
        let mut out = SENTINEL;

        let status = unsafe { extract_text(&recognizer, image.as_ptr(), 8, &mut out) };

        assert_eq!(status, E_FAIL);
        assert_eq!(out, SENTINEL);
    }

    #[test]
    fn test_repeated_calls_are_independent() {
        let image = [7u8; 3];
        let recognizer = Scripted::new(|_| Ok(text("same")));

        let mut first = SENTINEL;
        let mut second = SENTINEL;
        let s1 = unsafe { extract_text(&recognizer, image.as_ptr(), 3, &mut first) };
        let s2 = unsafe { extract_text(&recognizer, image.as_ptr(), 3, &mut second) };

        assert_eq!((s1, s2), (S_OK, S_OK));
        assert_ne!(first, second);
        assert_eq!(wide_to_vec(first), wide_to_vec(second));
        unsafe {
            free_wide(first);
            free_wide(second);
        }
    }

    #[test]
    fn test_language_status() {
        assert_eq!(language_status(Ok(true)), S_OK);
        assert_eq!(language_status(Ok(false)), S_FALSE);
        assert_eq!(
            language_status(Err(OcrError::InvalidArgument("empty".into()))),
            E_INVALIDARG
        );
        assert_eq!(
            language_status(Err(OcrError::EngineUnavailable("off".into()))),
            OcrStatus::EngineUnavailable.hresult()
        );
    }
}
