//! Owned UTF-16 output buffers
//!
//! On Windows buffers come from `CoTaskMemAlloc`, so managed hosts may release
//! them with `Marshal.FreeCoTaskMem` as well as with `OcrFreeText`. Elsewhere a
//! size header is stored in front of the text so `free_wide` can rebuild the
//! layout.

use ocrnative_engine::{OcrError, Result};
use std::ptr::NonNull;

/// Bytes needed for `len` code units plus the terminator
pub(crate) fn wide_bytes(len: usize) -> Option<usize> {
    len.checked_add(1)?.checked_mul(std::mem::size_of::<u16>())
}

/// Allocate a null-terminated copy of `units`.
///
/// Ownership of the returned pointer passes to whoever receives it; release it
/// with [`free_wide`].
pub(crate) fn alloc_wide(units: &[u16]) -> Result<NonNull<u16>> {
    let bytes = wide_bytes(units.len()).ok_or(OcrError::OutOfMemory { bytes: usize::MAX })?;
    let buffer = raw_alloc(bytes).ok_or(OcrError::OutOfMemory { bytes })?;

    unsafe {
        std::ptr::copy_nonoverlapping(units.as_ptr(), buffer.as_ptr(), units.len());
        buffer.as_ptr().add(units.len()).write(0);
    }

    Ok(buffer)
}

/// Release a buffer produced by [`alloc_wide`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by [`alloc_wide`] that has not
/// been freed yet.
pub(crate) unsafe fn free_wide(ptr: *mut u16) {
    if ptr.is_null() {
        return;
    }
    raw_free(ptr);
}

#[cfg(windows)]
fn raw_alloc(bytes: usize) -> Option<NonNull<u16>> {
    use windows::Win32::System::Com::CoTaskMemAlloc;

    NonNull::new(unsafe { CoTaskMemAlloc(bytes) }.cast::<u16>())
}

#[cfg(windows)]
unsafe fn raw_free(ptr: *mut u16) {
    use windows::Win32::System::Com::CoTaskMemFree;

    CoTaskMemFree(Some(ptr.cast_const().cast()));
}

#[cfg(not(windows))]
const HEADER: usize = std::mem::size_of::<usize>();

#[cfg(not(windows))]
fn header_layout(total: usize) -> Option<std::alloc::Layout> {
    std::alloc::Layout::from_size_align(total, std::mem::align_of::<usize>()).ok()
}

#[cfg(not(windows))]
fn raw_alloc(bytes: usize) -> Option<NonNull<u16>> {
    let total = bytes.checked_add(HEADER)?;
    let layout = header_layout(total)?;

    unsafe {
        let base = std::alloc::alloc(layout);
        if base.is_null() {
            return None;
        }
        base.cast::<usize>().write(total);
        NonNull::new(base.add(HEADER).cast::<u16>())
    }
}

#[cfg(not(windows))]
unsafe fn raw_free(ptr: *mut u16) {
    let base = ptr.cast::<u8>().sub(HEADER);
    let total = base.cast::<usize>().read();
    if let Some(layout) = header_layout(total) {
        std::alloc::dealloc(base, layout);
    }
}

/// Read a null-terminated UTF-16 string of at most `max_units` code units.
///
/// Returns `None` for null pointers, missing terminators and invalid UTF-16.
///
/// # Safety
///
/// `ptr` must be null or point to readable memory up to its terminator or
/// up to `max_units + 1` units, whichever comes first.
pub(crate) unsafe fn read_wide(ptr: *const u16, max_units: usize) -> Option<String> {
    if ptr.is_null() {
        return None;
    }

    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
        if len > max_units {
            return None;
        }
    }

    String::from_utf16(std::slice::from_raw_parts(ptr, len)).ok()
}

#[cfg(test)]
pub(crate) fn wide_to_vec(ptr: *const u16) -> Vec<u16> {
    let mut units = Vec::new();
    let mut i = 0;
    unsafe {
        while *ptr.add(i) != 0 {
            units.push(*ptr.add(i));
            i += 1;
        }
    }
    units
}
