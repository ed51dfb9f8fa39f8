//! HRESULT-style status codes shared with foreign callers

/// Operation succeeded
pub const S_OK: i32 = 0;
/// Operation succeeded with a negative answer
pub const S_FALSE: i32 = 1;
/// Unspecified failure
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;
/// One or more arguments are invalid
pub const E_INVALIDARG: i32 = 0x8007_0057_u32 as i32;
/// Ran out of memory
pub const E_OUTOFMEMORY: i32 = 0x8007_000E_u32 as i32;

/// Outcome of a single extraction
///
/// Engine and pipeline failures share `E_FAIL` on the wire; the distinction
/// only exists on the Rust side and in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrStatus {
    Success,
    InvalidArgument,
    EngineUnavailable,
    PipelineFailure,
    OutOfMemory,
}

impl OcrStatus {
    pub fn hresult(self) -> i32 {
        match self {
            OcrStatus::Success => S_OK,
            OcrStatus::InvalidArgument => E_INVALIDARG,
            OcrStatus::EngineUnavailable | OcrStatus::PipelineFailure => E_FAIL,
            OcrStatus::OutOfMemory => E_OUTOFMEMORY,
        }
    }

    pub fn is_success(self) -> bool {
        self == OcrStatus::Success
    }

    /// Short machine-friendly name
    pub fn as_str(self) -> &'static str {
        match self {
            OcrStatus::Success => "success",
            OcrStatus::InvalidArgument => "invalid_argument",
            OcrStatus::EngineUnavailable => "engine_unavailable",
            OcrStatus::PipelineFailure => "pipeline_failure",
            OcrStatus::OutOfMemory => "out_of_memory",
        }
    }
}

impl std::fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:08X})", self.as_str(), self.hresult() as u32)
    }
}
