//! Windows.Media.Ocr pipeline
//!
//! Each asynchronous WinRT operation is waited on with `.get()`, so every
//! function here blocks the calling thread until the platform finishes.

use crate::error::{OcrError, Result};
use crate::recognizer::EngineOptions;
use std::cell::Cell;
use tracing::debug;
use windows::{
    core::HSTRING,
    Globalization::Language,
    Graphics::Imaging::{BitmapDecoder, SoftwareBitmap},
    Media::Ocr::OcrEngine,
    Storage::Streams::{DataWriter, InMemoryRandomAccessStream},
    Win32::Foundation::RPC_E_CHANGED_MODE,
    Win32::System::WinRT::{RoInitialize, RO_INIT_MULTITHREADED},
};

thread_local! {
    static APARTMENT_READY: Cell<bool> = const { Cell::new(false) };
}

/// Make sure the current thread has a WinRT apartment.
///
/// A thread that already joined a single-threaded apartment keeps it; WinRT
/// objects work from either kind. Only an apartment reference this library
/// holds is remembered, since a host-owned one can be torn down under us.
pub(crate) fn ensure_apartment() -> Result<()> {
    if APARTMENT_READY.with(Cell::get) {
        return Ok(());
    }

    match unsafe { RoInitialize(RO_INIT_MULTITHREADED) } {
        Ok(()) => {
            debug!("initialized multithreaded apartment");
            APARTMENT_READY.with(|ready| ready.set(true));
            Ok(())
        }
        Err(e) if e.code() == RPC_E_CHANGED_MODE => {
            debug!("thread already has a single-threaded apartment");
            Ok(())
        }
        Err(e) => Err(OcrError::Apartment(e.to_string())),
    }
}

/// Copy encoded bytes into a rewound in-memory stream
fn write_stream(image: &[u8]) -> Result<InMemoryRandomAccessStream> {
    let stream = InMemoryRandomAccessStream::new()
        .map_err(|e| OcrError::Stream(format!("failed to create stream: {}", e)))?;

    let writer = DataWriter::CreateDataWriter(&stream)
        .map_err(|e| OcrError::Stream(format!("failed to create writer: {}", e)))?;

    writer
        .WriteBytes(image)
        .map_err(|e| OcrError::Stream(format!("failed to write bytes: {}", e)))?;

    writer
        .StoreAsync()
        .map_err(|e| OcrError::Stream(format!("failed to store: {}", e)))?
        .get()
        .map_err(|e| OcrError::Stream(format!("failed to complete store: {}", e)))?;

    stream
        .Seek(0)
        .map_err(|e| OcrError::Stream(format!("failed to seek: {}", e)))?;

    Ok(stream)
}

/// Decode the stream with whichever codec matches its content
fn decode(stream: &InMemoryRandomAccessStream) -> Result<SoftwareBitmap> {
    let decoder = BitmapDecoder::CreateAsync(stream)
        .map_err(|e| OcrError::Decode(format!("failed to create decoder: {}", e)))?
        .get()
        .map_err(|e| OcrError::Decode(format!("unrecognized image data: {}", e)))?;

    let bitmap = decoder
        .GetSoftwareBitmapAsync()
        .map_err(|e| OcrError::Decode(format!("failed to start bitmap decode: {}", e)))?
        .get()
        .map_err(|e| OcrError::Decode(format!("failed to decode bitmap: {}", e)))?;

    Ok(bitmap)
}

fn create_engine(options: &EngineOptions) -> Result<OcrEngine> {
    let Some(tag) = options.language.as_deref() else {
        return OcrEngine::TryCreateFromUserProfileLanguages().map_err(|e| {
            OcrError::EngineUnavailable(format!(
                "no recognizer for user profile languages: {}",
                e
            ))
        });
    };

    let language = Language::CreateLanguage(&HSTRING::from(tag)).map_err(|e| {
        OcrError::EngineUnavailable(format!("invalid language tag '{}': {}", tag, e))
    })?;

    let supported = OcrEngine::IsLanguageSupported(&language).map_err(|e| {
        OcrError::EngineUnavailable(format!("failed to query language '{}': {}", tag, e))
    })?;
    if !supported {
        return Err(OcrError::EngineUnavailable(format!(
            "language '{}' is not installed for recognition",
            tag
        )));
    }

    OcrEngine::TryCreateFromLanguage(&language).map_err(|e| {
        OcrError::EngineUnavailable(format!(
            "failed to create engine for language '{}': {}",
            tag, e
        ))
    })
}

fn check_dimensions(bitmap: &SoftwareBitmap) -> Result<()> {
    let max = OcrEngine::MaxImageDimension()?;
    let width = bitmap.PixelWidth()?.max(0) as u32;
    let height = bitmap.PixelHeight()?.max(0) as u32;

    if width > max || height > max {
        return Err(OcrError::ImageTooLarge { width, height, max });
    }

    debug!("decoded {}x{} bitmap", width, height);
    Ok(())
}

/// Run the full pipeline: apartment, stream, decode, engine, recognize
pub(crate) fn recognize(image: &[u8], options: &EngineOptions) -> Result<Vec<u16>> {
    ensure_apartment()?;

    let stream = write_stream(image)?;
    let bitmap = decode(&stream)?;
    check_dimensions(&bitmap)?;

    let engine = create_engine(options)?;

    let result = engine
        .RecognizeAsync(&bitmap)
        .map_err(|e| OcrError::Recognition(format!("failed to start OCR: {}", e)))?
        .get()
        .map_err(|e| OcrError::Recognition(format!("OCR recognition failed: {}", e)))?;

    let text = result
        .Text()
        .map_err(|e| OcrError::Recognition(format!("failed to read OCR text: {}", e)))?;

    debug!("recognized {} UTF-16 units", text.len());
    Ok(text.as_wide().to_vec())
}

pub(crate) fn available_languages() -> Result<Vec<String>> {
    ensure_apartment()?;

    let languages = OcrEngine::AvailableRecognizerLanguages()?;
    let mut tags = Vec::new();

    for i in 0..languages.Size()? {
        let language = languages.GetAt(i)?;
        tags.push(language.LanguageTag()?.to_string());
    }

    Ok(tags)
}

pub(crate) fn is_language_supported(tag: &str) -> Result<bool> {
    ensure_apartment()?;

    let language = match Language::CreateLanguage(&HSTRING::from(tag)) {
        Ok(language) => language,
        Err(e) => {
            debug!("language tag '{}' rejected: {}", tag, e);
            return Ok(false);
        }
    };

    Ok(OcrEngine::IsLanguageSupported(&language)?)
}
