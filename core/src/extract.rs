use crate::error::ExtractError;
use crate::tokenizer::normalize_text;
use std::panic;

/// How far into a payload the `%PDF-` header may start.
const MAGIC_WINDOW: usize = 1024;

/// Extract the text layer of a PDF: pages in order, joined by `\n`, normalized.
///
/// No OCR is attempted, so a scanned document yields little or no text.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    if !looks_like_pdf(bytes) {
        return Err(ExtractError::NotPdf);
    }
    // The parser can panic on malformed streams; keep that from crossing this boundary.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|payload| ExtractError::ParserPanic(panic_message(payload.as_ref())))?
        .map_err(|e| ExtractError::Parse(e.to_string()))?;
    Ok(normalize_text(&pages.join("\n")))
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(MAGIC_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
