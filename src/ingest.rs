// 📥 Ingestion - raw sales file → trimmed, non-empty lines
// Tolerant of legacy encodings and an optional header row

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

// ============================================================================
// ENCODINGS
// ============================================================================

/// Text encodings tried in order; the first one that decodes the whole file wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl SourceEncoding {
    pub const FALLBACK_ORDER: [SourceEncoding; 3] = [
        SourceEncoding::Utf8,
        SourceEncoding::Latin1,
        SourceEncoding::Windows1252,
    ];

    pub fn name(&self) -> &str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Latin1 => "latin-1",
            SourceEncoding::Windows1252 => "cp1252",
        }
    }

    /// Decode the entire buffer, `None` if any byte sequence is invalid
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            SourceEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            SourceEncoding::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            SourceEncoding::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        }
    }
}

/// Decoded file contents plus the encoding that produced them
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: SourceEncoding,
}

/// Run the fallback chain over raw bytes
pub fn decode_with_fallback(bytes: &[u8]) -> Option<DecodedText> {
    SourceEncoding::FALLBACK_ORDER.iter().find_map(|encoding| {
        encoding.decode(bytes).map(|text| DecodedText {
            text,
            encoding: *encoding,
        })
    })
}

// ============================================================================
// LINE EXTRACTION
// ============================================================================

/// Column-name token that marks the first line as a header
pub const HEADER_TOKEN: &str = "TransactionID";

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Split decoded text into trimmed, non-empty lines, dropping a header row.
///
/// The header check is a plain substring match on the first remaining line;
/// a header with other columns or another order is not detected.
pub fn clean_lines(text: &str) -> Vec<String> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);

    // `\r\n`, `\n` and a lone `\r` all end a line
    let mut lines: Vec<String> = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if lines.first().is_some_and(|first| first.contains(HEADER_TOKEN)) {
        lines.remove(0);
    }

    lines
}

/// Read a sales file, failing on a missing or undecodable file
pub fn try_read_sales_data(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read sales file: {}", path.display()))?;

    let decoded = decode_with_fallback(&bytes).with_context(|| {
        let tried: Vec<&str> = SourceEncoding::FALLBACK_ORDER.iter().map(|e| e.name()).collect();
        format!(
            "Could not decode {} with any of the attempted encodings: {}",
            path.display(),
            tried.join(", ")
        )
    })?;

    if decoded.encoding != SourceEncoding::Utf8 {
        log::info!("Decoded {} as {}", path.display(), decoded.encoding.name());
    } else {
        log::debug!("Decoded {} as utf-8", path.display());
    }

    Ok(clean_lines(&decoded.text))
}

/// Read a sales file, returning an empty list (and logging why) on failure
pub fn read_sales_data(path: &Path) -> Vec<String> {
    match try_read_sales_data(path) {
        Ok(lines) => lines,
        Err(err) => {
            log::warn!("{:#}", err);
            Vec::new()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
