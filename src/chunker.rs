//! Sliding-window character chunking
//!
//! Pages are cut into overlapping fixed-size windows so that retrieval
//! context survives chunk boundaries. Window arithmetic is part of the
//! persisted-metadata compatibility contract and must stay deterministic.

/// Windows whose trimmed length is at or below this are discarded
const MIN_CHUNK_CHARS: usize = 50;

/// Split text into overlapping character windows.
///
/// Window `i` covers `[start, start + size)` clamped to the text length;
/// the next window starts at `max(0, end - overlap)`. Iteration stops once
/// a window reaches the end of the text. Carriage returns are normalized
/// to spaces before windowing. Counts are in characters, not bytes, so
/// multi-byte text never splits inside a code point.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    // Each window must start past the previous one or iteration never
    // reaches the end of the text; config rejects overlap >= size, this
    // clamp keeps direct callers safe too.
    if size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(size - 1);

    let text = text.replace('\r', " ");
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    let mut parts = Vec::new();
    let mut start = 0;
    while start < n {
        let end = (start + size).min(n);
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if trimmed.chars().count() > MIN_CHUNK_CHARS {
            parts.push(trimmed.to_string());
        }
        if end == n {
            break;
        }
        start = end.saturating_sub(overlap);
    }
    parts
}
