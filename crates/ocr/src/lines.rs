/// One non-empty line of an OCR transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Position among the non-empty lines.
    pub index: usize,
    /// Trimmed text exactly as OCR produced it.
    pub text: String,
    /// `text` with full-width ASCII folded to half-width, for pattern matching.
    pub normalized: String,
}

/// Split a transcript into trimmed, non-empty lines, preserving order.
pub fn split_lines(raw_text: &str) -> Vec<Line> {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(index, text)| Line {
            index,
            text: text.to_string(),
            normalized: normalize_width(text),
        })
        .collect()
}

/// Fold the full-width forms block (`０-９`, `，`, `．`, `／`, `Ａ-Ｚ`, …) and the
/// ideographic space to their ASCII counterparts. `￥` is left alone; it sits
/// outside the block and is matched as a currency prefix as-is.
pub fn normalize_width(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}
