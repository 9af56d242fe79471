//! Fixed-metric text layout shared by the certificate and translation PDFs.
//!
//! Nothing is measured glyph by glyph: a line holds a fixed number of
//! characters, derived from the page width and an average character width,
//! and every row has the same height.

// =============================================================================
// Layout Constants
// =============================================================================

/// US Letter width in millimetres.
pub const LETTER_WIDTH_MM: f32 = 215.9;

/// US Letter height in millimetres.
pub const LETTER_HEIGHT_MM: f32 = 279.4;

/// Conversion factor used for font metrics (1 pt taken as 0.35 mm).
pub const PT_TO_MM: f32 = 0.35;

/// Body font size in points.
pub const FONT_SIZE_PT: f32 = 10.0;

/// Average character width in points.
pub const CHAR_WIDTH_PT: f32 = 7.0;

/// Bottom margin below which no row is placed.
pub const BOTTOM_MARGIN_MM: f32 = 10.0;

/// Left, right and top page margins.
pub const PAGE_MARGIN_MM: f32 = 10.0;

/// Page geometry and font metrics for fixed-width layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub bottom_margin_mm: f32,
    pub font_size_pt: f32,
    pub char_width_mm: f32,
}

impl Default for PageMetrics {
    fn default() -> Self {
        Self {
            page_width_mm: LETTER_WIDTH_MM,
            page_height_mm: LETTER_HEIGHT_MM,
            margin_mm: PAGE_MARGIN_MM,
            bottom_margin_mm: BOTTOM_MARGIN_MM,
            font_size_pt: FONT_SIZE_PT,
            char_width_mm: CHAR_WIDTH_PT * PT_TO_MM,
        }
    }
}

impl PageMetrics {
    /// Maximum characters per line: floor(page width / char width).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn char_budget(&self) -> usize {
        (self.page_width_mm / self.char_width_mm).floor().max(1.0) as usize
    }

    /// Height of a single text row.
    pub fn row_height_mm(&self) -> f32 {
        self.font_size_pt * PT_TO_MM
    }

    /// Lowest y (from the top edge) a row may reach.
    pub fn break_threshold_mm(&self) -> f32 {
        self.page_height_mm - self.bottom_margin_mm
    }
}

/// Word wrap a single line to at most `max_chars` characters per row.
///
/// Words are never split: a word longer than `max_chars` is emitted on its
/// own, unbroken row. A line with no words yields no rows.
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            rows.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }

    rows
}

/// Lay out `text` as rows: split on `\n`, wrap each line, and keep one blank
/// row for every line that has no words.
pub fn layout_rows(text: &str, max_chars: usize) -> Vec<String> {
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let wrapped = wrap_line(line, max_chars);
        if wrapped.is_empty() {
            rows.push(String::new());
        } else {
            rows.extend(wrapped);
        }
    }
    rows
}
