//! Paginated text rendering into new PDF documents.
//!
//! # Coordinate System
//!
//! Rows are placed with a cursor measured in millimetres from the **top** of
//! the page, the way the layout constants are expressed. PDF content streams
//! use points with a **bottom-left** origin, so every row is converted with:
//! ```text
//! pdf_y = page_height_pt - cursor_mm * MM_TO_PT
//! ```

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use super::encoding::encode_win_ansi;
use super::layout::{layout_rows, PageMetrics, PT_TO_MM};

/// Points per millimetre.
const MM_TO_PT: f32 = 72.0 / 25.4;

/// Horizontal padding inside a row, left of the text.
const CELL_PADDING_MM: f32 = 1.0;

/// Average glyph width as a fraction of font size, for centring.
const CENTER_WIDTH_FACTOR: f32 = 0.55;

/// Font resource names used in content streams.
const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";

/// Font weight for subsequent rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    const fn resource_name(self) -> &'static [u8] {
        match self {
            Self::Regular => REGULAR_FONT,
            Self::Bold => BOLD_FONT,
        }
    }
}

/// Horizontal placement of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Builds a multi-page PDF one row at a time.
///
/// Rows that would cross the bottom margin start a new page. Text is shown
/// in Helvetica/Helvetica-Bold with WinAnsiEncoding; unsupported characters
/// are replaced with a placeholder rather than rejected.
pub struct TextPdfWriter {
    metrics: PageMetrics,
    title: Option<String>,
    /// Finished pages plus the one currently being filled
    pages: Vec<Vec<Operation>>,
    /// Distance of the cursor from the top edge
    cursor_mm: f32,
    style: FontStyle,
    replaced_chars: usize,
}

impl TextPdfWriter {
    /// Create a writer with one empty page.
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            metrics,
            title: None,
            pages: vec![Vec::new()],
            cursor_mm: metrics.margin_mm,
            style: FontStyle::Regular,
            replaced_chars: 0,
        }
    }

    /// Set the document title written to the info dictionary.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_font(&mut self, style: FontStyle) {
        self.style = style;
    }

    /// Number of pages so far, including the current one.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Characters that could not be encoded and were shown as placeholders.
    pub const fn replaced_chars(&self) -> usize {
        self.replaced_chars
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor_mm = self.metrics.margin_mm;
    }

    /// Emit one row of `height_mm`, breaking the page first if it would not fit.
    pub fn row(&mut self, text: &str, height_mm: f32, align: Align) {
        if self.cursor_mm + height_mm > self.metrics.break_threshold_mm() {
            self.add_page();
        }

        if !text.is_empty() {
            self.show_text(text, height_mm, align);
        }
        self.cursor_mm += height_mm;
    }

    /// Advance the cursor without drawing. Does not trigger a page break.
    pub fn gap(&mut self, height_mm: f32) {
        self.cursor_mm += height_mm;
    }

    /// Emit a blank row of standard height.
    pub fn blank_row(&mut self) {
        self.row("", self.metrics.row_height_mm(), Align::Left);
    }

    /// Lay out `text` with the fixed character budget, one standard row per
    /// wrapped line and one blank row per empty line.
    pub fn paragraph(&mut self, text: &str) {
        let row_height = self.metrics.row_height_mm();
        for line in layout_rows(text, self.metrics.char_budget()) {
            self.row(&line, row_height, Align::Left);
        }
    }

    fn show_text(&mut self, text: &str, height_mm: f32, align: Align) {
        let encoded = encode_win_ansi(text);
        if encoded.replaced > 0 {
            warn!(
                "Replaced {} character(s) not representable in WinAnsiEncoding",
                encoded.replaced
            );
            self.replaced_chars += encoded.replaced;
        }

        let font_size = self.metrics.font_size_pt;
        let font_size_mm = font_size * PT_TO_MM;
        let left_mm = self.metrics.margin_mm + CELL_PADDING_MM;

        let x_mm = match align {
            Align::Left => left_mm,
            Align::Center => {
                let usable_mm = 2.0f32.mul_add(-self.metrics.margin_mm, self.metrics.page_width_mm);
                #[allow(clippy::cast_precision_loss)]
                let text_mm = encoded.bytes.len() as f32 * font_size * CENTER_WIDTH_FACTOR / MM_TO_PT;
                (self.metrics.margin_mm + (usable_mm - text_mm) / 2.0).max(left_mm)
            }
        };

        // Baseline sits slightly below the vertical centre of the row
        let baseline_mm = self.cursor_mm + height_mm / 2.0 + 0.3 * font_size_mm;
        let page_height_pt = self.metrics.page_height_mm * MM_TO_PT;

        let operations = [
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(self.style.resource_name().to_vec()),
                    Object::Real(font_size),
                ],
            ),
            Operation::new(
                "Td",
                vec![
                    Object::Real(x_mm * MM_TO_PT),
                    Object::Real(baseline_mm.mul_add(-MM_TO_PT, page_height_pt)),
                ],
            ),
            Operation::new("Tj", vec![Object::String(encoded.bytes, StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ];

        if let Some(page) = self.pages.last_mut() {
            page.extend(operations);
        }
    }

    /// Serialize all pages into PDF bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = add_standard_font(&mut doc, "Helvetica");
        let bold_id = add_standard_font(&mut doc, "Helvetica-Bold");
        let resources_id = doc.add_object(Dictionary::from_iter([(
            "Font",
            Object::Dictionary(Dictionary::from_iter([
                ("F1", Object::Reference(regular_id)),
                ("F2", Object::Reference(bold_id)),
            ])),
        )]));

        let media_box = Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.metrics.page_width_mm * MM_TO_PT),
            Object::Real(self.metrics.page_height_mm * MM_TO_PT),
        ]);

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let bytes = content
                .encode()
                .map_err(|e| Error::Render(format!("Failed to encode page content: {e}")))?;
            let content_id = doc.add_object(Stream::new(Dictionary::new(), bytes));

            let page_id = doc.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                ("Contents", Object::Reference(content_id)),
                ("Resources", Object::Reference(resources_id)),
                ("MediaBox", media_box.clone()),
            ]));
            kids.push(Object::Reference(page_id));
        }

        let count = i64::try_from(kids.len())
            .map_err(|_| Error::Render("too many pages".to_string()))?;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = Dictionary::from_iter([(
            "Producer",
            Object::string_literal(concat!("pdf-certify ", env!("CARGO_PKG_VERSION"))),
        )]);
        if let Some(title) = self.title {
            info.set("Title", Object::String(encode_win_ansi(&title).bytes, StringFormat::Literal));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));

        doc.compress();

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| Error::Render(format!("Failed to save PDF: {e}")))?;

        Ok(output)
    }
}

fn add_standard_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(base_font.as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]))
}

/// Render arbitrary text as a paginated PDF.
pub fn render_text_pdf(text: &str) -> Result<Vec<u8>> {
    render_text_pdf_with(text, PageMetrics::default())
}

/// Render arbitrary text as a paginated PDF with custom page metrics.
pub fn render_text_pdf_with(text: &str, metrics: PageMetrics) -> Result<Vec<u8>> {
    let mut writer = TextPdfWriter::new(metrics).with_title("Translation");
    writer.set_font(FontStyle::Regular);
    writer.paragraph(text);
    debug!("Laid out translation on {} page(s)", writer.page_count());
    writer.finish()
}

/// Write rendered PDF bytes to `path`, replacing any existing file.
pub fn save_pdf(bytes: &[u8], path: &Path) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| {
        error!("Failed to write PDF to {}: {}", path.display(), e);
        Error::Render(format!("Failed to write {}: {}", path.display(), e))
    })
}

/// Render `text` and write it to `path`.
pub fn text_to_pdf(text: &str, path: &Path) -> Result<()> {
    let bytes = render_text_pdf(text)?;
    save_pdf(&bytes, path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Collect the raw string operands of every `Tj` on each page.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<Vec<u8>>> {
        let doc = Document::load_mem(pdf).unwrap();
        doc.get_pages()
            .values()
            .map(|&page_id| {
                let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .filter_map(|op| match op.operands.first() {
                        Some(Object::String(bytes, _)) => Some(bytes.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_short_text_single_page() {
        let pdf = render_text_pdf("Hola\nMundo").unwrap();
        assert!(pdf.starts_with(b"%PDF"));

        let pages = shown_strings(&pdf);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], vec![b"Hola".to_vec(), b"Mundo".to_vec()]);
    }

    #[test]
    fn test_empty_text_still_produces_page() {
        let pdf = render_text_pdf("").unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_break_after_bottom_margin() {
        let metrics = PageMetrics::default();
        // 10mm top margin, 3.5mm rows, break at 269.4mm => 74 rows per page
        let text = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");

        let mut writer = TextPdfWriter::new(metrics);
        writer.paragraph(&text);
        assert_eq!(writer.page_count(), 3);

        let pages = shown_strings(&writer.finish().unwrap());
        assert_eq!(pages[0].len(), 74);
        assert_eq!(pages[1].len(), 74);
        assert_eq!(pages[2].len(), 52);
        assert_eq!(pages[1][0], b"line 74".to_vec());
    }

    #[test]
    fn test_blank_rows_take_space() {
        let mut writer = TextPdfWriter::new(PageMetrics::default());
        writer.paragraph(&"\n".repeat(100));
        assert_eq!(writer.page_count(), 2);
    }

    #[test]
    fn test_unsupported_characters_replaced_not_dropped() {
        let mut writer = TextPdfWriter::new(PageMetrics::default());
        writer.paragraph("Hola \u{6F22} Mundo");
        assert_eq!(writer.replaced_chars(), 1);

        let pages = shown_strings(&writer.finish().unwrap());
        assert_eq!(pages[0], vec![b"Hola ? Mundo".to_vec()]);
    }

    #[test]
    fn test_save_pdf_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.pdf");
        let result = text_to_pdf("text", &path);
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
