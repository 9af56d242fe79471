mod certificate;
mod document;
mod encoding;
mod layout;
mod merge;
mod render;
mod text;

pub use certificate::{Certificate, CERTIFICATE_TITLE, format_certificate_date};
pub use document::PdfDocument;
pub use encoding::{encode_win_ansi, PLACEHOLDER};
pub use layout::{layout_rows, wrap_line, PageMetrics};
pub use merge::{merge_documents, merge_pdfs, MergeInput, MergedPdf};
pub use render::{render_text_pdf, save_pdf, text_to_pdf, Align, FontStyle, TextPdfWriter};
pub use text::{extract_text_from_pdf, TextExtractor};
