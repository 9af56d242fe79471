//! pdf-certify core library
//!
//! Produces a certified translation of a PDF document:
//! - PDF text extraction
//! - Translation via OpenAI-compatible APIs
//! - Fixed-width text layout and PDF rendering (translation + certificate)
//! - Merging certificate, translation and original into one PDF

pub mod config;
pub mod error;
pub mod pdf;
pub mod pipeline;
pub mod translator;
pub mod util;

pub use config::{AppConfig, Lang, OutputsConfig, TranslatorConfig};
pub use error::{Error, Result};
pub use pdf::{Certificate, PdfDocument, TextExtractor, merge_pdfs, render_text_pdf, text_to_pdf};
pub use pipeline::{Pipeline, PipelineReport, RunPlan, RunRequest, Stage};
pub use translator::{OpenAiTranslator, TranslationRequest, Translator, create_translator};
