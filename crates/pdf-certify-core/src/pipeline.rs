//! The extract → translate → render → merge run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Instrument, debug, error, info, info_span};

use crate::config::{AppConfig, Lang, OutputsConfig};
use crate::error::{Error, Result};
use crate::pdf::{Certificate, PdfDocument, TextExtractor, merge_pdfs, text_to_pdf};
use crate::translator::{TranslationRequest, Translator};
use crate::util::write_text_file;

/// Everything a run needs, as supplied by the caller. Fields are optional
/// so that missing values can be reported together with the flag to pass.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub pdf_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub certificate_output: Option<PathBuf>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub source: Option<Lang>,
    pub target: Option<Lang>,
    pub outputs: OutputsConfig,
}

/// A validated [`RunRequest`]
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub pdf_path: PathBuf,
    pub output: PathBuf,
    pub certificate_output: PathBuf,
    pub certificate: Certificate,
    pub outputs: OutputsConfig,
}

fn required_text(value: Option<&str>, flag: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(Error::MissingArgument(flag)),
    }
}

fn required_path(value: Option<&Path>, flag: &'static str) -> Result<PathBuf> {
    match value {
        Some(p) if !p.as_os_str().is_empty() => Ok(p.to_path_buf()),
        _ => Err(Error::MissingArgument(flag)),
    }
}

impl RunRequest {
    /// Seed a request with the values found in a config file.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            name: config.signer.name.clone(),
            address: config.signer.address.clone(),
            source: config.languages.source.clone(),
            target: config.languages.target.clone(),
            outputs: config.outputs.clone(),
            ..Self::default()
        }
    }

    /// Check every required input before any stage runs.
    pub fn validate(&self) -> Result<RunPlan> {
        let pdf_path = required_path(self.pdf_path.as_deref(), "--pdf_path")?;
        let output = required_path(self.output.as_deref(), "--output")?;
        let certificate_output =
            required_path(self.certificate_output.as_deref(), "--certificate_output")?;
        let name = required_text(self.name.as_deref(), "--name")?;
        let address = required_text(self.address.as_deref(), "--address")?;
        let source = required_text(self.source.as_ref().map(Lang::as_str), "--language_1")?;
        let target = required_text(self.target.as_ref().map(Lang::as_str), "--language_2")?;

        if !pdf_path.is_file() {
            return Err(Error::DocumentRead(format!(
                "{} does not exist or is not a file",
                pdf_path.display()
            )));
        }

        let written: [(&'static str, &Path); 5] = [
            ("--output", &output),
            ("--certificate_output", &certificate_output),
            ("extracted text output", &self.outputs.extracted_text),
            ("translated text output", &self.outputs.translated_text),
            ("translated PDF output", &self.outputs.translated_pdf),
        ];
        for (i, &(field, path)) in written.iter().enumerate() {
            if path == pdf_path.as_path() {
                return Err(Error::InvalidArgument {
                    field,
                    reason: format!("{} would overwrite the source PDF", path.display()),
                });
            }
            if let Some((other, _)) = written[..i].iter().find(|(_, p)| *p == path) {
                return Err(Error::InvalidArgument {
                    field,
                    reason: format!("{} is also used for {}", path.display(), other),
                });
            }
        }

        Ok(RunPlan {
            pdf_path,
            output,
            certificate_output,
            certificate: Certificate::new(name, address, Lang::new(source), Lang::new(target)),
            outputs: self.outputs.clone(),
        })
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Certificate,
    Translate,
    RenderTranslation,
    Merge,
}

impl Stage {
    pub const ALL: [Self; 5] = [
        Self::Extract,
        Self::Certificate,
        Self::Translate,
        Self::RenderTranslation,
        Self::Merge,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Extract => "Extracting text",
            Self::Certificate => "Producing certificate",
            Self::Translate => "Translating",
            Self::RenderTranslation => "Rendering translation",
            Self::Merge => "Merging PDFs",
        }
    }
}

/// Summary of a successful run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub source_pages: usize,
    pub extracted_chars: usize,
    pub translated_chars: usize,
    pub output_pages: usize,
    pub output: PathBuf,
}

/// Callback invoked as each stage starts
pub type StageCallback = Box<dyn Fn(Stage) + Send + Sync>;

/// Runs the stages strictly in sequence; the first failure ends the run.
pub struct Pipeline {
    translator: Arc<dyn Translator>,
    on_stage: Option<StageCallback>,
}

/// Log a stage failure with its kind and pass it on unchanged.
fn log_failure(stage: Stage) -> impl FnOnce(Error) -> Error {
    move |e| {
        error!(stage = ?stage, kind = e.kind(), "{} failed: {}", stage.label(), e);
        e
    }
}

impl Pipeline {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            on_stage: None,
        }
    }

    /// Report stage transitions (used for progress display).
    #[must_use]
    pub fn with_stage_callback(mut self, callback: StageCallback) -> Self {
        self.on_stage = Some(callback);
        self
    }

    fn enter(&self, stage: Stage) {
        info!("{}", stage.label());
        if let Some(ref callback) = self.on_stage {
            callback(stage);
        }
    }

    /// Execute the whole run described by `plan`.
    pub async fn run(&self, plan: &RunPlan) -> Result<PipelineReport> {
        let span = info_span!(
            "pipeline",
            source = %plan.pdf_path.display(),
            translator = self.translator.name(),
        );
        self.run_stages(plan).instrument(span).await
    }

    async fn run_stages(&self, plan: &RunPlan) -> Result<PipelineReport> {
        self.enter(Stage::Extract);
        let (text, source_pages) = extract(&plan.pdf_path).map_err(log_failure(Stage::Extract))?;
        debug!("Extracted {} characters from {} page(s)", text.chars().count(), source_pages);

        self.enter(Stage::Certificate);
        plan.certificate
            .write_to(&plan.certificate_output)
            .map_err(log_failure(Stage::Certificate))?;
        // Extraction output, saved once the certificate exists
        write_text_file(&plan.outputs.extracted_text, &text)
            .map_err(log_failure(Stage::Extract))?;

        self.enter(Stage::Translate);
        let request = TranslationRequest::new(
            text,
            plan.certificate.source.clone(),
            plan.certificate.target.clone(),
        );
        let translated = self
            .translator
            .translate(&request)
            .await
            .map_err(log_failure(Stage::Translate))?;
        write_text_file(&plan.outputs.translated_text, &translated)
            .map_err(log_failure(Stage::Translate))?;

        self.enter(Stage::RenderTranslation);
        text_to_pdf(&translated, &plan.outputs.translated_pdf)
            .map_err(log_failure(Stage::RenderTranslation))?;

        self.enter(Stage::Merge);
        let inputs = [
            plan.certificate_output.as_path(),
            plan.outputs.translated_pdf.as_path(),
            plan.pdf_path.as_path(),
        ];
        let output_pages =
            merge_pdfs(&inputs, &plan.output).map_err(log_failure(Stage::Merge))?;

        info!("Process completed successfully");

        Ok(PipelineReport {
            source_pages,
            extracted_chars: request.text.chars().count(),
            translated_chars: translated.chars().count(),
            output_pages,
            output: plan.output.clone(),
        })
    }
}

/// Extract all text, releasing the document before returning.
fn extract(path: &Path) -> Result<(String, usize)> {
    let doc = PdfDocument::from_file(path)?;
    let text = TextExtractor::new(&doc).extract_text()?;
    Ok((text, doc.page_count()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete_request(dir: &Path) -> RunRequest {
        let pdf_path = dir.join("source.pdf");
        std::fs::write(&pdf_path, b"%PDF-1.5\n").unwrap();
        RunRequest {
            pdf_path: Some(pdf_path),
            output: Some(dir.join("out.pdf")),
            certificate_output: Some(dir.join("certificate.pdf")),
            name: Some("Jane Doe".to_string()),
            address: Some("123 Main St".to_string()),
            source: Some(Lang::new("English")),
            target: Some(Lang::new("Spanish")),
            outputs: OutputsConfig::in_dir(dir),
        }
    }

    #[test]
    fn test_validate_complete_request() {
        let dir = tempfile::tempdir().unwrap();
        let plan = complete_request(dir.path()).validate().unwrap();
        assert_eq!(plan.certificate.name, "Jane Doe");
        assert_eq!(plan.certificate.target, Lang::new("Spanish"));
    }

    #[test]
    fn test_validate_reports_missing_flag() {
        let dir = tempfile::tempdir().unwrap();

        let mut request = complete_request(dir.path());
        request.name = None;
        assert!(matches!(request.validate(), Err(Error::MissingArgument("--name"))));

        let mut request = complete_request(dir.path());
        request.address = Some("   ".to_string());
        assert!(matches!(request.validate(), Err(Error::MissingArgument("--address"))));

        let mut request = complete_request(dir.path());
        request.target = None;
        assert!(matches!(request.validate(), Err(Error::MissingArgument("--language_2"))));

        let request = RunRequest::default();
        assert!(matches!(request.validate(), Err(Error::MissingArgument("--pdf_path"))));
    }

    #[test]
    fn test_validate_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = complete_request(dir.path());
        request.pdf_path = Some(dir.path().join("absent.pdf"));
        assert!(matches!(request.validate(), Err(Error::DocumentRead(_))));
    }

    #[test]
    fn test_validate_rejects_overwriting_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = complete_request(dir.path());
        request.output = request.pdf_path.clone();
        assert!(matches!(
            request.validate(),
            Err(Error::InvalidArgument { field: "--output", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_shared_output_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut request = complete_request(dir.path());
        request.certificate_output = request.output.clone();
        assert!(matches!(
            request.validate(),
            Err(Error::InvalidArgument { field: "--certificate_output", .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::from_toml(
            r#"
            [signer]
            name = "Jane Doe"
            address = "123 Main St"

            [languages]
            source = "English"
            target = "Spanish"
            "#,
        )
        .unwrap();

        let request = RunRequest::from_config(&config);
        assert_eq!(request.name.as_deref(), Some("Jane Doe"));
        assert_eq!(request.source, Some(Lang::new("English")));
        assert!(request.pdf_path.is_none());
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::ALL.first(), Some(&Stage::Extract));
        assert_eq!(Stage::ALL.last(), Some(&Stage::Merge));
    }
}
