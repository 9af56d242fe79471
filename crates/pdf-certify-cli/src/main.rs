//! pdf-certify CLI - Produce a certified translation of a PDF document.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_certify_core::{AppConfig, Lang, Pipeline, RunRequest, Stage, create_translator};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "pdf-certify")]
#[command(author, version, about = "Extract, translate and merge PDF documents", long_about = None)]
struct Args {
    /// Path to the PDF file to be processed
    #[arg(long = "pdf_path")]
    pdf_path: Option<PathBuf>,

    /// Output file name for the merged PDF
    #[arg(long)]
    output: Option<PathBuf>,

    /// API key for OpenAI
    #[arg(long = "api_key", env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Name for the certificate of translation
    #[arg(long)]
    name: Option<String>,

    /// Address for the certificate of translation
    #[arg(long)]
    address: Option<String>,

    /// Source language for the translation
    #[arg(long = "language_1")]
    language_1: Option<String>,

    /// Target language for the translation
    #[arg(long = "language_2")]
    language_2: Option<String>,

    /// Output path for the certificate of translation
    #[arg(long = "certificate_output")]
    certificate_output: Option<PathBuf>,

    /// OpenAI API base URL
    #[arg(long = "api_base", env = "OPENAI_API_BASE")]
    api_base: Option<String>,

    /// Model name for OpenAI-compatible API
    #[arg(long, env = "OPENAI_MODEL")]
    model: Option<String>,

    /// Where to save the extracted text
    #[arg(long = "extracted_text_output")]
    extracted_text_output: Option<PathBuf>,

    /// Where to save the translated text
    #[arg(long = "translated_text_output")]
    translated_text_output: Option<PathBuf>,

    /// Where to save the rendered translation PDF
    #[arg(long = "translated_pdf_output")]
    translated_pdf_output: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    /// Apply command line values on top of the file configuration.
    fn apply(self, config: &mut AppConfig) -> RunRequest {
        if let Some(api_key) = self.api_key {
            config.translator.api_key = Some(api_key);
        }
        if let Some(api_base) = self.api_base {
            config.translator.api_base = api_base;
        }
        if let Some(model) = self.model {
            config.translator.model = model;
        }
        if let Some(path) = self.extracted_text_output {
            config.outputs.extracted_text = path;
        }
        if let Some(path) = self.translated_text_output {
            config.outputs.translated_text = path;
        }
        if let Some(path) = self.translated_pdf_output {
            config.outputs.translated_pdf = path;
        }

        let mut request = RunRequest::from_config(config);
        request.pdf_path = self.pdf_path;
        request.output = self.output;
        request.certificate_output = self.certificate_output;
        request.name = self.name.or(request.name);
        request.address = self.address.or(request.address);
        request.source = self.language_1.map(Lang::new).or(request.source);
        request.target = self.language_2.map(Lang::new).or(request.target);
        request
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let log_level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn stage_spinner() -> ProgressBar {
    let pb = ProgressBar::new(Stage::ALL.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:20.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

async fn run(args: Args) -> Result<()> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    let request = args.apply(&mut config);

    let translator =
        create_translator(&config.translator).context("Failed to initialize translator")?;

    // Check everything before touching the filesystem or the network
    let plan = request.validate()?;
    if translator.info().requires_api_key {
        config.translator.validate()?;
    }

    let pb = stage_spinner();
    let progress = pb.clone();
    let pipeline = Pipeline::new(translator).with_stage_callback(Box::new(move |stage| {
        if stage != Stage::Extract {
            progress.inc(1);
        }
        progress.set_message(stage.label());
    }));

    let outcome = pipeline.run(&plan).await;
    match &outcome {
        Ok(_) => {
            pb.inc(1);
            pb.finish_with_message("Done");
        }
        Err(_) => pb.abandon_with_message("Failed"),
    }
    let report = outcome?;

    info!(
        "Translated {} characters into {}",
        report.extracted_chars, report.translated_chars
    );
    info!(
        "Wrote {} ({} pages: certificate, translation, {} original)",
        report.output.display(),
        report.output_pages,
        report.source_pages
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    run(args).await.inspect_err(|e| error!("{:#}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_flags() {
        let args = Args::try_parse_from([
            "pdf-certify",
            "--pdf_path",
            "in.pdf",
            "--output",
            "out.pdf",
            "--api_key",
            "sk-test",
            "--name",
            "Jane Doe",
            "--address",
            "123 Main St",
            "--language_1",
            "English",
            "--language_2",
            "Spanish",
            "--certificate_output",
            "cert.pdf",
        ])
        .unwrap_or_else(|e| panic!("{e}"));

        let mut config = AppConfig::default();
        let request = args.apply(&mut config);

        assert_eq!(config.translator.api_key.as_deref(), Some("sk-test"));
        assert_eq!(request.name.as_deref(), Some("Jane Doe"));
        assert_eq!(request.source, Some(Lang::new("English")));
        assert_eq!(request.certificate_output, Some(PathBuf::from("cert.pdf")));
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from(["pdf-certify", "--name", "CLI Name"])
            .unwrap_or_else(|e| panic!("{e}"));

        let mut config = AppConfig::from_toml(
            r#"
            [signer]
            name = "File Name"
            address = "File Address"

            [outputs]
            translated_pdf = "work/translation.pdf"
            "#,
        )
        .unwrap_or_else(|e| panic!("{e}"));
        let request = args.apply(&mut config);

        assert_eq!(request.name.as_deref(), Some("CLI Name"));
        assert_eq!(request.address.as_deref(), Some("File Address"));
        assert_eq!(request.outputs.translated_pdf, PathBuf::from("work/translation.pdf"));
        assert!(request.pdf_path.is_none());
    }

    #[test]
    fn test_missing_flags_fail_validation() {
        let args = Args::try_parse_from(["pdf-certify"]).unwrap_or_else(|e| panic!("{e}"));
        let request = args.apply(&mut AppConfig::default());
        assert!(request.validate().is_err());
    }
}
