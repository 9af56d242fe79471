use thiserror::Error;

/// Unified error type for pdf-certify-core
///
/// Every pipeline stage maps its failures onto one of these variants:
/// - Reading the source PDF
/// - Calling the translation service
/// - Rendering generated PDFs
/// - Merging the final document
/// - Configuration and argument validation
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Pipeline Stage Errors
    // ==========================================================================
    /// The source PDF could not be opened or parsed
    #[error("failed to read document: {0}")]
    DocumentRead(String),

    /// The translation request failed
    #[error("translation service request failed: {0}")]
    TranslationService(String),

    /// The translation service answered without any content
    #[error("translation service returned no content")]
    TranslationEmptyResponse,

    /// A generated PDF could not be produced or written
    #[error("failed to render PDF: {0}")]
    Render(String),

    /// Input PDFs could not be merged
    #[error("failed to merge PDFs: {0}")]
    Merge(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// A required argument was not supplied
    #[error("missing required argument {0}")]
    MissingArgument(&'static str),

    /// An argument was supplied but cannot be used
    #[error("invalid value for {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Name of the error kind, used as a structured field in error logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DocumentRead(_) => "DocumentReadError",
            Self::TranslationService(_) | Self::TranslationEmptyResponse => {
                "TranslationServiceError"
            }
            Self::Render(_) => "RenderError",
            Self::Merge(_) => "MergeError",
            Self::MissingArgument(_) | Self::InvalidArgument { .. } | Self::ConfigLoad(_) => {
                "ConfigError"
            }
            Self::Io(_) => "IoError",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
