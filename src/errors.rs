/*!
 * Error types for the eafkit library.
 *
 * Document-level failures are typed with thiserror so callers can tell the
 * fatal ones (bad input, rejected mutation) from the conditions the model
 * recovers from and only reports.
 */

use thiserror::Error;

/// Errors raised by the annotation document model and its codec
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The source is not an ELAN annotation document
    #[error("Not an annotation document: {0}")]
    NotAnAnnotationDocument(String),

    /// The XML could not be parsed or a required attribute is missing
    #[error("Malformed document: {0}")]
    Malformed(String),

    /// No tier carries the requested id
    #[error("TIER_ID {tier_id} matched no tier (known: {known:?})")]
    TierNotFound {
        tier_id: String,
        known: Vec<String>,
    },

    /// A tier with this id already exists
    #[error("TIER_ID {0} already used")]
    DuplicateTierId(String),

    /// The linguistic type is not valid for the tier
    #[error("Type {type_id} is not recognized as a valid tier type (valid: {valid:?})")]
    InvalidLinguisticType {
        type_id: String,
        valid: Vec<String>,
    },

    /// Several tiers share an id; the largest one was picked
    #[error("TIER_ID {tier_id} matched {matches} tiers with sizes {sizes:?}")]
    AmbiguousTierId {
        tier_id: String,
        matches: usize,
        sizes: Vec<usize>,
    },

    /// The interval of an annotation could not be resolved
    #[error("Annotation {0} has no resolvable interval")]
    UndefinedInterval(String),

    /// No annotation on the parent tier covers the given instant
    #[error("No annotation on tier {parent:?} covers {time_ms}ms (needed by {annotation_id})")]
    NoGoverningAnnotation {
        annotation_id: String,
        parent: Option<String>,
        time_ms: u64,
    },

    /// The tier references a linguistic type that is not declared
    #[error("Linguistic type {0} is not declared in the document")]
    UnknownLinguisticType(String),

    /// Reading or writing the document failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl DocumentError {
    /// Whether the model recovers from this condition locally
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousTierId { .. }
                | Self::UndefinedInterval(_)
                | Self::NoGoverningAnnotation { .. }
        )
    }
}

impl From<std::io::Error> for DocumentError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<roxmltree::Error> for DocumentError {
    fn from(error: roxmltree::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

impl From<quick_xml::Error> for DocumentError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Malformed(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the document model
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from the CSV writer
    #[error("Export error: {0}")]
    Export(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::Export(error.to_string())
    }
}
