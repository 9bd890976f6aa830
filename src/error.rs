//! Genoload error types.
//!
//! All errors are typed and provide root cause information. Every variant
//! is fatal to the ingestion run that raised it.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for genoload operations.
#[derive(Error, Debug)]
pub enum IngestError {
    /// I/O error during file operations.
    #[error("I/O error for path {path}: {source}")]
    Io {
        /// The file path that caused the I/O error.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// SQLite backend error.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// The input has no line to sniff.
    #[error("Empty input: no line to detect the format from")]
    EmptyInput,

    /// Neither the sniffed nor the declared format has a normalizer.
    #[error("Unknown genotype file format '{format}'")]
    UnknownFormat {
        /// The format tag that matched nothing.
        format: String,
    },

    /// A VCF line has no GT entry in its FORMAT column.
    #[error("Line {line}: FORMAT column has no GT subfield")]
    MissingGenotypeField {
        /// 1-based line number.
        line: usize,
    },

    /// A line has fewer fields than its format requires.
    #[error("Line {line}: malformed {format} line, expected at least {expected} fields, found {found}")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// Format tag the line was parsed as.
        format: &'static str,
        /// Minimum field count for the format.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },

    /// The genotype metadata row does not exist.
    #[error("Genotype {genotype_id} not found")]
    GenotypeNotFound {
        /// The requested genotype id.
        genotype_id: i64,
    },

    /// A command line argument was rejected.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Why the argument was rejected.
        message: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{0}")]
    Other(String),
}

impl IngestError {
    /// Stable identifier for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Io { .. } => "Io",
            IngestError::Store(_) => "Store",
            IngestError::EmptyInput => "EmptyInput",
            IngestError::UnknownFormat { .. } => "UnknownFormat",
            IngestError::MissingGenotypeField { .. } => "MissingGenotypeField",
            IngestError::MalformedLine { .. } => "MalformedLine",
            IngestError::GenotypeNotFound { .. } => "GenotypeNotFound",
            IngestError::InvalidArgument { .. } => "InvalidArgument",
            IngestError::Json(_) => "Json",
            IngestError::Other(_) => "Other",
        }
    }

    /// Optional remediation hint shown to the operator.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            IngestError::EmptyInput => Some("Re-upload the genotyping file; nothing was loaded"),
            IngestError::UnknownFormat { .. } => Some(
                "Set the genotype filetype to one of: 23andme, ancestry, decodeme, ftdna-illumina, 23andme-exome-vcf, IYG",
            ),
            IngestError::MissingGenotypeField { .. } => {
                Some("The VCF sample column must carry a GT entry")
            }
            IngestError::MalformedLine { .. } => {
                Some("Check that the file was exported unmodified from the vendor")
            }
            IngestError::GenotypeNotFound { .. } => {
                Some("Create the genotype row first with `genoload register`")
            }
            _ => None,
        }
    }

    /// Attach `path` to an I/O error raised while reading an unnamed stream.
    pub fn with_path(self, path: &Path) -> Self {
        match self {
            IngestError::Io { source, .. } => IngestError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    /// File path associated with the error, if any.
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            IngestError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

/// Result type alias for genoload operations.
pub type Result<T> = std::result::Result<T, IngestError>;
