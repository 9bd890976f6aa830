//! Command-line interface for genoload.
//!
//! This module handles argument parsing and user interface only.
//! NO ingestion logic or database operations are performed here.

use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Genoload: load consumer genotyping files into a shared variant store.
#[derive(Parser, Debug)]
#[command(name = "genoload")]
#[command(author, version, about, long_about = None)]
#[command(subcommand_required = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print results and errors as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available genoload commands.
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Load a genotype file into the store.
    Ingest {
        /// Path to the SQLite database.
        #[arg(short, long)]
        database: PathBuf,

        /// Genotype record the file belongs to.
        #[arg(short, long)]
        genotype_id: i64,

        /// Path to the genotype file.
        #[arg(short, long)]
        file: PathBuf,

        /// Print the commands the run would apply without writing them.
        #[arg(long)]
        dry_run: bool,

        /// Skip refreshing table statistics after the load.
        #[arg(long)]
        skip_maintenance: bool,
    },

    /// Detect the format of a genotype file from its first line.
    Sniff {
        /// Path to the genotype file.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create a genotype record for a subject.
    Register {
        /// Path to the SQLite database.
        #[arg(short, long)]
        database: PathBuf,

        /// Subject (user) id owning the genotype.
        #[arg(short, long)]
        user_id: i64,

        /// Declared format tag (23andme, ancestry, decodeme, ftdna-illumina, 23andme-exome-vcf, IYG).
        #[arg(long)]
        filetype: String,
    },
}

/// Parse command-line arguments.
///
/// This function is the entry point for CLI argument parsing.
/// It returns the parsed Cli struct or exits on error.
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// JSON success payload for CLI responses.
#[derive(Serialize)]
pub struct CliSuccessPayload {
    /// Status indicator ("ok").
    pub status: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CliSuccessPayload {
    /// Construct a payload with structured data.
    pub fn with_data(message: String, data: Value) -> Self {
        Self {
            status: "ok",
            message,
            data: Some(data),
        }
    }
}

/// JSON error payload for CLI responses.
#[derive(Serialize)]
pub struct CliErrorPayload {
    /// Status indicator ("error").
    pub status: &'static str,
    /// Structured error details.
    pub error: ErrorDetails,
}

/// Details for a CLI error payload.
#[derive(Serialize)]
pub struct ErrorDetails {
    /// Error kind identifier (MalformedLine, etc.).
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Optional file context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Optional hint for remediation steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CliErrorPayload {
    /// Build payload from an IngestError instance.
    pub fn from_error(error: &crate::IngestError) -> Self {
        CliErrorPayload {
            status: "error",
            error: ErrorDetails {
                kind: error.kind(),
                message: error.to_string(),
                file: error
                    .file_path()
                    .map(|path| path.to_string_lossy().to_string()),
                hint: error.hint().map(|h| h.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IngestError;

    #[test]
    fn test_parse_ingest() {
        let cli = Cli::try_parse_from([
            "genoload",
            "ingest",
            "--database",
            "db.sqlite",
            "--genotype-id",
            "12",
            "--file",
            "genome.txt",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Ingest {
                genotype_id,
                dry_run,
                skip_maintenance,
                ..
            } => {
                assert_eq!(genotype_id, 12);
                assert!(dry_run);
                assert!(!skip_maintenance);
            }
            other => panic!("Expected ingest, got: {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["genoload"]).is_err());
    }

    #[test]
    fn test_error_payload() {
        let payload = CliErrorPayload::from_error(&IngestError::UnknownFormat {
            format: "genome-wide".to_string(),
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["kind"], "UnknownFormat");
        assert!(json["error"]["hint"].is_string());
        assert!(json["error"].get("file").is_none());
    }
}
