//! Commands and diagnostics emitted by an ingestion run.
//!
//! Events are structured values; the store binds their fields as query
//! parameters and never builds SQL text from them.

use crate::error::Result;
use crate::ingest::detect::FileFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One output of the ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IngestEvent {
    /// The file's declared format was wrong; store the detected one.
    CorrectFormat {
        /// Genotype record to update.
        record_id: i64,
        /// Format detected from the file content.
        #[serde(serialize_with = "serialize_format")]
        detected_format: FileFormat,
    },

    /// A variant absent from the store.
    CreateVariant {
        /// Variant name.
        name: String,
        /// Chromosome label.
        chromosome: String,
        /// Position on the chromosome.
        position: String,
        /// Creation timestamp.
        created_at: DateTime<Utc>,
    },

    /// A call not yet recorded for the subject.
    CreateSubjectVariant {
        /// Variant name.
        name: String,
        /// Subject (user) id.
        subject_id: i64,
        /// Genotype record id.
        record_id: i64,
        /// Called allele.
        allele: String,
        /// Creation timestamp.
        created_at: DateTime<Utc>,
    },

    /// The subject already has this variant; nothing is stored.
    DuplicateSkipped {
        /// Variant name.
        name: String,
        /// Allele on the skipped line.
        allele: String,
    },
}

impl IngestEvent {
    /// True for events that change the store.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, IngestEvent::DuplicateSkipped { .. })
    }
}

fn serialize_format<S: serde::Serializer>(
    format: &FileFormat,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(format.as_str())
}

/// Receiver of pipeline events, in input order.
pub trait EventSink {
    /// Handle one event. An error aborts the run.
    fn emit(&mut self, event: IngestEvent) -> Result<()>;
}

/// Collects events in memory (dry runs and tests).
impl EventSink for Vec<IngestEvent> {
    fn emit(&mut self, event: IngestEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}
