//! Genotype file → canonical variant → store command pipeline.
//!
//! This module sniffs the file format, normalizes each data line with the
//! matching format module, and decides which create commands the store
//! must apply. Processing is single pass and fail-fast.

pub mod alias;
pub mod ancestry;
pub mod decodeme;
pub mod detect;
pub mod dispatch;
pub mod ftdna;
pub mod iyg;
pub mod twentythree;
pub mod vcf;

use crate::dedup::DedupTracker;
use crate::error::{IngestError, Result};
use crate::event::{EventSink, IngestEvent};
use crate::ingest::alias::AliasTable;
use crate::ingest::detect::{FileFormat, FormatSniffer};
use crate::ingest::dispatch::{AnyNormalizer, LineNormalizer};
use crate::variant::NormalizedLine;
use chrono::Utc;
use serde::Serialize;
use std::borrow::Cow;
use std::io::BufRead;

/// Lines starting with this marker are never data.
pub const COMMENT_MARKER: char = '#';

/// Dropped from the start of the first line when an export carries one.
const BYTE_ORDER_MARK: char = '\u{feff}';

const LINE_TERMINATORS: &[char] = &['\r', '\n'];

/// Decode one raw line read with `read_until`.
///
/// Invalid UTF-8 is replaced rather than rejected. Only the line terminator
/// is removed, so empty trailing columns survive for field splitting.
pub(crate) fn decode_line(raw: &[u8], line_number: usize) -> String {
    let decoded = String::from_utf8_lossy(raw);
    if let Cow::Owned(_) = decoded {
        log::warn!("Line {}: invalid UTF-8 replaced", line_number);
    }
    let mut text = decoded.trim_end_matches(LINE_TERMINATORS);
    if line_number == 1 {
        text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    }
    text.to_string()
}

/// What is known about a genotype file before its lines are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeFileMetadata {
    /// Genotype record id.
    pub record_id: i64,
    /// Subject (user) the genotype belongs to.
    pub subject_id: i64,
    /// Format tag stored on the record; corrected when sniffing disagrees.
    pub declared_format: String,
    /// Format detected from the first line, if any rule matched.
    pub detected_format: Option<FileFormat>,
}

impl GenotypeFileMetadata {
    /// Metadata for a file whose content has not been sniffed yet.
    pub fn new(record_id: i64, subject_id: i64, declared_format: impl Into<String>) -> Self {
        Self {
            record_id,
            subject_id,
            declared_format: declared_format.into(),
            detected_format: None,
        }
    }
}

/// Counters describing a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Unique id of this run.
    pub run_id: String,
    /// SHA-256 of the input file, when read from disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_sha256: Option<String>,
    /// Format the lines were parsed as.
    pub format: String,
    /// Whether the declared format was corrected.
    pub format_corrected: bool,
    /// Lines read, including comments and blanks.
    pub lines_read: usize,
    /// Comment lines skipped.
    pub comment_lines: usize,
    /// Blank lines skipped.
    pub blank_lines: usize,
    /// In-band header rows skipped.
    pub header_lines: usize,
    /// Canonical records produced.
    pub records: usize,
    /// CreateVariant commands emitted.
    pub variants_created: usize,
    /// CreateSubjectVariant commands emitted.
    pub subject_variants_created: usize,
    /// Subject variants already present.
    pub duplicates_skipped: usize,
    /// Variant inserts absorbed by the store because another run won.
    pub variant_conflicts: usize,
    /// Subject variant inserts absorbed by the store.
    pub subject_variant_conflicts: usize,
}

/// Single-pass ingestion of one genotype file.
pub struct IngestionPipeline<'a> {
    sniffer: FormatSniffer,
    aliases: &'a AliasTable,
    tracker: DedupTracker,
}

impl<'a> IngestionPipeline<'a> {
    /// Create a pipeline over pre-loaded membership sets.
    pub fn new(tracker: DedupTracker, aliases: &'a AliasTable) -> Self {
        Self {
            sniffer: FormatSniffer::default(),
            aliases,
            tracker,
        }
    }

    /// Replace the built-in sniffing rules.
    pub fn with_sniffer(mut self, sniffer: FormatSniffer) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Membership sets as they stand after the run.
    pub fn tracker(&self) -> &DedupTracker {
        &self.tracker
    }

    /// Run the pipeline over `reader`, emitting events into `sink`.
    ///
    /// The first non-blank line decides the format and is then scanned
    /// like any other line, since some formats carry data in it. Any error
    /// stops the scan; the caller must discard what `sink` received.
    pub fn run<R: BufRead, S: EventSink>(
        &mut self,
        mut reader: R,
        metadata: &mut GenotypeFileMetadata,
        sink: &mut S,
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary {
            run_id: uuid::Uuid::new_v4().to_string(),
            ..IngestSummary::default()
        };
        log::info!(
            "Run {}: genotype {} for subject {}, declared format '{}'",
            summary.run_id,
            metadata.record_id,
            metadata.subject_id,
            metadata.declared_format
        );

        let mut selected: Option<AnyNormalizer<'a>> = None;

        let mut raw = Vec::new();
        let mut line_number = 0;

        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            line_number += 1;
            summary.lines_read += 1;

            let line = decode_line(&raw, line_number);
            if line.trim().is_empty() {
                summary.blank_lines += 1;
                continue;
            }

            let active = match selected {
                Some(active) => active,
                None => {
                    let format = self.resolve_format(&line, metadata, &mut summary, sink)?;
                    let active = AnyNormalizer::for_format(format, self.aliases);
                    selected = Some(active);
                    active
                }
            };

            if line.starts_with(COMMENT_MARKER) {
                summary.comment_lines += 1;
                continue;
            }

            let lowered = line.to_lowercase();
            match active.normalize(&lowered, line_number)? {
                NormalizedLine::Skip => summary.header_lines += 1,
                NormalizedLine::Record(record) => {
                    summary.records += 1;
                    let created_at = Utc::now();

                    if self.tracker.is_new_variant(record.name()) {
                        sink.emit(IngestEvent::CreateVariant {
                            name: record.name().to_string(),
                            chromosome: record.chromosome().to_string(),
                            position: record.position().to_string(),
                            created_at,
                        })?;
                        summary.variants_created += 1;
                    }

                    if self.tracker.is_new_subject_variant(record.name()) {
                        sink.emit(IngestEvent::CreateSubjectVariant {
                            name: record.name().to_string(),
                            subject_id: metadata.subject_id,
                            record_id: metadata.record_id,
                            allele: record.allele().to_string(),
                            created_at,
                        })?;
                        summary.subject_variants_created += 1;
                    } else {
                        log::debug!(
                            "Subject variant {} with allele {} already exists",
                            record.name(),
                            record.allele()
                        );
                        sink.emit(IngestEvent::DuplicateSkipped {
                            name: record.name().to_string(),
                            allele: record.allele().to_string(),
                        })?;
                        summary.duplicates_skipped += 1;
                    }
                }
            }
        }

        if selected.is_none() {
            return Err(IngestError::EmptyInput);
        }

        log::info!(
            "Run {}: {} records, {} new variants, {} new subject variants, {} duplicates",
            summary.run_id,
            summary.records,
            summary.variants_created,
            summary.subject_variants_created,
            summary.duplicates_skipped
        );
        Ok(summary)
    }

    /// Sniff the first line and settle on the format to parse with.
    fn resolve_format<S: EventSink>(
        &self,
        first_line: &str,
        metadata: &mut GenotypeFileMetadata,
        summary: &mut IngestSummary,
        sink: &mut S,
    ) -> Result<FileFormat> {
        let detected = self.sniffer.sniff(first_line);
        metadata.detected_format = detected;

        let format = match detected {
            Some(detected) if detected.as_str() != metadata.declared_format => {
                log::warn!(
                    "Genotype {} is supposed to have type {}, but it's actually {}",
                    metadata.record_id,
                    metadata.declared_format,
                    detected
                );
                sink.emit(IngestEvent::CorrectFormat {
                    record_id: metadata.record_id,
                    detected_format: detected,
                })?;
                metadata.declared_format = detected.as_str().to_string();
                summary.format_corrected = true;
                detected
            }
            Some(detected) => detected,
            None => {
                log::debug!(
                    "No sniffing rule matched; trusting declared format '{}'",
                    metadata.declared_format
                );
                metadata.declared_format.parse::<FileFormat>()?
            }
        };

        summary.format = format.as_str().to_string();
        Ok(format)
    }
}
