//! SQLite persistence for genotype ingestion.
//!
//! The store supplies the pipeline's inputs (genotype metadata and the
//! two known-name snapshots) and applies its commands. A run is one
//! transaction: committed after a clean scan, rolled back on any error.

pub mod schema;

use crate::dedup::DedupTracker;
use crate::error::{IngestError, Result};
use crate::event::{EventSink, IngestEvent};
use crate::ingest::alias::AliasTable;
use crate::ingest::{GenotypeFileMetadata, IngestSummary, IngestionPipeline};
use crate::variant::{
    DEFAULT_ALLELE_FREQUENCY, DEFAULT_GENOTYPE_FREQUENCY, DEFAULT_RANKING,
    DEFAULT_REFERENCE_COUNT,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::time::Duration;

/// Database handle for the genotype tables.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| IngestError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_millis(schema::BUSY_TIMEOUT_MS))?;
        conn.execute_batch(schema::PRAGMAS)?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Create a genotype record and return its id.
    pub fn register_genotype(&self, user_id: i64, filetype: &str) -> Result<i64> {
        self.conn
            .execute(schema::INSERT_GENOTYPE, params![user_id, filetype])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Load the metadata of a genotype record.
    pub fn genotype_metadata(&self, genotype_id: i64) -> Result<GenotypeFileMetadata> {
        self.conn
            .query_row(schema::SELECT_GENOTYPE, params![genotype_id], |row| {
                Ok(GenotypeFileMetadata::new(
                    genotype_id,
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })
            .optional()?
            .ok_or(IngestError::GenotypeNotFound { genotype_id })
    }

    /// Format tag currently stored on a genotype record.
    pub fn genotype_filetype(&self, genotype_id: i64) -> Result<String> {
        Ok(self.genotype_metadata(genotype_id)?.declared_format)
    }

    /// Every variant name in the store.
    pub fn known_variants(&self) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(schema::SELECT_VARIANT_NAMES)?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(names)
    }

    /// Variant names already recorded for one subject.
    pub fn known_subject_variants(&self, subject_id: i64) -> Result<HashSet<String>> {
        let mut stmt = self.conn.prepare(schema::SELECT_SUBJECT_VARIANT_NAMES)?;
        let names = stmt
            .query_map(params![subject_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(names)
    }

    /// Number of rows in the variants table.
    pub fn variant_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM snps", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of variants recorded for one subject.
    pub fn subject_variant_count(&self, subject_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_snps WHERE user_id = ?1",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Stored allele of a subject variant.
    pub fn subject_allele(&self, subject_id: i64, name: &str) -> Result<Option<String>> {
        let allele = self
            .conn
            .query_row(
                "SELECT local_genotype FROM user_snps WHERE user_id = ?1 AND snp_name = ?2",
                params![subject_id, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(allele)
    }

    /// Build the pipeline inputs for a genotype record.
    fn prepare(&self, genotype_id: i64) -> Result<(GenotypeFileMetadata, DedupTracker)> {
        let metadata = self.genotype_metadata(genotype_id)?;
        let known_variants = self.known_variants()?;
        let known_subject_variants = self.known_subject_variants(metadata.subject_id)?;
        log::info!(
            "Loaded {} known variants and {} known variants for subject {}",
            known_variants.len(),
            known_subject_variants.len(),
            metadata.subject_id
        );
        Ok((
            metadata,
            DedupTracker::new(known_variants, known_subject_variants),
        ))
    }

    /// Ingest a genotype file from disk, hashing it as it streams through.
    pub fn ingest_file(
        &mut self,
        path: &Path,
        genotype_id: i64,
        aliases: &AliasTable,
    ) -> Result<IngestSummary> {
        log::info!("Started work on {}", path.display());
        let mut reader = open_input(path)?;
        let mut summary = self
            .ingest_reader(&mut reader, genotype_id, aliases)
            .map_err(|e| e.with_path(path))?;
        let hash = reader.into_inner().finish();
        log::info!("Loaded {} (sha256 {})", path.display(), hash);
        summary.file_sha256 = Some(hash);
        Ok(summary)
    }

    /// Ingest genotype lines from any reader.
    ///
    /// Every command of the run, including a format correction, is applied
    /// in one transaction. Any error rolls the whole run back.
    pub fn ingest_reader<R: BufRead>(
        &mut self,
        reader: R,
        genotype_id: i64,
        aliases: &AliasTable,
    ) -> Result<IngestSummary> {
        let (mut metadata, tracker) = self.prepare(genotype_id)?;
        let mut pipeline = IngestionPipeline::new(tracker, aliases);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = {
            let mut sink = TransactionSink::new(&tx);
            pipeline
                .run(reader, &mut metadata, &mut sink)
                .map(|mut summary| {
                    summary.variant_conflicts = sink.variant_conflicts;
                    summary.subject_variant_conflicts = sink.subject_variant_conflicts;
                    summary
                })
        };

        match outcome {
            Ok(summary) => {
                tx.commit()?;
                log::info!("Committed run {}", summary.run_id);
                Ok(summary)
            }
            Err(e) => {
                log::warn!("Ingestion of genotype {} failed, rolling back: {}", genotype_id, e);
                if let Err(rollback_err) = tx.rollback() {
                    log::error!(
                        "Failed to roll back genotype {}: {}",
                        genotype_id,
                        rollback_err
                    );
                }
                Err(e)
            }
        }
    }

    /// Run the pipeline without writing anything; returns the events it would apply.
    pub fn plan_file(
        &self,
        path: &Path,
        genotype_id: i64,
        aliases: &AliasTable,
    ) -> Result<(Vec<IngestEvent>, IngestSummary)> {
        let mut reader = open_input(path)?;
        let (mut metadata, tracker) = self.prepare(genotype_id)?;
        let mut pipeline = IngestionPipeline::new(tracker, aliases);
        let mut events = Vec::new();
        let mut summary = pipeline
            .run(&mut reader, &mut metadata, &mut events)
            .map_err(|e| e.with_path(path))?;
        summary.file_sha256 = Some(reader.into_inner().finish());
        Ok((events, summary))
    }

    /// Refresh planner statistics after a load.
    pub fn maintain(&self) -> Result<()> {
        log::info!("Analyzing variant tables");
        self.conn.execute_batch(schema::MAINTENANCE)?;
        Ok(())
    }
}

/// Applies pipeline events inside an open transaction.
struct TransactionSink<'c> {
    conn: &'c Connection,
    variant_conflicts: usize,
    subject_variant_conflicts: usize,
}

impl<'c> TransactionSink<'c> {
    fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            variant_conflicts: 0,
            subject_variant_conflicts: 0,
        }
    }
}

impl EventSink for TransactionSink<'_> {
    fn emit(&mut self, event: IngestEvent) -> Result<()> {
        match event {
            IngestEvent::CorrectFormat {
                record_id,
                detected_format,
            } => {
                self.conn
                    .prepare_cached(schema::UPDATE_GENOTYPE_FILETYPE)?
                    .execute(params![detected_format.as_str(), record_id])?;
            }
            IngestEvent::CreateVariant {
                name,
                chromosome,
                position,
                created_at,
            } => {
                let inserted = self.conn.prepare_cached(schema::INSERT_VARIANT)?.execute(params![
                    name,
                    chromosome,
                    position,
                    DEFAULT_RANKING,
                    DEFAULT_ALLELE_FREQUENCY,
                    DEFAULT_GENOTYPE_FREQUENCY,
                    DEFAULT_REFERENCE_COUNT,
                    timestamp(&created_at),
                ])?;
                if inserted == 0 {
                    log::debug!("Variant {} was created concurrently, keeping existing row", name);
                    self.variant_conflicts += 1;
                }
            }
            IngestEvent::CreateSubjectVariant {
                name,
                subject_id,
                record_id,
                allele,
                created_at,
            } => {
                let inserted = self
                    .conn
                    .prepare_cached(schema::INSERT_SUBJECT_VARIANT)?
                    .execute(params![
                        allele,
                        record_id,
                        subject_id,
                        name,
                        timestamp(&created_at)
                    ])?;
                if inserted == 0 {
                    log::debug!(
                        "Subject variant {} for subject {} already stored",
                        name,
                        subject_id
                    );
                    self.subject_variant_conflicts += 1;
                }
            }
            IngestEvent::DuplicateSkipped { .. } => {}
        }
        Ok(())
    }
}

fn open_input(path: &Path) -> Result<BufReader<HashingReader<File>>> {
    let file = File::open(path).map_err(|e| IngestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufReader::new(HashingReader::new(file)))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Feeds every byte read through it into a SHA-256 digest.
struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
        }
    }

    /// Hex digest of everything read so far.
    fn finish(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
