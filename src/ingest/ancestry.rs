//! AncestryDNA raw data lines.
//!
//! Tab separated with the two alleles in separate columns. The column
//! header row (`rsid ...`) appears in-band and is skipped.

use crate::error::Result;
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{is_header, split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

const HEADER_TOKEN: &str = "rsid";

/// Normalizer for the ancestry-style layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct AncestryNormalizer;

impl LineNormalizer for AncestryNormalizer {
    fn format(&self) -> FileFormat {
        FileFormat::Ancestry
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        if line.split('\t').next().is_some_and(|f| is_header(f, HEADER_TOKEN)) {
            return Ok(NormalizedLine::Skip);
        }

        let fields = split_fields(line, '\t', self.format(), 6, line_number)?;
        let allele = format!("{}{}", fields[4], fields[5]);
        Ok(NormalizedLine::Record(CanonicalVariant::new(
            fields[0], fields[1], fields[3], allele,
        )))
    }
}
