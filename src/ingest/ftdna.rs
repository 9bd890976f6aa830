//! FamilyTreeDNA Illumina export lines: `"RSID","CHROMOSOME","POSITION","RESULT"`.
//!
//! Once the quotes are stripped the columns line up with the 23andMe layout.

use crate::error::Result;
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{is_header, split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

const HEADER_TOKEN: &str = "RSID";

/// Normalizer for the quoted comma-delimited illumina-style layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtdnaIlluminaNormalizer;

impl LineNormalizer for FtdnaIlluminaNormalizer {
    fn format(&self) -> FileFormat {
        FileFormat::FtdnaIllumina
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        let unquoted = line.replace('"', "");
        if unquoted.split(',').next().is_some_and(|f| is_header(f, HEADER_TOKEN)) {
            return Ok(NormalizedLine::Skip);
        }

        let fields = split_fields(&unquoted, ',', self.format(), 4, line_number)?;
        Ok(NormalizedLine::Record(CanonicalVariant::new(
            fields[0], fields[1], fields[2], fields[3],
        )))
    }
}
