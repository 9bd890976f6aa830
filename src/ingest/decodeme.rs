//! deCODEme export lines: `Name,Variation,Chromosome,Position,Strand,YourCode`.

use crate::error::Result;
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{is_header, split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

const HEADER_TOKEN: &str = "Name";

/// Normalizer for the comma-delimited decode-style layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeMeNormalizer;

impl LineNormalizer for DecodeMeNormalizer {
    fn format(&self) -> FileFormat {
        FileFormat::DecodeMe
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        if line.split(',').next().is_some_and(|f| is_header(f, HEADER_TOKEN)) {
            return Ok(NormalizedLine::Skip);
        }

        let fields = split_fields(line, ',', self.format(), 6, line_number)?;
        Ok(NormalizedLine::Record(CanonicalVariant::new(
            fields[0], fields[2], fields[3], fields[5],
        )))
    }
}
