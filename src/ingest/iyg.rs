//! Legacy IYG lines: `name<TAB>genotype`.
//!
//! Mitochondrial names embed their position (`MT-T3027C` sits at 3027)
//! and may have a dbSNP alias. Every other name is stored on chromosome
//! `1` at position `1`, whatever digits the name contains.

use crate::error::Result;
use crate::ingest::alias::AliasTable;
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

const MITOCHONDRIAL_MARKER: &[u8] = b"MT";

/// Normalizer for the legacy format with embedded position.
#[derive(Debug, Clone, Copy)]
pub struct IygNormalizer<'a> {
    aliases: &'a AliasTable,
}

impl<'a> IygNormalizer<'a> {
    /// Create a normalizer resolving mitochondrial names through `aliases`.
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }
}

impl LineNormalizer for IygNormalizer<'_> {
    fn format(&self) -> FileFormat {
        FileFormat::Iyg
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        let fields = split_fields(line, '\t', self.format(), 2, line_number)?;
        let name = fields[0];
        let allele = fields[1];

        let record = if is_mitochondrial(name) {
            let canonical = self.aliases.resolve(name).unwrap_or(name);
            CanonicalVariant::new(canonical, "MT", embedded_position(name), allele)
        } else {
            CanonicalVariant::new(name, "1", "1", allele)
        };
        Ok(NormalizedLine::Record(record))
    }
}

fn is_mitochondrial(name: &str) -> bool {
    name.as_bytes()
        .get(..MITOCHONDRIAL_MARKER.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MITOCHONDRIAL_MARKER))
}

/// Digits of `name`, in order.
fn embedded_position(name: &str) -> String {
    name.chars().filter(char::is_ascii_digit).collect()
}
