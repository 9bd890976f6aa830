//! Canonical variant representation shared by every input format.
//!
//! Each vendor format is normalized into the same four fields:
//! name, chromosome, position and allele.

use serde::Serialize;

/// Allele frequency placeholder stored on newly created variants.
pub const DEFAULT_ALLELE_FREQUENCY: &str = "---\nA: 0\nT: 0\nG: 0\nC: 0\n";

/// Genotype frequency placeholder stored on newly created variants.
pub const DEFAULT_GENOTYPE_FREQUENCY: &str = "--- {}\n";

/// Ranking assigned to newly created variants.
pub const DEFAULT_RANKING: i64 = 0;

/// Reference count assigned to newly created variants.
pub const DEFAULT_REFERENCE_COUNT: i64 = 1;

/// A format-independent variant call.
///
/// `chromosome` and `allele` are always uppercase and `name` is always
/// lowercase, whatever the casing of the raw line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalVariant {
    name: String,
    chromosome: String,
    position: String,
    allele: String,
}

impl CanonicalVariant {
    /// Build a record, normalizing the casing of every field.
    pub fn new(
        name: impl AsRef<str>,
        chromosome: impl AsRef<str>,
        position: impl Into<String>,
        allele: impl AsRef<str>,
    ) -> Self {
        Self {
            name: name.as_ref().to_ascii_lowercase(),
            chromosome: chromosome.as_ref().to_ascii_uppercase(),
            position: position.into(),
            allele: allele.as_ref().to_ascii_uppercase(),
        }
    }

    /// Variant name (e.g. `rs123`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chromosome label (e.g. `11`, `MT`, `X`).
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    /// Position on the chromosome, as written in the file.
    pub fn position(&self) -> &str {
        &self.position
    }

    /// Called allele string (e.g. `AG`).
    pub fn allele(&self) -> &str {
        &self.allele
    }
}

/// Result of normalizing one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedLine {
    /// The line carried a variant call.
    Record(CanonicalVariant),
    /// In-band header row; nothing to ingest.
    Skip,
}

impl NormalizedLine {
    /// Returns the record, if any.
    pub fn record(&self) -> Option<&CanonicalVariant> {
        match self {
            NormalizedLine::Record(record) => Some(record),
            NormalizedLine::Skip => None,
        }
    }
}
