//! 23andMe raw data lines: `rsid<TAB>chromosome<TAB>position<TAB>genotype`.

use crate::error::Result;
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

/// Normalizer for the primary tab-delimited layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwentyThreeAndMeNormalizer;

impl LineNormalizer for TwentyThreeAndMeNormalizer {
    fn format(&self) -> FileFormat {
        FileFormat::TwentyThreeAndMe
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        let fields = split_fields(line, '\t', self.format(), 4, line_number)?;
        Ok(NormalizedLine::Record(CanonicalVariant::new(
            fields[0], fields[1], fields[2], fields[3],
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IngestError;

    #[test]
    fn test_fields_map_directly() {
        let line = TwentyThreeAndMeNormalizer
            .normalize("rs123\t11\t421412\tAa", 1)
            .unwrap();
        assert_eq!(
            line,
            NormalizedLine::Record(CanonicalVariant::new("rs123", "11", "421412", "AA"))
        );
    }

    #[test]
    fn test_lowercased_chromosome_is_uppercased() {
        let line = TwentyThreeAndMeNormalizer
            .normalize("i3000001\tmt\t16519\tc", 3)
            .unwrap();
        let record = line.record().unwrap();
        assert_eq!(record.chromosome(), "MT");
        assert_eq!(record.allele(), "C");
    }

    #[test]
    fn test_short_line_is_malformed() {
        let err = TwentyThreeAndMeNormalizer.normalize("rs123\t11", 4).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedLine {
                line: 4,
                expected: 4,
                found: 2,
                ..
            }
        ));
    }
}
