//! 23andMe exome VCF data lines.
//!
//! The genotype is decoded from the sample column using the position of
//! `GT` in the FORMAT column. Allele index `0` contributes the REF base,
//! `1` the ALT base; any other index (missing calls, second ALT)
//! contributes nothing.

use crate::error::{IngestError, Result};
use crate::ingest::detect::FileFormat;
use crate::ingest::dispatch::{split_fields, LineNormalizer};
use crate::variant::{CanonicalVariant, NormalizedLine};

const CHROM: usize = 0;
const POS: usize = 1;
const ID: usize = 2;
const REF: usize = 3;
const ALT: usize = 4;
const FORMAT: usize = 8;
const SAMPLE: usize = 9;

/// Normalizer for the variant-call-format exome export.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExomeVcfNormalizer;

impl LineNormalizer for ExomeVcfNormalizer {
    fn format(&self) -> FileFormat {
        FileFormat::ExomeVcf
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        let fields = split_fields(line, '\t', self.format(), SAMPLE + 1, line_number)?;

        let genotype_index = fields[FORMAT]
            .split(':')
            .position(|key| key.eq_ignore_ascii_case("GT"))
            .ok_or(IngestError::MissingGenotypeField { line: line_number })?;

        let sample: Vec<&str> = fields[SAMPLE].split(':').collect();
        let call = sample.get(genotype_index).ok_or(IngestError::MalformedLine {
            line: line_number,
            format: self.format().as_str(),
            expected: genotype_index + 1,
            found: sample.len(),
        })?;

        let allele: String = call
            .split(['/', '|'])
            .filter_map(|index| match index {
                "0" => Some(fields[REF]),
                "1" => Some(fields[ALT]),
                _ => None,
            })
            .collect();

        Ok(NormalizedLine::Record(CanonicalVariant::new(
            fields[ID],
            fields[CHROM],
            fields[POS],
            allele,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vcf_line(format: &str, sample: &str) -> String {
        format!("1\t69511\tRS75062661\ta\tg\t.\tpass\t.\t{format}\t{sample}")
    }

    #[test]
    fn test_homozygous_alt() {
        let line = ExomeVcfNormalizer.normalize(&vcf_line("GT:AD", "1/1"), 5).unwrap();
        assert_eq!(
            line,
            NormalizedLine::Record(CanonicalVariant::new("rs75062661", "1", "69511", "GG"))
        );
    }

    #[test]
    fn test_genotype_not_first_subfield() {
        let line = ExomeVcfNormalizer
            .normalize(&vcf_line("ad:gt:dp", "12,3:0/1:15"), 5)
            .unwrap();
        assert_eq!(line.record().unwrap().allele(), "AG");
    }

    #[test]
    fn test_missing_calls_contribute_nothing() {
        let line = ExomeVcfNormalizer.normalize(&vcf_line("gt", "./1"), 5).unwrap();
        assert_eq!(line.record().unwrap().allele(), "G");
    }

    #[test]
    fn test_missing_gt_is_fatal() {
        let err = ExomeVcfNormalizer
            .normalize(&vcf_line("ad:dp", "12:15"), 8)
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingGenotypeField { line: 8 }));
    }

    #[test]
    fn test_short_sample_is_malformed() {
        let err = ExomeVcfNormalizer
            .normalize(&vcf_line("ad:gt", "12"), 8)
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedLine { line: 8, .. }));
    }

    #[test]
    fn test_nine_columns_is_malformed() {
        let err = ExomeVcfNormalizer
            .normalize("1\t69511\trs1\ta\tg\t.\tpass\t.\tgt", 2)
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::MalformedLine {
                expected: 10,
                found: 9,
                ..
            }
        ));
    }
}
