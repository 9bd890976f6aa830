//! Format-aware line normalization dispatcher.
//!
//! Every supported format implements [`LineNormalizer`]. [`AnyNormalizer`]
//! wraps the closed set of implementations so the pipeline selects one
//! normalizer per run and calls it for every data line.

use crate::error::{IngestError, Result};
use crate::ingest::alias::AliasTable;
use crate::ingest::detect::FileFormat;
use crate::ingest::{
    ancestry::AncestryNormalizer, decodeme::DecodeMeNormalizer, ftdna::FtdnaIlluminaNormalizer,
    iyg::IygNormalizer, twentythree::TwentyThreeAndMeNormalizer, vcf::ExomeVcfNormalizer,
};
use crate::variant::NormalizedLine;

/// Turns one raw, non-comment line into a canonical record or a skip.
pub trait LineNormalizer {
    /// Format handled by this normalizer.
    fn format(&self) -> FileFormat;

    /// Normalize a single line. `line_number` is 1-based and only used in errors.
    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine>;
}

/// Wrapper enum over every format-specific normalizer.
#[derive(Debug, Clone, Copy)]
pub enum AnyNormalizer<'a> {
    /// Format A.
    TwentyThreeAndMe(TwentyThreeAndMeNormalizer),
    /// Format B.
    Ancestry(AncestryNormalizer),
    /// Format C.
    DecodeMe(DecodeMeNormalizer),
    /// Format D.
    FtdnaIllumina(FtdnaIlluminaNormalizer),
    /// Format E.
    ExomeVcf(ExomeVcfNormalizer),
    /// Format F.
    Iyg(IygNormalizer<'a>),
}

impl<'a> AnyNormalizer<'a> {
    /// Select the normalizer for `format`.
    pub fn for_format(format: FileFormat, aliases: &'a AliasTable) -> Self {
        match format {
            FileFormat::TwentyThreeAndMe => {
                AnyNormalizer::TwentyThreeAndMe(TwentyThreeAndMeNormalizer)
            }
            FileFormat::Ancestry => AnyNormalizer::Ancestry(AncestryNormalizer),
            FileFormat::DecodeMe => AnyNormalizer::DecodeMe(DecodeMeNormalizer),
            FileFormat::FtdnaIllumina => AnyNormalizer::FtdnaIllumina(FtdnaIlluminaNormalizer),
            FileFormat::ExomeVcf => AnyNormalizer::ExomeVcf(ExomeVcfNormalizer),
            FileFormat::Iyg => AnyNormalizer::Iyg(IygNormalizer::new(aliases)),
        }
    }
}

impl LineNormalizer for AnyNormalizer<'_> {
    fn format(&self) -> FileFormat {
        match self {
            AnyNormalizer::TwentyThreeAndMe(n) => n.format(),
            AnyNormalizer::Ancestry(n) => n.format(),
            AnyNormalizer::DecodeMe(n) => n.format(),
            AnyNormalizer::FtdnaIllumina(n) => n.format(),
            AnyNormalizer::ExomeVcf(n) => n.format(),
            AnyNormalizer::Iyg(n) => n.format(),
        }
    }

    fn normalize(&self, line: &str, line_number: usize) -> Result<NormalizedLine> {
        match self {
            AnyNormalizer::TwentyThreeAndMe(n) => n.normalize(line, line_number),
            AnyNormalizer::Ancestry(n) => n.normalize(line, line_number),
            AnyNormalizer::DecodeMe(n) => n.normalize(line, line_number),
            AnyNormalizer::FtdnaIllumina(n) => n.normalize(line, line_number),
            AnyNormalizer::ExomeVcf(n) => n.normalize(line, line_number),
            AnyNormalizer::Iyg(n) => n.normalize(line, line_number),
        }
    }
}

/// Normalize a line with an explicit format.
///
/// # Example
///
/// ```
/// use genoload::ingest::alias::AliasTable;
/// use genoload::ingest::detect::FileFormat;
/// use genoload::ingest::dispatch::normalize_line;
///
/// let aliases = AliasTable::mitochondrial();
/// let line = normalize_line(FileFormat::TwentyThreeAndMe, "rs123\t11\t421412\taa", 1, &aliases)?;
/// assert_eq!(line.record().map(|r| r.allele()), Some("AA"));
/// # Ok::<(), genoload::IngestError>(())
/// ```
pub fn normalize_line(
    format: FileFormat,
    line: &str,
    line_number: usize,
    aliases: &AliasTable,
) -> Result<NormalizedLine> {
    AnyNormalizer::for_format(format, aliases).normalize(line, line_number)
}

/// Split `line` on `separator` and require at least `expected` fields.
pub(crate) fn split_fields(
    line: &str,
    separator: char,
    format: FileFormat,
    expected: usize,
    line_number: usize,
) -> Result<Vec<&str>> {
    let fields: Vec<&str> = line.split(separator).collect();
    if fields.len() < expected {
        return Err(IngestError::MalformedLine {
            line: line_number,
            format: format.as_str(),
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

/// True when `field` is the in-band header token of a format.
pub(crate) fn is_header(field: &str, token: &str) -> bool {
    field.eq_ignore_ascii_case(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_selects_matching_format() {
        let aliases = AliasTable::mitochondrial();
        for format in FileFormat::ALL {
            assert_eq!(AnyNormalizer::for_format(format, &aliases).format(), format);
        }
    }

    #[test]
    fn test_same_line_differs_by_format() {
        let aliases = AliasTable::mitochondrial();
        let a = normalize_line(FileFormat::TwentyThreeAndMe, "rs9\t2\t500\tct", 1, &aliases)
            .unwrap();
        let f = normalize_line(FileFormat::Iyg, "rs9\tct", 1, &aliases).unwrap();
        assert_eq!(a.record().unwrap().position(), "500");
        assert_eq!(f.record().unwrap().position(), "1");
    }

    #[test]
    fn test_split_fields_reports_shape() {
        let err = split_fields("a,b", ',', FileFormat::DecodeMe, 6, 12).unwrap_err();
        match err {
            IngestError::MalformedLine {
                line,
                format,
                expected,
                found,
            } => {
                assert_eq!((line, format, expected, found), (12, "decodeme", 6, 2));
            }
            other => panic!("Expected MalformedLine, got: {:?}", other),
        }
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let aliases = AliasTable::mitochondrial();
        let line = "mt-t3027c\tag";
        let first = normalize_line(FileFormat::Iyg, line, 1, &aliases).unwrap();
        let second = normalize_line(FileFormat::Iyg, line, 1, &aliases).unwrap();
        assert_eq!(first, second);
    }
}
