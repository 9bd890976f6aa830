//! Genotype file format detection from the opening line.
//!
//! Table-driven detection. Rules are checked in order and the first
//! matching prefix wins. Unmatched input returns None so the caller can
//! fall back to the declared format.

use crate::error::{IngestError, Result};
use crate::ingest::decode_line;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Genotype file formats supported by genoload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// 23andMe raw data (tab separated, already canonical).
    TwentyThreeAndMe,
    /// AncestryDNA raw data (tab separated, split alleles).
    Ancestry,
    /// deCODEme export (comma separated).
    DecodeMe,
    /// FamilyTreeDNA Illumina export (quoted, comma separated).
    FtdnaIllumina,
    /// 23andMe exome VCF.
    ExomeVcf,
    /// Legacy IYG format with the position embedded in the name.
    Iyg,
}

impl FileFormat {
    /// All formats, in declaration order.
    pub const ALL: [FileFormat; 6] = [
        FileFormat::TwentyThreeAndMe,
        FileFormat::Ancestry,
        FileFormat::DecodeMe,
        FileFormat::FtdnaIllumina,
        FileFormat::ExomeVcf,
        FileFormat::Iyg,
    ];

    /// Convert format to the tag stored on the genotype record.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::TwentyThreeAndMe => "23andme",
            FileFormat::Ancestry => "ancestry",
            FileFormat::DecodeMe => "decodeme",
            FileFormat::FtdnaIllumina => "ftdna-illumina",
            FileFormat::ExomeVcf => "23andme-exome-vcf",
            FileFormat::Iyg => "IYG",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = IngestError;

    fn from_str(tag: &str) -> std::result::Result<Self, Self::Err> {
        FileFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == tag)
            .ok_or_else(|| IngestError::UnknownFormat {
                format: tag.to_string(),
            })
    }
}

/// A single sniffing rule: an opening prefix mapped to a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffRule {
    /// Case-sensitive prefix of the first line.
    pub prefix: &'static str,
    /// Format implied by the prefix.
    pub format: FileFormat,
}

/// Built-in rules, highest priority first.
pub const DEFAULT_RULES: &[SniffRule] = &[
    SniffRule {
        prefix: "# This data file generated by 23andMe",
        format: FileFormat::TwentyThreeAndMe,
    },
    SniffRule {
        prefix: "Name,Variation,Chromosome",
        format: FileFormat::DecodeMe,
    },
    SniffRule {
        prefix: "##fileformat=VCFv4",
        format: FileFormat::ExomeVcf,
    },
    SniffRule {
        prefix: "#AncestryDNA raw",
        format: FileFormat::Ancestry,
    },
    SniffRule {
        prefix: "RSID,CHROMOSOME,",
        format: FileFormat::FtdnaIllumina,
    },
    SniffRule {
        prefix: "\"RSID\",\"CHROMOSOME\",",
        format: FileFormat::FtdnaIllumina,
    },
    SniffRule {
        prefix: "rs2131925",
        format: FileFormat::Iyg,
    },
];

/// Ordered prefix matcher over the first line of a file.
#[derive(Debug, Clone, Copy)]
pub struct FormatSniffer {
    rules: &'static [SniffRule],
}

impl Default for FormatSniffer {
    fn default() -> Self {
        Self::new(DEFAULT_RULES)
    }
}

impl FormatSniffer {
    /// Create a sniffer over an ordered rule list.
    pub fn new(rules: &'static [SniffRule]) -> Self {
        Self { rules }
    }

    /// Detect the format of a file from its first line.
    ///
    /// # Examples
    ///
    /// ```
    /// # use genoload::ingest::detect::{FileFormat, FormatSniffer};
    /// let sniffer = FormatSniffer::default();
    /// assert_eq!(sniffer.sniff("#AncestryDNA raw data download"), Some(FileFormat::Ancestry));
    /// assert_eq!(sniffer.sniff("rs1\t1\t100\tAA"), None);
    /// ```
    pub fn sniff(&self, first_line: &str) -> Option<FileFormat> {
        self.rules
            .iter()
            .find(|rule| first_line.starts_with(rule.prefix))
            .map(|rule| rule.format)
    }
}

/// Detect the format with the built-in rules.
pub fn sniff_format(first_line: &str) -> Option<FileFormat> {
    FormatSniffer::default().sniff(first_line)
}

/// Detect the format of a file on disk from its first non-blank line.
///
/// Returns `IngestError::EmptyInput` when the file has no such line.
pub fn sniff_file(path: &Path) -> Result<Option<FileFormat>> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut raw = Vec::new();
    let mut line_number = 0;
    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).map_err(io_err)? == 0 {
            return Err(IngestError::EmptyInput);
        }
        line_number += 1;
        let line = decode_line(&raw, line_number);
        if !line.trim().is_empty() {
            return Ok(sniff_format(&line));
        }
    }
}
