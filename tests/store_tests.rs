//! Store-backed ingestion tests: transactions, idempotence, shared databases.

use genoload::ingest::alias::AliasTable;
use genoload::{IngestError, Store};
use sha2::{Digest, Sha256};
use std::fs;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    const GENOME: &str = "# This data file generated by 23andMe at: Thu Jan 01 2015\n\
                          rs4477212\t1\t82154\tAA\n\
                          rs3094315\t1\t752566\tAG\n\
                          rs3131972\t1\t752721\tAG\n";

    fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("Failed to write genotype file");
        path
    }

    #[test]
    fn test_ingesting_twice_is_idempotent() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(&dir, "genome.txt", GENOME);
        let mut store = Store::open(&dir.path().join("db/genoload.sqlite")).unwrap();
        let aliases = AliasTable::mitochondrial();
        let genotype = store.register_genotype(1, "23andme").unwrap();

        let first = store.ingest_file(&input, genotype, &aliases).unwrap();
        let second = store.ingest_file(&input, genotype, &aliases).unwrap();

        assert_eq!(first.variants_created, 3);
        assert_eq!(first.subject_variants_created, 3);
        assert_eq!(second.variants_created, 0);
        assert_eq!(second.subject_variants_created, 0);
        assert_eq!(second.duplicates_skipped, 3);
        assert_eq!(first.file_sha256, second.file_sha256);
        assert_ne!(first.run_id, second.run_id);
        assert_eq!(store.variant_count().unwrap(), 3);
        assert_eq!(store.subject_variant_count(1).unwrap(), 3);
    }

    #[test]
    fn test_second_subject_reuses_variants() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(&dir, "genome.txt", GENOME);
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let aliases = AliasTable::mitochondrial();
        let first = store.register_genotype(1, "23andme").unwrap();
        let second = store.register_genotype(2, "23andme").unwrap();

        store.ingest_file(&input, first, &aliases).unwrap();
        let summary = store.ingest_file(&input, second, &aliases).unwrap();

        assert_eq!(summary.variants_created, 0);
        assert_eq!(summary.subject_variants_created, 3);
        assert_eq!(store.variant_count().unwrap(), 3);
        assert_eq!(store.subject_variant_count(2).unwrap(), 3);
    }

    #[test]
    fn test_separate_handles_share_one_database() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = dir.path().join("shared.sqlite");
        let input = write_input(&dir, "genome.txt", GENOME);
        let aliases = AliasTable::mitochondrial();

        let mut worker_a = Store::open(&db).unwrap();
        let mut worker_b = Store::open(&db).unwrap();
        let genotype_a = worker_a.register_genotype(1, "23andme").unwrap();
        let genotype_b = worker_b.register_genotype(2, "23andme").unwrap();

        worker_a.ingest_file(&input, genotype_a, &aliases).unwrap();
        let summary = worker_b.ingest_file(&input, genotype_b, &aliases).unwrap();

        assert_eq!(summary.variants_created, 0);
        assert_eq!(worker_b.variant_count().unwrap(), 3);
    }

    #[test]
    fn test_unknown_format_applies_nothing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(&dir, "genome.txt", "rs1\t1\t10\tAA\n");
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "mystery-chip").unwrap();

        let err = store
            .ingest_file(&input, genotype, &AliasTable::mitochondrial())
            .unwrap_err();

        assert!(matches!(err, IngestError::UnknownFormat { .. }));
        assert_eq!(store.variant_count().unwrap(), 0);
        assert_eq!(store.genotype_filetype(genotype).unwrap(), "mystery-chip");
    }

    #[test]
    fn test_abort_midway_keeps_store_untouched() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(
            &dir,
            "broken.txt",
            "#AncestryDNA raw data download\nrs1\t1\t.\t10\tA\tG\nrs2\t1\t20\n",
        );
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "23andme").unwrap();

        let err = store
            .ingest_file(&input, genotype, &AliasTable::mitochondrial())
            .unwrap_err();

        assert!(matches!(err, IngestError::MalformedLine { line: 3, .. }));
        assert_eq!(store.variant_count().unwrap(), 0);
        assert_eq!(store.subject_variant_count(1).unwrap(), 0);
        assert_eq!(store.genotype_filetype(genotype).unwrap(), "23andme");
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(&dir, "empty.txt", "");
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "23andme").unwrap();

        let err = store
            .ingest_file(&input, genotype, &AliasTable::mitochondrial())
            .unwrap_err();

        assert!(matches!(err, IngestError::EmptyInput));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "23andme").unwrap();
        let missing = dir.path().join("nope.txt");

        let err = store
            .ingest_file(&missing, genotype, &AliasTable::mitochondrial())
            .unwrap_err();

        assert_eq!(err.file_path(), Some(missing.as_path()));
    }

    #[test]
    fn test_plan_file_writes_nothing() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(&dir, "genome.txt", GENOME);
        let store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "ancestry").unwrap();

        let (events, summary) = store
            .plan_file(&input, genotype, &AliasTable::mitochondrial())
            .unwrap();

        assert!(summary.format_corrected);
        assert_eq!(events.len(), 7);
        assert_eq!(store.variant_count().unwrap(), 0);
        assert_eq!(store.genotype_filetype(genotype).unwrap(), "ancestry");
    }

    #[test]
    fn test_invalid_utf8_line_is_loaded() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("genome.txt");
        let content: &[u8] = b"# This data file generated by 23andMe\n\
                               rs1\t1\t10\tAA\n\
                               rs2\t1\t20\tA\xffA\n";
        fs::write(&path, content).unwrap();
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "23andme").unwrap();

        let summary = store
            .ingest_file(&path, genotype, &AliasTable::mitochondrial())
            .unwrap();

        assert_eq!(summary.subject_variants_created, 2);
        assert_eq!(store.subject_allele(1, "rs1").unwrap().as_deref(), Some("AA"));
        assert_eq!(
            summary.file_sha256,
            Some(format!("{:x}", Sha256::digest(content)))
        );
    }

    #[test]
    fn test_byte_order_mark_file_is_loaded() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let input = write_input(
            &dir,
            "ancestry.txt",
            "\u{feff}#AncestryDNA raw data download\n\
             rsid\tchromosome\tposition\tallele1\tallele2\n\
             rs1\t1\t.\t10\tA\tG\n",
        );
        let mut store = Store::open(&dir.path().join("genoload.sqlite")).unwrap();
        let genotype = store.register_genotype(1, "ancestry").unwrap();

        let summary = store
            .ingest_file(&input, genotype, &AliasTable::mitochondrial())
            .unwrap();

        assert!(!summary.format_corrected);
        assert_eq!(store.subject_allele(1, "rs1").unwrap().as_deref(), Some("AG"));
    }
}
