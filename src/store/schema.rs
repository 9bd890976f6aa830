//! Relational schema and statements for genotype storage.
//!
//! Every statement binds its values as parameters.

/// Tables for genotype records, variants and per-subject calls.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS genotypes (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    filetype TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS snps (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    chromosome TEXT NOT NULL,
    position TEXT NOT NULL,
    ranking INTEGER NOT NULL DEFAULT 0,
    allele_frequency TEXT NOT NULL,
    genotype_frequency TEXT NOT NULL,
    user_snps_count INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_snps (
    id INTEGER PRIMARY KEY,
    local_genotype TEXT NOT NULL,
    genotype_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    snp_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(user_id, snp_name)
);

CREATE INDEX IF NOT EXISTS idx_user_snps_user_id ON user_snps(user_id);
CREATE INDEX IF NOT EXISTS idx_user_snps_genotype_id ON user_snps(genotype_id);
";

/// Connection settings applied on open.
pub const PRAGMAS: &str = "PRAGMA foreign_keys = ON;
     PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;";

/// Milliseconds a writer waits on a lock held by a concurrent run.
pub const BUSY_TIMEOUT_MS: u64 = 30_000;

pub(crate) const INSERT_GENOTYPE: &str =
    "INSERT INTO genotypes (user_id, filetype) VALUES (?1, ?2)";

pub(crate) const SELECT_GENOTYPE: &str =
    "SELECT user_id, filetype FROM genotypes WHERE id = ?1";

pub(crate) const UPDATE_GENOTYPE_FILETYPE: &str =
    "UPDATE genotypes SET filetype = ?1 WHERE id = ?2";

pub(crate) const SELECT_VARIANT_NAMES: &str = "SELECT name FROM snps";

pub(crate) const SELECT_SUBJECT_VARIANT_NAMES: &str =
    "SELECT snp_name FROM user_snps WHERE user_id = ?1";

/// Concurrent runs may race to create the same variant; the loser is a no-op.
pub(crate) const INSERT_VARIANT: &str = "INSERT INTO snps
    (name, chromosome, position, ranking, allele_frequency, genotype_frequency,
     user_snps_count, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
    ON CONFLICT(name) DO NOTHING";

pub(crate) const INSERT_SUBJECT_VARIANT: &str = "INSERT INTO user_snps
    (local_genotype, genotype_id, user_id, snp_name, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
    ON CONFLICT(user_id, snp_name) DO NOTHING";

pub(crate) const MAINTENANCE: &str = "ANALYZE snps; ANALYZE user_snps;";
