//! Genoload CLI binary
//!
//! This is the main entry point for the genoload command-line interface.
//! The CLI is a thin adapter over existing APIs - NO logic is implemented here.

use genoload::cli::{CliErrorPayload, CliSuccessPayload, Commands};
use genoload::ingest::alias::AliasTable;
use genoload::store::Store;
use genoload::IngestError;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = genoload::cli::parse_args();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    // Execute command
    let result = match cli.command {
        Commands::Ingest {
            database,
            genotype_id,
            file,
            dry_run,
            skip_maintenance,
        } => execute_ingest(&database, genotype_id, &file, dry_run, skip_maintenance),
        Commands::Sniff { file } => execute_sniff(&file),
        Commands::Register {
            database,
            user_id,
            filetype,
        } => execute_register(&database, user_id, &filetype),
    };

    // Handle result
    match result {
        Ok(payload) => {
            if cli.json {
                match serde_json::to_string(&payload) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        return ExitCode::from(1);
                    }
                }
            } else {
                println!("{}", payload.message);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            if cli.json {
                let payload = CliErrorPayload::from_error(&e);
                match serde_json::to_string(&payload) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("Error: {}", e),
                }
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::from(1)
        }
    }
}

/// Install env_logger, optionally writing to a file.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), IngestError> {
    let default_level = match (verbose, log_file) {
        (true, _) => "debug",
        (false, Some(_)) => "info",
        (false, None) => "warn",
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| IngestError::Other(format!("Failed to initialize logging: {}", e)))
}

/// Execute the ingest command.
///
/// This function is a thin adapter that:
/// 1. Opens the store
/// 2. Runs the pipeline in one transaction (or as a dry run)
/// 3. Refreshes statistics unless told not to
fn execute_ingest(
    database: &Path,
    genotype_id: i64,
    file: &Path,
    dry_run: bool,
    skip_maintenance: bool,
) -> Result<CliSuccessPayload, IngestError> {
    let mut store = Store::open(database)?;
    let aliases = AliasTable::mitochondrial();

    if dry_run {
        let (events, summary) = store.plan_file(file, genotype_id, &aliases)?;
        for event in events.iter().filter(|e| e.is_persistent()) {
            println!("{}", serde_json::to_string(event)?);
        }
        return Ok(CliSuccessPayload::with_data(
            format!(
                "Dry run of genotype {}: {} variants and {} subject variants would be created",
                genotype_id, summary.variants_created, summary.subject_variants_created
            ),
            serde_json::to_value(&summary)?,
        ));
    }

    let summary = store.ingest_file(file, genotype_id, &aliases)?;

    if !skip_maintenance {
        // Statistics refresh never fails a committed load.
        if let Err(e) = store.maintain() {
            log::warn!("Maintenance after genotype {} failed: {}", genotype_id, e);
        }
    }

    Ok(CliSuccessPayload::with_data(
        format!(
            "Loaded genotype {} as {}: {} new variants, {} new subject variants, {} duplicates",
            genotype_id,
            summary.format,
            summary.variants_created,
            summary.subject_variants_created,
            summary.duplicates_skipped
        ),
        serde_json::to_value(&summary)?,
    ))
}

/// Execute the sniff command.
fn execute_sniff(file: &Path) -> Result<CliSuccessPayload, IngestError> {
    let detected = genoload::ingest::detect::sniff_file(file)?;
    let tag = detected.map_or("unknown", |format| format.as_str());
    Ok(CliSuccessPayload::with_data(
        tag.to_string(),
        serde_json::json!({ "format": tag }),
    ))
}

/// Execute the register command.
fn execute_register(
    database: &Path,
    user_id: i64,
    filetype: &str,
) -> Result<CliSuccessPayload, IngestError> {
    let store = Store::open(database)?;
    let genotype_id = store.register_genotype(user_id, filetype)?;
    Ok(CliSuccessPayload::with_data(
        genotype_id.to_string(),
        serde_json::json!({ "genotype_id": genotype_id, "user_id": user_id }),
    ))
}
