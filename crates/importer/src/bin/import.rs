use clap::{Parser, Subcommand};
use importer::{CsvRosterImporter, ImportContext, ImportReport, RosterImporter};
use std::path::{Path, PathBuf};
use storage::Database;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roster-import")]
#[command(about = "Tournament roster importer", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://tournament.db?mode=rwc")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a roster exported from the registration spreadsheet as CSV
    Csv {
        file: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    /// Import every CSV file in a directory
    BulkImport {
        #[arg(long, default_value = "./imports")]
        directory: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("roster_import={},importer={},storage={}", log_level, log_level, log_level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Csv {
            file,
            validate_only,
        } => {
            let db = connect(validate_only, &cli.database_url).await?;
            let report = process_file(&file, db.as_ref()).await?;
            print_report(&report);
        }
        Commands::BulkImport {
            directory,
            validate_only,
        } => {
            handle_bulk_import(directory, validate_only, &cli.database_url).await?;
        }
    }

    Ok(())
}

async fn connect(
    validate_only: bool,
    database_url: &str,
) -> Result<Option<Database>, Box<dyn std::error::Error>> {
    if validate_only {
        return Ok(None);
    }

    tracing::info!("Connecting to database...");
    let db = Database::new(database_url).await?;
    db.run_migrations().await?;
    Ok(Some(db))
}

async fn process_file(
    file: &Path,
    db: Option<&Database>,
) -> Result<ImportReport, Box<dyn std::error::Error>> {
    tracing::info!("Loading roster from: {}", file.display());
    let data = tokio::fs::read(file).await?;
    let importer = CsvRosterImporter::new();

    let report = match db {
        Some(db) => {
            let context = ImportContext::new(db.pool().clone());
            importer.import(&data, &context).await?
        }
        None => {
            let report = importer.dry_run(&data)?;
            for warning in &report.warnings {
                tracing::warn!("  {}", warning);
            }
            report
        }
    };

    Ok(report)
}

async fn handle_bulk_import(
    directory: PathBuf,
    validate_only: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Scanning directory for roster CSV files: {}", directory.display());

    let mut csv_files = Vec::new();
    let mut entries = tokio::fs::read_dir(&directory).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "csv") {
            csv_files.push(path);
        }
    }

    if csv_files.is_empty() {
        tracing::warn!("No CSV files found in {}", directory.display());
        return Ok(());
    }

    csv_files.sort();
    tracing::info!("Found {} roster file(s)", csv_files.len());

    let db = connect(validate_only, database_url).await?;

    let mut success_count = 0;
    let mut error_count = 0;

    for (idx, file_path) in csv_files.iter().enumerate() {
        tracing::info!("[{}/{}] Processing: {}", idx + 1, csv_files.len(), file_path.display());

        match process_file(file_path, db.as_ref()).await {
            Ok(report) => {
                success_count += 1;
                print_report(&report);
            }
            Err(e) => {
                error_count += 1;
                tracing::error!("  ✗ Error: {}", e);
            }
        }
    }

    tracing::info!("Summary: {} succeeded, {} failed", success_count, error_count);

    if error_count > 0 {
        return Err(format!("{} file(s) failed to import", error_count).into());
    }

    Ok(())
}

fn print_report(report: &ImportReport) {
    tracing::info!(
        "✓ {} imported, {} skipped, {} warning(s)",
        report.imported,
        report.skipped,
        report.warnings.len()
    );
}
