//! # saverows - save container import / CSV export
//!
//! ```text
//! saverows import <path>   decode a save container into the row store
//! saverows export <path>   write every stored row to a CSV file
//! ```
//!
//! ## Configuration
//!
//! ```text
//! SAVEROWS_STORE   row store log path       (default: "save_units.rows")
//! SAVEROWS_SYNC    fsync every row append   (default: "false")
//! SAVEROWS_LOG     log filter directive     (default: "info")
//! ```
//!
//! Logs go to stderr; the completion line goes to stdout.
//!
//! ## Example
//!
//! ```text
//! $ saverows import SaveData1.dat
//! Import completed, 3 rows written
//! $ saverows export dump.csv
//! CSV export completed -> dump.csv
//! ```

mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::StoreConfig;
use rowstore::RowStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};

/// Imports save-container units into a row store and exports them as CSV.
#[derive(Parser, Debug)]
#[command(name = "saverows", version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a container file and upsert its units into the row store.
    Import {
        /// Container file to read.
        path: PathBuf,
    },
    /// Write every stored row to a CSV file, ascending by id.
    Export {
        /// Destination CSV file (created or truncated).
        path: PathBuf,
    },
}

fn run(command: Command, config: &StoreConfig) -> Result<()> {
    let mut store = RowStore::open(config)?;

    match command {
        Command::Import { path } => {
            let report = pipeline::import_container(&path, &mut store)?;
            if report.skipped_units() > 0 {
                warn!(
                    skipped_units = report.skipped_units(),
                    "some units could not be decoded"
                );
            }
            println!("Import completed, {} rows written", report.total_rows());
        }
        Command::Export { path } => {
            pipeline::export_csv(&store, &path)?;
            println!("CSV export completed -> {}", path.display());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init();

    let config = StoreConfig::from_env();
    match run(args.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(store = %config.path.display(), "{e:#}");
            ExitCode::FAILURE
        }
    }
}
