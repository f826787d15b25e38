//! Illustrative driver for the attribute store.
//!
//! Reads `eavclad.{toml,json,...}` from the working directory (plus
//! `EAVCLAD_*` overrides), opens the store, applies the optional bulk load
//! file and prints every entity. Log verbosity follows `RUST_LOG`.

use std::process::ExitCode;

use eavclad::construct::Database;
use eavclad::load::EntityRecord;
use eavclad::settings::Settings;
use eavclad::{EavError, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn run() -> Result<()> {
    let settings = Settings::load("eavclad")?;
    let mut db = Database::with_config(settings.store_config())?;
    if let Some(path) = &settings.bulk_load_file {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EavError::Config(format!("could not read '{}': {e}", path.display()))
        })?;
        let facts = db.load(EntityRecord::parse_json(&text)?)?;
        info!(facts, file = %path.display(), "bulk load complete");
    }
    if db.is_empty() {
        println!("(no entities)");
    }
    for entity in db.entities() {
        println!("{entity}");
    }
    db.close()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "eavclad failed");
            ExitCode::FAILURE
        }
    }
}
