//! tracedoc CLI: upsert and inspect tracing documents.
//!
//! ```text
//! tracedoc [--config FILE] [--data-dir DIR | --ephemeral] [-v] upsert '{"master_key": …}'
//! tracedoc get <MASTER_KEY>
//! tracedoc list
//! ```
//!
//! Results go to stdout as JSON, logs and errors to stderr. Exit code is 0
//! on success and 1 on any error.

mod commands;
mod format;
mod logging;
mod parse;

use std::path::PathBuf;
use std::process;

use clap::ArgMatches;
use tracedoc::{Config, TraceDb};

use commands::build_cli;
use format::{format_record, format_records};
use parse::{matches_to_action, CliAction};

/// Data directory used when neither flags nor the config name one
const DEFAULT_DATA_DIR: &str = ".tracedoc";

fn main() {
    let matches = build_cli().get_matches();

    let config = match resolve_config(&matches) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    logging::init(matches.get_count("verbose"), &config.log_filter);

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => fail(&e),
    };

    let db = match TraceDb::from_config(&config) {
        Ok(db) => db,
        Err(e) => fail(&e.to_string()),
    };

    match execute(&db, action) {
        Ok(out) => println!("{}", out),
        Err(e) => fail(&e),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {}", message);
    process::exit(1)
}

/// Load the config file, if any, and apply command-line overrides.
fn resolve_config(matches: &ArgMatches) -> Result<Config, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(path).map_err(|e| format!("{}: {}", path, e))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, matches);
    Ok(config)
}

fn apply_overrides(config: &mut Config, matches: &ArgMatches) {
    if matches.get_flag("ephemeral") {
        config.data_dir = None;
    } else if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.data_dir = Some(PathBuf::from(dir));
    } else if config.data_dir.is_none() {
        config.data_dir = Some(PathBuf::from(DEFAULT_DATA_DIR));
    }

    if let Some(name) = matches.get_one::<String>("collection") {
        config.collection = name.clone();
    }
}

/// Run one action against an open database.
fn execute(db: &TraceDb, action: CliAction) -> Result<String, String> {
    match action {
        CliAction::Upsert(doc) => db
            .upsert(&doc)
            .map(|record| format_record(&record))
            .map_err(|e| e.to_string()),
        CliAction::Get(key) => match db.get(key).map_err(|e| e.to_string())? {
            Some((record, _)) => Ok(format_record(&record)),
            None => Err(format!("no document with master key {}", key)),
        },
        CliAction::List => db
            .list()
            .map(|records| format_records(&records))
            .map_err(|e| e.to_string()),
    }
}
