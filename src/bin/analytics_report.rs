use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use tracing::error;

use career_quiz_pipeline::analytics;
use career_quiz_pipeline::rest_store::RestStore;
use career_quiz_pipeline::{config, logging};

#[derive(Debug, Default)]
struct Flags {
    json: bool,
    save: bool,
    sql: bool,
}

fn main() -> Result<()> {
    config::load_env();
    logging::init();
    let flags = parse_flags();

    if flags.sql {
        println!("{}", analytics::SQL_VIEWS);
        return Ok(());
    }

    let store = match RestStore::from_env() {
        Ok(store) => store,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    };
    let report = analytics::generate(&store, config::page_size(), Utc::now())?;

    if flags.json {
        let raw = serde_json::to_string_pretty(&report).context("failed encoding report")?;
        println!("{raw}");
    } else {
        print!("{}", analytics::render(&report));
    }

    if flags.save {
        let path = PathBuf::from(analytics::report_filename(Local::now().naive_local()));
        analytics::save_report(&report, &path)?;
        println!("Report saved to: {}", path.display());
    }
    Ok(())
}

fn parse_flags() -> Flags {
    let mut flags = Flags::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => flags.json = true,
            "--save" => flags.save = true,
            "--sql" => flags.sql = true,
            other => eprintln!("ignoring unknown argument {other}"),
        }
    }
    flags
}
