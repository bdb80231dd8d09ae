use anyhow::Result;
use tracing::{error, info};

use career_quiz_pipeline::flags::FlagTable;
use career_quiz_pipeline::rest_store::RestStore;
use career_quiz_pipeline::update_nationalities::{self, UpdateOptions};
use career_quiz_pipeline::wiki::WikiClient;
use career_quiz_pipeline::{config, logging};

const NATIONALITY_DELAY_MS: u64 = 300;

// `test` writes the first 5 players, `dry` looks up 20 without writing.
fn main() -> Result<()> {
    config::load_env();
    logging::init();
    let store = match RestStore::from_env() {
        Ok(store) => store,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    };

    let mut opts = UpdateOptions {
        delay: config::request_delay(NATIONALITY_DELAY_MS),
        ..UpdateOptions::default()
    };
    match std::env::args().nth(1).as_deref() {
        Some("test") => opts.limit = Some(5),
        Some("dry") => {
            opts.dry_run = true;
            opts.limit = Some(20);
        }
        _ => {}
    }

    info!("=== Updating Player Nationalities ===");
    let summary =
        update_nationalities::run(&store, &WikiClient::new(), FlagTable::builtin_ref(), &opts)?;

    let after = summary.after;
    println!("=== Done ===");
    println!("Candidates: {}", summary.candidates);
    if opts.dry_run {
        println!("Would update: {}", summary.would_update);
    }
    println!("Updated: {}, Failed: {}", summary.updated, summary.failed);
    println!(
        "Final coverage: {}/{} ({:.1}%)",
        after.with_nationality,
        after.total,
        after.percent()
    );
    if after.reached_target() {
        println!("Target reached! Coverage is at 80% or above.");
    } else {
        println!(
            "Still need {} more players to reach 80%",
            after.missing_to_target()
        );
    }
    Ok(())
}
