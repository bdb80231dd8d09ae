use anyhow::Result;
use tracing::{error, info};

use career_quiz_pipeline::nationality_codes;
use career_quiz_pipeline::rest_store::RestStore;
use career_quiz_pipeline::{config, logging};

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

    info!("=== Fixing Missing Nationality Codes ===");
    let summary = nationality_codes::fix_missing_codes(&store)?;
    if summary.fetched == 0 {
        info!("No players to fix!");
        return Ok(());
    }

    println!("Nationality breakdown:");
    for row in &summary.breakdown {
        println!(
            "  {}: {} players -> {}",
            row.nationality,
            row.players,
            row.code.unwrap_or("?")
        );
    }
    println!();
    println!("=== Done ===");
    println!(
        "Updated: {}, Skipped: {}, Failed: {}",
        summary.updated, summary.skipped, summary.failed
    );
    Ok(())
}
