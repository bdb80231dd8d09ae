use anyhow::Result;
use tracing::{error, info};

use career_quiz_pipeline::distribution;
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

    let report = distribution::analyze(&store, config::page_size())?;
    info!(
        "Found {} players and {} career entries",
        report.total_players, report.total_entries
    );
    println!();
    print!("{}", distribution::render(&report));
    Ok(())
}
