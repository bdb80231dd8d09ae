use anyhow::Result;
use tracing::error;

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

    let summary = nationality_codes::fix_niger_codes(&store)?;
    println!("Players found with NE (Niger) code: {}", summary.fetched);
    for name in &summary.names {
        println!("  - {name}");
    }
    println!();
    println!(
        "Done! Updated {} players from NE (Niger) to NG (Nigeria)",
        summary.updated
    );
    if summary.failed > 0 {
        println!("Failed: {}", summary.failed);
    }
    Ok(())
}
