use anyhow::Result;
use tracing::error;

use career_quiz_pipeline::clean_fields;
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

    let summary = clean_fields::clean_club_names(&store)?;
    if summary.fetched == 0 {
        println!("No entries to fix!");
        return Ok(());
    }
    for fix in &summary.examples {
        println!("  Fixed: '{}...' -> '{}'", preview(&fix.before, 50), fix.after);
    }

    println!();
    println!("=== Results ===");
    println!("Updated: {} entries", summary.updated);
    println!("Errors: {}", summary.errors);
    Ok(())
}

fn preview(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
