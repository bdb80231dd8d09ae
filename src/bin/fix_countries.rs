use anyhow::Result;
use tracing::error;

use career_quiz_pipeline::club_country::ClubCountryResolver;
use career_quiz_pipeline::fix_countries::{self, FixCountriesOptions};
use career_quiz_pipeline::rest_store::RestStore;
use career_quiz_pipeline::{config, logging};

const UNMATCHED_SHOWN: usize = 30;

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

    let resolver = ClubCountryResolver::builtin();
    let summary = fix_countries::run(&store, &resolver, FixCountriesOptions::from_env())?;
    if summary.fetched == 0 {
        println!("No entries to fix!");
        return Ok(());
    }

    println!();
    println!("=== Results ===");
    println!("Fetched: {} entries", summary.fetched);
    for group in &summary.groups {
        println!("  {} {}: {} entries", group.code, group.flag, group.entries);
    }
    println!("Updated: {} entries", summary.updated);
    if summary.failed > 0 {
        println!("Failed: {} entries", summary.failed);
    }
    println!("Unmatched clubs: {}", summary.unmatched.len());
    if !summary.unmatched.is_empty() {
        println!();
        println!("Sample unmatched clubs (add these to data/club_countries.tsv):");
        for club in summary.unmatched.iter().take(UNMATCHED_SHOWN) {
            println!("  - {club}");
        }
    }
    Ok(())
}
