use anyhow::Result;
use tracing::error;

use career_quiz_pipeline::club_country::ClubCountryResolver;
use career_quiz_pipeline::rest_store::RestStore;
use career_quiz_pipeline::scrape::{self, DEFAULT_PREVIEW_TITLE, ScrapeOptions};
use career_quiz_pipeline::store::RecordStore;
use career_quiz_pipeline::wiki::WikiClient;
use career_quiz_pipeline::{config, logging};

const SCRAPE_DELAY_MS: u64 = 500;

// `test [Title]` previews one page, `dry` scrapes 30 per league into JSON.
fn main() -> Result<()> {
    config::load_env();
    logging::init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let source = WikiClient::new();
    let resolver = ClubCountryResolver::builtin();

    if args.first().map(String::as_str) == Some("test") {
        let title = args.get(1).map(String::as_str).unwrap_or(DEFAULT_PREVIEW_TITLE);
        let Some(career) = scrape::preview(&source, &resolver, title)? else {
            error!("No wikitext for {title}");
            std::process::exit(1);
        };
        println!();
        println!("{} - {} clubs", title.replace('_', " "), career.len());
        for entry in &career {
            println!("{}", scrape::preview_line(entry));
        }
        return Ok(());
    }

    let dry = args.first().map(String::as_str) == Some("dry");
    let mut opts = if dry {
        ScrapeOptions::dry()
    } else {
        ScrapeOptions::default()
    };
    opts.delay = config::request_delay(SCRAPE_DELAY_MS);

    let store = if dry {
        None
    } else {
        match RestStore::from_env() {
            Ok(store) => Some(store),
            Err(err) => {
                error!("{err:#}; saving to JSON instead");
                None
            }
        }
    };

    let summary = scrape::run(
        &source,
        store.as_ref().map(|s| s as &dyn RecordStore),
        &resolver,
        &opts,
    )?;
    println!("Scrape complete");
    println!("Listed: {}", summary.listed);
    println!("Enriched: {}", summary.enriched);
    println!("Without wikitext: {}", summary.missing_wikitext);
    println!("Career length out of range: {}", summary.rejected_length);
    match summary.saved_to {
        Some(path) => println!("Saved to: {}", path.display()),
        None => println!("Uploaded: {}", summary.uploaded),
    }
    Ok(())
}
