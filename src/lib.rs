pub mod analytics;
pub mod career;
pub mod clean_fields;
pub mod cleanup;
pub mod club_country;
pub mod config;
pub mod distribution;
pub mod fix_countries;
pub mod flags;
pub mod http_client;
pub mod logging;
pub mod memory_store;
pub mod nationality;
pub mod nationality_codes;
pub mod rest_store;
pub mod scrape;
pub mod store;
pub mod update_nationalities;
pub mod wiki;
pub mod wikitext;
