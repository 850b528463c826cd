pub mod run_once;
pub mod scrape;
pub mod trigger;
