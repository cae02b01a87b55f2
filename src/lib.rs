pub mod core;
pub mod scraping;

// --- Primary core exports ---
pub use crate::core::config;
pub use crate::core::error::ScrapeError;
pub use crate::core::types;
pub use crate::core::types::*;

// --- Engine exports ---
pub use crate::scraping::browser;
pub use crate::scraping::place_scraper;
pub use crate::scraping::place_scraper::PlaceScraper;
