pub mod browser;
pub mod place_scraper;
