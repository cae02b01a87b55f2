//! URL normalization and navigation for the extraction session.
//!
//! Three URL shapes reach the engine: shortlinks (`naver.me`), mobile or
//! generic map URLs (`m.place.naver.com`, `map.naver.com`), and the
//! canonical desktop detail page (`pcmap.place.naver.com`). Shortlinks are
//! resolved in-browser; mobile/map forms are rewritten to the desktop form
//! by place id before navigation.

use super::PlaceScraper;
use crate::core::config;
use crate::core::error::ScrapeError;
use crate::scraping::browser;
use chromiumoxide::Page;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

const SHORTLINK_HOST: &str = "naver.me";
const MOBILE_HOST: &str = "m.place.naver.com";
const MAP_HOST: &str = "map.naver.com";

fn place_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Place ids are numeric, 8+ digits; shorter digit runs in the URL
    // (ports, zoom levels) must not match.
    RE.get_or_init(|| Regex::new(r"\d{8,}").expect("valid place-id pattern"))
}

/// Rewrite a mobile or generic map URL to the canonical desktop detail
/// page. URLs without a recognizable place id pass through unchanged.
pub fn canonicalize_place_url(url: &str) -> String {
    if url.contains(MOBILE_HOST) || url.contains(MAP_HOST) {
        if let Some(id) = place_id_pattern().find(url) {
            return format!(
                "https://pcmap.place.naver.com/restaurant/{}/home",
                id.as_str()
            );
        }
    }
    url.to_string()
}

pub fn is_shortlink(url: &str) -> bool {
    url.contains(SHORTLINK_HOST)
}

impl PlaceScraper {
    /// Resolve, rewrite, and navigate. Returns the final post-redirect URL.
    pub(super) async fn navigate_to_place(
        &self,
        page: &Page,
        url: &str,
    ) -> Result<String, ScrapeError> {
        let mut url = url.to_string();

        if is_shortlink(&url) {
            info!("🔗 Resolving shortlink: {}", url);
            page.goto(url.as_str())
                .await
                .map_err(|e| ScrapeError::Navigation(format!("shortlink '{}': {}", url, e)))?;
            // The redirect target renders client-side; give it a moment
            // before trusting page.url().
            tokio::time::sleep(Duration::from_millis(config::shortlink_wait_ms())).await;
            if let Ok(Some(resolved)) = page.url().await {
                url = resolved;
            }
        }

        let target = canonicalize_place_url(&url);
        if target != url {
            info!("🔁 Rewrote to desktop detail page: {}", target);
        }

        info!("🌐 Navigating to: {}", target);
        page.goto(target.as_str())
            .await
            .map_err(|e| ScrapeError::Navigation(format!("goto '{}': {}", target, e)))?;

        browser::wait_until_stable(
            page,
            config::network_quiet_ms(),
            config::network_quiet_timeout_ms(),
        )
        .await
        .ok();

        let final_url = page.url().await.ok().flatten().unwrap_or(target);
        Ok(final_url)
    }
}
