//! The extraction engine: one session per URL, end to end.
//!
//! Session states: Navigating → Settling → Extracting → Reconciling →
//! Done. The in-page locator and the markup extractor each produce an
//! independent candidate set; the reconciler merges them into the
//! canonical record. Any unrecovered failure becomes a failure envelope;
//! callers never see a raw error.

mod locate;
mod markup;
mod navigate;
mod reconcile;

pub use locate::{global_state, GlobalStateKey};
pub use markup::{extract_from_markup, extract_rating};
pub use navigate::canonicalize_place_url;
pub use reconcile::{
    collect_warnings, merge, MAX_IMAGES, MAX_MENU_ITEMS, MAX_REVIEWS, WARN_MARKUP_EMPTY,
    WARN_NO_FIELDS, WARN_PROBE_ERROR,
};

use crate::core::config;
use crate::core::error::ScrapeError;
use crate::core::types::{CandidateSet, ExtractionEnvelope, ExtractionRecord};
use crate::scraping::browser;
use chromiumoxide::Browser;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

/// Multi-strategy place-page extraction engine.
///
/// Stateless between calls: every `scrape` launches its own browser and
/// tears it down on every exit path. Concurrent invocations each get their
/// own instance.
pub struct PlaceScraper;

struct SessionOutcome {
    record: ExtractionRecord,
    final_url: String,
    warnings: Vec<String>,
}

impl PlaceScraper {
    pub fn new() -> Self {
        Self
    }

    /// Run one full extraction session. Infallible at this boundary: every
    /// outcome is a well-formed envelope. Failure envelopes carry the
    /// original input URL, not a partially-resolved intermediate.
    pub async fn scrape(&self, url: &str) -> ExtractionEnvelope {
        match self.run_session(url).await {
            Ok(outcome) => {
                info!(
                    "✅ Extraction done: {} ({} fields, {} menu, {} reviews, {} images)",
                    outcome.final_url,
                    outcome.record.basic_info.len(),
                    outcome.record.menu_items.len(),
                    outcome.record.reviews.len(),
                    outcome.record.images.len()
                );
                ExtractionEnvelope::success(outcome.record, outcome.final_url, outcome.warnings)
            }
            Err(e) => {
                error!("❌ Extraction session failed: {}", e);
                ExtractionEnvelope::failure(e, url.to_string())
            }
        }
    }

    async fn run_session(&self, url: &str) -> Result<SessionOutcome, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScrapeError::InvalidUrl {
                url: url.to_string(),
                reason: "URL must use HTTP or HTTPS".to_string(),
            });
        }

        let exe = browser::find_chrome_executable().ok_or_else(|| {
            ScrapeError::Session(
                "no Chromium-family browser found; set CHROME_EXECUTABLE".to_string(),
            )
        })?;
        let cfg = browser::build_session_config(&exe)
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        info!("🚀 Launching session browser ({})", exe);
        let (mut session_browser, mut handler) = Browser::launch(cfg)
            .await
            .map_err(|e| ScrapeError::Session(format!("launch ({}): {}", exe, e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {}", e);
                }
            }
        });

        // Session states run inside this block so browser close and handler
        // abort happen on every exit path.
        let result = self.run_states(&session_browser, url).await;

        session_browser.close().await.ok();
        handler_task.abort();

        result
    }

    async fn run_states(&self, browser: &Browser, url: &str) -> Result<SessionOutcome, ScrapeError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Session(format!("new page: {}", e)))?;

        // Navigating
        let final_url = self.navigate_to_place(&page, url).await?;

        // Settling: late client-side rendering routinely lands after
        // networkidle on these pages.
        let settle = config::settle_delay_ms();
        debug!("⏳ Settling for {}ms", settle);
        tokio::time::sleep(Duration::from_millis(settle)).await;

        // Extracting: the in-page probe failing is recoverable; the markup
        // extractor still runs on the captured HTML.
        let eval = match self.locate(&page).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_recoverable() => {
                warn!("⚠️ Locator unavailable, continuing markup-only: {}", e);
                CandidateSet {
                    error: Some(e.to_string()),
                    ..CandidateSet::default()
                }
            }
            Err(e) => return Err(e),
        };

        let html = page
            .content()
            .await
            .map_err(|e| ScrapeError::Session(format!("content capture: {}", e)))?;
        let markup = extract_from_markup(&html);

        // Reconciling
        let record = merge(eval.clone(), markup.clone());
        let warnings = collect_warnings(&eval, &markup, &record);
        if !warnings.is_empty() {
            warn!("⚠️ Extraction warnings: {:?}", warnings);
        }

        Ok(SessionOutcome {
            record,
            final_url,
            warnings,
        })
    }
}

impl Default for PlaceScraper {
    fn default() -> Self {
        Self::new()
    }
}
