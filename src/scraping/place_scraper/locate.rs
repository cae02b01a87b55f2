//! Field Locator: runs a read-only probe script inside the rendered page.
//!
//! Five additive strategies, each filling gaps the earlier ones left:
//! runtime global-state capture, meta tags, JSON-LD structured data,
//! generic attribute-substring selectors, and a CDN image sweep. The whole
//! probe is one `page.evaluate` round-trip returning a `CandidateSet`.

use super::PlaceScraper;
use crate::core::error::ScrapeError;
use crate::core::types::CandidateSet;
use chromiumoxide::Page;
use tracing::{info, warn};

/// Well-known runtime globals that may hold the page's hydration state.
///
/// Capability-checked lookup: presence is never assumed. Each key either
/// yields a blob in `CandidateSet::raw` or nothing. Captured verbatim as a
/// side channel; never parsed further by the locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalStateKey {
    PlaceState,
    ApolloState,
    PlaceStateLegacy,
    NextData,
}

impl GlobalStateKey {
    pub const ALL: [GlobalStateKey; 4] = [
        GlobalStateKey::PlaceState,
        GlobalStateKey::ApolloState,
        GlobalStateKey::PlaceStateLegacy,
        GlobalStateKey::NextData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalStateKey::PlaceState => "__PLACE_STATE__",
            GlobalStateKey::ApolloState => "__APOLLO_STATE__",
            GlobalStateKey::PlaceStateLegacy => "PLACE_STATE",
            GlobalStateKey::NextData => "__NEXT_DATA__",
        }
    }
}

/// Typed access to a captured global-state blob.
pub fn global_state<'a>(
    candidates: &'a CandidateSet,
    key: GlobalStateKey,
) -> Option<&'a serde_json::Value> {
    candidates.raw.get(key.as_str())
}

/// Host substring identifying the image CDN; icon assets are excluded.
const IMAGE_CDN_MARKER: &str = "pstatic";
const IMAGE_ICON_MARKER: &str = "icon";

impl PlaceScraper {
    /// Evaluate the probe script and deserialize its result.
    ///
    /// A JS-side exception mid-probe is recorded in `CandidateSet::error`
    /// and leaves earlier probes' results intact. Only a failed evaluate
    /// round-trip itself surfaces as `ScrapeError::Extraction`.
    pub(super) async fn locate(&self, page: &Page) -> Result<CandidateSet, ScrapeError> {
        let candidates: CandidateSet = page
            .evaluate(probe_script())
            .await
            .map_err(|e| ScrapeError::Extraction(e.to_string()))?
            .into_value()
            .map_err(|e| ScrapeError::Extraction(format!("probe result: {}", e)))?;

        if let Some(err) = &candidates.error {
            warn!("⚠️ In-page probe aborted mid-run: {}", err);
        }
        info!(
            "🔎 Locator: {} basic fields, {} images, {} raw blobs",
            candidates.basic_info.len(),
            candidates.images.len(),
            candidates.raw.len()
        );
        Ok(candidates)
    }
}

/// Build the in-page probe. The global-state key list is generated from
/// `GlobalStateKey::ALL` so the Rust enum and the JS probe cannot drift.
pub(crate) fn probe_script() -> String {
    let keys = GlobalStateKey::ALL
        .iter()
        .map(|k| format!("'{}'", k.as_str()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"(() => {{
    const result = {{
        basicInfo: {{}},
        menuItems: [],
        reviews: [],
        images: [],
        raw: {{}}
    }};

    try {{
        // 1. Runtime global-state capture (verbatim side channel)
        const stateKeys = [{keys}];
        for (const key of stateKeys) {{
            if (window[key] !== undefined && window[key] !== null) {{
                result.raw[key] = window[key];
            }}
        }}

        // 2. Meta tags: first match per field wins; all image tags append
        document.querySelectorAll('meta').forEach(meta => {{
            const property = meta.getAttribute('property') || meta.getAttribute('name');
            const content = meta.getAttribute('content');
            if (!property || !content) return;

            if (property.includes('title') && !result.basicInfo.name) {{
                result.basicInfo.name = content;
            }}
            if (property.includes('description') && !result.basicInfo.description) {{
                result.basicInfo.description = content;
            }}
            if (property.includes('image')) {{
                result.images.push(content);
            }}
        }});

        // 3. JSON-LD structured data, overriding meta-derived fields
        document.querySelectorAll('script[type="application/ld+json"]').forEach(element => {{
            try {{
                const data = JSON.parse(element.textContent);
                const type = data['@type'];
                if (type === 'Restaurant' || (Array.isArray(type) && type.includes('Restaurant'))) {{
                    const fields = {{
                        name: data.name,
                        address: data.address && data.address.streetAddress,
                        telephone: data.telephone,
                        priceRange: data.priceRange,
                        rating: data.aggregateRating && data.aggregateRating.ratingValue,
                        reviewCount: data.aggregateRating && data.aggregateRating.reviewCount
                    }};
                    for (const [key, value] of Object.entries(fields)) {{
                        if (value !== undefined && value !== null) {{
                            result.basicInfo[key] = String(value);
                        }}
                    }}
                }}
                result.raw.jsonLd = data;
            }} catch (e) {{}}
        }});

        // 4. Generic attribute-substring selectors, only for still-unset fields
        const selectors = {{
            name: ['h1', 'h2', '[class*="name"]', '[class*="title"]'],
            category: ['[class*="category"]', '[class*="type"]'],
            address: ['[class*="address"]', '[class*="location"]'],
            phone: ['[class*="phone"]', '[class*="tel"]']
        }};
        for (const [key, selectorList] of Object.entries(selectors)) {{
            for (const selector of selectorList) {{
                if (result.basicInfo[key]) break;
                const element = document.querySelector(selector);
                if (element) {{
                    const text = element.textContent.trim();
                    if (text) {{
                        result.basicInfo[key] = text;
                        break;
                    }}
                }}
            }}
        }}

        // 5. CDN image sweep (capping happens at merge)
        document.querySelectorAll('img').forEach(img => {{
            const src = img.src || img.dataset.src;
            if (src && src.includes('{cdn}') && !src.includes('{icon}')) {{
                result.images.push(src);
            }}
        }});
    }} catch (error) {{
        result.error = String(error);
    }}

    return result;
}})()"#,
        keys = keys,
        cdn = IMAGE_CDN_MARKER,
        icon = IMAGE_ICON_MARKER,
    )
}
