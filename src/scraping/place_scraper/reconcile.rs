//! Reconciler: merges the two candidate sets into one canonical record.
//!
//! Merge direction is pinned down explicitly: markup provides the
//! baseline, eval-derived data overrides and extends. Eval reflects the
//! fully hydrated runtime state and is trusted over markup snapshots,
//! except where eval has nothing.

use crate::core::types::{CandidateSet, ExtractionRecord, Statistics};
use std::collections::HashSet;

pub const MAX_MENU_ITEMS: usize = 20;
pub const MAX_REVIEWS: usize = 10;
pub const MAX_IMAGES: usize = 10;

/// Warning labels attached to a success envelope. These are the staleness
/// signals for the versioned selector table and probe failures: a clean
/// success and "every strategy came back empty" must be distinguishable.
pub const WARN_MARKUP_EMPTY: &str = "markup_selectors_empty";
pub const WARN_NO_FIELDS: &str = "no_fields_extracted";
pub const WARN_PROBE_ERROR: &str = "locator_probe_error";

/// Merge per-field, order-documented:
///
/// * `basic_info` — markup applied first, eval applied on top (eval wins
///   per field).
/// * `menu_items` — eval's list then markup's list; de-duplicated by name,
///   first occurrence wins; capped at [`MAX_MENU_ITEMS`]. Empty names are
///   dropped.
/// * `reviews` — eval then markup, capped at [`MAX_REVIEWS`], no de-dup.
/// * `images` — eval only, capped at [`MAX_IMAGES`]; the markup extractor
///   contributes no images.
/// * `statistics` — read exclusively from eval's `basic_info` (the
///   structured-data probe is the only realistic source); `None` when
///   absent or unparseable.
pub fn merge(eval: CandidateSet, markup: CandidateSet) -> ExtractionRecord {
    let statistics = Statistics {
        rating: eval
            .basic_info
            .get("rating")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|r| *r >= 0.0),
        review_count: eval
            .basic_info
            .get("reviewCount")
            .and_then(|v| v.trim().parse::<u64>().ok()),
    };

    let mut basic_info = markup.basic_info;
    for (key, value) in eval.basic_info {
        basic_info.insert(key, value);
    }

    let mut seen_names: HashSet<String> = HashSet::new();
    let menu_items = eval
        .menu_items
        .into_iter()
        .chain(markup.menu_items)
        .filter(|item| !item.name.is_empty() && seen_names.insert(item.name.clone()))
        .take(MAX_MENU_ITEMS)
        .collect();

    let reviews = eval
        .reviews
        .into_iter()
        .chain(markup.reviews)
        .take(MAX_REVIEWS)
        .collect();

    let images = eval.images.into_iter().take(MAX_IMAGES).collect();

    ExtractionRecord {
        basic_info,
        menu_items,
        reviews,
        images,
        statistics,
    }
}

/// Derive the warning labels for a finished extraction.
pub fn collect_warnings(
    eval: &CandidateSet,
    markup: &CandidateSet,
    record: &ExtractionRecord,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if eval.error.is_some() {
        warnings.push(WARN_PROBE_ERROR.to_string());
    }
    if markup.is_empty() {
        warnings.push(WARN_MARKUP_EMPTY.to_string());
    }
    if record.is_empty() {
        warnings.push(WARN_NO_FIELDS.to_string());
    }
    warnings
}
