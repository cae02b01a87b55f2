use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Invocation input for the HTTP wrapper.
///
/// `url` is optional at the serde level so a missing field yields a clean
/// 400 instead of a deserialization error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// One menu entry. `name` is never empty after reconciliation; `price` may
/// be the empty string when the page shows no price, but it is always present.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub price: String,
}

/// One visitor review. `rating` is in 0–5; `0.0` means the rating text
/// carried no digits.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
    pub rating: f64,
    pub text: String,
    pub date: String,
}

/// Derived numeric summary, sourced from the structured-data probe.
///
/// `None` means "unknown", distinct from a literal zero. Serialized as
/// `null` on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub rating: Option<f64>,
    pub review_count: Option<u64>,
}

/// The canonical reconciled output: one record per extraction call.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    #[serde(default)]
    pub basic_info: BTreeMap<String, String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub statistics: Statistics,
}

impl ExtractionRecord {
    /// True when no strategy produced anything: the "silently degraded
    /// page layout" signal callers should watch for.
    pub fn is_empty(&self) -> bool {
        self.basic_info.is_empty()
            && self.menu_items.is_empty()
            && self.reviews.is_empty()
            && self.images.is_empty()
    }
}

/// A partial, per-strategy extraction result. Fields may be absent; no
/// uniqueness or cap guarantees are enforced until reconciliation.
///
/// `raw` carries runtime global-state blobs (keyed by well-known global
/// name) and the parsed JSON-LD block under `jsonLd`: side-channel data
/// for debugging and forward compatibility, never merged into the record.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSet {
    #[serde(default)]
    pub basic_info: BTreeMap<String, String>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub raw: serde_json::Map<String, serde_json::Value>,
    /// Set when the in-page probe caught an exception mid-run. Probes that
    /// ran before the failure keep their results.
    #[serde(default)]
    pub error: Option<String>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.basic_info.is_empty()
            && self.menu_items.is_empty()
            && self.reviews.is_empty()
            && self.images.is_empty()
    }
}

/// The uniform result wrapper. Exactly one of `data`/`error` is present,
/// gated by `success`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExtractionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Final post-redirect URL on success; the original input on failure.
    pub url: String,
    /// RFC 3339 timestamp of envelope creation.
    pub timestamp: String,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ExtractionEnvelope {
    pub fn success(record: ExtractionRecord, url: String, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            data: Some(record),
            error: None,
            url,
            timestamp: Utc::now().to_rfc3339(),
            warnings,
        }
    }

    pub fn failure(error: impl std::fmt::Display, url: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            url,
            timestamp: Utc::now().to_rfc3339(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_populates_data_only() {
        let env = ExtractionEnvelope::success(
            ExtractionRecord::default(),
            "https://pcmap.place.naver.com/restaurant/12345678/home".into(),
            vec![],
        );
        assert!(env.success);
        assert!(env.data.is_some());
        assert!(env.error.is_none());
        assert!(!env.timestamp.is_empty());
    }

    #[test]
    fn envelope_failure_populates_error_only() {
        let env =
            ExtractionEnvelope::failure("navigation failed: dns error", "https://naver.me/xyz".into());
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("navigation failed: dns error"));
        assert_eq!(env.url, "https://naver.me/xyz");
    }

    #[test]
    fn record_serializes_camel_case() {
        let mut record = ExtractionRecord::default();
        record.basic_info.insert("name".into(), "김치찌개집".into());
        record.menu_items.push(MenuItem {
            name: "김치찌개".into(),
            price: "9,000원".into(),
        });
        record.statistics.rating = Some(4.5);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["basicInfo"]["name"], "김치찌개집");
        assert_eq!(json["menuItems"][0]["price"], "9,000원");
        assert_eq!(json["statistics"]["rating"], 4.5);
        assert!(json["statistics"]["reviewCount"].is_null());
    }

    #[test]
    fn candidate_set_tolerates_missing_fields() {
        let parsed: CandidateSet =
            serde_json::from_str(r#"{"basicInfo":{"name":"Store A"}}"#).unwrap();
        assert_eq!(
            parsed.basic_info.get("name").map(String::as_str),
            Some("Store A")
        );
        assert!(parsed.menu_items.is_empty());
        assert!(parsed.error.is_none());
        assert!(!parsed.is_empty());
    }

    #[test]
    fn empty_record_reports_empty() {
        assert!(ExtractionRecord::default().is_empty());
    }
}
