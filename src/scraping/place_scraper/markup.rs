//! Markup-Pattern Extractor: a pure, replayable function of the HTML
//! string. No script execution, no runtime globals: just the fixed table
//! of structural selectors tuned to the page's versioned class scheme.
//!
//! Serves as the independent cross-check against the in-page locator and
//! as the fallback when script evaluation fails entirely. The selector
//! table silently degrades when the site ships a new class scheme; the
//! session surfaces that as a `markup_selectors_empty` warning.

use super::reconcile::{MAX_MENU_ITEMS, MAX_REVIEWS};
use crate::core::types::{CandidateSet, MenuItem, Review};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

// Versioned class-name scheme of the desktop place page. Ordered: first
// matching selector wins per field.
const NAME_SELECTORS: &[&str] = &["span.GHAhO", "span.Fc1rA", "h2.place_title"];
const CATEGORY_SELECTORS: &[&str] = &["span.lnJFt", "span.DJJvD"];
const ADDRESS_SELECTORS: &[&str] = &["span.IH7VW", "span.LDgIH"];
const PHONE_SELECTORS: &[&str] = &["span.xlx7Q"];

const MENU_ITEM_SELECTOR: &str = "li.E2jtL";
const MENU_NAME_SELECTOR: &str = "span.lPzHi";
const MENU_PRICE_SELECTOR: &str = "div._3qFuX";

const REVIEW_ITEM_SELECTOR: &str = "li.pui__X35jYm";
const REVIEW_RATING_SELECTOR: &str = "span.pui__bMWJiy";
const REVIEW_TEXT_SELECTOR: &str = "a.pui__xtsQN-";
const REVIEW_DATE_SELECTOR: &str = "time span";

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digit pattern"))
}

/// Parse a rating out of free text: first run of digits as f64, clamped to
/// the 0–5 review scale; `0.0` when the text carries none
/// (e.g. "별점 4점" → 4.0).
pub fn extract_rating(text: &str) -> f64 {
    digit_run()
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|v| v.min(5.0))
        .unwrap_or(0.0)
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    for sel in selectors {
        let Ok(selector) = Selector::parse(sel) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = trimmed_text(element);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

fn child_text(item: ElementRef<'_>, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    item.select(&selector).next().map(trimmed_text)
}

/// Apply the fixed selector table to raw markup.
pub fn extract_from_markup(html: &str) -> CandidateSet {
    let document = Html::parse_document(html);
    let mut out = CandidateSet::default();

    for (field, selectors) in [
        ("name", NAME_SELECTORS),
        ("category", CATEGORY_SELECTORS),
        ("address", ADDRESS_SELECTORS),
        ("phone", PHONE_SELECTORS),
    ] {
        if let Some(text) = select_first_text(&document, selectors) {
            out.basic_info.insert(field.to_string(), text);
        }
    }

    if let Ok(selector) = Selector::parse(MENU_ITEM_SELECTOR) {
        for item in document.select(&selector).take(MAX_MENU_ITEMS) {
            // Name is required; a menu row without one is skipped outright.
            let Some(name) = child_text(item, MENU_NAME_SELECTOR).filter(|n| !n.is_empty())
            else {
                continue;
            };
            let price = child_text(item, MENU_PRICE_SELECTOR).unwrap_or_default();
            out.menu_items.push(MenuItem { name, price });
        }
    }

    if let Ok(selector) = Selector::parse(REVIEW_ITEM_SELECTOR) {
        for item in document.select(&selector).take(MAX_REVIEWS) {
            let Some(text) = child_text(item, REVIEW_TEXT_SELECTOR).filter(|t| !t.is_empty())
            else {
                continue;
            };
            let rating = child_text(item, REVIEW_RATING_SELECTOR)
                .map(|t| extract_rating(&t))
                .unwrap_or(0.0);
            let date = child_text(item, REVIEW_DATE_SELECTOR).unwrap_or_default();
            out.reviews.push(Review { rating, text, date });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <html><body>
            <span class="GHAhO">맛있는 김치찌개집</span>
            <span class="lnJFt">한식</span>
            <span class="IH7VW">서울 마포구 양화로 123</span>
            <span class="xlx7Q">02-123-4567</span>
            <ul>
                <li class="E2jtL">
                    <span class="lPzHi">김치찌개</span>
                    <div class="_3qFuX">9,000원</div>
                </li>
                <li class="E2jtL">
                    <span class="lPzHi">된장찌개</span>
                </li>
                <li class="E2jtL">
                    <div class="_3qFuX">5,000원</div>
                </li>
            </ul>
            <ul>
                <li class="pui__X35jYm">
                    <span class="pui__bMWJiy">별점 4점</span>
                    <a class="pui__xtsQN-">국물이 진하고 좋아요</a>
                    <time><span>2024.03.15</span></time>
                </li>
                <li class="pui__X35jYm">
                    <span class="pui__bMWJiy">별점 없음</span>
                    <a class="pui__xtsQN-">재방문 의사 있습니다</a>
                </li>
                <li class="pui__X35jYm">
                    <span class="pui__bMWJiy">별점 5점</span>
                </li>
            </ul>
        </body></html>
    "#;

    #[test]
    fn basic_info_uses_first_matching_selector() {
        let candidates = extract_from_markup(FIXTURE);
        assert_eq!(
            candidates.basic_info.get("name").map(String::as_str),
            Some("맛있는 김치찌개집")
        );
        assert_eq!(
            candidates.basic_info.get("category").map(String::as_str),
            Some("한식")
        );
        assert_eq!(
            candidates.basic_info.get("phone").map(String::as_str),
            Some("02-123-4567")
        );
    }

    #[test]
    fn menu_without_name_is_skipped_price_defaults_empty() {
        let candidates = extract_from_markup(FIXTURE);
        assert_eq!(candidates.menu_items.len(), 2);
        assert_eq!(candidates.menu_items[0].name, "김치찌개");
        assert_eq!(candidates.menu_items[0].price, "9,000원");
        assert_eq!(candidates.menu_items[1].name, "된장찌개");
        assert_eq!(candidates.menu_items[1].price, "");
    }

    #[test]
    fn review_without_text_is_skipped() {
        let candidates = extract_from_markup(FIXTURE);
        assert_eq!(candidates.reviews.len(), 2);
        assert_eq!(candidates.reviews[0].rating, 4.0);
        assert_eq!(candidates.reviews[0].text, "국물이 진하고 좋아요");
        assert_eq!(candidates.reviews[0].date, "2024.03.15");
        // No digits in the rating text → 0.0; missing date → empty string.
        assert_eq!(candidates.reviews[1].rating, 0.0);
        assert_eq!(candidates.reviews[1].date, "");
    }

    #[test]
    fn rating_parses_first_digit_run() {
        assert_eq!(extract_rating("별점 4점"), 4.0);
        assert_eq!(extract_rating("no digits here"), 0.0);
        assert_eq!(extract_rating(""), 0.0);
    }

    #[test]
    fn rating_never_exceeds_review_scale() {
        // Runaway digit runs (percentages, counts next to the star widget)
        // must not leak out of the 0–5 range.
        assert_eq!(extract_rating("별점 12점"), 5.0);
        assert_eq!(extract_rating("45"), 5.0);
        assert_eq!(extract_rating("100% 만족"), 5.0);
        assert_eq!(extract_rating("5"), 5.0);
    }

    #[test]
    fn unknown_layout_extracts_nothing() {
        let candidates = extract_from_markup("<html><body><h1>Redesigned page</h1></body></html>");
        assert!(candidates.is_empty());
    }

    #[test]
    fn menu_list_is_capped_at_twenty() {
        let mut html = String::from("<html><body><ul>");
        for i in 0..30 {
            html.push_str(&format!(
                r#"<li class="E2jtL"><span class="lPzHi">메뉴 {i}</span></li>"#
            ));
        }
        html.push_str("</ul></body></html>");

        let candidates = extract_from_markup(&html);
        assert_eq!(candidates.menu_items.len(), MAX_MENU_ITEMS);
    }

    #[test]
    fn review_list_is_capped_at_ten() {
        let mut html = String::from("<html><body><ul>");
        for i in 0..25 {
            html.push_str(&format!(
                r#"<li class="pui__X35jYm"><a class="pui__xtsQN-">리뷰 {i}</a></li>"#
            ));
        }
        html.push_str("</ul></body></html>");

        let candidates = extract_from_markup(&html);
        assert_eq!(candidates.reviews.len(), MAX_REVIEWS);
    }
}
