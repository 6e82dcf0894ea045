//! C6: HTML Link Extractor. Walks `<a href>` elements and resolves, drops
//! query/fragment, normalizes, then classifies each href.

use crate::classify::{is_valid_link, same_host};
use crate::normalize::normalize;
use indexmap::IndexSet;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Extract the ordered, de-duplicated, classified set of crawlable links
/// from an HTML document fetched at `base`.
///
/// The query string and fragment are unconditionally dropped from each href
/// before normalization, matching the aggressive de-duplication behavior
/// this crate inherits from its reference implementation (see the
/// "query-preserving normalization" open question in `DESIGN.md`).
#[allow(clippy::too_many_arguments)]
pub fn extract_links(
    body: &str,
    base: &Url,
    seed: &Url,
    follow_external_links: bool,
    include_patterns: &[Regex],
    exclude_patterns: &[Regex],
) -> Vec<String> {
    let document = Html::parse_document(body);
    let Ok(selector) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut seen = IndexSet::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let stripped = href.split(['?', '#']).next().unwrap_or(href);
        if stripped.is_empty() {
            continue;
        }

        let Ok(absolute) = base.join(stripped) else {
            continue;
        };

        if !follow_external_links && !same_host(absolute.as_str(), seed) {
            continue;
        }
        if !is_valid_link(absolute.path()) {
            continue;
        }

        let normalized = normalize(absolute.as_str());
        if normalized.is_empty() {
            continue;
        }

        if !include_patterns.is_empty() && !include_patterns.iter().any(|re| re.is_match(&normalized)) {
            continue;
        }
        if exclude_patterns.iter().any(|re| re.is_match(&normalized)) {
            continue;
        }

        seen.insert(normalized);
    }

    seen.into_iter().collect()
}
