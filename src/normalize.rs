//! C1: URL Normalizer. Canonicalizes URLs for equality comparisons.

use url::Url;

/// Canonicalize a URL string for use as a de-duplication key.
///
/// Lowercases scheme, host, and path; strips the fragment and any trailing
/// slash from a non-empty path; preserves the query string exactly as given.
/// Returns an empty string if `url` is clearly malformed.
pub fn normalize(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    match Url::parse(trimmed) {
        Ok(parsed) => {
            let scheme = parsed.scheme().to_lowercase();
            let host = match parsed.host_str() {
                Some(h) => h.to_lowercase(),
                None => return String::new(),
            };
            let mut path = parsed.path().to_lowercase();
            if path.len() > 1 && path.ends_with('/') {
                path.truncate(path.len() - 1);
            }

            let mut out = format!("{scheme}://{host}{path}");
            if let Some(query) = parsed.query() {
                out.push('?');
                out.push_str(query);
            }
            out
        }
        Err(_) => {
            let mut lowered = trimmed.to_lowercase();
            while lowered.ends_with('/') {
                lowered.pop();
            }
            lowered
        }
    }
}
