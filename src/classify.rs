//! C2: Link Classifier. Decides whether a discovered href is worth crawling.

use url::Url;

const ALLOWED_EXTENSIONS: &[&str] = &["html", "htm", "aspx", "php"];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "ico", "tiff",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt",
    // media
    "mp3", "mp4", "avi", "mov", "wav", "flac", "ogg", "webm",
    // archives
    "zip", "tar", "gz", "rar", "7z",
    // data / web assets
    "xml", "json", "rss", "css", "js",
    // fonts
    "woff", "woff2", "ttf", "eot", "otf",
];

const EXCLUDED_SYSTEM_PATHS: &[&str] = &[
    "/cgi-bin/",
    "/cdn-cgi/",
    "/wp-admin/",
    "/wp-includes/",
    "/wp-content/plugins/",
    "/admin/",
    "/phpmyadmin/",
];

fn extension_of(path: &str) -> Option<String> {
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    last_segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

/// Is `href`'s syntax (extension, system path) eligible to be crawled?
pub fn is_valid_link(href: &str) -> bool {
    let path_only = href.split(['?', '#']).next().unwrap_or(href);

    if let Some(ext) = extension_of(path_only) {
        if !ext.is_empty() {
            if EXCLUDED_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
            if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
        }
    }

    let lower_path = path_only.to_lowercase();
    if EXCLUDED_SYSTEM_PATHS
        .iter()
        .any(|prefix| lower_path.contains(prefix))
    {
        return false;
    }

    true
}

/// Does `candidate` share a host with `seed`? Relative and protocol-relative
/// URLs are treated as same-host; foreign schemes are never same-host.
pub fn same_host(candidate: &str, seed: &Url) -> bool {
    let trimmed = candidate.trim();

    if trimmed.starts_with("//") {
        let as_https = format!("https:{trimmed}");
        return Url::parse(&as_https)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
            .map(|h| Some(h) == seed.host_str().map(|s| s.to_lowercase()))
            .unwrap_or(false);
    }

    match Url::parse(trimmed) {
        Ok(absolute) => {
            if absolute.scheme() != "http" && absolute.scheme() != "https" {
                return false;
            }
            absolute.host_str().map(|h| h.to_lowercase())
                == seed.host_str().map(|h| h.to_lowercase())
        }
        // Relative URI: no host component, implicitly same-host.
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_excluded_extensions() {
        assert!(!is_valid_link("/photo.jpg"));
        assert!(!is_valid_link("/sitemap.xml"));
        assert!(!is_valid_link("/app.js"));
    }

    #[test]
    fn accepts_allowed_extensions_and_extensionless() {
        assert!(is_valid_link("/page.html"));
        assert!(is_valid_link("/page.php"));
        assert!(is_valid_link("/about"));
    }

    #[test]
    fn rejects_unknown_extensions() {
        assert!(!is_valid_link("/weird.xyz"));
    }

    #[test]
    fn rejects_system_paths() {
        assert!(!is_valid_link("/wp-admin/edit.php"));
        assert!(!is_valid_link("/cgi-bin/run"));
    }

    #[test]
    fn same_host_rules() {
        let seed = Url::parse("https://example.com/").unwrap();
        assert!(same_host("/relative/path", &seed));
        assert!(same_host("//example.com/other", &seed));
        assert!(same_host("https://EXAMPLE.com/x", &seed));
        assert!(!same_host("https://other.com/x", &seed));
        assert!(!same_host("mailto:a@example.com", &seed));
    }
}
