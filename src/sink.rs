//! C9: Sink. Optional on-disk writer that persists fetched HTML under a base
//! directory, with rewritten absolute URLs and a safe, length-bounded path.

use crate::error::{CrawlError, Result};
use rand::Rng;
use regex::Regex;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use url::Url;

const MAX_PATH_LEN: usize = 150;
const REWRITE_ATTRS: &[&str] = &["href", "src"];

/// Lightweight validation findings, logged but never fatal to the save.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub parse_errors: usize,
    pub images_missing_alt: usize,
}

fn validate_html(body: &str) -> ValidationReport {
    let document = Html::parse_document(body);
    let images_missing_alt = Selector::parse("img")
        .map(|sel| {
            document
                .select(&sel)
                .filter(|el| el.value().attr("alt").is_none())
                .count()
        })
        .unwrap_or(0);

    ValidationReport {
        parse_errors: document.errors.len(),
        images_missing_alt,
    }
}

/// Rewrite relative `href`/`src` attribute values to absolute URLs, using
/// `base` as the resolution root. Mechanical attribute-level rewrite rather
/// than a full parse/re-serialize round trip, to avoid reformatting markup
/// that isn't being changed.
fn rewrite_relative_urls(body: &str, base: &Url) -> String {
    let attr_group = REWRITE_ATTRS.join("|");
    let pattern = format!(r#"(?P<attr>{attr_group})\s*=\s*"(?P<value>[^"]*)""#);
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(_) => return body.to_string(),
    };

    re.replace_all(body, |caps: &regex::Captures| {
        let attr = &caps["attr"];
        let value = &caps["value"];
        if value.is_empty() || value.starts_with('#') || Url::parse(value).is_ok() {
            return caps[0].to_string();
        }
        match base.join(value) {
            Ok(absolute) => format!(r#"{attr}="{absolute}""#),
            Err(_) => caps[0].to_string(),
        }
    })
    .into_owned()
}

/// Derive a safe, bounded-length filesystem path for `url` under `output_dir`.
fn derive_path(url: &Url, output_dir: &Path) -> PathBuf {
    let mut raw_path = url.path().trim_start_matches('/').to_string();
    if raw_path.is_empty() || raw_path.ends_with('/') {
        raw_path.push_str("index.html");
    }
    if !raw_path.ends_with(".html") && !raw_path.ends_with(".htm") {
        raw_path.push_str(".html");
    }

    let sanitized_segments: Vec<String> = raw_path
        .split('/')
        .map(sanitize_filename::sanitize)
        .filter(|s| !s.is_empty())
        .collect();
    if sanitized_segments.is_empty() {
        return output_dir.join(fallback_name());
    }

    let mut path = output_dir.to_path_buf();
    for segment in &sanitized_segments[..sanitized_segments.len() - 1] {
        path.push(segment);
    }
    let mut filename = sanitized_segments.last().cloned().unwrap_or_default();

    let dir_len = path.to_string_lossy().len();
    if dir_len + filename.len() > MAX_PATH_LEN {
        let ext_len = filename.rsplit('.').next().map(|e| e.len() + 1).unwrap_or(0);
        let keep = MAX_PATH_LEN.saturating_sub(dir_len).saturating_sub(ext_len);
        let (stem, ext) = filename.split_at(filename.len() - ext_len);
        let truncated_stem: String = stem.chars().take(keep.max(1)).collect();
        filename = format!("{truncated_stem}{ext}");
    }

    path.push(filename);
    path
}

fn fallback_name() -> String {
    let suffix: u64 = rand::thread_rng().gen();
    format!("page_{suffix:x}.html")
}

/// Persist `body` (already fetched from `url`) under `output_dir`, rewriting
/// relative URLs to absolute first. Writes atomically via a same-directory
/// temp file and rename. Returns the path written.
#[tracing::instrument(skip(body), fields(url = %url))]
pub async fn save(url: &Url, body: &str, output_dir: &Path, validate: bool) -> Result<PathBuf> {
    let rewritten = rewrite_relative_urls(body, url);

    if validate {
        let report = validate_html(body);
        if report.parse_errors > 0 || report.images_missing_alt > 0 {
            tracing::warn!(
                url = %url,
                parse_errors = report.parse_errors,
                images_missing_alt = report.images_missing_alt,
                "HTML validation findings"
            );
        }
    }

    let target = derive_path(url, output_dir);
    let parent = target.parent().unwrap_or(output_dir).to_path_buf();

    tokio::fs::create_dir_all(&parent)
        .await
        .map_err(|e| CrawlError::SinkIo(url.to_string(), e.to_string()))?;

    let target_clone = target.clone();
    let rewritten_clone = rewritten.clone();
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(
            target_clone.parent().unwrap_or(std::path::Path::new(".")),
        )?;
        use std::io::Write;
        tmp.write_all(rewritten_clone.as_bytes())?;
        tmp.persist(&target_clone)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        Ok::<(), std::io::Error>(())
    })
    .await
    .map_err(|e| CrawlError::SinkIo(url.to_string(), e.to_string()))?
    .map_err(|e| CrawlError::SinkIo(url.to_string(), e.to_string()))?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_becomes_index() {
        let url = Url::parse("http://example.com/").unwrap();
        let path = derive_path(&url, Path::new("/tmp/out"));
        assert_eq!(path, Path::new("/tmp/out/index.html"));
    }

    #[test]
    fn nested_path_preserved() {
        let url = Url::parse("http://example.com/blog/post-1").unwrap();
        let path = derive_path(&url, Path::new("/tmp/out"));
        assert_eq!(path, Path::new("/tmp/out/blog/post-1.html"));
    }

    #[test]
    fn rewrites_relative_href_to_absolute() {
        let base = Url::parse("http://example.com/dir/page.html").unwrap();
        let body = r#"<a href="../other.html">x</a><img src="img.png">"#;
        let rewritten = rewrite_relative_urls(body, &base);
        assert!(rewritten.contains(r#"href="http://example.com/other.html""#));
        assert!(rewritten.contains(r#"src="http://example.com/dir/img.png""#));
    }

    #[tokio::test]
    async fn saves_and_rewrites_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse("http://example.com/page").unwrap();
        let body = r#"<a href="/other">x</a>"#;
        let path = save(&url, body, dir.path(), false).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("http://example.com/other"));
    }
}
