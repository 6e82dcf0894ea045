//! C4: Feed Discoverer. Seeds the frontier from `sitemap.xml`/RSS/Atom feeds.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use reqwest::Client;
use std::time::Duration;
use url::Url;

const FEED_PATHS: &[&str] = &["sitemap.xml", "rss.xml", "feed.xml", "atom.xml"];

/// Fetch the well-known feed paths at `seed`'s origin and return every
/// well-formed absolute URL found in a `<loc>` element or `<link>`
/// element/attribute. Best-effort: a missing or malformed feed is skipped.
#[tracing::instrument(skip(client, seed))]
pub async fn discover(client: &Client, seed: &Url, timeout: Duration, user_agent: &str) -> Vec<String> {
    let Some(host) = seed.host_str() else {
        return Vec::new();
    };
    let origin = format!("{}://{}/", seed.scheme(), host);

    let mut discovered = Vec::new();
    for path in FEED_PATHS {
        let feed_url = format!("{origin}{path}");
        let request = client
            .get(&feed_url)
            .header(reqwest::header::USER_AGENT, user_agent);
        match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(resp)) if resp.status().is_success() => match resp.text().await {
                Ok(body) => {
                    let urls = parse_feed_urls(&body);
                    tracing::debug!(feed = %feed_url, found = urls.len(), "parsed feed");
                    discovered.extend(urls);
                }
                Err(err) => tracing::warn!(feed = %feed_url, %err, "failed to read feed body"),
            },
            Ok(Ok(resp)) => {
                tracing::debug!(feed = %feed_url, status = %resp.status(), "feed not found");
            }
            Ok(Err(err)) => tracing::warn!(feed = %feed_url, %err, "failed to fetch feed"),
            Err(_) => tracing::warn!(feed = %feed_url, "feed fetch timed out"),
        }
    }

    discovered
}

/// Parse `<loc>` text and `<link>` href/text content out of an XML document,
/// ignoring namespaces, keeping only well-formed absolute http(s) URLs.
fn parse_feed_urls(body: &str) -> Vec<String> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut urls = Vec::new();
    let mut in_loc = false;
    let mut in_link = false;
    let mut pending_link_href: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(tag)) => {
                let local = local_name(tag.name().as_ref());
                if local.eq_ignore_ascii_case("loc") {
                    in_loc = true;
                } else if local.eq_ignore_ascii_case("link") {
                    in_link = true;
                    pending_link_href = tag.attributes().flatten().find_map(|attr| {
                        if local_name(attr.key.as_ref()).eq_ignore_ascii_case("href") {
                            attr.unescape_value().ok().map(|v| v.into_owned())
                        } else {
                            None
                        }
                    });
                }
            }
            Ok(Event::Empty(tag)) => {
                let local = local_name(tag.name().as_ref());
                if local.eq_ignore_ascii_case("link") {
                    if let Some(href) = tag.attributes().flatten().find_map(|attr| {
                        if local_name(attr.key.as_ref()).eq_ignore_ascii_case("href") {
                            attr.unescape_value().ok().map(|v| v.into_owned())
                        } else {
                            None
                        }
                    }) {
                        push_if_absolute(&mut urls, &href);
                    }
                }
            }
            Ok(Event::Text(text)) => {
                if in_loc {
                    if let Ok(decoded) = text.unescape() {
                        push_if_absolute(&mut urls, decoded.trim());
                    }
                } else if in_link && pending_link_href.is_none() {
                    if let Ok(decoded) = text.unescape() {
                        push_if_absolute(&mut urls, decoded.trim());
                    }
                }
            }
            Ok(Event::End(tag)) => {
                let local = local_name(tag.name().as_ref());
                if local.eq_ignore_ascii_case("loc") {
                    in_loc = false;
                } else if local.eq_ignore_ascii_case("link") {
                    if let Some(href) = pending_link_href.take() {
                        push_if_absolute(&mut urls, &href);
                    }
                    in_link = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    urls
}

fn local_name(qname: &[u8]) -> String {
    let full = String::from_utf8_lossy(qname);
    full.rsplit(':').next().unwrap_or(&full).to_string()
}

fn push_if_absolute(urls: &mut Vec<String>, candidate: &str) {
    if let Ok(parsed) = Url::parse(candidate) {
        if parsed.scheme() == "http" || parsed.scheme() == "https" {
            urls.push(candidate.to_string());
        }
    }
}
