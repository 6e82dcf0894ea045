//! C3: Robots Registry. Per-host cache of `robots.txt` disallow rules.
//!
//! Honors only `User-agent`, `Disallow`, and wildcard globs (§4.3) — no
//! `Allow`, no `Crawl-delay` enforcement beyond the Rate Governor's baseline
//! delay. A host with no rules, or whose `robots.txt` fails to fetch or
//! parse, is treated as unrestricted (fail-open).

use regex::Regex;
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::RwLock;
use url::Url;

/// Cache of parsed disallow rules, one entry per host visited this crawl.
pub struct RobotsRegistry {
    client: Client,
    user_agent: String,
    rules: RwLock<HashMap<String, Vec<String>>>,
}

impl RobotsRegistry {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
            rules: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch and parse `robots.txt` for `url`'s host, if not already cached.
    #[tracing::instrument(skip(self, url), fields(host = %url.host_str().unwrap_or("?")))]
    pub async fn process_host(&self, url: &Url) {
        let Some(host) = url.host_str().map(|h| h.to_lowercase()) else {
            return;
        };

        {
            let rules = self.rules.read().await;
            if rules.contains_key(&host) {
                return;
            }
        }

        let robots_url = format!("{}://{}/robots.txt", url.scheme(), host);
        let disallows = match self
            .client
            .get(&robots_url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => parse_robots(&body, &self.user_agent),
                Err(err) => {
                    tracing::warn!(%host, %err, "failed to read robots.txt body; allowing crawl");
                    Vec::new()
                }
            },
            Ok(resp) => {
                tracing::debug!(%host, status = %resp.status(), "robots.txt non-2xx; unrestricted");
                Vec::new()
            }
            Err(err) => {
                tracing::debug!(%host, %err, "robots.txt fetch failed; unrestricted");
                Vec::new()
            }
        };

        self.rules.write().await.insert(host, disallows);
    }

    /// Is `url` allowed to be fetched, given the cached rules for its host?
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let Some(host) = url.host_str().map(|h| h.to_lowercase()) else {
            return true;
        };

        let rules = self.rules.read().await;
        let Some(disallows) = rules.get(&host) else {
            return true;
        };

        let path = url.path();
        !disallows.iter().any(|pattern| pattern_matches(pattern, path))
    }
}

/// Parse `robots.txt` content, returning the `Disallow` patterns of the first
/// group whose `User-agent` matches `*` or `user_agent` (case-insensitive
/// substring). Returns an empty list (allow-all) if nothing matches, or on
/// any malformed input — this parser is fail-open by construction.
fn parse_robots(content: &str, user_agent: &str) -> Vec<String> {
    let ua_lower = user_agent.to_lowercase();
    let mut groups: Vec<(Vec<String>, Vec<String>)> = Vec::new();
    let mut in_disallow_phase = false;

    for raw_line in content.lines() {
        let line = match raw_line.split('#').next() {
            Some(l) => l.trim(),
            None => continue,
        };
        if line.is_empty() {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };
        let directive = directive.trim().to_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => {
                let agent = value.to_lowercase();
                if groups.is_empty() || in_disallow_phase {
                    groups.push((vec![agent], Vec::new()));
                    in_disallow_phase = false;
                } else if let Some(last) = groups.last_mut() {
                    last.0.push(agent);
                }
            }
            "disallow" => {
                if let Some(last) = groups.last_mut() {
                    last.1.push(value.to_string());
                    in_disallow_phase = true;
                }
            }
            _ => {}
        }
    }

    groups
        .into_iter()
        .find(|(agents, _)| {
            agents
                .iter()
                .any(|a| a == "*" || ua_lower.contains(a.as_str()))
        })
        .map(|(_, disallows)| disallows)
        .unwrap_or_default()
}

/// Match a single `Disallow` pattern against a request path per §4.3.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return path.starts_with(prefix);
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return path.ends_with(suffix);
    }
    if pattern.contains('*') {
        return glob_regex(pattern)
            .map(|re| re.is_match(path))
            .unwrap_or(false);
    }
    path.starts_with(pattern)
}

fn glob_regex(pattern: &str) -> Option<Regex> {
    let mut anchored = String::from("^");
    for (i, part) in pattern.split('*').enumerate() {
        if i > 0 {
            anchored.push_str(".*");
        }
        anchored.push_str(&regex::escape(part));
    }
    anchored.push('$');
    Regex::new(&anchored).ok()
}
