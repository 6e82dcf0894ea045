//! C5: Page Fetcher. Performs a single HTTP GET and always returns a result.

use crate::model::{synthetic_status, CrawlResult};
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetch `url`, translating transport errors and timeouts into the synthetic
/// status codes of §3. Never returns `Err` — every outcome is a `CrawlResult`.
#[tracing::instrument(skip(client), fields(url = %url))]
pub async fn fetch(
    client: &Client,
    url: &Url,
    depth: usize,
    id: u64,
    timeout: Duration,
    user_agent: &str,
) -> CrawlResult {
    let start_time = Utc::now();
    let start_instant = std::time::Instant::now();

    let request = client
        .get(url.clone())
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.5");

    let (status_code, response_body, errors) =
        match tokio::time::timeout(timeout, request.send()).await {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                let is_text = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(|ct| ct.trim_start().starts_with("text/"))
                    .unwrap_or(false);

                if (200..300).contains(&status) && is_text {
                    match response.text().await {
                        Ok(body) => (status, Some(body), Vec::new()),
                        Err(err) => (
                            status,
                            None,
                            vec![format!("failed to read response body: {err}")],
                        ),
                    }
                } else {
                    (status, None, Vec::new())
                }
            }
            Ok(Err(err)) => (
                synthetic_status::CONNECTION_ERROR,
                None,
                vec![format!("network transport error: {err}")],
            ),
            Err(_) => (
                synthetic_status::TIMEOUT,
                None,
                vec![format!("request timed out after {}s", timeout.as_secs())],
            ),
        };

    let completion_time = Utc::now();
    let elapsed_ms = start_instant.elapsed().as_millis();

    CrawlResult {
        id,
        request_path: crate::normalize::normalize(url.as_str()),
        found_url: Some(url.to_string()),
        depth,
        status_code,
        response_body,
        errors,
        start_time,
        completion_time,
        elapsed_ms,
        links: Vec::new(),
    }
}
