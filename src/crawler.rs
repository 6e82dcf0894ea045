//! C13: Crawl Orchestrator. Drives the frontier → robots → governor →
//! fetch → extract → admit loop, owning cancellation and termination.

use crate::error::{CrawlError, Result};
use crate::feeds;
use crate::fetch::fetch;
use crate::frontier::Frontier;
use crate::governor::RateGovernor;
use crate::links::extract_links;
use crate::model::{CrawlReport, CrawlResult};
use crate::normalize::normalize;
use crate::options::CrawlOptions;
use crate::progress::ProgressBroadcaster;
use crate::robots::RobotsRegistry;
use crate::sink;
use crate::sitemap::build_sitemap;
use crate::tracker::Tracker;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use indexmap::IndexMap;
use regex::Regex;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use url::Url;

const PROGRESS_EVERY: usize = 10;
const DRAIN_POLL_MS: u64 = 50;

/// Entry point for running a bounded, polite crawl.
pub struct Crawler {
    client: Client,
}

impl Crawler {
    /// Build a crawler with a default `reqwest::Client`.
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }

    /// Build a crawler around a caller-supplied client (e.g. one already
    /// wrapped in the host application's cache/retry/telemetry decorators).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Run a crawl to completion with a fresh, never-cancelled token and a
    /// throwaway progress broadcaster. Use [`Crawler::run_cancellable`] to
    /// observe progress events or support external cancellation.
    pub async fn run(&self, options: CrawlOptions) -> Result<CrawlReport> {
        let progress = ProgressBroadcaster::new();
        self.run_cancellable(options, CancellationToken::new(), &progress)
            .await
    }

    /// Run a crawl to completion, publishing progress into `progress` and
    /// honoring cancellation via `token`.
    #[tracing::instrument(skip(self, options, token, progress), fields(seed = %options.seed_url))]
    pub async fn run_cancellable(
        &self,
        options: CrawlOptions,
        token: CancellationToken,
        progress: &ProgressBroadcaster,
    ) -> Result<CrawlReport> {
        let crawl_start = std::time::Instant::now();

        // --- Init ---
        if options.max_depth == 0 || options.max_pages == 0 || options.max_concurrent_requests == 0 {
            return Err(CrawlError::InvalidSeed(
                "max_depth, max_pages, and max_concurrent_requests must all be >= 1".into(),
            ));
        }
        let seed_url = parse_seed(&options.seed_url)?;
        let include_patterns = compile_patterns(&options.include_patterns)?;
        let exclude_patterns = compile_patterns(&options.exclude_patterns)?;

        let frontier = Frontier::new(options.max_depth);
        let robots = RobotsRegistry::new(self.client.clone(), options.user_agent.clone());
        let governor = RateGovernor::new(options.request_delay_ms, options.use_adaptive_rate_limiting);
        let tracker = Tracker::new();
        let results: RwLock<IndexMap<String, CrawlResult>> = RwLock::new(IndexMap::new());
        let next_id = AtomicU64::new(0);
        let timeout = Duration::from_secs(options.timeout_seconds);
        let output_dir: Option<PathBuf> = options.output_directory.as_ref().map(PathBuf::from);

        // --- Seeded ---
        if options.respect_robots_txt {
            let started = std::time::Instant::now();
            robots.process_host(&seed_url).await;
            tracker.record("robots_txt_processing", started.elapsed()).await;
        }

        let normalized_seed = normalize(seed_url.as_str());
        frontier
            .try_admit(&normalized_seed, 0, &robots, options.respect_robots_txt)
            .await;

        if options.discover_from_sitemap_and_rss {
            let started = std::time::Instant::now();
            let discovered = feeds::discover(&self.client, &seed_url, timeout, &options.user_agent).await;
            for candidate in discovered {
                let normalized = normalize(&candidate);
                frontier
                    .try_admit(&normalized, 1, &robots, options.respect_robots_txt)
                    .await;
            }
            tracker.record("sitemap_processing", started.elapsed()).await;
        }

        progress.publish_started(frontier.len().await);

        // --- Running / Draining ---
        let mut in_flight = FuturesUnordered::new();
        let mut since_progress = 0usize;
        let mut current_depth = 1usize;

        loop {
            // Count in-flight fetches against max_pages too, not just
            // completed ones, so a wide fan-out can't dispatch more workers
            // than the remaining page budget before any of them finish.
            while in_flight.len() < options.max_concurrent_requests
                && !token.is_cancelled()
                && results.read().await.len() + in_flight.len() < options.max_pages
            {
                let Some(entry) = frontier.pop().await else {
                    break;
                };
                current_depth = current_depth.max(entry.depth);
                in_flight.push(self.process_entry(
                    entry,
                    &seed_url,
                    &options,
                    &frontier,
                    &robots,
                    &governor,
                    &tracker,
                    &token,
                    timeout,
                    &include_patterns,
                    &exclude_patterns,
                    output_dir.as_deref(),
                    &next_id,
                ));
            }

            if in_flight.is_empty() {
                let drained = frontier.is_empty().await;
                let limit_reached = results.read().await.len() >= options.max_pages;
                if drained || limit_reached || token.is_cancelled() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(DRAIN_POLL_MS)).await;
                continue;
            }

            if let Some(outcome) = in_flight.next().await {
                if let Some(result) = outcome {
                    let queue_count = frontier.len().await;
                    results.write().await.insert(result.request_path.clone(), result);
                    since_progress += 1;
                    if since_progress >= PROGRESS_EVERY {
                        progress.publish_progress(results.read().await.len(), queue_count, current_depth);
                        since_progress = 0;
                    }
                }
            }
        }

        while let Some(outcome) = in_flight.next().await {
            if let Some(result) = outcome {
                results.write().await.insert(result.request_path.clone(), result);
            }
        }

        // --- Done ---
        let mut final_results: Vec<CrawlResult> = results.into_inner().into_values().collect();
        final_results.sort_by_key(|r| r.id);

        let sitemap_started = std::time::Instant::now();
        let sitemap_xml = build_sitemap(&final_results);
        tracker.record("sitemap_processing", sitemap_started.elapsed()).await;

        if options.generate_sitemap {
            if let Some(path) = &options.sitemap_output_path {
                if let Err(err) = tokio::fs::write(path, &sitemap_xml).await {
                    tracing::warn!(path, %err, "failed to write sitemap to disk");
                }
            }
        }

        tracker.log_summary(crawl_start.elapsed()).await;
        progress.publish_complete(final_results.len());

        Ok(CrawlReport {
            seed_url: options.seed_url,
            max_pages: options.max_pages,
            complete: !token.is_cancelled(),
            results: final_results,
            sitemap_xml,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_entry(
        &self,
        entry: crate::model::FrontierEntry,
        seed_url: &Url,
        options: &CrawlOptions,
        frontier: &Frontier,
        robots: &RobotsRegistry,
        governor: &RateGovernor,
        tracker: &Tracker,
        token: &CancellationToken,
        timeout: Duration,
        include_patterns: &[Regex],
        exclude_patterns: &[Regex],
        output_dir: Option<&std::path::Path>,
        next_id: &AtomicU64,
    ) -> Option<CrawlResult> {
        tokio::select! {
            _ = token.cancelled() => return None,
            _ = governor.wait(token) => {}
        }
        if token.is_cancelled() {
            return None;
        }

        let id = next_id.fetch_add(1, Ordering::Relaxed);
        let fetch_started = std::time::Instant::now();
        let url = match Url::parse(&entry.url) {
            Ok(url) => url,
            Err(_) => {
                return Some(CrawlResult {
                    id,
                    request_path: entry.url.clone(),
                    found_url: Some(entry.url.clone()),
                    depth: entry.depth,
                    status_code: crate::model::synthetic_status::UNKNOWN,
                    response_body: None,
                    errors: vec!["admitted URL failed to re-parse".to_string()],
                    start_time: chrono::Utc::now(),
                    completion_time: chrono::Utc::now(),
                    elapsed_ms: 0,
                    links: Vec::new(),
                });
            }
        };

        let mut result = tokio::select! {
            _ = token.cancelled() => return None,
            result = fetch(&self.client, &url, entry.depth, id, timeout, &options.user_agent) => result,
        };
        tracker.record("page_crawl", fetch_started.elapsed()).await;
        governor.record_outcome(result.status_code).await;

        if result.is_success_text() {
            let body = result.response_body.clone().expect("is_success_text guarantees a body");
            let links = extract_links(
                &body,
                &url,
                seed_url,
                options.follow_external_links,
                include_patterns,
                exclude_patterns,
            );
            for link in &links {
                if !token.is_cancelled() {
                    frontier
                        .try_admit(link, entry.depth, robots, options.respect_robots_txt)
                        .await;
                }
            }
            result.links = links;

            if options.save_pages_to_disk {
                if let Some(dir) = output_dir {
                    if let Err(err) = sink::save(&url, &body, dir, options.validate_html).await {
                        result.errors.push(err.to_string());
                    }
                }
            }
        }

        Some(result)
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new().expect("default reqwest client construction cannot fail")
    }
}

fn parse_seed(seed_url: &str) -> Result<Url> {
    if seed_url.trim().is_empty() {
        return Err(CrawlError::InvalidSeed("seed URL is empty".into()));
    }
    let parsed = Url::parse(seed_url)
        .map_err(|e| CrawlError::InvalidSeed(format!("{seed_url}: {e}")))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(CrawlError::InvalidSeed(format!(
            "{seed_url}: scheme must be http or https"
        )));
    }
    Ok(parsed)
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| Regex::new(p).map_err(|e| CrawlError::InvalidSeed(format!("invalid pattern {p:?}: {e}"))))
        .collect()
}
