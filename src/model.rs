//! Value types produced and consumed by the crawler core.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single frontier entry: a URL awaiting a fetch, tagged with the depth it
/// was discovered at and a scheduling priority (lower sorts first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
    pub priority: u8,
}

/// Per-URL outcome of a single fetch, produced exactly once per admitted URL.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub id: u64,
    pub request_path: String,
    pub found_url: Option<String>,
    pub depth: usize,
    pub status_code: u16,
    pub response_body: Option<String>,
    pub errors: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub completion_time: DateTime<Utc>,
    pub elapsed_ms: u128,
    pub links: Vec<String>,
}

impl CrawlResult {
    pub fn is_success_text(&self) -> bool {
        self.status_code == 200 && self.response_body.is_some()
    }
}

/// Kind of a published [`ProgressEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressKind {
    Started,
    Progressed,
    Complete,
}

/// A progress notification published to subscribers during a crawl.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub kind: ProgressKind,
    pub crawled_count: usize,
    pub queue_count: usize,
    pub current_depth: usize,
    pub message: String,
}

/// The final outcome of a crawl, returned from [`crate::Crawler::run`].
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed_url: String,
    pub max_pages: usize,
    pub results: Vec<CrawlResult>,
    pub sitemap_xml: String,
    pub complete: bool,
}

/// Synthetic status codes standing in for transport-level failures (§3).
pub mod synthetic_status {
    pub const TIMEOUT: u16 = 408;
    pub const CONNECTION_ERROR: u16 = 503;
    pub const UNKNOWN: u16 = 500;
}
