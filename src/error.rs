//! Error taxonomy for the crawler core.
//!
//! Per-page failures never propagate as `Err` out of the orchestrator; they are
//! recorded on the affected [`crate::model::CrawlResult`]. Only configuration
//! and orchestrator-invariant failures are returned from [`crate::Crawler::run`].

use thiserror::Error;

/// Error kinds produced by the crawler core.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL (or another required option) is missing or malformed.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// DNS, connection, TLS, or reset-style transport failure.
    #[error("network transport error fetching {url}: {source}")]
    NetworkTransport {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// The per-request timeout elapsed before a response arrived.
    #[error("timed out fetching {0}")]
    Timeout(String),

    /// HTML body could not be parsed for link extraction.
    #[error("failed to parse HTML body of {0}: {1}")]
    ParseHtml(String, String),

    /// `robots.txt` content could not be parsed; caller should fail open.
    #[error("failed to parse robots.txt for host {0}: {1}")]
    ParseRobots(String, String),

    /// A sitemap/RSS/Atom feed could not be parsed; caller should skip it.
    #[error("failed to parse feed {0}: {1}")]
    ParseFeed(String, String),

    /// Filesystem sink failed to persist a page.
    #[error("failed to save page {0} to disk: {1}")]
    SinkIo(String, String),

    /// The crawl was cancelled before completion.
    #[error("crawl cancelled")]
    Cancelled,

    /// An invariant was violated inside the orchestrator itself.
    #[error("crawl failed: {0}")]
    CrawlFatal(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
