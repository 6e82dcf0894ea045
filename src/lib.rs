//! A polite, bounded, breadth-first web crawler.
//!
//! Starts from a seed URL, follows in-domain hyperlinks up to configured
//! depth/page limits, respects `robots.txt` and adaptive rate-limit
//! signals, discovers additional URLs from `sitemap.xml`/RSS/Atom feeds,
//! and produces a per-page [`CrawlResult`] plus a consolidated sitemap.
//! Progress is streamed to subscribers during the crawl via
//! [`ProgressBroadcaster`].
//!
//! ```no_run
//! use polite_crawler::{Crawler, CrawlerBuilder};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let crawler = Crawler::new()?;
//! let options = CrawlerBuilder::new()
//!     .with_seed_url("https://example.com/")
//!     .with_max_depth(3)
//!     .with_max_pages(50)
//!     .build();
//! let report = crawler.run(options).await?;
//! println!("fetched {} pages", report.results.len());
//! # Ok(())
//! # }
//! ```

mod classify;
mod crawler;
mod csv_export;
mod error;
mod feeds;
mod fetch;
mod frontier;
mod governor;
mod links;
mod model;
mod normalize;
mod options;
mod progress;
mod robots;
mod sink;
mod sitemap;
mod tracker;

pub use crawler::Crawler;
pub use csv_export::to_csv;
pub use error::{CrawlError, Result};
pub use model::{CrawlReport, CrawlResult, FrontierEntry, ProgressEvent, ProgressKind};
pub use normalize::normalize;
pub use options::{CrawlOptions, CrawlerBuilder};
pub use progress::ProgressBroadcaster;

pub use tokio_util::sync::CancellationToken;
