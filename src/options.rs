//! Crawl configuration. Defines bounds and behaviors for the crawling process.

use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "PoliteCrawler/0.1";

const MAX_DEPTH: usize = 5;
const MAX_PAGES: usize = 100;
const MAX_CONCURRENT_REQUESTS: usize = 3;
const REQUEST_DELAY_MS: u64 = 250;
const TIMEOUT_SECONDS: u64 = 10;

/// Configuration parameters for a single [`crate::Crawler::run`] call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrawlOptions {
    pub seed_url: String,
    pub max_pages: usize,
    pub max_depth: usize,
    pub request_delay_ms: u64,
    pub user_agent: String,
    pub respect_robots_txt: bool,
    pub discover_from_sitemap_and_rss: bool,
    pub save_pages_to_disk: bool,
    pub output_directory: Option<String>,
    pub validate_html: bool,
    pub timeout_seconds: u64,
    pub use_adaptive_rate_limiting: bool,
    pub max_concurrent_requests: usize,
    pub follow_external_links: bool,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub generate_sitemap: bool,
    pub sitemap_output_path: Option<String>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_pages: MAX_PAGES,
            max_depth: MAX_DEPTH,
            request_delay_ms: REQUEST_DELAY_MS,
            user_agent: USER_AGENT.into(),
            respect_robots_txt: true,
            discover_from_sitemap_and_rss: false,
            save_pages_to_disk: false,
            output_directory: None,
            validate_html: false,
            timeout_seconds: TIMEOUT_SECONDS,
            use_adaptive_rate_limiting: true,
            max_concurrent_requests: MAX_CONCURRENT_REQUESTS,
            follow_external_links: false,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            generate_sitemap: true,
            sitemap_output_path: None,
        }
    }
}

/// Builder pattern for [`CrawlOptions`]. Allows for customizable configurations.
pub struct CrawlerBuilder {
    options: CrawlOptions,
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlerBuilder {
    /// Initializes a new builder with default configuration and the given seed.
    pub fn new() -> Self {
        CrawlerBuilder {
            options: CrawlOptions::default(),
        }
    }

    pub fn with_seed_url<S: AsRef<str>>(mut self, seed_url: S) -> Self {
        self.options.seed_url = seed_url.as_ref().into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.options.max_depth = depth;
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.options.max_pages = pages;
        self
    }

    pub fn with_max_concurrent_requests(mut self, requests: usize) -> Self {
        self.options.max_concurrent_requests = requests;
        self
    }

    pub fn with_request_delay_ms(mut self, ms: u64) -> Self {
        self.options.request_delay_ms = ms;
        self
    }

    pub fn with_robots(mut self, respect: bool) -> Self {
        self.options.respect_robots_txt = respect;
        self
    }

    pub fn with_user_agent<S: AsRef<str>>(mut self, user_agent: S) -> Self {
        self.options.user_agent = user_agent.as_ref().into();
        self
    }

    pub fn with_feed_discovery(mut self, discover: bool) -> Self {
        self.options.discover_from_sitemap_and_rss = discover;
        self
    }

    pub fn with_save_pages_to_disk(mut self, output_directory: impl Into<String>) -> Self {
        self.options.save_pages_to_disk = true;
        self.options.output_directory = Some(output_directory.into());
        self
    }

    pub fn with_validate_html(mut self, validate: bool) -> Self {
        self.options.validate_html = validate;
        self
    }

    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.options.timeout_seconds = seconds;
        self
    }

    pub fn with_adaptive_rate_limiting(mut self, adaptive: bool) -> Self {
        self.options.use_adaptive_rate_limiting = adaptive;
        self
    }

    pub fn with_follow_external_links(mut self, follow: bool) -> Self {
        self.options.follow_external_links = follow;
        self
    }

    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.include_patterns = patterns;
        self
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.options.exclude_patterns = patterns;
        self
    }

    pub fn with_sitemap_output(mut self, path: impl Into<String>) -> Self {
        self.options.generate_sitemap = true;
        self.options.sitemap_output_path = Some(path.into());
        self
    }

    /// Consumes the builder and returns the configured [`CrawlOptions`].
    pub fn build(self) -> CrawlOptions {
        self.options
    }
}
