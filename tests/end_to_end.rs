//! End-to-end crawl scenarios against a mocked HTTP server, one per
//! behavior described for the crawl orchestrator: linear link-following,
//! depth/page bounds, robots.txt exclusion, adaptive backoff, and
//! sitemap-driven discovery.

use polite_crawler::{Crawler, CrawlerBuilder};
use std::sync::Once;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber once per test binary, so crawl spans/events
/// surface in `cargo test -- --nocapture` instead of going nowhere.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

fn html_with_link(href: &str) -> String {
    format!(r#"<html><body><a href="{href}">next</a></body></html>"#)
}

async fn mount_empty_robots(server: &MockServer) {
    init_tracing();
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn follows_links_across_a_two_page_site() {
    let server = MockServer::start().await;
    mount_empty_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_with_link("/page-2"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>leaf page</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(3)
        .with_max_pages(10)
        .with_request_delay_ms(0)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.complete);
    assert!(report
        .results
        .iter()
        .all(|r| r.status_code == 200 && r.response_body.is_some()));
}

#[tokio::test]
async fn stops_at_max_depth() {
    let server = MockServer::start().await;
    mount_empty_robots(&server).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_with_link("/a"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_with_link("/b"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_with_link("/c"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    // max_depth=1: seed is depth 1, /a discovered at depth 2 is over the
    // bound and must never be admitted, so only the seed is fetched.
    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(1)
        .with_max_pages(100)
        .with_request_delay_ms(0)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].depth, 1);
}

#[tokio::test]
async fn stops_at_max_pages_on_a_star_graph() {
    // Seed links to 10 siblings at once (a star graph), with a
    // concurrency level that lets multiple siblings dispatch in the same
    // admission round before any of them complete. max_pages must bound
    // the *total* crawl exactly, not just what's finished when the
    // admission loop last checked.
    let server = MockServer::start().await;
    mount_empty_robots(&server).await;

    let seed_body = format!(
        "<html><body>{}</body></html>",
        (1..=10)
            .map(|i| format!(r#"<a href="/p{i}">p{i}</a>"#))
            .collect::<String>()
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(seed_body)
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    for i in 1..=10 {
        Mock::given(method("GET"))
            .and(path(format!("/p{i}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>leaf</body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;
    }

    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(10)
        .with_max_pages(5)
        .with_max_concurrent_requests(3)
        .with_request_delay_ms(0)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 5);
}

#[tokio::test]
async fn honors_robots_disallow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /secret\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html_with_link("/secret"))
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    // No mock for /secret: if the crawler requested it despite the
    // disallow rule, it would show up as an extra entry in report.results.

    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(5)
        .with_max_pages(10)
        .with_request_delay_ms(0)
        .with_robots(true)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 1);
}

#[tokio::test]
async fn adaptive_backoff_recovers_after_timeouts() {
    let server = MockServer::start().await;
    mount_empty_robots(&server).await;

    // Delay the response well past the crawler's request timeout so each
    // fetch records a synthetic timeout outcome, driving the rate
    // governor's adaptive backoff.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_millis(300)))
        .mount(&server)
        .await;

    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(1)
        .with_max_pages(1)
        .with_request_delay_ms(10)
        .with_timeout_seconds(1)
        .with_adaptive_rate_limiting(true)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 1);
    // 408 is the synthetic "request timed out" status from the fetcher.
    assert_eq!(report.results[0].status_code, 408);
}

#[tokio::test]
async fn discovers_seeds_from_sitemap() {
    let server = MockServer::start().await;
    mount_empty_robots(&server).await;

    let sitemap = format!(
        r#"<?xml version="1.0"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<url><loc>{}/rendered-a</loc></url>
<url><loc>{}/rendered-b</loc></url>
</urlset>"#,
        server.uri(),
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rss.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/feed.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/atom.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>no links here</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rendered-a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>a</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rendered-b"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body>b</body></html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let options = CrawlerBuilder::new()
        .with_seed_url(server.uri())
        .with_max_depth(5)
        .with_max_pages(10)
        .with_request_delay_ms(0)
        .with_feed_discovery(true)
        .build();

    let crawler = Crawler::new().unwrap();
    let report = crawler.run(options).await.unwrap();

    assert_eq!(report.results.len(), 3);
    assert!(report
        .results
        .iter()
        .any(|r| r.request_path.ends_with("/rendered-a")));
    assert!(report
        .results
        .iter()
        .any(|r| r.request_path.ends_with("/rendered-b")));
}
