//! C11: Sitemap Builder. Emits a `urlset` XML document over the
//! successfully-fetched URLs.

use crate::model::CrawlResult;
use chrono::Utc;
use indexmap::IndexSet;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Cursor;

const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Build the sitemap XML document over `results`, deduplicated, over exactly
/// the `200`-status URLs (§4.11).
pub fn build_sitemap(results: &[CrawlResult]) -> String {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let mut urls = IndexSet::new();
    for result in results {
        if result.status_code == 200 {
            urls.insert(result.request_path.clone());
        }
    }

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .expect("writing to an in-memory buffer cannot fail");

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_XMLNS));
    writer.write_event(Event::Start(urlset.clone())).unwrap();

    for url in &urls {
        writer.write_event(Event::Start(BytesStart::new("url"))).unwrap();

        writer.write_event(Event::Start(BytesStart::new("loc"))).unwrap();
        writer
            .write_event(Event::Text(BytesText::new(url)))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new("loc"))).unwrap();

        writer.write_event(Event::Start(BytesStart::new("lastmod"))).unwrap();
        writer
            .write_event(Event::Text(BytesText::new(&today)))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new("lastmod"))).unwrap();

        writer.write_event(Event::Start(BytesStart::new("changefreq"))).unwrap();
        writer
            .write_event(Event::Text(BytesText::new("weekly")))
            .unwrap();
        writer.write_event(Event::End(BytesEnd::new("changefreq"))).unwrap();

        writer.write_event(Event::Start(BytesStart::new("priority"))).unwrap();
        writer.write_event(Event::Text(BytesText::new("0.5"))).unwrap();
        writer.write_event(Event::End(BytesEnd::new("priority"))).unwrap();

        writer.write_event(Event::End(BytesEnd::new("url"))).unwrap();
    }

    writer.write_event(Event::End(BytesEnd::new("urlset"))).unwrap();

    String::from_utf8(writer.into_inner().into_inner()).expect("sitemap XML is valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(path: &str, status: u16) -> CrawlResult {
        let now = Utc::now();
        CrawlResult {
            id: 0,
            request_path: path.to_string(),
            found_url: None,
            depth: 1,
            status_code: status,
            response_body: None,
            errors: Vec::new(),
            start_time: now,
            completion_time: now,
            elapsed_ms: 0,
            links: Vec::new(),
        }
    }

    #[test]
    fn includes_only_200_status_deduplicated() {
        let results = vec![
            result("http://t/", 200),
            result("http://t/about", 200),
            result("http://t/about", 200),
            result("http://t/missing", 404),
        ];
        let xml = build_sitemap(&results);
        assert!(xml.contains("<loc>http://t/</loc>"));
        assert!(xml.contains("<loc>http://t/about</loc>"));
        assert!(!xml.contains("missing"));
        assert_eq!(xml.matches("<url>").count(), 2);
        assert!(xml.contains(SITEMAP_XMLNS));
    }
}
