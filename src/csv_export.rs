//! C14: CSV Exporter. Mechanical serializer of the §6 row contract — no
//! reflection, a hand-written column list.

use crate::model::CrawlResult;
use csv::{Terminator, WriterBuilder};

/// Serialize `results` to CSV per the row contract: one row per
/// [`CrawlResult`], `errors`/`links` rendered as element counts, the HTML
/// body excluded entirely.
pub fn to_csv(results: &[CrawlResult]) -> csv::Result<String> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record([
        "id",
        "request_path",
        "found_url",
        "depth",
        "status_code",
        "errors",
        "start_time",
        "completion_time",
        "elapsed_ms",
        "links",
    ])?;

    for result in results {
        writer.write_record(&[
            result.id.to_string(),
            result.request_path.clone(),
            result.found_url.clone().unwrap_or_default(),
            result.depth.to_string(),
            result.status_code.to_string(),
            result.errors.len().to_string(),
            result.start_time.to_rfc3339(),
            result.completion_time.to_rfc3339(),
            result.elapsed_ms.to_string(),
            result.links.len().to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes).expect("csv writer only emits valid UTF-8"))
}
