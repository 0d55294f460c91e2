// src/extract/sitemap.rs
// =============================================================================
// Reads the <loc> entries out of a sitemap or sitemap index.
//
// Both kinds of sitemap list their URLs inside <loc> elements:
//   <urlset><url><loc>https://example.com/page</loc></url></urlset>
//   <sitemapindex><sitemap><loc>https://example.com/a.xml</loc></sitemap></sitemapindex>
// so we do not need to know which kind we got. Deciding what a URL points
// at is the resolver's job.
//
// quick-xml is a streaming reader: it hands us one event at a time (start
// tag, text, end tag) without building a tree, which suits large sitemaps.
// =============================================================================

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::CrawlError;

/// Returns the trimmed text of every `<loc>` element, in document order.
///
/// Prefixed tags such as `<sitemap:loc>` are matched by their local name.
/// Blank entries are dropped. Malformed XML is a `CrawlError::Parse`.
pub fn extract_locs(xml: &str) -> Result<Vec<String>, CrawlError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = true;
                current.clear();
            }
            Ok(Event::Text(e)) if in_loc => {
                current.push_str(&e.unescape().map_err(|err| CrawlError::Parse(err.to_string()))?);
            }
            Ok(Event::CData(e)) if in_loc => {
                current.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => {
                in_loc = false;
                let loc = current.trim();
                if !loc.is_empty() {
                    locs.push(loc.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CrawlError::Parse(format!(
                    "malformed sitemap at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    Ok(locs)
}
