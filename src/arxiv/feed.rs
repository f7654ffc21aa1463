//! Atom feed parsing for arXiv export API responses.
//!
//! The feed layout is fixed and shallow, so entries are sliced out by tag
//! rather than run through a general XML parser.

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use super::client::SearchProviderError;
use super::types::PaperRecord;

const PDF_BASE: &str = "https://arxiv.org/pdf/";

pub(super) fn parse_feed(xml: &str) -> Result<Vec<PaperRecord>, SearchProviderError> {
    if !xml.contains("<feed") {
        return Err(SearchProviderError::Parse(
            "response is not an Atom feed".to_string(),
        ));
    }

    let mut papers = Vec::new();
    for entry in blocks(xml, "<entry>", "</entry>") {
        let id = tag_text(entry, "id").unwrap_or_default();
        // arXiv reports malformed queries as a single pseudo-entry.
        if id.contains("/api/errors") {
            let message = tag_text(entry, "summary")
                .map(|s| normalize_whitespace(&s))
                .unwrap_or_else(|| "unknown query error".to_string());
            return Err(SearchProviderError::Api { code: 400, message });
        }
        match parse_entry(entry) {
            Some(paper) => papers.push(paper),
            None => debug!(%id, "skipping feed entry without id or title"),
        }
    }
    Ok(papers)
}

fn parse_entry(entry: &str) -> Option<PaperRecord> {
    let url = tag_text(entry, "id").filter(|id| !id.is_empty())?;
    let title = tag_text(entry, "title")
        .map(|t| normalize_whitespace(&t))
        .filter(|t| !t.is_empty())?;

    let authors = blocks(entry, "<author>", "</author>")
        .into_iter()
        .filter_map(|author| tag_text(author, "name"))
        .map(|name| normalize_whitespace(&name))
        .filter(|name| !name.is_empty())
        .collect();

    let summary = tag_text(entry, "summary")
        .map(|s| normalize_whitespace(&s))
        .unwrap_or_default();

    let published = tag_text(entry, "published").and_then(|p| parse_date(&p));

    let categories = open_tags(entry, "category")
        .into_iter()
        .filter_map(|tag| attribute(tag, "term"))
        .collect();

    let pdf_url = open_tags(entry, "link")
        .into_iter()
        .find(|tag| {
            attribute(tag, "title").as_deref() == Some("pdf")
                || attribute(tag, "type").as_deref() == Some("application/pdf")
        })
        .and_then(|tag| attribute(tag, "href"))
        .unwrap_or_else(|| derive_pdf_url(&url));

    Some(PaperRecord {
        title,
        authors,
        summary,
        published,
        url,
        pdf_url,
        categories,
    })
}

/// Slices every `open ... close` block, inclusive, in document order.
fn blocks<'a>(xml: &'a str, open: &str, close: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(pos) = xml[from..].find(open) {
        let start = from + pos;
        let Some(len) = xml[start..].find(close) else {
            break;
        };
        let end = start + len + close.len();
        found.push(&xml[start..end]);
        from = end;
    }
    found
}

/// Finds the start of `<tag` where the name is not merely a prefix of a longer tag name.
fn find_open(xml: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut search = from;
    while let Some(pos) = xml[search..].find(&needle) {
        let start = search + pos;
        let after = xml[start + needle.len()..].chars().next();
        if matches!(after, Some(c) if c == '>' || c == '/' || c.is_whitespace()) {
            return Some(start);
        }
        search = start + needle.len();
    }
    None
}

/// Every opening tag `<tag ...>` (or self-closing) as a raw slice, for attribute lookup.
fn open_tags<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(start) = find_open(xml, tag, from) {
        let Some(len) = xml[start..].find('>') else {
            break;
        };
        let end = start + len + 1;
        found.push(&xml[start..end]);
        from = end;
    }
    found
}

/// Unescaped text of the first `<tag>text</tag>`; empty for a self-closing tag.
fn tag_text(xml: &str, tag: &str) -> Option<String> {
    let start = find_open(xml, tag, 0)?;
    let open_end = start + xml[start..].find('>')?;
    if xml[..open_end].ends_with('/') {
        return Some(String::new());
    }
    let content_start = open_end + 1;
    let close = format!("</{tag}>");
    let content_end = content_start + xml[content_start..].find(&close)?;
    Some(unescape(xml[content_start..content_end].trim()))
}

fn attribute(tag: &str, name: &str) -> Option<String> {
    let needle = format!(" {name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(unescape(&tag[start..start + len]))
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s.trim().get(..10)?, "%Y-%m-%d").ok())
}

fn derive_pdf_url(entry_id: &str) -> String {
    let arxiv_id = entry_id
        .split_once("/abs/")
        .map(|(_, id)| id)
        .unwrap_or_else(|| entry_id.rsplit('/').next().unwrap_or(entry_id));
    format!("{PDF_BASE}{arxiv_id}")
}

#[cfg(test)]
pub(crate) const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <link href="http://arxiv.org/api/query?search_query%3Dall%3Aattention" rel="self" type="application/atom+xml"/>
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <id>http://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <opensearch:totalResults xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/">2</opensearch:totalResults>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on
    complex recurrent or convolutional neural networks.
    </summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
    <author>
      <name>Niki Parmar</name>
    </author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2101.00001v1</id>
    <published>2021-01-01T00:00:00Z</published>
    <title>Graphs &amp; Transformers</title>
    <summary>Short.</summary>
    <author>
      <name>Ada Lovelace</name>
    </author>
    <category term="cs.AI" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_entries_in_order() {
        let papers = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Attention Is All You Need");
        assert_eq!(papers[1].title, "Graphs & Transformers");
    }

    #[test]
    fn parses_entry_fields() {
        let papers = parse_feed(SAMPLE_FEED).unwrap();
        let paper = &papers[0];

        assert_eq!(
            paper.authors,
            vec!["Ashish Vaswani", "Noam Shazeer", "Niki Parmar"]
        );
        assert_eq!(
            paper.summary,
            "The dominant sequence transduction models are based on complex recurrent or convolutional neural networks."
        );
        assert_eq!(paper.published, NaiveDate::from_ymd_opt(2017, 6, 12));
        assert_eq!(paper.url, "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(paper.pdf_url, "http://arxiv.org/pdf/1706.03762v7");
        assert_eq!(paper.categories, vec!["cs.CL", "cs.LG"]);
    }

    #[test]
    fn derives_pdf_url_when_link_missing() {
        let papers = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(papers[1].pdf_url, "https://arxiv.org/pdf/2101.00001v1");
    }

    #[test]
    fn feed_without_entries_is_empty() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#;
        assert!(parse_feed(xml).unwrap().is_empty());
    }

    #[test]
    fn non_feed_body_is_parse_error() {
        let result = parse_feed("<html><body>Service Unavailable</body></html>");
        assert!(matches!(result, Err(SearchProviderError::Parse(_))));
    }

    #[test]
    fn error_entry_is_api_error() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
          <entry>
            <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
            <title>Error</title>
            <summary>incorrect id format for 1234</summary>
          </entry>
        </feed>"#;
        match parse_feed(xml) {
            Err(SearchProviderError::Api { code: 400, message }) => {
                assert_eq!(message, "incorrect id format for 1234");
            }
            other => panic!("expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn entries_without_title_are_skipped() {
        let xml = r#"<feed>
          <entry><id>http://arxiv.org/abs/1</id></entry>
          <entry><id>http://arxiv.org/abs/2</id><title>Kept</title></entry>
        </feed>"#;
        let papers = parse_feed(xml).unwrap();
        assert_eq!(papers.len(), 1);
        assert_eq!(papers[0].title, "Kept");
    }

    #[test]
    fn tag_text_ignores_longer_tag_names() {
        let xml = "<identifier>nope</identifier><id>yes</id>";
        assert_eq!(tag_text(xml, "id").as_deref(), Some("yes"));
    }

    #[test]
    fn unescapes_entities_once() {
        assert_eq!(unescape("a &amp;lt; b"), "a &lt; b");
        assert_eq!(unescape("&quot;x&quot; &gt; y"), "\"x\" > y");
    }

    #[test]
    fn parse_date_accepts_date_prefix() {
        assert_eq!(parse_date("2020-02-29"), NaiveDate::from_ymd_opt(2020, 2, 29));
        assert_eq!(parse_date("garbage"), None);
    }
}
