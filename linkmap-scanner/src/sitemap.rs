use crate::error::{Result, ScanError};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Classification of a parsed sitemap document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSitemap {
    /// Index document: locations of child sitemap documents.
    Index(Vec<String>),
    /// Leaf document: locations of pages to check.
    Leaf(Vec<String>),
    /// Well-formed XML that carries neither sitemap nor url entries.
    Invalid,
}

#[derive(Clone, Copy)]
enum EntryKind {
    Sitemap,
    Url,
}

/// Parses a sitemap document and classifies it in a single pass. Sitemap
/// entries take precedence: a document carrying both kinds is an index and
/// its url entries are dropped.
///
/// Malformed XML and documents with no elements beyond the root are errors,
/// not [`ParsedSitemap::Invalid`].
pub fn parse(xml: &str) -> Result<ParsedSitemap> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut sitemap_locs: Vec<String> = Vec::new();
    let mut url_locs: Vec<String> = Vec::new();
    let mut saw_sitemap = false;
    let mut saw_url = false;
    let mut root_seen = false;
    let mut saw_element = false;
    let mut entry: Option<EntryKind> = None;
    let mut in_loc = false;
    let mut loc: Option<String> = None;

    loop {
        match reader
            .read_event()
            .map_err(|e| ScanError::XmlError(e.to_string()))?
        {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if root_seen {
                    saw_element = true;
                } else {
                    root_seen = true;
                }
                match name.as_str() {
                    "sitemap" if entry.is_none() => {
                        saw_sitemap = true;
                        entry = Some(EntryKind::Sitemap);
                        loc = None;
                    }
                    "url" if entry.is_none() => {
                        saw_url = true;
                        entry = Some(EntryKind::Url);
                        loc = None;
                    }
                    "loc" if entry.is_some() => in_loc = true,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if root_seen {
                    saw_element = true;
                } else {
                    root_seen = true;
                }
                // Self-closing entries carry no loc but still decide the
                // document kind.
                match name.as_str() {
                    "sitemap" if entry.is_none() => saw_sitemap = true,
                    "url" if entry.is_none() => saw_url = true,
                    _ => {}
                }
            }
            Event::Text(e) => {
                if in_loc {
                    let text = e
                        .unescape()
                        .map_err(|e| ScanError::XmlError(e.to_string()))?;
                    loc = Some(text.trim().to_string());
                }
            }
            Event::End(e) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "sitemap" | "url" => {
                        if let (Some(kind), Some(l)) = (entry, loc.take()) {
                            match kind {
                                EntryKind::Sitemap => sitemap_locs.push(l),
                                EntryKind::Url => url_locs.push(l),
                            }
                        }
                        entry = None;
                    }
                    "loc" => in_loc = false,
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_element {
        return Err(ScanError::XmlError("document has no entries".to_string()));
    }

    if saw_sitemap {
        Ok(ParsedSitemap::Index(sitemap_locs))
    } else if saw_url {
        Ok(ParsedSitemap::Leaf(url_locs))
    } else {
        Ok(ParsedSitemap::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_index_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap>
    <loc>https://example.com/sitemap-a.xml</loc>
    <lastmod>2024-01-15</lastmod>
  </sitemap>
  <sitemap>
    <loc>https://example.com/sitemap-b.xml</loc>
  </sitemap>
</sitemapindex>"#;

        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Index(vec![
                "https://example.com/sitemap-a.xml".to_string(),
                "https://example.com/sitemap-b.xml".to_string(),
            ])
        );
    }

    #[test]
    fn test_parse_leaf_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/one</loc>
    <lastmod>2024-01-15</lastmod>
    <priority>0.8</priority>
  </url>
  <url>
    <loc>https://example.com/two</loc>
  </url>
  <url>
    <loc>https://example.com/three</loc>
  </url>
</urlset>"#;

        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Leaf(vec![
                "https://example.com/one".to_string(),
                "https://example.com/two".to_string(),
                "https://example.com/three".to_string(),
            ])
        );
    }

    #[test]
    fn test_sitemap_entries_take_precedence_over_urls() {
        let xml = r#"<root>
  <url><loc>https://example.com/page</loc></url>
  <sitemap><loc>https://example.com/child.xml</loc></sitemap>
</root>"#;

        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Index(vec!["https://example.com/child.xml".to_string()])
        );
    }

    #[test]
    fn test_unrelated_elements_are_invalid() {
        let xml = r#"<feed><item><title>not a sitemap</title></item></feed>"#;
        assert_eq!(parse(xml).unwrap(), ParsedSitemap::Invalid);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let xml = r#"<urlset><url><loc>https://example.com</urlset>"#;
        assert!(parse(xml).is_err());
    }

    #[test]
    fn test_childless_root_is_an_error() {
        assert!(parse(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></urlset>"#).is_err());
    }

    #[test]
    fn test_non_xml_input_is_an_error() {
        assert!(parse("not xml at all").is_err());
    }

    #[test]
    fn test_prefixed_element_names_are_matched_by_local_name() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://example.com/page</sm:loc></sm:url>
</sm:urlset>"#;

        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Leaf(vec!["https://example.com/page".to_string()])
        );
    }

    #[test]
    fn test_entry_without_loc_is_skipped() {
        let xml = r#"<urlset>
  <url><lastmod>2024-01-15</lastmod></url>
  <url><loc>https://example.com/kept</loc></url>
</urlset>"#;

        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Leaf(vec!["https://example.com/kept".to_string()])
        );
    }

    #[test]
    fn test_self_closing_entries_still_classify_the_document() {
        assert_eq!(parse("<urlset><url/></urlset>").unwrap(), ParsedSitemap::Leaf(vec![]));
        assert_eq!(
            parse("<sitemapindex><sitemap/></sitemapindex>").unwrap(),
            ParsedSitemap::Index(vec![])
        );
    }

    #[test]
    fn test_loc_whitespace_is_trimmed() {
        let xml = "<urlset><url><loc>\n    https://example.com/padded\n  </loc></url></urlset>";
        let parsed = parse(xml).unwrap();
        assert_eq!(
            parsed,
            ParsedSitemap::Leaf(vec!["https://example.com/padded".to_string()])
        );
    }
}
