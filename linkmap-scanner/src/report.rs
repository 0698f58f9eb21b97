use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::warn;

/// Stand-in for the url column on records that describe a whole document
/// rather than a single link.
pub const URL_PLACEHOLDER: &str = "????";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub status: u16,
    pub url: String,
    pub source_sitemap: String,
    pub message: String,
}

impl ReportRecord {
    pub fn link(status: u16, url: &str, source_sitemap: &str, message: String) -> Self {
        Self {
            status,
            url: url.to_string(),
            source_sitemap: source_sitemap.to_string(),
            message,
        }
    }

    // Document failures put the reason in the sitemap column and the document
    // identifier in the message column; consumers depend on this layout.
    pub fn sitemap_not_found(document: &str) -> Self {
        Self {
            status: 404,
            url: URL_PLACEHOLDER.to_string(),
            source_sitemap: "Sitemap file not found".to_string(),
            message: document.to_string(),
        }
    }

    pub fn invalid_sitemap(document: &str) -> Self {
        Self {
            status: 500,
            url: URL_PLACEHOLDER.to_string(),
            source_sitemap: "Invalid sitemap url".to_string(),
            message: document.to_string(),
        }
    }

    /// Renders the record as one comma-separated line of quoted fields.
    /// Field values are interpolated verbatim, without quote escaping.
    pub fn csv_line(&self) -> String {
        format!(
            "\"{}\",\"{}\",\"{}\",\"{}\"",
            self.status, self.url, self.source_sitemap, self.message
        )
    }
}

/// Receives report records as they are produced. Traversal hands every
/// record to the sink immediately; nothing is accumulated on the caller side.
pub trait ReportSink {
    fn emit(&mut self, record: ReportRecord);
}

/// Production sink: one CSV line per record, written to the wrapped writer.
pub struct CsvReporter<W> {
    out: W,
}

impl<W: Write> CsvReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportSink for CsvReporter<W> {
    fn emit(&mut self, record: ReportRecord) {
        if let Err(e) = writeln!(self.out, "{}", record.csv_line()) {
            warn!("Failed to write report line: {}", e);
        }
    }
}

/// Collects records in memory instead of writing them out.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ReportRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemorySink {
    fn emit(&mut self, record: ReportRecord) {
        self.records.push(record);
    }
}
