use crate::checker::LinkChecker;
use crate::error::Result;
use crate::report::{ReportRecord, ReportSink};
use crate::sitemap::{self, ParsedSitemap};
use reqwest::Client;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;
use url::Url;

pub struct SitemapResolver {
    client: Client,
    checker: LinkChecker,
}

impl SitemapResolver {
    pub fn new(concurrency: usize) -> Self {
        let client = Client::builder()
            .user_agent(concat!("linkmap/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            checker: LinkChecker::new(concurrency),
        }
    }

    /// Walks a sitemap document tree depth-first, emitting one record per
    /// checked link and one per document that cannot be resolved. Never
    /// fails: every error becomes a record and traversal moves on.
    pub async fn resolve<S: ReportSink + Send>(&self, document: &str, sink: &mut S) {
        self.resolve_boxed(document.to_string(), sink).await;
    }

    // Async recursion needs the boxed form.
    fn resolve_boxed<'a, S: ReportSink + Send>(
        &'a self,
        document: String,
        sink: &'a mut S,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let xml = match self.load(&document).await {
                Ok(xml) => xml,
                Err(e) => {
                    debug!("Failed to load sitemap {}: {}", document, e);
                    sink.emit(ReportRecord::sitemap_not_found(&document));
                    return;
                }
            };

            match sitemap::parse(&xml) {
                Ok(ParsedSitemap::Index(children)) => {
                    debug!("{} indexes {} child sitemaps", document, children.len());
                    // Children resolve sequentially, in document order.
                    for child in children {
                        self.resolve_boxed(child, &mut *sink).await;
                    }
                }
                Ok(ParsedSitemap::Leaf(urls)) => {
                    debug!("{} lists {} urls", document, urls.len());
                    self.checker.check(&document, &urls, sink).await;
                }
                Ok(ParsedSitemap::Invalid) => {
                    sink.emit(ReportRecord::invalid_sitemap(&document));
                }
                Err(e) => {
                    debug!("Failed to parse sitemap {}: {}", document, e);
                    sink.emit(ReportRecord::sitemap_not_found(&document));
                }
            }
        })
    }

    /// Loads a document over HTTP for http/https identifiers, from the
    /// filesystem for anything else. A non-success HTTP status is a load
    /// failure.
    async fn load(&self, document: &str) -> Result<String> {
        match Url::parse(document) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                let response = self
                    .client
                    .get(document)
                    .send()
                    .await?
                    .error_for_status()?;
                Ok(response.text().await?)
            }
            _ => Ok(tokio::fs::read_to_string(document).await?),
        }
    }
}
