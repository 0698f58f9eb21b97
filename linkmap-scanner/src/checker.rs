use crate::report::{ReportRecord, ReportSink};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

/// Status reported for a request that never produced an HTTP response.
pub const NO_RESPONSE_STATUS: u16 = 0;

pub struct LinkChecker {
    client: Client,
    concurrency: usize,
}

impl LinkChecker {
    pub fn new(concurrency: usize) -> Self {
        // Redirects must surface as 301/302 statuses, so the client never
        // follows them.
        let client = Client::builder()
            .user_agent(concat!("linkmap/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    /// Checks every url of one leaf document. Urls are processed in
    /// contiguous batches of at most the configured concurrency: all requests
    /// of a batch are in flight together, and the next batch starts only once
    /// the whole batch has been reported.
    pub async fn check(
        &self,
        source_sitemap: &str,
        urls: &[String],
        sink: &mut (dyn ReportSink + Send),
    ) {
        for batch in urls.chunks(self.concurrency) {
            let mut handles = Vec::with_capacity(batch.len());
            for url in batch {
                let client = self.client.clone();
                let url = url.clone();
                handles.push(tokio::spawn(async move { probe(&client, &url).await }));
            }

            // Join every handle before emitting anything: the sink sees a
            // batch only once the whole batch has terminated.
            let mut outcomes = Vec::with_capacity(batch.len());
            for (handle, url) in handles.into_iter().zip(batch) {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!("Link check task for {} failed: {}", url, e);
                        Outcome {
                            status: NO_RESPONSE_STATUS,
                            redirect: None,
                        }
                    }
                };
                outcomes.push(outcome);
            }

            for (outcome, url) in outcomes.into_iter().zip(batch) {
                let message = match outcome.redirect {
                    Some(target) => format!("Redirected to: {}", target),
                    None => "Link Good".to_string(),
                };
                sink.emit(ReportRecord::link(
                    outcome.status,
                    url,
                    source_sitemap,
                    message,
                ));
            }
        }
    }
}

struct Outcome {
    status: u16,
    redirect: Option<String>,
}

async fn probe(client: &Client, url: &str) -> Outcome {
    match client.get(url).send().await {
        Ok(response) => {
            let status = response.status();
            // Only 301 and 302 count as redirects; other 3xx statuses are
            // reported like any other code.
            let redirect = if matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND) {
                Some(redirect_target(&response, url))
            } else {
                None
            };
            Outcome {
                status: status.as_u16(),
                redirect,
            }
        }
        Err(e) => {
            debug!("Request to {} failed: {}", url, e);
            Outcome {
                status: NO_RESPONSE_STATUS,
                redirect: None,
            }
        }
    }
}

/// Absolute form of the Location header, or an empty string when the
/// response carries none.
fn redirect_target(response: &reqwest::Response, request_url: &str) -> String {
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if location.is_empty() {
        return String::new();
    }

    match Url::parse(request_url).and_then(|base| base.join(location)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => location.to_string(),
    }
}
