mod arguments;

use arguments::Args;
use clap::Parser;
use linkmap_scanner::{CsvReporter, SitemapResolver};
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries only the report stream.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Args = Args::parse();

    let resolver = SitemapResolver::new(args.concurrency);
    let mut sink = CsvReporter::new(io::stdout());
    resolver.resolve(&args.sitemap, &mut sink).await;
}
