use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// URL or path of the root sitemap document
    pub sitemap: String,

    /// Maximum number of concurrent link checks per batch
    #[arg(default_value_t = 1)]
    pub concurrency: usize,
}
