//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};
use scrapehub_core::CommonField;
use scrapehub_core::export::ExportFormat;
use scrapehub_core::linkedin::{DatePosted, ExperienceLevel, JobType, SortBy};

/// Extract structured records from web pages and LinkedIn job searches.
///
/// Scrapehub fetches pages (optionally authenticated), pulls common fields or
/// CSS-selected values out of them, and writes the results as CSV or JSON.
#[derive(Parser, Debug)]
#[command(name = "scrapehub")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/scrapehub/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch pages and export extracted fields, one file per page
    Scrape(ScrapeArgs),
    /// Run a LinkedIn job search and export the postings
    Jobs(JobsArgs),
    /// Show or clear saved job searches
    History(HistoryArgs),
}

/// Overwrite switches shared by exporting commands.
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct OverwriteArgs {
    /// Replace existing export files
    #[arg(long, overrides_with = "no_overwrite")]
    pub overwrite: bool,

    /// Fail instead of replacing existing export files
    #[arg(long, overrides_with = "overwrite")]
    pub no_overwrite: bool,
}

impl OverwriteArgs {
    /// Flag value, if either switch was given; the last one wins.
    pub fn resolve(self) -> Option<bool> {
        if self.overwrite {
            Some(true)
        } else if self.no_overwrite {
            Some(false)
        } else {
            None
        }
    }
}

/// Arguments for `scrapehub scrape`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("auth").args(["basic", "bearer", "cookie"])))]
pub struct ScrapeArgs {
    /// URLs to scrape (reads stdin when omitted and no --file is given)
    pub urls: Vec<String>,

    /// Read URLs from a file, one per line
    #[arg(short, long, value_name = "FILE", conflicts_with = "urls")]
    pub file: Option<PathBuf>,

    /// Common field to extract (title, headings, links, body_text, paragraphs, images,
    /// meta_description, link_text, image_alt, tables, lists, forms)
    #[arg(long = "field", value_name = "NAME")]
    pub fields: Vec<CommonField>,

    /// Custom rule as "label: css selector"
    #[arg(long = "select", value_name = "RULE")]
    pub selectors: Vec<String>,

    /// HTTP basic credentials as USER:PASS
    #[arg(long, value_name = "USER:PASS")]
    pub basic: Option<String>,

    /// Bearer token
    #[arg(long, value_name = "TOKEN")]
    pub bearer: Option<String>,

    /// Raw Cookie header value
    #[arg(long, value_name = "COOKIE")]
    pub cookie: Option<String>,

    /// Export format
    #[arg(long, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Directory export files are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,

    /// Concurrent page fetches (1-16)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: Option<u8>,

    /// Per-page timeout in seconds (1-3600)
    #[arg(short = 't', long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Print which common fields each page has instead of exporting
    #[arg(long)]
    pub list_fields: bool,
}

/// Arguments for `scrapehub jobs`.
#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Search keywords
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Location filter
    #[arg(short, long)]
    pub location: Option<String>,

    /// Posting age (past_day, past_week, past_month)
    #[arg(long, value_name = "AGE")]
    pub date_posted: Option<DatePosted>,

    /// Experience level, repeatable
    #[arg(long = "experience", value_name = "LEVEL")]
    pub experience_levels: Vec<ExperienceLevel>,

    /// Job type, repeatable
    #[arg(long = "job-type", value_name = "TYPE")]
    pub job_types: Vec<JobType>,

    /// Result ordering (relevance, recent)
    #[arg(long, value_name = "ORDER")]
    pub sort: Option<SortBy>,

    /// Records per page (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub limit: Option<u32>,

    /// Maximum pages to fetch (1-50)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub pages: u32,

    /// Check the access token against the API before searching
    #[arg(long)]
    pub check_status: bool,

    /// Export format
    #[arg(long, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,

    /// Directory the export file is written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub overwrite: OverwriteArgs,

    /// LinkedIn client id (default: $LINKEDIN_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,

    /// LinkedIn client secret (default: $LINKEDIN_CLIENT_SECRET)
    #[arg(long)]
    pub client_secret: Option<String>,

    /// LinkedIn redirect URI (default: $LINKEDIN_REDIRECT_URI)
    #[arg(long)]
    pub redirect_uri: Option<String>,

    /// LinkedIn access token (default: $LINKEDIN_ACCESS_TOKEN)
    #[arg(long)]
    pub access_token: Option<String>,

    /// Do not record this search in history
    #[arg(long)]
    pub no_history: bool,
}

/// Arguments for `scrapehub history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Show a single saved search
    #[arg(long, value_name = "ID", conflicts_with = "clear")]
    pub id: Option<i64>,

    /// Delete every saved search
    #[arg(long)]
    pub clear: bool,
}
