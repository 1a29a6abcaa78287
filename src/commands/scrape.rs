//! Scrape command handler: fetch, extract, export one file per page.

use std::collections::HashSet;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use scrapehub_core::export::{ExportFormat, ExportOptions, export_filename, numbered_filename};
use scrapehub_core::extract::{ExtractionRule, RuleSet, available_fields, parse_selector_lines};
use scrapehub_core::fetch::{AuthConfig, Fetcher, FetcherConfig};
use scrapehub_core::{collect_targets, extract, write_records};
use tracing::{debug, info, warn};

use crate::app_config::{
    DEFAULT_CONCURRENCY, DEFAULT_FILE_URL_LIMIT, DEFAULT_MANUAL_URL_LIMIT, FileConfig,
};
use crate::cli::ScrapeArgs;

pub async fn run_scrape_command(args: &ScrapeArgs, config: &FileConfig) -> Result<()> {
    let Some((input, limit)) = read_input(args, config)? else {
        println!("No input provided. Pass URLs as arguments, use --file, or pipe them via stdin.");
        return Ok(());
    };

    let targets = collect_targets(&input, limit)?;
    if targets.is_empty() {
        println!("No URLs found in input.");
        return Ok(());
    }

    let rules = build_rule_set(&args.fields, &args.selectors)?;
    let auth = resolve_auth(args)?;

    let mut fetcher_config = FetcherConfig::default();
    if let Some(secs) = args.timeout.or(config.fetch_timeout_secs) {
        fetcher_config.default_timeout = Duration::from_secs(secs);
    }
    if let Some(redirects) = config.max_redirects {
        fetcher_config.max_redirects = usize::try_from(redirects).unwrap_or(usize::MAX);
    }
    let fetcher = Fetcher::with_config(fetcher_config).context("Failed to build HTTP client")?;
    let timeout = fetcher.default_timeout();

    let concurrency = args
        .concurrency
        .map(usize::from)
        .or_else(|| config.concurrency.and_then(|c| usize::try_from(c).ok()))
        .unwrap_or(DEFAULT_CONCURRENCY);

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    if !args.list_fields {
        fs::create_dir_all(&output_dir).with_context(|| {
            format!("Failed to create output directory '{}'", output_dir.display())
        })?;
    }
    let options = ExportOptions {
        overwrite: args
            .overwrite
            .resolve()
            .or(config.overwrite)
            .unwrap_or(true),
    };

    info!(
        targets = targets.len(),
        concurrency,
        rules = rules.len(),
        auth = auth.kind(),
        "Starting scrape"
    );

    let progress = ProgressBar::new(targets.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // buffered keeps results in input order
    let results: Vec<_> = stream::iter(targets.into_iter().map(|target| {
        let fetcher = &fetcher;
        let auth = &auth;
        let progress = &progress;
        async move {
            let result = fetcher.fetch(&target, auth, timeout).await;
            progress.inc(1);
            (target, result)
        }
    }))
    .buffered(concurrency)
    .collect()
    .await;
    progress.finish_and_clear();

    let mut used_names = HashSet::new();
    let mut written = 0usize;
    let mut failed = 0usize;
    for (target, result) in results {
        let page = match result {
            Ok(page) => page,
            Err(error) => {
                warn!(url = %target.normalized_url, error = %error, "Fetch failed");
                println!("Failed: {} ({error})", target.normalized_url);
                failed += 1;
                continue;
            }
        };

        if args.list_fields {
            let fields: Vec<&str> = available_fields(&page)
                .into_iter()
                .map(|field| field.label())
                .collect();
            println!("{}: {}", target.normalized_url, fields.join(", "));
            written += 1;
            continue;
        }

        let extraction = extract(&page, &rules);
        let filename = unique_filename(&target.normalized_url, args.format, &mut used_names);
        let path = output_dir.join(&filename);
        match write_records(std::slice::from_ref(&extraction), args.format, &path, options) {
            Ok(()) => {
                debug!(url = %target.normalized_url, fields = extraction.len(), "Extraction written");
                println!("{} -> {}", target.normalized_url, path.display());
                written += 1;
            }
            Err(error) => {
                warn!(url = %target.normalized_url, error = %error, "Export failed");
                println!("Failed: {} ({error})", target.normalized_url);
                failed += 1;
            }
        }
    }

    info!(written, failed, "Scrape complete");
    if written == 0 && failed > 0 {
        bail!("All {failed} targets failed");
    }
    Ok(())
}

/// Joined input text and the URL cap that applies to its source.
fn read_input(args: &ScrapeArgs, config: &FileConfig) -> Result<Option<(String, usize)>> {
    let manual_limit = config
        .manual_url_limit
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(DEFAULT_MANUAL_URL_LIMIT);
    let file_limit = config
        .file_url_limit
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(DEFAULT_FILE_URL_LIMIT);

    if !args.urls.is_empty() {
        return Ok(Some((args.urls.join("\n"), manual_limit)));
    }
    if let Some(path) = &args.file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file '{}'", path.display()))?;
        return Ok(Some((text, file_limit)));
    }
    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(Some((buffer, file_limit)));
    }
    Ok(None)
}

fn build_rule_set(
    fields: &[scrapehub_core::CommonField],
    selectors: &[String],
) -> Result<RuleSet> {
    let mut rules: Vec<ExtractionRule> = fields.iter().copied().map(ExtractionRule::from).collect();
    for line in selectors {
        let parsed = parse_selector_lines(line)
            .with_context(|| format!("Invalid --select value '{line}'"))?;
        rules.extend(parsed);
    }
    if rules.is_empty() {
        return Ok(RuleSet::common_fields());
    }
    Ok(RuleSet::new(rules)?)
}

fn resolve_auth(args: &ScrapeArgs) -> Result<AuthConfig> {
    if let Some(pair) = &args.basic {
        return AuthConfig::parse_basic(pair)
            .ok_or_else(|| anyhow!("Invalid --basic value: expected USER:PASS"));
    }
    if let Some(token) = &args.bearer {
        return Ok(AuthConfig::bearer(token.as_str()));
    }
    if let Some(cookie) = &args.cookie {
        return Ok(AuthConfig::cookie(cookie.as_str()));
    }
    Ok(AuthConfig::None)
}

fn unique_filename(source: &str, format: ExportFormat, used: &mut HashSet<String>) -> String {
    let base = export_filename(source, format);
    let mut candidate = base.clone();
    let mut counter = 2;
    while !used.insert(candidate.clone()) {
        candidate = numbered_filename(&base, counter);
        counter += 1;
    }
    candidate
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use scrapehub_core::CommonField;

    #[test]
    fn test_unique_filename_numbers_collisions() {
        let mut used = HashSet::new();
        let first = unique_filename("https://a.com/wiki/Cat", ExportFormat::Csv, &mut used);
        let second = unique_filename("https://b.com/Cat", ExportFormat::Csv, &mut used);
        let third = unique_filename("https://c.com/Cat/", ExportFormat::Csv, &mut used);
        assert_eq!(first, "Cat.csv");
        assert_eq!(second, "Cat-2.csv");
        assert_eq!(third, "Cat-3.csv");
    }

    #[test]
    fn test_build_rule_set_defaults_to_common_fields() {
        let rules = build_rule_set(&[], &[]).unwrap();
        assert_eq!(rules.len(), CommonField::ALL.len());
    }

    #[test]
    fn test_build_rule_set_mixes_fields_and_selectors() {
        let rules = build_rule_set(
            &[CommonField::Title],
            &["price: span.price".to_string()],
        )
        .unwrap();
        let labels: Vec<&str> = rules.rules().iter().map(ExtractionRule::label).collect();
        assert_eq!(labels, vec!["title", "price"]);
    }

    #[test]
    fn test_build_rule_set_rejects_reserved_label() {
        assert!(build_rule_set(&[], &["url: a".to_string()]).is_err());
    }

    #[test]
    fn test_build_rule_set_rejects_bad_selector_line() {
        let err = build_rule_set(&[], &["no separator".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Invalid --select value"));
    }
}
