//! Jobs command handler: paginate a LinkedIn search, save it, export it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use scrapehub_core::export::{ExportOptions, export_filename};
use scrapehub_core::linkedin::{
    JobRecord, JobSearchQuery, LinkedInClient, LinkedInConfig, LinkedInCredentials,
    RateLimitTracker,
};
use scrapehub_core::write_records;
use tracing::{info, warn};

use super::open_history_store;
use crate::app_config::FileConfig;
use crate::cli::JobsArgs;

pub async fn run_jobs_command(args: &JobsArgs, config: &FileConfig) -> Result<()> {
    let query = build_query(args);
    let client = LinkedInClient::new(
        resolve_credentials(args, LinkedInCredentials::from_env()),
        linkedin_config(config),
        Arc::new(RateLimitTracker::new()),
    )?;

    if args.check_status {
        client.check_status().await?;
        println!("LinkedIn API is reachable and the access token was accepted.");
    }

    let mut session = client.submit(query)?;
    let mut records: Vec<JobRecord> = Vec::new();
    while session.pages_fetched() < args.pages && !session.is_exhausted() {
        match client.next_page(&mut session).await {
            Ok(page) => records.extend(page),
            Err(error) if !records.is_empty() => {
                warn!(error = %error, "Stopping pagination early");
                println!("Stopped after {} pages: {error}", session.pages_fetched());
                break;
            }
            Err(error) => return Err(error.into()),
        }
    }
    info!(
        session_id = session.id(),
        records = records.len(),
        pages = session.pages_fetched(),
        state = %session.state(),
        "Search finished"
    );

    if !args.no_history {
        let store = open_history_store(config).await?;
        let saved = store
            .append(session.query(), records.len() as u64)
            .await
            .context("Failed to save search to history")?;
        println!("Saved search #{}", saved.id);
    }

    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory '{}'", output_dir.display()))?;
    let path = output_dir.join(export_filename(session.id(), args.format));
    let options = ExportOptions {
        overwrite: args
            .overwrite
            .resolve()
            .or(config.overwrite)
            .unwrap_or(true),
    };
    write_records(&records, args.format, &path, options)?;
    println!("{} jobs -> {}", records.len(), path.display());
    Ok(())
}

fn build_query(args: &JobsArgs) -> JobSearchQuery {
    let mut query = JobSearchQuery {
        keywords: args.keywords.clone(),
        location: args.location.clone(),
        date_posted: args.date_posted,
        experience_levels: args.experience_levels.clone(),
        job_types: args.job_types.clone(),
        limit: args.limit,
        ..JobSearchQuery::default()
    };
    if let Some(sort) = args.sort {
        query.sort_by = sort;
    }
    query
}

/// Flag values win over the environment.
fn resolve_credentials(args: &JobsArgs, env: LinkedInCredentials) -> LinkedInCredentials {
    LinkedInCredentials::new(
        args.client_id.clone().unwrap_or(env.client_id),
        args.client_secret.clone().unwrap_or(env.client_secret),
        args.redirect_uri.clone().unwrap_or(env.redirect_uri),
        args.access_token.clone().unwrap_or(env.access_token),
    )
}

fn linkedin_config(config: &FileConfig) -> LinkedInConfig {
    let mut linkedin = LinkedInConfig::default();
    if let Some(base_url) = &config.linkedin_base_url {
        linkedin.base_url.clone_from(base_url);
    }
    if let Some(page_size) = config.linkedin_page_size.and_then(|v| u32::try_from(v).ok()) {
        linkedin.page_size = page_size;
    }
    linkedin
}
