//! History command handler: list, show, or clear saved searches.

use anyhow::Result;
use scrapehub_core::SavedSearch;

use super::open_history_store;
use crate::app_config::FileConfig;
use crate::cli::HistoryArgs;

pub async fn run_history_command(args: &HistoryArgs, config: &FileConfig) -> Result<()> {
    let store = open_history_store(config).await?;

    if args.clear {
        let removed = store.clear().await?;
        println!("Removed {removed} saved searches.");
        return Ok(());
    }

    if let Some(id) = args.id {
        match store.get(id).await? {
            Some(saved) => {
                println!("{}", render_history_row(&saved));
                println!("{}", serde_json::to_string_pretty(&saved.query)?);
            }
            None => println!("No saved search with id {id}."),
        }
        return Ok(());
    }

    let saved = store.list().await?;
    if saved.is_empty() {
        println!("No saved searches.");
        return Ok(());
    }
    for search in &saved {
        println!("{}", render_history_row(search));
    }
    Ok(())
}

fn render_history_row(saved: &SavedSearch) -> String {
    let summary = saved.query.summary();
    format!(
        "#{:<4} {}  {:>5} results  {}",
        saved.id,
        saved.created_at.format("%Y-%m-%d %H:%M"),
        saved.result_count,
        if summary.is_empty() { "(no filters)" } else { summary.as_str() }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scrapehub_core::JobSearchQuery;

    #[test]
    fn test_render_history_row() {
        let saved = SavedSearch {
            id: 3,
            query: JobSearchQuery::new().keywords("rust").location("Berlin"),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            result_count: 42,
        };
        assert_eq!(
            render_history_row(&saved),
            "#3    2025-03-01 09:30     42 results  keywords=rust location=Berlin"
        );
    }
}
