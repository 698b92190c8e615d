//! Browse articles example
//!
//! Logs in (or reuses the saved session), loads the article list and prints
//! one page of it, the way a dashboard would render it.
//!
//! ```bash
//! EXAMPREP_USERNAME=ana EXAMPREP_PASSWORD=secret \
//!     cargo run --example browse_articles -- "graphs" dsa title_asc
//! ```
//!
//! Arguments (all optional): search term, subject filter, sort key, page
//! size (one of the configured options).

use examprep_client::format::{excerpt, format_date_time};
use examprep_client::listing::subject_label;
use examprep_client::{Config, Dashboard, PageSlot, QueryState, SortKey, connect};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let api = connect(&config)?;

    if !api.is_authenticated() {
        let username = std::env::var("EXAMPREP_USERNAME")?;
        let password = std::env::var("EXAMPREP_PASSWORD")?;
        if let Err(e) = api.login(&username, &password).await {
            eprintln!("{}", e.user_message("Login failed"));
            return Ok(());
        }
    }

    let dashboard = Dashboard::new(api);
    if let Err(e) = dashboard.refresh().await {
        eprintln!("{}", e.user_message("Failed to load articles"));
        return Ok(());
    }

    let mut args = std::env::args().skip(1);
    let mut query = QueryState::from_config(&config.listing);
    if let Some(term) = args.next() {
        query.set_search_term(term);
    }
    if let Some(subject) = args.next() {
        query.set_subject_filter(&subject);
    }
    if let Some(sort) = args.next() {
        query.set_sort_key(sort.parse::<SortKey>()?);
    }
    if let Some(size) = args.next() {
        query.set_page_size(size.parse()?)?;
    }

    let stats = dashboard.stats().await;
    println!(
        "{} articles, {} favorites, {} pinned",
        stats.total, stats.favorites, stats.pinned
    );
    let subjects: Vec<String> = dashboard
        .subject_options()
        .await
        .into_iter()
        .map(|o| o.label)
        .collect();
    println!("Subjects: {}", subjects.join(", "));
    println!("Sorted by: {}", query.sort_key().label());

    dashboard
        .view(&query, |view| {
            if view.visible.is_empty() {
                println!("No articles match.");
                return;
            }
            println!(
                "Showing {}-{} of {} (page {}/{})",
                view.page_start, view.page_end, view.total_filtered, view.page, view.total_pages
            );
            for article in &view.visible {
                let marks = match (article.pinned, article.favorite) {
                    (true, true) => "📌★ ",
                    (true, false) => "📌 ",
                    (false, true) => "★ ",
                    (false, false) => "",
                };
                println!(
                    "\n{marks}{} [{}]",
                    article.title,
                    subject_label(&article.normalized_subject())
                );
                println!(
                    "  Created: {}",
                    format_date_time(
                        article
                            .created_at
                            .map(|t| t.with_timezone(&chrono::Local))
                            .as_ref()
                    )
                );
                println!("  {}", excerpt(article.content.as_deref(), 100));
                if !article.files.is_empty() {
                    println!("  Files: {}", article.files.join(", "));
                }
            }
            if view.total_pages > 1 {
                let bar: Vec<String> = view
                    .page_slots()
                    .into_iter()
                    .map(|slot| match slot {
                        PageSlot::Page(n) if n == view.page => format!("[{n}]"),
                        PageSlot::Page(n) => n.to_string(),
                        PageSlot::Gap => "…".to_string(),
                    })
                    .collect();
                println!("\nPages: {}", bar.join(" "));
            }
        })
        .await;

    Ok(())
}
