use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use linkdash::analytics::{
    AnalyticsAggregator, CategoryBreakdown, DateRange, FixedClock, SystemClock,
};
use linkdash::config::Config;
use linkdash::links::{LinkCollectionController, StatusFilter};
use linkdash::storage::{Fixture, InMemorySource, LinkSource};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "linkdash-admin")]
#[command(about = "Inspect link fixtures from the command line", long_about = None)]
struct Cli {
    /// Fixture file (defaults to FIXTURE_PATH)
    #[arg(long, global = true)]
    fixture: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List links
    Links {
        /// Case-insensitive search over title, short code and URL
        #[arg(long)]
        search: Option<String>,
        /// active, archived or all
        #[arg(long, default_value = "active")]
        status: StatusFilter,
    },
    /// Print the analytics snapshot of a link
    Analytics {
        /// Link ID
        link_id: String,
        /// last7days, last30days, last3months or alltime
        #[arg(long, default_value = "last30days")]
        range: DateRange,
        /// Explicit window start (YYYY-MM-DD), requires --end
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// Explicit window end (YYYY-MM-DD), requires --start
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        /// Resolve presets relative to this day instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn print_breakdown(title: &str, breakdown: &CategoryBreakdown, total: u64) {
    println!("\n{title}:");
    if breakdown.is_empty() {
        println!("  (no clicks)");
        return;
    }
    for entry in breakdown.entries() {
        println!(
            "  {:<30} {:>8} {:>6.1}%",
            entry.name,
            entry.value,
            entry.percentage(total) * 100.0
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let path = cli
        .fixture
        .or(config.data.fixture_path.clone())
        .context("No fixture given: pass --fixture or set FIXTURE_PATH")?;
    let source = Arc::new(InMemorySource::from_fixture(Fixture::load(&path).await?));

    match cli.command {
        Commands::Links { search, status } => {
            let mut controller = LinkCollectionController::new(source.fetch_link_summaries().await?);
            controller.set_status_filter(status);
            if let Some(search) = search {
                controller.set_search_term(search);
            }

            let visible = controller.visible_links();
            if visible.is_empty() {
                println!("No links found.");
            } else {
                println!("{:<12} {:<30} {:<12} {:>8}", "ID", "Title", "Short code", "Clicks");
                println!("{}", "-".repeat(66));
                for link in visible {
                    println!(
                        "{:<12} {:<30} {:<12} {:>8}",
                        link.id, link.title, link.short_code, link.click_count
                    );
                }
            }
        }
        Commands::Analytics {
            link_id,
            range,
            start,
            end,
            today,
        } => {
            let range = match (start, end) {
                (Some(start), Some(end)) => DateRange::between(start, end)?,
                _ => range,
            };

            let aggregator = match today {
                Some(day) => AnalyticsAggregator::new_with_config(
                    source,
                    Arc::new(FixedClock(day)),
                    config.data.short_domain.clone(),
                    config.analytics.limits(),
                ),
                None => AnalyticsAggregator::new_with_config(
                    source,
                    Arc::new(SystemClock),
                    config.data.short_domain.clone(),
                    config.analytics.limits(),
                ),
            };

            let snapshot = aggregator.get_snapshot(&link_id, range).await?;
            println!("{} -> {}", snapshot.short_url, snapshot.original_url);
            println!(
                "{} clicks between {} and {}",
                snapshot.total_clicks, snapshot.range.start, snapshot.range.end
            );

            println!("\nClicks per day:");
            for point in &snapshot.click_series {
                println!("  {}  {:>6}", point.date, point.clicks);
            }

            let total = snapshot.total_clicks;
            print_breakdown("Devices", &snapshot.device_breakdown, total);
            print_breakdown("Referrers", &snapshot.referrer_breakdown, total);
            print_breakdown("Locations", &snapshot.location_breakdown, total);
        }
    }

    Ok(())
}
