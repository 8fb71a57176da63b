use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use lotto_draws::config;
use lotto_draws::database::{get_draw_page, get_draw_with_neighbours, open_database};
use lotto_draws::ingest::{self, IngestOutcome};
use lotto_draws::landing::landing_bundle;
use lotto_draws::seed;
use lotto_draws::source::{self, SourceKind};
use lotto_draws::stats::{
    cold_numbers, extended_recommendations, number_detail, recommendations, top_numbers,
};
use lotto_draws::types::DrawSummary;
use lotto_draws::utils::format_amount;

#[derive(Parser)]
#[command(name = "lotto-draws", about = "Lotto 6/45 draw ingestion and statistics")]
struct Cli {
    /// SQLite database path (overrides LOTTO_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch missing draws from the operator
    Fetch {
        /// First draw number (default: newest stored + 1)
        #[arg(long = "from")]
        from: Option<u32>,
        /// Last draw number (default: latest available)
        #[arg(long = "to")]
        to: Option<u32>,
        /// Acquisition strategy (overrides LOTTO_SOURCE)
        #[arg(long)]
        source: Option<SourceKind>,
    },

    /// Backfill draws from the results spreadsheet (.xlsx) or a CSV export
    Seed {
        #[arg(short, long)]
        file: PathBuf,
        /// Delete stored draws before loading
        #[arg(long)]
        clear: bool,
    },

    /// List stored draws, newest first
    List {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Show one draw with its neighbours
    Show { draw_no: u32 },

    /// Hot and cold numbers over all draws
    Stats {
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Detail statistics for a single number (1-45)
    Number { number: i64 },

    /// Today's recommendation sets
    Recommend {
        /// Ten strategies instead of three
        #[arg(long)]
        extended: bool,
    },

    /// Landing page bundle
    Landing,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load()?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path.clone());
    let conn = open_database(&db_path)
        .with_context(|| format!("cannot open database {}", db_path.display()))?;
    let today = Local::now().date_naive();

    match cli.command {
        Command::Fetch { from, to, source: strategy } => {
            let kind = strategy.unwrap_or(config.source);
            let draw_source = source::from_config(&config, kind)?;
            cmd_fetch(&conn, draw_source.as_ref(), from, to, cli.json).await
        }
        Command::Seed { file, clear } => cmd_seed(&conn, &file, clear, cli.json),
        Command::List { page } => {
            let page = get_draw_page(&conn, page)?;
            if cli.json {
                return print_json(&page);
            }
            println!("📋 Page {}/{} ({} draws)", page.page, page.total_pages, page.total_draws);
            for draw in &page.draws {
                print_draw(draw);
            }
            Ok(())
        }
        Command::Show { draw_no } => {
            let Some(found) = get_draw_with_neighbours(&conn, draw_no)? else {
                bail!("draw {} is not stored", draw_no);
            };
            if cli.json {
                return print_json(&found);
            }
            print_draw(&found.draw);
            println!(
                "   1st prize {}원 x {} | sales {}원",
                format_amount(found.draw.first_prize),
                found.draw.first_prize_winners,
                format_amount(found.draw.total_sales)
            );
            if let Some(prev) = &found.prev_draw {
                println!("   ← previous: #{}", prev.draw_no);
            }
            if let Some(next) = &found.next_draw {
                println!("   → next: #{}", next.draw_no);
            }
            Ok(())
        }
        Command::Stats { top } => {
            let hot = top_numbers(&conn, top)?;
            let cold = cold_numbers(&conn, top)?;
            if cli.json {
                return print_json(&serde_json::json!({ "hot": hot, "cold": cold }));
            }
            println!("🔥 Most drawn:");
            for c in &hot {
                println!("   {:>2}  x{}", c.number, c.count);
            }
            println!("🧊 Least drawn:");
            for c in &cold {
                println!("   {:>2}  x{}", c.number, c.count);
            }
            Ok(())
        }
        Command::Number { number } => {
            let detail = number_detail(&conn, number)?;
            if cli.json {
                return print_json(&detail);
            }
            println!("🎱 Number {}", detail.number);
            println!(
                "   drawn {} times in {} draws ({:.1}%)",
                detail.total_count, detail.total_draws, detail.appearance_rate
            );
            println!(
                "   last 10/30/100: {}/{}/{} | trend: {:?}",
                detail.last_10, detail.last_30, detail.last_100, detail.trend
            );
            if let Some(last) = &detail.last_appeared {
                println!("   last seen in #{} ({}), {} draws ago", last.draw_no, last.draw_date, last.draws_ago);
            }
            let companions: Vec<String> = detail
                .companions
                .iter()
                .map(|c| format!("{}(x{})", c.number, c.count))
                .collect();
            println!("   often drawn with: {}", companions.join(", "));
            Ok(())
        }
        Command::Recommend { extended } => {
            let sets = if extended {
                extended_recommendations(&conn, today, 10)?
            } else {
                recommendations(&conn, today)?
            };
            if cli.json {
                return print_json(&sets);
            }
            println!("🤖 Recommendations for {}", today);
            for set in &sets {
                println!(
                    "   {}  {:?}  {}%  {}",
                    set.set_name, set.numbers, set.confidence, set.strategy
                );
            }
            Ok(())
        }
        Command::Landing => {
            let bundle = landing_bundle(&conn, today)?;
            if cli.json {
                return print_json(&bundle);
            }
            if bundle.placeholder {
                println!("⚠ No draws stored yet, showing placeholder data.");
            }
            print_draw(&bundle.current_draw);
            println!("🍀 Today's numbers: {:?}", bundle.daily_numbers);
            for set in &bundle.recommendations {
                println!("   {}  {:?}  {}%", set.set_name, set.numbers, set.confidence);
            }
            println!("   {} recent draws, latest first", bundle.recent_draws.len());
            Ok(())
        }
    }
}

async fn cmd_fetch(
    conn: &Connection,
    draw_source: &dyn source::DrawSource,
    from: Option<u32>,
    to: Option<u32>,
    json: bool,
) -> Result<()> {
    let outcome = ingest::run(conn, draw_source, from, to).await?;
    if json {
        return print_json(&outcome);
    }
    match outcome {
        IngestOutcome::UpToDate { .. } => println!("✅ Already up to date."),
        IngestOutcome::Completed(report) => {
            println!("📥 Draws {} ~ {}", report.from, report.to);
            println!(
                "✅ Done! saved: {} (created: {}, updated: {}), failed: {}",
                report.saved(),
                report.created,
                report.updated,
                report.failed
            );
            if !report.failed_draws.is_empty() {
                println!("   failed draws: {:?}", report.failed_draws);
            }
        }
    }
    Ok(())
}

fn cmd_seed(conn: &Connection, file: &Path, clear: bool, json: bool) -> Result<()> {
    let report = seed::load(conn, file, clear)?;
    if json {
        return print_json(&report);
    }
    if clear {
        println!("🗑  Removed {} existing draws", report.cleared);
    }
    println!("📄 {} rows in {}", report.total_rows, file.display());
    println!(
        "✅ Done! created: {}, updated: {}, skipped: {}",
        report.created, report.updated, report.skipped
    );
    Ok(())
}

fn print_draw(draw: &DrawSummary) {
    println!(
        "   #{} ({})  {:?} + {}",
        draw.draw_no, draw.draw_date, draw.winning_numbers, draw.bonus_number
    );
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
