//! Outcomes CLI - reporting over a dataset snapshot.

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::Level;
use outcomes_aggregation::{ReportingService, TwoLensReport};
use outcomes_core::{DateRange, ProgramId, Time};
use outcomes_storage::{Dataset, MemoryStore};

#[derive(Parser)]
#[command(name = "outcomes")]
#[command(about = "Outcome metrics reporting", long_about = None)]
struct Cli {
    /// Path to a JSON dataset snapshot
    #[arg(long)]
    dataset: PathBuf,

    /// Program to report on
    #[arg(long)]
    program: String,

    /// Window start (YYYY-MM-DD); defaults to one year ago
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD); defaults to today
    #[arg(long)]
    to: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Band distributions for scale metrics
    Distributions,
    /// Success rates for achievement metrics
    Achievements,
    /// Monthly band trend series
    Trends,
    /// Self-report vs staff-observed comparison
    TwoLens,
    /// Enrollment coverage audit
    Completeness,
}

fn window(from: Option<NaiveDate>, to: Option<NaiveDate>) -> DateRange {
    let to: Time = match to {
        Some(d) => d.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc(),
        None => Utc::now(),
    };
    let from: Time = match from {
        Some(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(),
        None => to - Duration::days(365),
    };
    DateRange::new(from, to)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    let dataset = Dataset::from_json(&std::fs::read_to_string(&cli.dataset)?)?;
    let store = Arc::new(MemoryStore::from_dataset(dataset));
    let service = ReportingService::new(store.clone(), store.clone());

    let program = ProgramId::new(cli.program);
    let range = window(cli.from, cli.to);

    match cli.command {
        Commands::Distributions => {
            let reports = service.metric_distributions(&program, range).await?;
            println!("Distributions ({})", reports.len());
            for report in reports {
                println!(
                    "  {} | total {} | new {}",
                    report.metric_name, report.total, report.new_participants
                );
                println!(
                    "    low {} ({:.1}%) | mid {} ({:.1}%) | high {} ({:.1}%)",
                    report.band_low.count,
                    report.band_low.pct,
                    report.band_mid.count,
                    report.band_mid.pct,
                    report.band_high.count,
                    report.band_high.pct,
                );
            }
        }
        Commands::Achievements => {
            let reports = service.achievement_rates(&program, range).await?;
            println!("Achievement rates ({})", reports.len());
            for report in reports {
                let target = report
                    .target_rate
                    .map(|t| format!(" (target {:.1}%)", t))
                    .unwrap_or_default();
                println!(
                    "  {} | {}/{} | {:.1}%{}",
                    report.metric_name, report.successes, report.total, report.rate_pct, target,
                );
            }
        }
        Commands::Trends => {
            let trends = service.metric_trends(&program, range).await?;
            for trend in trends {
                println!("{}", trend.metric_name);
                for point in trend.points {
                    println!(
                        "  {} | low {:.1}% | high {:.1}% | n={}",
                        point.month, point.band_low_pct, point.band_high_pct, point.total,
                    );
                }
            }
        }
        Commands::TwoLens => match service.two_lenses(&program, range).await? {
            TwoLensReport::InsufficientData {
                self_report_total,
                staff_observed_total,
            } => {
                println!(
                    "Insufficient data (self-report n={}, staff-observed n={})",
                    self_report_total, staff_observed_total,
                );
            }
            TwoLensReport::Comparison {
                self_report_pct,
                staff_observed_pct,
                gap_pct,
                direction,
            } => {
                println!("Self-report: {:.1}%", self_report_pct);
                println!("Staff-observed: {:.1}%", staff_observed_pct);
                println!("Gap: {:.1}% ({:?})", gap_pct, direction);
            }
        },
        Commands::Completeness => {
            let report = service.data_completeness(&program, range).await?;
            println!(
                "Enrolled {} | with scores {} | {:.1}% ({:?})",
                report.enrolled_count,
                report.with_scores_count,
                report.completeness_pct,
                report.level,
            );
        }
    }

    Ok(())
}
