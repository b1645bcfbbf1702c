use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use match_motion_analytics::{analysis, ingest, report, AnalysisConfig, InjurySelectionPolicy};

#[derive(Parser)]
#[command(name = "motion-report")]
#[command(about = "Movement, fatigue and injury-risk metrics from tracked player detections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Tracker export with frame, entity id and box corners per row ("-" for stdin)
    #[arg(long)]
    csv: PathBuf,
    /// JSON file overriding analysis thresholds
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    injury_policy: Option<InjurySelectionPolicy>,
    /// Entities per top-N ranking (overrides the config file)
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit chart requests for the renderer as JSON
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the match summary and rankings
    Summary {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

struct LoadedRun {
    analysis: analysis::AnalysisReport,
    config: AnalysisConfig,
    source: String,
    rows_read: usize,
    rejected: usize,
}

fn load_config(input: &InputArgs) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &input.config {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(policy) = input.injury_policy {
        config.injury_policy = policy;
    }
    if let Some(limit) = input.limit {
        config.ranking_limit = limit;
    }
    config.validate()?;
    Ok(config)
}

fn run(input: &InputArgs) -> anyhow::Result<LoadedRun> {
    let config = load_config(input)?;
    let outcome = if input.csv.as_os_str() == "-" {
        ingest::read_detections(std::io::stdin().lock())
    } else {
        ingest::load_csv(&input.csv)
    }
    .with_context(|| format!("failed to read detections from {}", input.csv.display()))?;

    if outcome.rejected_count() > 0 {
        warn!(
            rejected = outcome.rejected_count(),
            rows = outcome.rows_read(),
            "skipped malformed detection rows"
        );
    }
    info!(records = outcome.records.len(), "detections loaded");

    let analysis = analysis::analyze(&outcome.records, &config);
    Ok(LoadedRun {
        analysis,
        config,
        source: input.csv.display().to_string(),
        rows_read: outcome.rows_read(),
        rejected: outcome.rejected_count(),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("match_motion_analytics=info,motion_report=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { input, out } => {
            let loaded = run(&input)?;
            let envelope = report::ReportEnvelope::new(
                &loaded.analysis,
                &loaded.config,
                &loaded.source,
                loaded.rows_read,
                loaded.rejected,
            );
            let json = serde_json::to_string_pretty(&envelope)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!(
                        "Wrote {} chart requests to {}.",
                        loaded.analysis.requests.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Commands::Summary { input } => {
            let loaded = run(&input)?;
            let analysis = &loaded.analysis;

            if let Err(err) = analysis.require_entities() {
                info!(%err, "nothing to summarize");
                println!("No tracked entities found.");
                return Ok(());
            }

            let summary = &analysis.summary;
            println!("Match summary:");
            println!("- {} players", summary.entity_count);
            println!("- avg frames {:.2}", summary.mean_frame_count);
            println!("- avg distance {:.2}", summary.mean_distance);
            if let (Some(best), Some(worst)) = (&summary.best_performer, &summary.worst_performer) {
                println!(
                    "- top player {} ({:.2}), lowest player {} ({:.2})",
                    best.entity_id, best.distance_moved, worst.entity_id, worst.distance_moved
                );
            }

            println!("Top players by distance moved:");
            for entry in &analysis.top_distance {
                println!(
                    "- {} moved {:.2} across {} frames",
                    entry.entity_id, entry.distance_moved, entry.frames_appeared
                );
            }

            println!("Top players by fatigue indicators:");
            for aggregate in &analysis.fatigue {
                println!(
                    "- {} with {} low activity frames",
                    aggregate.entity_id, aggregate.low_activity_frame_count
                );
            }

            for candidate in &analysis.reported_injuries {
                println!(
                    "Potential injury: player {} stopped in {} of the last {} frames.",
                    candidate.entity_id, candidate.trailing_stop_count, loaded.config.injury_window
                );
            }
        }
        Commands::Report { input, out } => {
            let loaded = run(&input)?;
            let report =
                report::build_markdown(&loaded.source, Utc::now(), loaded.rejected, &loaded.analysis);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
