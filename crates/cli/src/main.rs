//! Waypoint CLI - customer project tracking from the terminal.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use waypoint_core::{MilestoneId, ProjectId, Time};
use waypoint_progress::{
    progress_percentage, BasicProjectTracker, MilestoneView, ProjectTracker, RiskLevel, TrackView,
};
use waypoint_storage::{JsonStorage, Storage};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Milestone risk and blocker tracking for customer projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Storage path for project snapshots
    #[arg(short, long, default_value = ".waypoint", env = "WAYPOINT_STORAGE")]
    storage: std::path::PathBuf,

    /// Evaluate as of this instant (RFC 3339) instead of the current time
    #[arg(long, global = true)]
    now: Option<Time>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects
    List,
    /// Show a project's tracking view
    Track {
        /// Project ID
        project: String,
    },
    /// Show one milestone's risk
    Risk {
        /// Project ID
        project: String,
        /// Milestone ID
        milestone: String,
    },
    /// Show what a project is waiting on
    Blocking {
        /// Project ID
        project: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Read the clock once so every evaluation in this run agrees.
    let now = cli.now.unwrap_or_else(chrono::Utc::now);
    debug!(%now, storage = %cli.storage.display(), "starting");

    let storage = std::sync::Arc::new(JsonStorage::new(&cli.storage).await?);
    let tracker = BasicProjectTracker::with_shared(storage.clone());

    match cli.command {
        Commands::List => {
            let projects = storage.list_projects().await?;
            let mut rows = Vec::with_capacity(projects.len());
            for project in projects {
                let milestones = storage.list_milestones(&project.id).await?;
                rows.push(ProjectRow {
                    progress_percentage: progress_percentage(&milestones),
                    milestones: milestones.len(),
                    id: project.id.to_string(),
                    name: project.name,
                    status: project.status.as_str(),
                });
            }

            if cli.json {
                print_json(&rows)?;
            } else {
                println!("Projects ({})", rows.len());
                for row in rows {
                    println!("  {} | {} | {:>3}% of {} - {}",
                        row.id,
                        row.status,
                        row.progress_percentage,
                        row.milestones,
                        row.name,
                    );
                }
            }
        }
        Commands::Track { project } => {
            let id = ProjectId::from(project);
            let view = tracker
                .track(&id, now)
                .await?
                .ok_or_else(|| anyhow!("Project not found: {}", id))?;

            if cli.json {
                print_json(&view)?;
            } else {
                print_track_view(&view);
            }
        }
        Commands::Risk { project, milestone } => {
            let project_id = ProjectId::from(project);
            let milestone_id = MilestoneId::from(milestone);
            let view = tracker
                .milestone_risk(&project_id, &milestone_id, now)
                .await?
                .ok_or_else(|| anyhow!("Milestone {} not found in project {}", milestone_id, project_id))?;

            if cli.json {
                print_json(&view)?;
            } else {
                print_milestone(&view, now);
            }
        }
        Commands::Blocking { project } => {
            let id = ProjectId::from(project);
            let waiting_on = tracker
                .waiting_on(&id)
                .await?
                .ok_or_else(|| anyhow!("Project not found: {}", id))?;

            if cli.json {
                print_json(&waiting_on)?;
            } else if waiting_on.is_empty() {
                println!("Nothing is blocked");
            } else {
                println!("Waiting on: {}", waiting_on.join(", "));
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRow {
    id: String,
    name: String,
    status: &'static str,
    milestones: usize,
    progress_percentage: u8,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_track_view(view: &TrackView) {
    println!("Project: {} ({})", view.project.name, view.project.status);
    if let Some(expected) = view.project.expected_completion_date {
        println!("  Expected completion: {}", expected.format("%Y-%m-%d"));
    }
    println!("  Progress: {}% ({}/{} milestones)",
        view.progress_percentage,
        view.completed_milestones,
        view.total_milestones,
    );
    if !view.waiting_on.is_empty() {
        println!("  Waiting on: {}", view.waiting_on.join(", "));
    }

    println!("Milestones");
    for m in &view.milestones {
        print_milestone(m, view.evaluated_at);
    }

    if !view.recent_activity.is_empty() {
        println!("Recent activity");
        for entry in &view.recent_activity {
            println!("  {} {}", entry.created_at.format("%Y-%m-%d %H:%M"), entry.message);
        }
    }
}

fn print_milestone(view: &MilestoneView, now: Time) {
    let m = &view.milestone;
    println!("  {} | {} | {} - {}",
        m.id,
        format_risk(view.risk_level),
        m.status,
        m.name,
    );
    if let Some(done) = m.completed_date {
        println!("      completed {}", done.format("%Y-%m-%d"));
    } else if let Some(target) = m.target_date {
        let days = waypoint_progress::days_until(target, now);
        if days < 0.0 {
            println!("      due {} ({:.1} days overdue)", target.format("%Y-%m-%d"), -days);
        } else {
            println!("      due {} (in {:.1} days)", target.format("%Y-%m-%d"), days);
        }
    }
    if !view.blocking_items.is_empty() {
        println!("      blocked by: {}", view.blocking_items.join(", "));
    }
}

fn format_risk(level: Option<RiskLevel>) -> &'static str {
    match level {
        Some(RiskLevel::Green) => "GREEN ",
        Some(RiskLevel::Yellow) => "YELLOW",
        Some(RiskLevel::Red) => "RED   ",
        None => "DONE  ",
    }
}
