use crate::cli::render_json;
use clap::Args;
use docgen::config::AppConfig;
use docgen::error::AppError;
use docgen::pathway::{recommend, RecommendationItem};
use docgen::pipeline::{spawn_run, PipelineConfig, RunSummary};
use docgen::report::FsDocumentStore;
use docgen::roster::{OfficialRecord, Roster, RosterLoader};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct RosterArgs {
    /// Roster exports (CSV or HTML .xls). Defaults to DOCGEN_OFFICIALS_LIST.
    pub(crate) files: Vec<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct GenerateArgs {
    #[command(flatten)]
    pub(crate) roster: RosterArgs,
    /// Directory for generated reports (defaults to DOCGEN_REPORT_DIRECTORY)
    #[arg(long)]
    pub(crate) report_dir: Option<PathBuf>,
    /// Skip officials whose registration is invoice pending
    #[arg(long)]
    pub(crate) no_invoice_pending: bool,
    /// Skip officials whose registration is account pending
    #[arg(long)]
    pub(crate) no_account_pending: bool,
    /// Skip officials whose registration is PSO pending
    #[arg(long)]
    pub(crate) no_pso_pending: bool,
}

#[derive(Debug, Serialize)]
struct OfficialRecommendations<'a> {
    registration_id: &'a str,
    name: String,
    club_code: &'a str,
    certification: Option<&'a str>,
    recommendations: Vec<RecommendationItem>,
}

pub(crate) fn run_load(config: &AppConfig, args: RosterArgs) -> Result<(), AppError> {
    let files = roster_files(config, args);
    let roster = RosterLoader::from_paths(&files)?;

    println!(
        "Loaded {} officials from {} file(s)",
        roster.len(),
        files.len()
    );
    for official in roster.officials() {
        println!("{}", roster_line(official));
    }
    Ok(())
}

pub(crate) fn run_recommend(
    config: &AppConfig,
    args: RosterArgs,
    json: bool,
) -> Result<(), AppError> {
    let roster = RosterLoader::from_paths(roster_files(config, args))?;
    let entries = recommendations(&roster);

    if json {
        println!("{}", render_json(&entries));
        return Ok(());
    }

    for entry in entries {
        println!(
            "{} ({}) - {}",
            entry.name,
            entry.club_code,
            entry.certification.unwrap_or("NONE")
        );
        if entry.recommendations.is_empty() {
            println!("  No further steps identified");
        }
        for item in &entry.recommendations {
            println!("  - {item}");
        }
    }
    Ok(())
}

pub(crate) async fn run_generate(config: &AppConfig, args: GenerateArgs) -> Result<(), AppError> {
    let pipeline = generate_config(config, &args);
    let roster = RosterLoader::from_paths(roster_files(config, args.roster))?;

    let summary = spawn_run(Arc::new(FsDocumentStore), pipeline, roster).await?;

    render_summary(&summary);
    Ok(())
}

fn roster_files(config: &AppConfig, args: RosterArgs) -> Vec<PathBuf> {
    if args.files.is_empty() {
        vec![config.reports.officials_list.clone()]
    } else {
        args.files
    }
}

fn generate_config(config: &AppConfig, args: &GenerateArgs) -> PipelineConfig {
    let mut pipeline = PipelineConfig::from(config);
    if let Some(dir) = &args.report_dir {
        pipeline.report_directory = dir.clone();
    }
    if args.no_invoice_pending {
        pipeline.statuses.invoice_pending = false;
    }
    if args.no_account_pending {
        pipeline.statuses.account_pending = false;
    }
    if args.no_pso_pending {
        pipeline.statuses.pso_pending = false;
    }
    pipeline
}

fn roster_line(official: &OfficialRecord) -> String {
    format!(
        "{:>10}  {:<32} {:<6} {:<16} {}",
        official.registration_id,
        official.display_name(),
        official.club_code,
        official.status.label(),
        official
            .certification
            .as_ref()
            .map(|level| level.label())
            .unwrap_or("NONE")
    )
}

fn recommendations(roster: &Roster) -> Vec<OfficialRecommendations<'_>> {
    roster
        .officials()
        .iter()
        .map(|official| OfficialRecommendations {
            registration_id: &official.registration_id,
            name: official.display_name(),
            club_code: &official.club_code,
            certification: official.certification.as_ref().map(|level| level.label()),
            recommendations: recommend(official),
        })
        .collect()
}

fn render_summary(summary: &RunSummary) {
    println!("Report generation complete");
    println!("  Clubs processed: {}", summary.clubs.len());
    for club in &summary.clubs {
        println!("    - {club}");
    }
    println!("  Officials considered: {}", summary.considered);
    println!("  Reports written: {}", summary.written);
    if summary.skipped > 0 {
        println!("  Reports skipped: {} (see log)", summary.skipped);
    }
    match &summary.manifest_path {
        Some(path) => println!("  Email list: {}", path.display()),
        None => println!("  Email list: not written (see log)"),
    }
    match &summary.composite_path {
        Some(path) => println!("  Full report: {}", path.display()),
        None => println!("  Full report: not written (see log)"),
    }
}
