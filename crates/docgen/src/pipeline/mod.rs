//! Report generation run: club partitioning, per-official documents and the
//! final aggregation.

pub mod worker;

pub use worker::{spawn_guarded_run, spawn_run, RunGate, RunGuard, RunHandle, WorkerError};

use crate::config::AppConfig;
use crate::pathway::recommend;
use crate::report::{
    write_composite, write_manifest, DocumentBuilder, DocumentStore, ManifestRow,
};
use crate::roster::{OfficialRecord, RegistrationStatus, Roster};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

pub const REPORT_DATE_FORMAT: &str = "%B %d %Y %I:%M%p";

/// Which registration statuses get reports; active officials always do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusFilter {
    pub invoice_pending: bool,
    pub account_pending: bool,
    pub pso_pending: bool,
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self {
            invoice_pending: true,
            account_pending: true,
            pso_pending: true,
        }
    }
}

impl StatusFilter {
    pub fn includes(&self, status: &RegistrationStatus) -> bool {
        match status {
            RegistrationStatus::Active => true,
            RegistrationStatus::InvoicePending => self.invoice_pending,
            RegistrationStatus::AccountPending => self.account_pending,
            RegistrationStatus::PsoPending => self.pso_pending,
            RegistrationStatus::Other(_) => false,
        }
    }
}

/// Settings a single run needs, captured when the run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineConfig {
    pub report_directory: PathBuf,
    pub report_file: String,
    pub email_list_csv: String,
    pub report_title: String,
    pub statuses: StatusFilter,
}

impl PipelineConfig {
    pub fn composite_path(&self) -> PathBuf {
        self.report_directory.join(&self.report_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.report_directory.join(&self.email_list_csv)
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        config.reports.pipeline()
    }
}

/// Officials of one club, in roster order.
#[derive(Debug, Clone)]
pub struct ClubGroup<'a> {
    pub club_code: String,
    pub club_full_name: String,
    pub officials: Vec<&'a OfficialRecord>,
}

/// Outcome of one run; failures after loading are recorded, not raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub clubs: Vec<String>,
    pub considered: usize,
    pub written: usize,
    pub skipped: usize,
    pub manifest: Vec<ManifestRow>,
    pub manifest_path: Option<PathBuf>,
    pub composite_path: Option<PathBuf>,
}

/// Groups officials by primary club, ascending by club code.
///
/// Clubs are discovered from rows that are not affiliated sub-club entries;
/// each group then collects every official carrying that club code, less
/// those who have graduated off the pathway.
pub fn partition(roster: &Roster) -> Vec<ClubGroup<'_>> {
    let mut clubs: BTreeMap<&str, &str> = BTreeMap::new();
    for official in roster.officials() {
        if official.is_primary_club() {
            clubs
                .entry(official.club_code.as_str())
                .or_insert(official.club_full_name.as_str());
        }
    }

    clubs
        .into_iter()
        .map(|(code, name)| ClubGroup {
            club_code: code.to_string(),
            club_full_name: name.to_string(),
            officials: roster
                .officials()
                .iter()
                .filter(|official| official.club_code == code)
                .filter(|official| {
                    !official
                        .certification
                        .as_ref()
                        .is_some_and(|level| level.is_graduated())
                })
                .collect(),
        })
        .collect()
}

pub struct Pipeline<'a> {
    store: &'a dyn DocumentStore,
    config: PipelineConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(store: &'a dyn DocumentStore, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn run(&self, roster: &Roster) -> RunSummary {
        self.run_at(roster, Local::now())
    }

    pub fn run_at(&self, roster: &Roster, now: DateTime<Local>) -> RunSummary {
        info!(officials = roster.len(), "report generation started");
        let report_date = now.format(REPORT_DATE_FORMAT).to_string();
        let mut builder = DocumentBuilder::new(
            self.store,
            &self.config.report_directory,
            &self.config.report_title,
        );
        let mut summary = RunSummary::default();

        for club in partition(roster) {
            info!(club = %club.club_full_name, code = %club.club_code, "processing club");
            for official in club
                .officials
                .iter()
                .filter(|official| self.config.statuses.includes(&official.status))
            {
                summary.considered += 1;
                let recommendations = recommend(official);
                match builder.build(official, &club.club_full_name, &report_date, &recommendations)
                {
                    Ok(row) => {
                        summary.written += 1;
                        summary.manifest.push(row);
                    }
                    Err(err) => {
                        summary.skipped += 1;
                        warn!(
                            official = %official.display_name(),
                            error = %err,
                            "error processing official"
                        );
                    }
                }
            }
            summary.clubs.push(club.club_full_name);
        }

        let manifest_path = self.config.manifest_path();
        info!(path = %manifest_path.display(), "creating email list");
        match write_manifest(self.store, &summary.manifest, &manifest_path) {
            Ok(()) => summary.manifest_path = Some(manifest_path),
            Err(err) => warn!(error = %err, "unable to save email list"),
        }

        let composite_path = self.config.composite_path();
        info!(path = %composite_path.display(), "creating master document");
        match write_composite(
            self.store,
            &summary.manifest,
            &self.config.report_title,
            &composite_path,
        ) {
            Ok(()) => summary.composite_path = Some(composite_path),
            Err(err) => warn!(error = %err, "unable to save full report"),
        }

        info!(
            written = summary.written,
            skipped = summary.skipped,
            "report generation complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::RosterLoader;

    const EXPORT: &str = "Registration Id,Last Name,First Name,Email,ClubCode,Club,AffiliatedClubs,Status,Current_CertificationLevel\n\
        1,Young,Ann,ann@example.com,ZED,Zed Swim,,Active,\n\
        2,Adams,Bob,bob@example.com,ABC,Alpha Aquatics,,Invoice Pending,LEVEL I - RED PIN\n\
        3,Brown,Cy,cy@example.com,ABC,Alpha Aquatics,,Active,LEVEL IV - GREEN PIN\n\
        4,Clark,Di,di@example.com,ABC,Alpha Aquatics,ZED,Active,\n\
        5,Doe,Ed,ed@example.com,MID,Mid Club,ABC,Active,\n\
        6,Eve,Fay,fay@example.com,ABC,Alpha Aquatics,,Suspended,\n\
        7,Gray,Gus,gus@example.com,ABC,Alpha Aquatics,,Active,LEVEL V - BLUE PIN\n";

    #[test]
    fn clubs_sorted_by_code_from_primary_rows() {
        let roster = RosterLoader::from_str(EXPORT).expect("roster");
        let groups = partition(&roster);

        let codes: Vec<&str> = groups.iter().map(|g| g.club_code.as_str()).collect();
        assert_eq!(codes, vec!["ABC", "ZED"]);

        let abc: Vec<&str> = groups[0]
            .officials
            .iter()
            .map(|o| o.registration_id.as_str())
            .collect();
        assert_eq!(abc, vec!["2", "4", "6"]);
    }

    #[test]
    fn status_filter_always_includes_active() {
        let filter = StatusFilter {
            invoice_pending: false,
            account_pending: true,
            pso_pending: false,
        };
        assert!(filter.includes(&RegistrationStatus::Active));
        assert!(!filter.includes(&RegistrationStatus::InvoicePending));
        assert!(filter.includes(&RegistrationStatus::AccountPending));
        assert!(!filter.includes(&RegistrationStatus::PsoPending));
        assert!(!filter.includes(&RegistrationStatus::Other("Lapsed".to_string())));
    }

    #[test]
    fn config_paths_join_report_directory() {
        let config = PipelineConfig {
            report_directory: PathBuf::from("/out"),
            report_file: "all.html".to_string(),
            email_list_csv: "list.csv".to_string(),
            report_title: "Report".to_string(),
            statuses: StatusFilter::default(),
        };
        assert_eq!(config.composite_path(), PathBuf::from("/out/all.html"));
        assert_eq!(config.manifest_path(), PathBuf::from("/out/list.csv"));
    }
}
