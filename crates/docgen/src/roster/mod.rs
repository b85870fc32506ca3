//! Roster export ingestion.
//!
//! Exports from the registration system arrive either as CSV or as the HTML
//! table the system labels `.xls`. Either way the first row holds the column
//! names, blank and aggregate rows have no registration id, and dates use
//! `0001-01-01` to mean "none". The loader turns that into typed
//! [`OfficialRecord`]s, one per official per club.

pub mod domain;
mod mapping;
mod normalizer;
mod parser;

pub use domain::{
    CertificationLevel, Clinic, ClinicStatus, OfficialRecord, RegistrationStatus,
};
pub use normalizer::{get_date, is_valid_date, parse_date, SENTINEL_DATE};

use mapping::ColumnMap;
use normalizer::{is_yes, non_empty};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid roster CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid roster HTML data: {0}")]
    Html(String),
    #[error("roster export has no header row")]
    Empty,
    #[error("roster export is missing required column(s): {}", .missing.join(", "))]
    DataFormat { missing: Vec<String> },
}

/// Normalised, deduplicated set of officials in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    officials: Vec<OfficialRecord>,
}

impl Roster {
    pub fn new(records: Vec<OfficialRecord>) -> Self {
        Self {
            officials: deduplicate(records),
        }
    }

    pub fn officials(&self) -> &[OfficialRecord] {
        &self.officials
    }

    pub fn len(&self) -> usize {
        self.officials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.officials.is_empty()
    }

    /// Appends another export, folding duplicates into the existing records.
    pub fn merge(self, other: Roster) -> Roster {
        let mut records = self.officials;
        records.extend(other.officials);
        Roster::new(records)
    }
}

pub struct RosterLoader;

impl RosterLoader {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Roster, RosterError> {
        let file = std::fs::File::open(path.as_ref())?;
        let roster = Self::from_reader(file)?;
        info!(path = %path.as_ref().display(), officials = roster.len(), "loaded roster export");
        Ok(roster)
    }

    /// Loads several exports in order and merges them into one roster.
    pub fn from_paths<I, P>(paths: I) -> Result<Roster, RosterError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths
            .into_iter()
            .try_fold(Roster::default(), |roster, path| {
                Ok(roster.merge(Self::from_path(path)?))
            })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Roster, RosterError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Roster, RosterError> {
        let mut rows = parser::parse_table(content)?.rows.into_iter();
        let headers = rows.next().ok_or(RosterError::Empty)?;
        let columns =
            ColumnMap::from_headers(&headers).map_err(|missing| RosterError::DataFormat { missing })?;

        let mut records = Vec::new();
        for (offset, row) in rows.enumerate() {
            match build_record(&row, &columns) {
                Some(record) => records.push(record),
                None => debug!(row = offset + 2, "skipping row without registration id"),
            }
        }

        Ok(Roster::new(records))
    }
}

fn build_record(row: &[String], columns: &ColumnMap) -> Option<OfficialRecord> {
    let cell = |index: usize| row.get(index).map(String::as_str).unwrap_or_default();
    let optional_cell = |index: Option<usize>| index.map(cell).unwrap_or_default();

    let registration_id = non_empty(cell(columns.registration_id))?;

    let clinics = columns
        .clinics
        .iter()
        .map(|(clinic, positions)| {
            let status = ClinicStatus {
                completed: is_yes(optional_cell(positions.taken)),
                clinic_date: parse_date(optional_cell(positions.clinic_date)),
                signoff_1: parse_date(optional_cell(positions.signoff_1)),
                signoff_2: parse_date(optional_cell(positions.signoff_2)),
            };
            (*clinic, status)
        })
        .collect();

    Some(OfficialRecord {
        registration_id,
        last_name: cell(columns.last_name).trim().to_string(),
        first_name: cell(columns.first_name).trim().to_string(),
        email: cell(columns.email).trim().to_string(),
        club_code: cell(columns.club_code).trim().to_string(),
        club_full_name: cell(columns.club).trim().to_string(),
        affiliated_clubs: non_empty(optional_cell(columns.affiliated_clubs)),
        status: RegistrationStatus::parse(cell(columns.status)),
        certification: CertificationLevel::parse(cell(columns.certification)),
        clinics,
    })
}

/// Collapses rows sharing `(registration_id, club_code)`.
///
/// The more complete record wins (first seen on a tie); fields it lacks are
/// then filled from the other one.
fn deduplicate(records: Vec<OfficialRecord>) -> Vec<OfficialRecord> {
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut unique: Vec<OfficialRecord> = Vec::with_capacity(records.len());

    for record in records {
        match positions.get(&record.dedup_key()) {
            Some(&position) => {
                let existing = &mut unique[position];
                if record.completeness() > existing.completeness() {
                    let mut winner = record;
                    winner.fill_from(existing);
                    *existing = winner;
                } else {
                    existing.fill_from(&record);
                }
            }
            None => {
                positions.insert(record.dedup_key(), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}
