use super::domain::Clinic;
use super::normalizer::normalize_header;
use std::collections::{BTreeMap, HashMap};

pub(crate) const REGISTRATION_ID: &str = "Registration Id";
pub(crate) const LAST_NAME: &str = "Last Name";
pub(crate) const FIRST_NAME: &str = "First Name";
pub(crate) const EMAIL: &str = "Email";
pub(crate) const CLUB_CODE: &str = "ClubCode";
pub(crate) const CLUB: &str = "Club";
pub(crate) const AFFILIATED_CLUBS: &str = "AffiliatedClubs";
pub(crate) const STATUS: &str = "Status";
pub(crate) const CERTIFICATION_LEVEL: &str = "Current_CertificationLevel";

const REQUIRED: &[&str] = &[
    REGISTRATION_ID,
    LAST_NAME,
    FIRST_NAME,
    EMAIL,
    CLUB_CODE,
    CLUB,
    STATUS,
    CERTIFICATION_LEVEL,
];

/// Column positions for one clinic; any of them may be missing from an export.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct ClinicColumns {
    pub(crate) taken: Option<usize>,
    pub(crate) clinic_date: Option<usize>,
    pub(crate) signoff_1: Option<usize>,
    pub(crate) signoff_2: Option<usize>,
}

#[derive(Debug)]
pub(crate) struct ColumnMap {
    pub(crate) registration_id: usize,
    pub(crate) last_name: usize,
    pub(crate) first_name: usize,
    pub(crate) email: usize,
    pub(crate) club_code: usize,
    pub(crate) club: usize,
    pub(crate) affiliated_clubs: Option<usize>,
    pub(crate) status: usize,
    pub(crate) certification: usize,
    pub(crate) clinics: BTreeMap<Clinic, ClinicColumns>,
}

impl ColumnMap {
    /// Resolves the header row, returning the names of any required columns
    /// that are absent.
    pub(crate) fn from_headers(headers: &[String]) -> Result<Self, Vec<String>> {
        let mut index: HashMap<String, usize> = HashMap::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            index.entry(normalize_header(header)).or_insert(position);
        }
        let lookup = |name: &str| index.get(&normalize_header(name)).copied();

        let missing: Vec<String> = REQUIRED
            .iter()
            .filter(|name| lookup(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        let required = |name: &str| lookup(name).unwrap_or_default();
        let clinics = Clinic::ordered()
            .into_iter()
            .map(|clinic| {
                let prefix = clinic.export_name();
                let columns = ClinicColumns {
                    taken: lookup(prefix),
                    clinic_date: lookup(&format!("{prefix}-ClinicDate")),
                    signoff_1: lookup(&format!("{prefix}-Deck Evaluation #1 Date")),
                    signoff_2: lookup(&format!("{prefix}-Deck Evaluation #2 Date")),
                };
                (clinic, columns)
            })
            .collect();

        Ok(Self {
            registration_id: required(REGISTRATION_ID),
            last_name: required(LAST_NAME),
            first_name: required(FIRST_NAME),
            email: required(EMAIL),
            club_code: required(CLUB_CODE),
            club: required(CLUB),
            affiliated_clubs: lookup(AFFILIATED_CLUBS),
            status: required(STATUS),
            certification: required(CERTIFICATION_LEVEL),
            clinics,
        })
    }
}
