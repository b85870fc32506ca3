use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Clinics tracked on the officials certification pathway, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Clinic {
    Intro,
    SafetyMarshal,
    StrokeTurn,
    ChiefTimekeeper,
    Clerk,
    MeetManager,
    Starter,
    ChiefFinishJudge,
    ChiefRecorder,
    Referee,
    ParaModule,
}

impl Clinic {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Intro,
            Self::SafetyMarshal,
            Self::StrokeTurn,
            Self::ChiefTimekeeper,
            Self::Clerk,
            Self::MeetManager,
            Self::Starter,
            Self::ChiefFinishJudge,
            Self::ChiefRecorder,
            Self::Referee,
            Self::ParaModule,
        ]
    }

    /// Clinics that count toward Level II.
    pub const fn level_two() -> [Self; 5] {
        [
            Self::ChiefTimekeeper,
            Self::Clerk,
            Self::MeetManager,
            Self::Starter,
            Self::ChiefFinishJudge,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "Intro to Swimming",
            Self::SafetyMarshal => "Safety Marshal",
            Self::StrokeTurn => "Stroke & Turn",
            Self::ChiefTimekeeper => "Chief Timekeeper",
            Self::Clerk => "Admin Desk/Clerk",
            Self::MeetManager => "Meet Manager",
            Self::Starter => "Starter",
            Self::ChiefFinishJudge => "CFJ/CJE",
            Self::ChiefRecorder => "Chief Recorder",
            Self::Referee => "Referee",
            Self::ParaModule => "Para eModule",
        }
    }

    /// Column prefix used by the registration system export.
    pub const fn export_name(self) -> &'static str {
        match self {
            Self::Intro => "Introduction to Swimming Officiating",
            Self::SafetyMarshal => "Safety Marshal",
            Self::StrokeTurn => "Judge of Stroke/Inspector of Turns",
            Self::ChiefTimekeeper => "Chief Timekeeper",
            Self::Clerk => "Clerk of Course",
            Self::MeetManager => "Meet Manager",
            Self::Starter => "Starter",
            Self::ChiefFinishJudge => "Chief Finish Judge/Chief Judge",
            Self::ChiefRecorder => "Recorder-Scorer",
            Self::Referee => "Referee",
            Self::ParaModule => "Para Swimming eModule",
        }
    }

    pub const fn required_signoffs(self) -> u8 {
        match self {
            Self::SafetyMarshal | Self::ChiefRecorder | Self::Referee | Self::ParaModule => 0,
            _ => 2,
        }
    }

    pub const fn has_signoffs(self) -> bool {
        self.required_signoffs() > 0
    }
}

/// Progress recorded against a single clinic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicStatus {
    pub completed: bool,
    pub clinic_date: Option<NaiveDate>,
    pub signoff_1: Option<NaiveDate>,
    pub signoff_2: Option<NaiveDate>,
}

impl ClinicStatus {
    pub(crate) fn populated_fields(&self) -> usize {
        usize::from(self.completed)
            + usize::from(self.clinic_date.is_some())
            + usize::from(self.signoff_1.is_some())
            + usize::from(self.signoff_2.is_some())
    }

    pub(crate) fn fill_from(&mut self, other: &ClinicStatus) {
        self.completed |= other.completed;
        self.clinic_date = self.clinic_date.or(other.clinic_date);
        self.signoff_1 = self.signoff_1.or(other.signoff_1);
        self.signoff_2 = self.signoff_2.or(other.signoff_2);
    }
}

/// Rung on the certification ladder.
///
/// Values the export carries that are not a recognised level (pending or
/// affiliated markers) are kept verbatim in `Affiliated` and sit outside the
/// ladder ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    LevelI(String),
    LevelII(String),
    LevelIII(String),
    LevelIV(String),
    LevelV(String),
    Affiliated(String),
}

impl CertificationLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        let label = raw.trim();
        if label.is_empty() {
            return None;
        }

        let upper = label.to_ascii_uppercase();
        let numeral = upper
            .strip_prefix("LEVEL")
            .map(|rest| {
                rest.trim_start()
                    .split(|c: char| !c.is_ascii_alphanumeric())
                    .next()
                    .unwrap_or_default()
            })
            .unwrap_or_default();

        let label = label.to_string();
        Some(match numeral {
            "I" | "1" => Self::LevelI(label),
            "II" | "2" => Self::LevelII(label),
            "III" | "3" => Self::LevelIII(label),
            "IV" | "4" => Self::LevelIV(label),
            "V" | "5" => Self::LevelV(label),
            _ => Self::Affiliated(label),
        })
    }

    /// Position on the ladder, `None` for the affiliated marker.
    pub const fn rank(&self) -> Option<u8> {
        match self {
            Self::LevelI(_) => Some(1),
            Self::LevelII(_) => Some(2),
            Self::LevelIII(_) => Some(3),
            Self::LevelIV(_) => Some(4),
            Self::LevelV(_) => Some(5),
            Self::Affiliated(_) => None,
        }
    }

    /// Levels IV and V have nothing left on the pathway.
    pub fn is_graduated(&self) -> bool {
        matches!(self.rank(), Some(rank) if rank >= 4)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::LevelI(label)
            | Self::LevelII(label)
            | Self::LevelIII(label)
            | Self::LevelIV(label)
            | Self::LevelV(label)
            | Self::Affiliated(label) => label,
        }
    }
}

impl fmt::Display for CertificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Active,
    InvoicePending,
    AccountPending,
    PsoPending,
    Other(String),
}

impl RegistrationStatus {
    pub fn parse(raw: &str) -> Self {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        match collapsed.to_ascii_lowercase().as_str() {
            "active" => Self::Active,
            "invoice pending" => Self::InvoicePending,
            "account pending" => Self::AccountPending,
            "pso pending" => Self::PsoPending,
            _ => Self::Other(collapsed),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Active => "Active",
            Self::InvoicePending => "Invoice Pending",
            Self::AccountPending => "Account Pending",
            Self::PsoPending => "PSO Pending",
            Self::Other(label) => label,
        }
    }
}

/// One official in the context of one club affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficialRecord {
    pub registration_id: String,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub club_code: String,
    pub club_full_name: String,
    pub affiliated_clubs: Option<String>,
    pub status: RegistrationStatus,
    pub certification: Option<CertificationLevel>,
    pub clinics: BTreeMap<Clinic, ClinicStatus>,
}

impl OfficialRecord {
    /// Status for a clinic; clinics missing from the export read as not taken.
    pub fn clinic(&self, clinic: Clinic) -> ClinicStatus {
        self.clinics.get(&clinic).cloned().unwrap_or_default()
    }

    pub fn has_taken(&self, clinic: Clinic) -> bool {
        self.clinics
            .get(&clinic)
            .map(|status| status.completed)
            .unwrap_or(false)
    }

    pub fn is_primary_club(&self) -> bool {
        self.affiliated_clubs.is_none()
    }

    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub(crate) fn dedup_key(&self) -> (String, String) {
        (self.registration_id.clone(), self.club_code.clone())
    }

    /// Count of optional fields carrying data, used to pick between duplicates.
    /// The affiliation is a role marker and does not count.
    pub(crate) fn completeness(&self) -> usize {
        usize::from(!self.email.is_empty())
            + usize::from(!self.club_full_name.is_empty())
            + usize::from(self.certification.is_some())
            + self
                .clinics
                .values()
                .map(ClinicStatus::populated_fields)
                .sum::<usize>()
    }

    pub(crate) fn fill_from(&mut self, other: &OfficialRecord) {
        if self.email.is_empty() {
            self.email = other.email.clone();
        }
        if self.club_full_name.is_empty() {
            self.club_full_name = other.club_full_name.clone();
        }
        // An empty affiliation marks the primary club row, not missing data.
        if other.is_primary_club() {
            self.affiliated_clubs = None;
        }
        if self.certification.is_none() {
            self.certification = other.certification.clone();
        }
        for (clinic, status) in &other.clinics {
            self.clinics.entry(*clinic).or_default().fill_from(status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certification_parses_export_labels() {
        assert_eq!(
            CertificationLevel::parse("LEVEL I - RED PIN").and_then(|l| l.rank()),
            Some(1)
        );
        assert_eq!(
            CertificationLevel::parse("Level III - White Pin").and_then(|l| l.rank()),
            Some(3)
        );
        assert!(CertificationLevel::parse("LEVEL IV - GREEN PIN")
            .expect("level")
            .is_graduated());
        assert!(CertificationLevel::parse("LEVEL V - BLUE PIN")
            .expect("level")
            .is_graduated());
        assert!(!CertificationLevel::parse("LEVEL II - ORANGE PIN")
            .expect("level")
            .is_graduated());
        assert!(CertificationLevel::parse("   ").is_none());
    }

    #[test]
    fn unrecognised_levels_are_affiliated_markers() {
        let level = CertificationLevel::parse("Affiliated - Pending").expect("marker");
        assert_eq!(level.rank(), None);
        assert!(!level.is_graduated());
        assert_eq!(level.label(), "Affiliated - Pending");
    }

    #[test]
    fn status_parsing_is_case_and_space_insensitive() {
        assert_eq!(RegistrationStatus::parse("active"), RegistrationStatus::Active);
        assert_eq!(
            RegistrationStatus::parse("Invoice  Pending"),
            RegistrationStatus::InvoicePending
        );
        assert_eq!(
            RegistrationStatus::parse("PSO Pending"),
            RegistrationStatus::PsoPending
        );
        assert_eq!(
            RegistrationStatus::parse("Suspended"),
            RegistrationStatus::Other("Suspended".to_string())
        );
    }

    #[test]
    fn clinics_without_signoffs_are_flagged() {
        let without: Vec<_> = Clinic::ordered()
            .into_iter()
            .filter(|clinic| !clinic.has_signoffs())
            .collect();
        assert_eq!(
            without,
            vec![
                Clinic::SafetyMarshal,
                Clinic::ChiefRecorder,
                Clinic::Referee,
                Clinic::ParaModule
            ]
        );
    }
}
