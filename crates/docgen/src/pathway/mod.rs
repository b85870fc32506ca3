//! Certification pathway guidance.
//!
//! [`recommend`] is a pure function of the official's record: it looks at the
//! current certification level and the clinic history and returns the next
//! steps, most foundational first.

mod rules;

pub use rules::count_signoffs;

use crate::roster::{CertificationLevel, OfficialRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One human-readable next step for an official.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationItem(String);

impl RecommendationItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecommendationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn recommend(record: &OfficialRecord) -> Vec<RecommendationItem> {
    let mut items = Vec::new();

    match &record.certification {
        None => rules::uncertified(record, &mut items),
        Some(CertificationLevel::LevelI(_)) => rules::level_one(record, &mut items),
        // Levels II and up are reviewed by hand.
        Some(_) => {}
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{Clinic, ClinicStatus, RegistrationStatus};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn date(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2023, 10, day)
    }

    fn official(level: Option<&str>) -> OfficialRecord {
        OfficialRecord {
            registration_id: "100".to_string(),
            last_name: "Smith".to_string(),
            first_name: "Ann".to_string(),
            email: "ann@example.com".to_string(),
            club_code: "ABC".to_string(),
            club_full_name: "Alpha Club".to_string(),
            affiliated_clubs: None,
            status: RegistrationStatus::Active,
            certification: level.and_then(CertificationLevel::parse),
            clinics: BTreeMap::new(),
        }
    }

    fn taken(record: &mut OfficialRecord, clinic: Clinic, signoffs: u8) {
        record.clinics.insert(
            clinic,
            ClinicStatus {
                completed: true,
                clinic_date: date(1),
                signoff_1: (signoffs >= 1).then(|| date(8)).flatten(),
                signoff_2: (signoffs >= 2).then(|| date(15)).flatten(),
            },
        );
    }

    fn texts(items: &[RecommendationItem]) -> Vec<&str> {
        items.iter().map(RecommendationItem::text).collect()
    }

    #[test]
    fn uncertified_without_intro_starts_with_intro_clinic() {
        let record = official(None);
        let items = recommend(&record);
        assert_eq!(
            texts(&items),
            vec![
                "Take Introduction to Swimming Officiating Clinic and obtain sign-offs",
                "Take Safety Marshal Clinic",
            ]
        );
    }

    #[test]
    fn uncertified_with_one_intro_signoff_needs_one_more() {
        let mut record = official(None);
        taken(&mut record, Clinic::Intro, 1);
        taken(&mut record, Clinic::SafetyMarshal, 0);
        let items = recommend(&record);
        assert_eq!(
            texts(&items),
            vec!["Obtain 1 sign-off(s) for Introduction to Swimming Officiating"]
        );
    }

    #[test]
    fn uncertified_with_complete_intro_only_needs_safety_marshal() {
        let mut record = official(None);
        taken(&mut record, Clinic::Intro, 2);
        assert_eq!(texts(&recommend(&record)), vec!["Take Safety Marshal Clinic"]);
    }

    #[test]
    fn level_one_without_stroke_turn_is_told_to_take_it() {
        let mut record = official(Some("LEVEL I - RED PIN"));
        taken(&mut record, Clinic::Intro, 0);
        assert_eq!(
            texts(&recommend(&record)),
            vec![
                "Obtain 2 sign-off(s) for Introduction to Swimming Officiating",
                "Take Judge of Stroke/Inspector of Turns Clinic",
            ]
        );
    }

    #[test]
    fn level_one_near_core_completion_is_pointed_at_level_two() {
        let mut record = official(Some("LEVEL I - RED PIN"));
        taken(&mut record, Clinic::Intro, 1);
        taken(&mut record, Clinic::StrokeTurn, 2);
        let items = recommend(&record);
        assert_eq!(
            texts(&items),
            vec![
                "Obtain 1 sign-off(s) for Introduction to Swimming Officiating",
                "Take a Level II clinic (CT, MM, CFJ/CJE, Admin Desk or Starter) and obtain sign-offs",
            ]
        );
    }

    #[test]
    fn level_one_with_level_two_clinic_needs_its_signoffs() {
        let mut record = official(Some("LEVEL I - RED PIN"));
        taken(&mut record, Clinic::Intro, 2);
        taken(&mut record, Clinic::StrokeTurn, 1);
        taken(&mut record, Clinic::Starter, 0);
        assert_eq!(
            texts(&recommend(&record)),
            vec![
                "Obtain 1 sign-off(s) for Judge of Stroke/Inspector of Turns",
                "Obtain sign-offs on at least 1 Level II clinic (CT, MM, CFJ/CJE, Admin Desk or Starter)",
            ]
        );
    }

    #[test]
    fn level_one_below_threshold_gets_no_level_two_advice() {
        let mut record = official(Some("LEVEL I - RED PIN"));
        taken(&mut record, Clinic::Intro, 1);
        taken(&mut record, Clinic::StrokeTurn, 1);
        assert_eq!(recommend(&record).len(), 2);
    }

    #[test]
    fn higher_levels_have_no_automated_guidance() {
        for level in [
            "LEVEL II - ORANGE PIN",
            "LEVEL III - WHITE PIN",
            "LEVEL IV - GREEN PIN",
            "LEVEL V - BLUE PIN",
            "Affiliated",
        ] {
            assert!(recommend(&official(Some(level))).is_empty(), "{level}");
        }
    }

    #[test]
    fn recommendations_are_deterministic() {
        let mut record = official(Some("LEVEL I - RED PIN"));
        taken(&mut record, Clinic::Intro, 2);
        taken(&mut record, Clinic::StrokeTurn, 2);
        let first = recommend(&record);
        for _ in 0..5 {
            assert_eq!(recommend(&record), first);
        }
    }
}
