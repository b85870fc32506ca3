use super::RecommendationItem;
use crate::roster::{Clinic, OfficialRecord};
use chrono::NaiveDate;

const LEVEL_TWO_OPTIONS: &str = "(CT, MM, CFJ/CJE, Admin Desk or Starter)";

/// Intro plus stroke & turn sign-offs at which Level II advice starts.
const CORE_SIGNOFF_THRESHOLD: u8 = 3;

pub fn count_signoffs(signoff_1: Option<NaiveDate>, signoff_2: Option<NaiveDate>) -> u8 {
    u8::from(signoff_1.is_some()) + u8::from(signoff_2.is_some())
}

pub(crate) fn clinic_signoffs(record: &OfficialRecord, clinic: Clinic) -> u8 {
    let status = record.clinic(clinic);
    count_signoffs(status.signoff_1, status.signoff_2)
}

pub(crate) fn uncertified(record: &OfficialRecord, items: &mut Vec<RecommendationItem>) {
    if !record.has_taken(Clinic::Intro) {
        items.push(take_clinic_with_signoffs(Clinic::Intro));
    } else {
        let signoffs = clinic_signoffs(record, Clinic::Intro);
        if signoffs < 2 {
            items.push(obtain_signoffs(Clinic::Intro, signoffs));
        }
    }

    if !record.has_taken(Clinic::SafetyMarshal) {
        items.push(take_clinic(Clinic::SafetyMarshal));
    }
}

pub(crate) fn level_one(record: &OfficialRecord, items: &mut Vec<RecommendationItem>) {
    let intro_signoffs = clinic_signoffs(record, Clinic::Intro);
    if intro_signoffs < 2 {
        items.push(obtain_signoffs(Clinic::Intro, intro_signoffs));
    }

    if !record.has_taken(Clinic::StrokeTurn) {
        items.push(take_clinic(Clinic::StrokeTurn));
        return;
    }

    let stroke_turn_signoffs = clinic_signoffs(record, Clinic::StrokeTurn);
    if stroke_turn_signoffs < 2 {
        items.push(obtain_signoffs(Clinic::StrokeTurn, stroke_turn_signoffs));
    }

    if intro_signoffs + stroke_turn_signoffs >= CORE_SIGNOFF_THRESHOLD {
        let any_level_two = Clinic::level_two()
            .into_iter()
            .any(|clinic| record.has_taken(clinic));
        if any_level_two {
            items.push(RecommendationItem::new(format!(
                "Obtain sign-offs on at least 1 Level II clinic {LEVEL_TWO_OPTIONS}"
            )));
        } else {
            items.push(RecommendationItem::new(format!(
                "Take a Level II clinic {LEVEL_TWO_OPTIONS} and obtain sign-offs"
            )));
        }
    }
}

fn take_clinic(clinic: Clinic) -> RecommendationItem {
    RecommendationItem::new(format!("Take {} Clinic", clinic.export_name()))
}

fn take_clinic_with_signoffs(clinic: Clinic) -> RecommendationItem {
    RecommendationItem::new(format!(
        "Take {} Clinic and obtain sign-offs",
        clinic.export_name()
    ))
}

fn obtain_signoffs(clinic: Clinic, have: u8) -> RecommendationItem {
    RecommendationItem::new(format!(
        "Obtain {} sign-off(s) for {}",
        2u8.saturating_sub(have),
        clinic.export_name()
    ))
}
