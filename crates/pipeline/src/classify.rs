use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::amount::{extract_amount, first_number};
use crate::config::{DonorThresholds, PipelineConfig, Policy};
use crate::model::{
    ApplicantStatus, Category, DonorTier, EfficiencyTier, Point, RawRecord, ResolvedCoordinate,
    SOURCE_RECORD,
};
use crate::resolve::resolve;

// ---------------------------------------------------------------------------
// Encodings
// ---------------------------------------------------------------------------

pub const VOLUNTEER_COLOR: &str = "#4CAF50";
pub const DISASTER_VOLUNTEER_COLOR: &str = "#ff5722";
const VOLUNTEER_SIZE: f64 = 5.0;
const DISASTER_VOLUNTEER_SIZE: f64 = 7.0;
const VOLUNTEER_OPACITY: f64 = 0.7;

pub const DRIVE_HIGH_COLOR: &str = "#d32f2f";
pub const DRIVE_MEDIUM_COLOR: &str = "#f57c00";
pub const DRIVE_LOW_COLOR: &str = "#fbc02d";
const DRIVE_SIZE_RANGE: (f64, f64) = (4.0, 12.0);
const DRIVE_UNITS_PER_SIZE: f64 = 50.0;
const DRIVE_OPACITY: f64 = 0.8;

const DONOR_SIZE_RANGE: (f64, f64) = (6.0, 15.0);
const DONOR_LOG_SCALE: f64 = 2.5;
const DONOR_OPACITY: f64 = 0.9;

pub const APPLICANT_CONVERTED_COLOR: &str = "#00c853";
pub const APPLICANT_PENDING_COLOR: &str = "#ffd54f";
pub const APPLICANT_PROCESSING_COLOR: &str = "#90caf9";
const APPLICANT_SIZE: f64 = 3.0;
const APPLICANT_OPACITY: f64 = 0.5;

/// Category-specific inputs to the encoding rules, independent of where
/// they came from (a source row or the synthetic generator).
#[derive(Debug, Clone, PartialEq)]
pub enum RecordFacts {
    Volunteer { disaster_response: bool },
    BloodDrive { collected: f64, projected: f64 },
    Donor { amount: f64 },
    Applicant { status: ApplicantStatus },
}

impl RecordFacts {
    pub fn category(&self) -> Category {
        match self {
            Self::Volunteer { .. } => Category::Volunteer,
            Self::BloodDrive { .. } => Category::BloodDrive,
            Self::Donor { .. } => Category::Donor,
            Self::Applicant { .. } => Category::Applicant,
        }
    }
}

/// Efficiency in percent; 0 when nothing was projected.
pub fn efficiency(collected: f64, projected: f64) -> f64 {
    if projected > 0.0 {
        collected / projected * 100.0
    } else {
        0.0
    }
}

pub fn efficiency_tier(efficiency: f64, policy: &Policy) -> EfficiencyTier {
    if efficiency >= policy.efficiency_high {
        EfficiencyTier::High
    } else if efficiency >= policy.efficiency_medium {
        EfficiencyTier::Medium
    } else {
        EfficiencyTier::Low
    }
}

pub fn donor_tier(amount: f64, t: &DonorThresholds) -> DonorTier {
    if amount >= t.mega {
        DonorTier::Mega
    } else if amount >= t.major {
        DonorTier::Major
    } else if amount >= t.leadership {
        DonorTier::Leadership
    } else if amount >= t.benefactor {
        DonorTier::Benefactor
    } else if amount >= t.patron {
        DonorTier::Patron
    } else if amount >= t.supporter {
        DonorTier::Supporter
    } else {
        DonorTier::Contributor
    }
}

fn donor_color(amount: f64, t: &DonorThresholds) -> &'static str {
    if amount >= t.mega {
        "#6a1b9a"
    } else if amount >= t.leadership {
        "#1565c0"
    } else if amount >= t.benefactor {
        "#0277bd"
    } else if amount >= t.patron {
        "#0288d1"
    } else {
        "#039be5"
    }
}

pub fn applicant_status(outcome: Option<&str>, status: Option<&str>) -> ApplicantStatus {
    if outcome.is_some_and(|o| o.to_ascii_lowercase().contains("converted")) {
        ApplicantStatus::Converted
    } else if status.is_some_and(|s| s.eq_ignore_ascii_case("pending")) {
        ApplicantStatus::Pending
    } else {
        ApplicantStatus::Processing
    }
}

/// Boolean-ish flag values: `Yes`, `Y`, `true`, `1` (any case).
pub fn is_flag_set(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "yes" | "y" | "true" | "1"
    )
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Apply the category encoding rules. `None` only for donors without a
/// positive gift.
pub fn encode(facts: &RecordFacts, coordinate: ResolvedCoordinate, policy: &Policy) -> Option<Point> {
    let mut attributes = BTreeMap::new();

    let (color, size, opacity) = match *facts {
        RecordFacts::Volunteer { disaster_response } => {
            attributes.insert("disaster_response".to_string(), json!(disaster_response));
            if disaster_response {
                (DISASTER_VOLUNTEER_COLOR, DISASTER_VOLUNTEER_SIZE, VOLUNTEER_OPACITY)
            } else {
                (VOLUNTEER_COLOR, VOLUNTEER_SIZE, VOLUNTEER_OPACITY)
            }
        }
        RecordFacts::BloodDrive { collected, projected } => {
            let collected = collected.max(0.0);
            let projected = projected.max(0.0);
            let eff = efficiency(collected, projected);
            let tier = efficiency_tier(eff, policy);
            attributes.insert("collected".to_string(), json!(collected));
            attributes.insert("projected".to_string(), json!(projected));
            attributes.insert("efficiency".to_string(), json!(round1(eff)));
            attributes.insert("tier".to_string(), json!(tier));
            let color = match tier {
                EfficiencyTier::High => DRIVE_HIGH_COLOR,
                EfficiencyTier::Medium => DRIVE_MEDIUM_COLOR,
                EfficiencyTier::Low => DRIVE_LOW_COLOR,
            };
            let size = (collected / DRIVE_UNITS_PER_SIZE).clamp(DRIVE_SIZE_RANGE.0, DRIVE_SIZE_RANGE.1);
            (color, size, DRIVE_OPACITY)
        }
        RecordFacts::Donor { amount } => {
            if !(amount > 0.0 && amount.is_finite()) {
                return None;
            }
            let thresholds = &policy.donor_tiers;
            let tier = donor_tier(amount, thresholds);
            attributes.insert("amount".to_string(), json!(amount));
            attributes.insert("tier".to_string(), json!(tier));
            attributes.insert("tier_label".to_string(), json!(tier.label()));
            let size = (amount.log10() * DONOR_LOG_SCALE).clamp(DONOR_SIZE_RANGE.0, DONOR_SIZE_RANGE.1);
            (donor_color(amount, thresholds), size, DONOR_OPACITY)
        }
        RecordFacts::Applicant { status } => {
            attributes.insert("status".to_string(), json!(status));
            let color = match status {
                ApplicantStatus::Converted => APPLICANT_CONVERTED_COLOR,
                ApplicantStatus::Pending => APPLICANT_PENDING_COLOR,
                ApplicantStatus::Processing => APPLICANT_PROCESSING_COLOR,
            };
            (color, APPLICANT_SIZE, APPLICANT_OPACITY)
        }
    };

    Some(Point {
        category: facts.category(),
        coordinate,
        color,
        size,
        opacity,
        attributes,
    })
}

// ---------------------------------------------------------------------------
// Record classification
// ---------------------------------------------------------------------------

/// Turns source rows into points using the caller's schema and policy.
pub struct Classifier<'a> {
    config: &'a PipelineConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Upper-cased region code of `record`, if any.
    pub fn region_code(&self, record: &RawRecord, category: Category) -> Option<String> {
        record
            .first(&self.config.schema(category).region)
            .map(|r| r.to_ascii_uppercase())
    }

    pub fn facts(&self, record: &RawRecord, category: Category) -> RecordFacts {
        let schema = self.config.schema(category);
        match category {
            Category::Volunteer => RecordFacts::Volunteer {
                disaster_response: record.first(&schema.flag).is_some_and(is_flag_set),
            },
            Category::BloodDrive => RecordFacts::BloodDrive {
                collected: first_number(record, &schema.collected).unwrap_or(0.0),
                projected: first_number(record, &schema.projected).unwrap_or(0.0),
            },
            Category::Donor => RecordFacts::Donor {
                amount: extract_amount(record, &schema.amount),
            },
            Category::Applicant => RecordFacts::Applicant {
                status: applicant_status(
                    record.first(&schema.outcome),
                    record.first(&schema.status),
                ),
            },
        }
    }

    /// Classify one record. `index` is the record's position within its
    /// source and seeds the spiral placement.
    pub fn classify(&self, record: &RawRecord, category: Category, index: u64) -> Option<Point> {
        let schema = self.config.schema(category);
        let region = self.region_code(record, category);
        let place = record.first(&schema.place);

        let coordinate = resolve(
            record,
            &schema.latitude,
            &schema.longitude,
            region.as_deref(),
            place,
            index,
        )?;

        let facts = self.facts(record, category);
        let mut point = encode(&facts, coordinate, &self.config.policy)?;

        let attrs = &mut point.attributes;
        attrs.insert("source".to_string(), json!(SOURCE_RECORD));
        if let Some(region) = region {
            attrs.insert("region".to_string(), Value::String(region));
        }
        if let Some(place) = place {
            attrs.insert("place".to_string(), json!(place));
        }
        if let Some(label) = record.first(&schema.label) {
            attrs.insert("label".to_string(), json!(label));
        }
        if let Some(date) = record.first(&schema.date) {
            attrs.insert("date".to_string(), json!(date));
        }
        if category == Category::Volunteer {
            let status = record.first(&schema.status).unwrap_or("Active");
            attrs.insert("status".to_string(), json!(status));
        }

        Some(point)
    }
}
