//! Deterministic synthetic dataset.
//!
//! Used in place of real data when every source failed, and to top up
//! sparse real data. Points are spread over the gazetteer's population
//! centers proportional to their weight, placed on the same golden-angle
//! spiral as region fallbacks, and encoded with the same rules as real
//! records. Underlying values come from a seeded RNG.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::classify::{encode, RecordFacts};
use crate::config::{Policy, TargetCounts};
use crate::gazetteer::{self, Place};
use crate::model::{ApplicantStatus, Category, Point, SOURCE_SYNTHETIC};
use crate::resolve::spiral_around;

/// Points per unit of place weight when topping up sparse data.
const SUPPLEMENT_WEIGHT_DIVISOR: u32 = 5;

/// 2^64 / φ, the usual stream-splitting increment.
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Split `total` across `weights` by largest remainder. Ties go to the
/// earlier entry. The result always sums to `total` unless every weight is 0.
pub fn apportion(total: usize, weights: &[u32]) -> Vec<usize> {
    let sum: u128 = weights.iter().map(|w| *w as u128).sum();
    if sum == 0 {
        return vec![0; weights.len()];
    }

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders = Vec::with_capacity(weights.len());
    for (i, w) in weights.iter().enumerate() {
        let exact = total as u128 * *w as u128;
        shares.push((exact / sum) as usize);
        remainders.push((exact % sum, i));
    }

    let assigned: usize = shares.iter().sum();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, i) in remainders.into_iter().take(total - assigned) {
        shares[i] += 1;
    }
    shares
}

/// Counts used to top up sparse data: `weight / 5` points per population
/// center, split 50 % volunteers, 30 % blood drives, 20 % donors.
pub fn supplement_targets() -> TargetCounts {
    let total: usize = gazetteer::places()
        .iter()
        .map(|p| (p.weight / SUPPLEMENT_WEIGHT_DIVISOR) as usize)
        .sum();
    let volunteer = total / 2;
    let blood_drive = total * 3 / 10;
    TargetCounts {
        volunteer,
        blood_drive,
        donor: total - volunteer - blood_drive,
        applicant: 0,
    }
}

/// Independent stream per category, so one category's target never shifts
/// another category's draws.
fn category_seed(seed: u64, category: Category) -> u64 {
    let salt: u64 = match category {
        Category::Volunteer => 1,
        Category::BloodDrive => 2,
        Category::Donor => 3,
        Category::Applicant => 4,
    };
    seed.wrapping_add(GOLDEN_GAMMA.wrapping_mul(salt))
}

fn draw_facts(category: Category, index: u64, rng: &mut StdRng) -> RecordFacts {
    match category {
        Category::Volunteer => RecordFacts::Volunteer {
            disaster_response: index % 10 == 0,
        },
        Category::BloodDrive => {
            let efficiency: f64 = rng.gen_range(60.0..100.0);
            let projected = rng.gen_range(20..=500) as f64;
            RecordFacts::BloodDrive {
                collected: (projected * efficiency / 100.0).round(),
                projected,
            }
        }
        Category::Donor => RecordFacts::Donor {
            amount: (5_000.0 + rng.gen_range(0.0..995_000.0f64)).round(),
        },
        Category::Applicant => {
            let roll: f64 = rng.gen();
            let status = if roll < 0.3 {
                ApplicantStatus::Converted
            } else if roll < 0.5 {
                ApplicantStatus::Pending
            } else {
                ApplicantStatus::Processing
            };
            RecordFacts::Applicant { status }
        }
    }
}

fn synthetic_point(
    facts: &RecordFacts,
    place: &Place,
    index: u64,
    policy: &Policy,
) -> Option<Point> {
    let coordinate = spiral_around(place.centroid(), index);
    let mut point = encode(facts, coordinate, policy)?;
    let attrs = &mut point.attributes;
    attrs.insert("source".to_string(), json!(SOURCE_SYNTHETIC));
    attrs.insert("region".to_string(), json!(place.region));
    attrs.insert("place".to_string(), json!(place.name));
    if facts.category() == Category::Volunteer {
        attrs.insert("label".to_string(), json!(format!("{} Chapter", place.name)));
        attrs.insert("status".to_string(), json!("Active"));
    }
    Some(point)
}

/// Generate `targets` points per category. Same targets, policy and seed
/// always produce the same points in the same order.
pub fn generate(targets: &TargetCounts, policy: &Policy, seed: u64) -> Vec<Point> {
    let places = gazetteer::places();
    let weights: Vec<u32> = places.iter().map(|p| p.weight).collect();
    let mut points = Vec::with_capacity(targets.total());

    for category in Category::ALL {
        let mut rng = StdRng::seed_from_u64(category_seed(seed, category));
        let per_place = apportion(targets.get(category), &weights);
        let mut index: u64 = 0;
        for (place, count) in places.iter().zip(per_place) {
            for _ in 0..count {
                let facts = draw_facts(category, index, &mut rng);
                if let Some(point) = synthetic_point(&facts, place, index, policy) {
                    points.push(point);
                }
                index += 1;
            }
        }
    }

    points
}
