use std::collections::{BTreeMap, HashMap};

use crate::model::{
    ApplicantBreakdown, ApplicantStatus, Category, Point, RegionCluster, ResolvedCoordinate,
};

const CLUSTER_SIZE_RANGE: (f64, f64) = (5.0, 20.0);

/// Running sums for one region. Centroid is only computed on snapshot.
#[derive(Debug, Clone)]
struct RegionTally {
    lat_sum: f64,
    lng_sum: f64,
    all_exact: bool,
    counts: [usize; 4],
    total: usize,
    applicants: ApplicantBreakdown,
}

impl RegionTally {
    fn new() -> Self {
        Self {
            lat_sum: 0.0,
            lng_sum: 0.0,
            all_exact: true,
            counts: [0; 4],
            total: 0,
            applicants: ApplicantBreakdown::default(),
        }
    }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Volunteer => 0,
        Category::BloodDrive => 1,
        Category::Donor => 2,
        Category::Applicant => 3,
    }
}

/// Per-region rollup of point counts and centroids.
///
/// Append-then-snapshot: [`finalize`](Self::finalize) is a pure read, so
/// `add` may keep being called afterwards and a later `finalize` sees
/// everything added so far.
#[derive(Debug, Clone, Default)]
pub struct RegionAggregator {
    regions: HashMap<String, RegionTally>,
}

impl RegionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, point: &Point, region_code: &str) {
        let tally = self
            .regions
            .entry(region_code.to_string())
            .or_insert_with(RegionTally::new);
        tally.lat_sum += point.coordinate.latitude;
        tally.lng_sum += point.coordinate.longitude;
        tally.all_exact &= point.coordinate.is_exact;
        tally.counts[slot(point.category)] += 1;
        tally.total += 1;

        if point.category == Category::Applicant {
            tally.applicants.total += 1;
            match point.applicant_status() {
                Some(ApplicantStatus::Converted) => tally.applicants.converted += 1,
                Some(ApplicantStatus::Pending) => tally.applicants.pending += 1,
                _ => {}
            }
        }
    }

    /// Number of distinct regions seen so far.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Snapshot of every region, sorted by region code.
    pub fn finalize(&self) -> Vec<RegionCluster> {
        let mut codes: Vec<&String> = self.regions.keys().collect();
        codes.sort();

        codes
            .into_iter()
            .map(|code| {
                let t = &self.regions[code];
                let n = t.total as f64;
                let counts_by_category: BTreeMap<Category, usize> = Category::ALL
                    .iter()
                    .map(|c| (*c, t.counts[slot(*c)]))
                    .collect();
                RegionCluster {
                    region_code: code.clone(),
                    centroid: ResolvedCoordinate {
                        latitude: t.lat_sum / n,
                        longitude: t.lng_sum / n,
                        is_exact: t.all_exact,
                    },
                    color: cluster_color(&counts_by_category, t.total),
                    size: cluster_size(t.total),
                    counts_by_category,
                    total: t.total,
                    applicants: t.applicants,
                }
            })
            .collect()
    }
}

/// Overview color by composition: volunteer-heavy, mixed, donor-heavy, other.
pub fn cluster_color(counts: &BTreeMap<Category, usize>, total: usize) -> &'static str {
    let get = |c: Category| counts.get(&c).copied().unwrap_or(0);
    let volunteers = get(Category::Volunteer);
    let ratio = if total > 0 { volunteers as f64 / total as f64 } else { 0.0 };
    if ratio > 0.5 {
        "#4caf50"
    } else if ratio > 0.3 {
        "#2196f3"
    } else if get(Category::Donor) > volunteers {
        "#9c27b0"
    } else {
        "#ff9800"
    }
}

pub fn cluster_size(total: usize) -> f64 {
    ((total.max(1) as f64).log10() * 5.0).clamp(CLUSTER_SIZE_RANGE.0, CLUSTER_SIZE_RANGE.1)
}
