use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Category, DataOrigin, PipelineSummary, Point};

/// What happened during a run, beyond the points themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct RunDiagnostics {
    pub origin: DataOrigin,
    pub dropped_by_category: BTreeMap<Category, usize>,
    pub failed_sources: Vec<Category>,
    pub truncated: usize,
}

impl RunDiagnostics {
    pub fn new(origin: DataOrigin) -> Self {
        Self {
            origin,
            dropped_by_category: Category::ALL.iter().map(|c| (*c, 0)).collect(),
            failed_sources: Vec::new(),
            truncated: 0,
        }
    }
}

/// Summary over the emitted points. Every category appears in
/// `counts_by_category`, zero or not.
pub fn compute_summary(points: &[Point], diagnostics: RunDiagnostics) -> PipelineSummary {
    let mut counts_by_category: BTreeMap<Category, usize> =
        Category::ALL.iter().map(|c| (*c, 0)).collect();
    let mut regions: BTreeSet<&str> = BTreeSet::new();
    let mut synthetic_points = 0;

    for p in points {
        *counts_by_category.entry(p.category).or_insert(0) += 1;
        if let Some(region) = p.region() {
            regions.insert(region);
        }
        if p.is_synthetic() {
            synthetic_points += 1;
        }
    }

    PipelineSummary {
        total: points.len(),
        counts_by_category,
        distinct_regions: regions.len(),
        origin: diagnostics.origin,
        synthetic_points,
        dropped_by_category: diagnostics.dropped_by_category,
        failed_sources: diagnostics.failed_sources,
        truncated: diagnostics.truncated,
    }
}
