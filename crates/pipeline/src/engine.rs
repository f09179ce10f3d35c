use rayon::prelude::*;

use crate::aggregate::RegionAggregator;
use crate::classify::Classifier;
use crate::config::PipelineConfig;
use crate::error::LoadError;
use crate::model::{Category, DataOrigin, PipelineResult, Point, RawRecord};
use crate::summary::{compute_summary, RunDiagnostics};
use crate::synthetic;

/// Supplies the rows of one source. Loading may block; the pipeline never
/// retries or times out a loader.
pub trait SourceLoader: Send + Sync {
    fn load(&self) -> Result<Vec<RawRecord>, LoadError>;
}

impl<F> SourceLoader for F
where
    F: Fn() -> Result<Vec<RawRecord>, LoadError> + Send + Sync,
{
    fn load(&self) -> Result<Vec<RawRecord>, LoadError> {
        self()
    }
}

/// The four loaders of a run.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub volunteers: &'a dyn SourceLoader,
    pub blood_drives: &'a dyn SourceLoader,
    pub donors: &'a dyn SourceLoader,
    pub applicants: &'a dyn SourceLoader,
}

impl<'a> Sources<'a> {
    pub fn get(&self, category: Category) -> &'a dyn SourceLoader {
        match category {
            Category::Volunteer => self.volunteers,
            Category::BloodDrive => self.blood_drives,
            Category::Donor => self.donors,
            Category::Applicant => self.applicants,
        }
    }
}

/// State owned by a single run.
struct RunContext<'a> {
    config: &'a PipelineConfig,
    points: Vec<Point>,
    aggregator: RegionAggregator,
    diagnostics: RunDiagnostics,
}

impl<'a> RunContext<'a> {
    fn new(config: &'a PipelineConfig, origin: DataOrigin) -> Self {
        Self {
            config,
            points: Vec::new(),
            aggregator: RegionAggregator::new(),
            diagnostics: RunDiagnostics::new(origin),
        }
    }

    /// Append in order; points without a region code skip the rollup.
    fn push(&mut self, point: Point) {
        if let Some(region) = point.region() {
            let region = region.to_string();
            self.aggregator.add(&point, &region);
        }
        self.points.push(point);
    }

    fn classify_source(&mut self, category: Category, records: &[RawRecord]) {
        let classifier = Classifier::new(self.config);
        let classified: Vec<Option<Point>> = records
            .par_iter()
            .enumerate()
            .map(|(i, record)| classifier.classify(record, category, i as u64))
            .collect();

        let mut dropped = 0;
        for point in classified {
            match point {
                Some(point) => self.push(point),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            log::debug!("{category}: dropped {dropped} of {} records", records.len());
        }
        self.diagnostics.dropped_by_category.insert(category, dropped);
    }

    fn supplement(&mut self) {
        let targets = synthetic::supplement_targets();
        let extra = synthetic::generate(&targets, &self.config.policy, self.config.fallback.seed);
        log::debug!(
            "only {} points from records, adding {} synthetic points",
            self.points.len(),
            extra.len()
        );
        for point in extra {
            self.push(point);
        }
        self.diagnostics.origin = DataOrigin::Supplemented;
    }

    fn truncate(&mut self) {
        let max = self.config.limits.max_points;
        if self.points.len() > max {
            self.diagnostics.truncated = self.points.len() - max;
            log::debug!("truncating {} points to {max}", self.points.len());
            self.points.truncate(max);
        }
    }

    fn finish(self) -> PipelineResult {
        let clusters = self.aggregator.finalize();
        let summary = compute_summary(&self.points, self.diagnostics);
        log::info!(
            "map ready: {} points, {} regions, origin {}",
            summary.total,
            clusters.len(),
            summary.origin
        );
        PipelineResult {
            points: self.points,
            clusters,
            summary,
        }
    }
}

fn load_all(sources: &Sources<'_>) -> [(Category, Result<Vec<RawRecord>, LoadError>); 4] {
    let ((volunteers, blood_drives), (donors, applicants)) = rayon::join(
        || rayon::join(|| sources.volunteers.load(), || sources.blood_drives.load()),
        || rayon::join(|| sources.donors.load(), || sources.applicants.load()),
    );
    [
        (Category::Volunteer, volunteers),
        (Category::BloodDrive, blood_drives),
        (Category::Donor, donors),
        (Category::Applicant, applicants),
    ]
}

/// Build the map from the four sources.
///
/// Never fails: a failed source counts as empty, sparse output is topped up
/// with synthetic points, and if every source failed the whole result is
/// synthetic.
pub fn run(config: &PipelineConfig, sources: &Sources<'_>) -> PipelineResult {
    let loaded = load_all(sources);

    let mut failed = Vec::new();
    for (category, result) in &loaded {
        if let Err(e) = result {
            log::warn!("{category}: {e}; continuing without it");
            failed.push(*category);
        }
    }

    if failed.len() == Category::ALL.len() {
        log::warn!("every source failed, serving synthetic data");
        let mut ctx = fallback_context(config);
        ctx.diagnostics.failed_sources = failed;
        return ctx.finish();
    }

    let mut ctx = RunContext::new(config, DataOrigin::Records);
    ctx.diagnostics.failed_sources = failed;
    for (category, result) in &loaded {
        let records = result.as_deref().unwrap_or(&[]);
        ctx.classify_source(*category, records);
    }

    if ctx.points.len() < config.limits.min_points {
        ctx.supplement();
    }
    ctx.truncate();
    ctx.finish()
}

fn fallback_context(config: &PipelineConfig) -> RunContext<'_> {
    let mut ctx = RunContext::new(config, DataOrigin::Synthetic);
    let points = synthetic::generate(&config.fallback.targets, &config.policy, config.fallback.seed);
    for point in points {
        ctx.push(point);
    }
    ctx.truncate();
    ctx
}

/// Synthetic dataset only, as served when every source fails.
pub fn fallback(config: &PipelineConfig) -> PipelineResult {
    fallback_context(config).finish()
}
