use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One source row: field name → raw value, exactly as the loader saw it.
///
/// Field names differ between sources and are never normalized; callers
/// describe them with candidate lists in [`crate::config::SourceSchema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and synthetic rows.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Trimmed value of `field`. Empty and whitespace-only values count as absent.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First present value among `candidates`, tried in order.
    pub fn first<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&str> {
        candidates.iter().find_map(|c| self.get(c.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl From<HashMap<String, String>> for RawRecord {
    fn from(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Volunteer,
    BloodDrive,
    Donor,
    Applicant,
}

impl Category {
    /// Processing order. Output order of points follows it.
    pub const ALL: [Category; 4] = [
        Category::Volunteer,
        Category::BloodDrive,
        Category::Donor,
        Category::Applicant,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Volunteer => write!(f, "volunteer"),
            Self::BloodDrive => write!(f, "blood_drive"),
            Self::Donor => write!(f, "donor"),
            Self::Applicant => write!(f, "applicant"),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

pub const MIN_LATITUDE: f64 = 24.0;
pub const MAX_LATITUDE: f64 = 50.0;
pub const MIN_LONGITUDE: f64 = -125.0;
pub const MAX_LONGITUDE: f64 = -66.0;

/// Continental bounding box check. NaN never passes.
pub fn within_bounds(latitude: f64, longitude: f64) -> bool {
    (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
        && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// True only when both values came from the record itself.
    pub is_exact: bool,
}

impl ResolvedCoordinate {
    /// Exact coordinate from record fields; `None` outside the bounding box.
    pub fn exact(latitude: f64, longitude: f64) -> Option<Self> {
        within_bounds(latitude, longitude).then_some(Self {
            latitude,
            longitude,
            is_exact: true,
        })
    }

    /// Derived coordinate, clamped into the bounding box.
    pub fn approximate(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(MIN_LATITUDE, MAX_LATITUDE),
            longitude: longitude.clamp(MIN_LONGITUDE, MAX_LONGITUDE),
            is_exact: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for EfficiencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Donor gift tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorTier {
    Contributor,
    Supporter,
    Patron,
    Benefactor,
    Leadership,
    Major,
    Mega,
}

impl DonorTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mega => "Mega Donor ($1M+)",
            Self::Major => "Major Donor ($500K+)",
            Self::Leadership => "Leadership ($100K+)",
            Self::Benefactor => "Benefactor ($50K+)",
            Self::Patron => "Patron ($25K+)",
            Self::Supporter => "Supporter ($10K+)",
            Self::Contributor => "Contributor ($5K+)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantStatus {
    Converted,
    Pending,
    Processing,
}

impl std::fmt::Display for ApplicantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Converted => write!(f, "converted"),
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

pub const SOURCE_RECORD: &str = "record";
pub const SOURCE_SYNTHETIC: &str = "synthetic";

/// One renderable, classified, geolocated unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub category: Category,
    pub coordinate: ResolvedCoordinate,
    pub color: &'static str,
    pub size: f64,
    pub opacity: f64,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Point {
    pub fn region(&self) -> Option<&str> {
        self.attributes.get("region").and_then(|v| v.as_str())
    }

    pub fn is_synthetic(&self) -> bool {
        self.attributes.get("source").and_then(|v| v.as_str()) == Some(SOURCE_SYNTHETIC)
    }

    /// Intake status of an applicant point; `None` for other categories.
    pub fn applicant_status(&self) -> Option<ApplicantStatus> {
        if self.category != Category::Applicant {
            return None;
        }
        match self.attributes.get("status").and_then(|v| v.as_str())? {
            "converted" => Some(ApplicantStatus::Converted),
            "pending" => Some(ApplicantStatus::Pending),
            "processing" => Some(ApplicantStatus::Processing),
            _ => None,
        }
    }
}

/// Applicant pipeline of one region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicantBreakdown {
    pub total: usize,
    pub converted: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCluster {
    pub region_code: String,
    pub centroid: ResolvedCoordinate,
    pub counts_by_category: BTreeMap<Category, usize>,
    pub total: usize,
    pub applicants: ApplicantBreakdown,
    pub color: &'static str,
    pub size: f64,
}

/// Where the points of a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    /// Every point derives from a source record.
    Records,
    /// Real records, topped up with synthetic points for sparse data.
    Supplemented,
    /// All sources failed; the whole dataset is synthetic.
    Synthetic,
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Records => write!(f, "records"),
            Self::Supplemented => write!(f, "supplemented"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub counts_by_category: BTreeMap<Category, usize>,
    pub distinct_regions: usize,
    pub origin: DataOrigin,
    pub synthetic_points: usize,
    pub dropped_by_category: BTreeMap<Category, usize>,
    pub failed_sources: Vec<Category>,
    pub truncated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub points: Vec<Point>,
    pub clusters: Vec<RegionCluster>,
    pub summary: PipelineSummary,
}
