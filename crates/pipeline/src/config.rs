use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Category;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything a pipeline run needs besides the records themselves.
///
/// Field-name candidates are owned by the caller so that schema drift in a
/// source never requires touching the pipeline. Missing tables and lists
/// fall back to the historical field names of each source.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "PipelineConfigFile")]
pub struct PipelineConfig {
    pub volunteers: SourceSchema,
    pub blood_drives: SourceSchema,
    pub donors: SourceSchema,
    pub applicants: SourceSchema,
    pub policy: Policy,
    pub limits: Limits,
    pub fallback: FallbackConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfigFile::default().into()
    }
}

impl PipelineConfig {
    pub fn schema(&self, category: Category) -> &SourceSchema {
        match category {
            Category::Volunteer => &self.volunteers,
            Category::BloodDrive => &self.blood_drives,
            Category::Donor => &self.donors,
            Category::Applicant => &self.applicants,
        }
    }
}

// ---------------------------------------------------------------------------
// Source schema
// ---------------------------------------------------------------------------

/// Ordered candidate field names per logical attribute of one source.
///
/// Lists that do not apply to a category stay empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceSchema {
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub region: Vec<String>,
    pub place: Vec<String>,
    /// Display name (chapter, account, donor name).
    pub label: Vec<String>,
    /// Display date (volunteer since, drive year, application date).
    pub date: Vec<String>,
    /// Volunteer disaster-response eligibility.
    pub flag: Vec<String>,
    pub status: Vec<String>,
    /// Applicant intake outcome.
    pub outcome: Vec<String>,
    pub collected: Vec<String>,
    pub projected: Vec<String>,
    pub amount: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl SourceSchema {
    pub fn default_for(category: Category) -> Self {
        match category {
            Category::Volunteer => Self {
                latitude: names(&["Y", "Latitude", "lat", "latitude"]),
                longitude: names(&["X", "Longitude", "lon", "lng", "longitude"]),
                region: names(&["State", "ST", "st"]),
                place: names(&["City"]),
                label: names(&["Chapter Name", "Chapter"]),
                date: names(&["Volunteer Since Date", "Since"]),
                flag: names(&["Dis Resp", "Disaster Response"]),
                status: names(&["Current Status", "Status"]),
                ..Self::default()
            },
            Category::BloodDrive => Self {
                latitude: names(&["Lat", "Latitude", "lat", "Y"]),
                longitude: names(&["Long", "Longitude", "lon", "lng", "X"]),
                region: names(&["St", "State", "ST"]),
                place: names(&["City"]),
                label: names(&["Account Name"]),
                date: names(&["Year"]),
                collected: names(&["RBC Products Collected"]),
                projected: names(&["RBC Product Projection"]),
                ..Self::default()
            },
            Category::Donor => Self {
                latitude: names(&["Y", "Latitude", "lat"]),
                longitude: names(&["X", "Longitude", "lon", "lng"]),
                region: names(&["State", "ST", "st"]),
                place: names(&["City"]),
                label: names(&["Account Name", "Name"]),
                amount: names(&[" Gift $ ", "Gift $", "Gift Amount", "Amount", "Donation"]),
                ..Self::default()
            },
            Category::Applicant => Self {
                latitude: names(&["Y", "Latitude", "lat"]),
                longitude: names(&["X", "Longitude", "lon", "lng"]),
                region: names(&["State", "ST", "st"]),
                place: names(&["City"]),
                date: names(&["Application Dt"]),
                status: names(&["Current Status"]),
                outcome: names(&["Intake Outcome"]),
                ..Self::default()
            },
        }
    }

    /// True when at least one resolution path is configured.
    fn can_locate(&self) -> bool {
        !self.region.is_empty()
            || !self.place.is_empty()
            || (!self.latitude.is_empty() && !self.longitude.is_empty())
    }
}

/// Partial schema as written in a config file; named lists replace the
/// defaults, unnamed ones keep them.
#[derive(Debug, Clone, Default, Deserialize)]
struct SchemaPatch {
    latitude: Option<Vec<String>>,
    longitude: Option<Vec<String>>,
    region: Option<Vec<String>>,
    place: Option<Vec<String>>,
    label: Option<Vec<String>>,
    date: Option<Vec<String>>,
    flag: Option<Vec<String>>,
    status: Option<Vec<String>>,
    outcome: Option<Vec<String>>,
    collected: Option<Vec<String>>,
    projected: Option<Vec<String>>,
    amount: Option<Vec<String>>,
}

impl SchemaPatch {
    fn apply(self, category: Category) -> SourceSchema {
        let d = SourceSchema::default_for(category);
        SourceSchema {
            latitude: self.latitude.unwrap_or(d.latitude),
            longitude: self.longitude.unwrap_or(d.longitude),
            region: self.region.unwrap_or(d.region),
            place: self.place.unwrap_or(d.place),
            label: self.label.unwrap_or(d.label),
            date: self.date.unwrap_or(d.date),
            flag: self.flag.unwrap_or(d.flag),
            status: self.status.unwrap_or(d.status),
            outcome: self.outcome.unwrap_or(d.outcome),
            collected: self.collected.unwrap_or(d.collected),
            projected: self.projected.unwrap_or(d.projected),
            amount: self.amount.unwrap_or(d.amount),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PipelineConfigFile {
    #[serde(default)]
    volunteers: SchemaPatch,
    #[serde(default)]
    blood_drives: SchemaPatch,
    #[serde(default)]
    donors: SchemaPatch,
    #[serde(default)]
    applicants: SchemaPatch,
    #[serde(default)]
    policy: Policy,
    #[serde(default)]
    limits: Limits,
    #[serde(default)]
    fallback: FallbackConfig,
}

impl From<PipelineConfigFile> for PipelineConfig {
    fn from(file: PipelineConfigFile) -> Self {
        Self {
            volunteers: file.volunteers.apply(Category::Volunteer),
            blood_drives: file.blood_drives.apply(Category::BloodDrive),
            donors: file.donors.apply(Category::Donor),
            applicants: file.applicants.apply(Category::Applicant),
            policy: file.policy,
            limits: file.limits,
            fallback: file.fallback,
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Classification thresholds. The defaults are the historical values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Policy {
    /// Minimum efficiency (percent) for the high tier.
    pub efficiency_high: f64,
    /// Minimum efficiency (percent) for the medium tier.
    pub efficiency_medium: f64,
    pub donor_tiers: DonorThresholds,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            efficiency_high: 90.0,
            efficiency_medium: 75.0,
            donor_tiers: DonorThresholds::default(),
        }
    }
}

/// Lower bounds (inclusive) of each donor tier above `contributor`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DonorThresholds {
    pub supporter: f64,
    pub patron: f64,
    pub benefactor: f64,
    pub leadership: f64,
    pub major: f64,
    pub mega: f64,
}

impl Default for DonorThresholds {
    fn default() -> Self {
        Self {
            supporter: 10_000.0,
            patron: 25_000.0,
            benefactor: 50_000.0,
            leadership: 100_000.0,
            major: 500_000.0,
            mega: 1_000_000.0,
        }
    }
}

impl DonorThresholds {
    fn ascending(&self) -> [f64; 6] {
        [
            self.supporter,
            self.patron,
            self.benefactor,
            self.leadership,
            self.major,
            self.mega,
        ]
    }
}

// ---------------------------------------------------------------------------
// Limits + Fallback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Below this many points the output is topped up with synthetic points.
    pub min_points: usize,
    /// Hard cap on emitted points (prefix truncation).
    pub max_points: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_points: 100,
            max_points: 50_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub seed: u64,
    pub targets: TargetCounts,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            seed: 2025,
            targets: TargetCounts::default(),
        }
    }
}

/// Requested number of synthetic points per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetCounts {
    pub volunteer: usize,
    pub blood_drive: usize,
    pub donor: usize,
    pub applicant: usize,
}

impl Default for TargetCounts {
    fn default() -> Self {
        Self {
            volunteer: 8_000,
            blood_drive: 28_000,
            donor: 2_000,
            applicant: 12_000,
        }
    }
}

impl TargetCounts {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Volunteer => self.volunteer,
            Category::BloodDrive => self.blood_drive,
            Category::Donor => self.donor,
            Category::Applicant => self.applicant,
        }
    }

    pub fn total(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl PipelineConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.policy;
        if !(p.efficiency_medium.is_finite() && p.efficiency_high.is_finite()) {
            return Err(ConfigError::Validation(
                "efficiency thresholds must be finite".into(),
            ));
        }
        if p.efficiency_medium < 0.0 || p.efficiency_medium > p.efficiency_high {
            return Err(ConfigError::Validation(format!(
                "efficiency thresholds must satisfy 0 <= medium <= high, got medium={} high={}",
                p.efficiency_medium, p.efficiency_high
            )));
        }

        let tiers = p.donor_tiers.ascending();
        if tiers.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(ConfigError::Validation(
                "donor tier thresholds must be positive".into(),
            ));
        }
        if tiers.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Validation(
                "donor tier thresholds must be strictly ascending".into(),
            ));
        }

        if self.limits.max_points == 0 {
            return Err(ConfigError::Validation("max_points must be at least 1".into()));
        }
        if self.limits.min_points > self.limits.max_points {
            return Err(ConfigError::Validation(format!(
                "min_points ({}) exceeds max_points ({})",
                self.limits.min_points, self.limits.max_points
            )));
        }

        if self.fallback.targets.total() == 0 {
            return Err(ConfigError::Validation(
                "fallback.targets must request at least one point".into(),
            ));
        }

        for category in Category::ALL {
            if !self.schema(category).can_locate() {
                return Err(ConfigError::Validation(format!(
                    "source '{category}': no region, place or coordinate fields configured"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.limits.max_points, 50_000);
        assert_eq!(config.policy.efficiency_high, 90.0);
        assert_eq!(config.volunteers.flag, vec!["Dis Resp", "Disaster Response"]);
        assert_eq!(config.fallback.targets.total(), 50_000);
    }

    #[test]
    fn patch_replaces_only_named_lists() {
        let input = r#"
[donors]
amount = ["Pledge"]
region = ["Province"]

[limits]
max_points = 2000
"#;
        let config = PipelineConfig::from_toml(input).unwrap();
        assert_eq!(config.donors.amount, vec!["Pledge"]);
        assert_eq!(config.donors.region, vec!["Province"]);
        assert_eq!(config.donors.place, vec!["City"]);
        assert_eq!(config.limits.max_points, 2000);
        assert_eq!(config.limits.min_points, 100);
        assert_eq!(config.volunteers, SourceSchema::default_for(Category::Volunteer));
    }

    #[test]
    fn integer_thresholds_accepted() {
        let input = r#"
[policy]
efficiency_high = 85
efficiency_medium = 70

[policy.donor_tiers]
mega = 2000000
"#;
        let config = PipelineConfig::from_toml(input).unwrap();
        assert_eq!(config.policy.efficiency_high, 85.0);
        assert_eq!(config.policy.donor_tiers.mega, 2_000_000.0);
        assert_eq!(config.policy.donor_tiers.major, 500_000.0);
    }

    #[test]
    fn reject_inverted_efficiency() {
        let input = r#"
[policy]
efficiency_high = 60
efficiency_medium = 75
"#;
        let err = PipelineConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("medium <= high"));
    }

    #[test]
    fn reject_unordered_donor_tiers() {
        let input = r#"
[policy.donor_tiers]
patron = 9000
"#;
        let err = PipelineConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn reject_min_above_max() {
        let input = r#"
[limits]
min_points = 500
max_points = 100
"#;
        let err = PipelineConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("exceeds max_points"));
    }

    #[test]
    fn reject_empty_fallback() {
        let input = r#"
[fallback.targets]
volunteer = 0
blood_drive = 0
donor = 0
applicant = 0
"#;
        let err = PipelineConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("fallback.targets"), "{err}");

        let one_category = "[fallback.targets]\nvolunteer = 0\nblood_drive = 0\ndonor = 1\napplicant = 0\n";
        assert!(PipelineConfig::from_toml(one_category).is_ok());
    }

    #[test]
    fn reject_unlocatable_source() {
        let input = r#"
[applicants]
latitude = []
region = []
place = []
"#;
        let err = PipelineConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("source 'applicant'"));
    }

    #[test]
    fn reject_bad_type() {
        let err = PipelineConfig::from_toml("[limits]\nmax_points = \"lots\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
