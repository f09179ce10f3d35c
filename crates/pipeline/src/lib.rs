//! `reliefmap-pipeline`: relief-operations map pipeline.
//!
//! Pure engine crate: receives records through injected loaders, returns
//! classified, geolocated points plus per-region rollups.
//! No CLI or IO dependencies.

pub mod aggregate;
pub mod amount;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod gazetteer;
pub mod model;
pub mod resolve;
pub mod summary;
pub mod synthetic;

pub use config::PipelineConfig;
pub use engine::{fallback, run, SourceLoader, Sources};
pub use error::{ConfigError, LoadError};
pub use model::{Category, DataOrigin, PipelineResult, Point, RawRecord, RegionCluster};
