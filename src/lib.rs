//! Batch movement analytics over tracked player detections.
//!
//! One detection table goes in; per-entity kinematics, fatigue and distance
//! rankings, injury candidates, a match summary and an ordered list of chart
//! requests come out. Nothing here draws or persists anything.

pub mod analysis;
pub mod config;
pub mod error;
pub mod ingest;
pub mod kinematics;
pub mod models;
pub mod rankings;
pub mod report;
pub mod risk;
pub mod trajectory;

pub use analysis::{analyze, AnalysisReport};
pub use config::{AnalysisConfig, InjurySelectionPolicy};
