use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_LOW_ACTIVITY_THRESHOLD: f64 = 1.0;
pub const DEFAULT_INJURY_MOVEMENT_THRESHOLD: f64 = 100.0;
pub const DEFAULT_INJURY_WINDOW: usize = 30;
pub const DEFAULT_INJURY_STOP_THRESHOLD: usize = 20;
pub const DEFAULT_RANKING_LIMIT: usize = 10;
pub const UNASSIGNED_ENTITY_ID: i64 = -1;

/// Which flagged injury candidates end up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InjurySelectionPolicy {
    /// Only the first flagged entity in input order.
    #[default]
    FirstEncountered,
    /// Only the entity with the most trailing stops.
    MostSevere,
    /// Every flagged entity, in input order.
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Displacement per frame step below which a frame counts as low activity.
    #[serde(default = "default_low_activity_threshold")]
    pub low_activity_threshold: f64,

    /// Total movement an entity must exceed before it can be an injury candidate.
    #[serde(default = "default_injury_movement_threshold")]
    pub injury_movement_threshold: f64,

    /// Number of trailing displacement samples inspected for stoppages.
    #[serde(default = "default_injury_window")]
    pub injury_window: usize,

    /// Minimum low-activity samples inside the trailing window.
    #[serde(default = "default_injury_stop_threshold")]
    pub injury_stop_threshold: usize,

    #[serde(default = "default_ranking_limit")]
    pub ranking_limit: usize,

    #[serde(default = "default_unassigned_entity_id")]
    pub unassigned_entity_id: i64,

    #[serde(default)]
    pub injury_policy: InjurySelectionPolicy,
}

fn default_low_activity_threshold() -> f64 {
    DEFAULT_LOW_ACTIVITY_THRESHOLD
}

fn default_injury_movement_threshold() -> f64 {
    DEFAULT_INJURY_MOVEMENT_THRESHOLD
}

fn default_injury_window() -> usize {
    DEFAULT_INJURY_WINDOW
}

fn default_injury_stop_threshold() -> usize {
    DEFAULT_INJURY_STOP_THRESHOLD
}

fn default_ranking_limit() -> usize {
    DEFAULT_RANKING_LIMIT
}

fn default_unassigned_entity_id() -> i64 {
    UNASSIGNED_ENTITY_ID
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            low_activity_threshold: DEFAULT_LOW_ACTIVITY_THRESHOLD,
            injury_movement_threshold: DEFAULT_INJURY_MOVEMENT_THRESHOLD,
            injury_window: DEFAULT_INJURY_WINDOW,
            injury_stop_threshold: DEFAULT_INJURY_STOP_THRESHOLD,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            unassigned_entity_id: UNASSIGNED_ENTITY_ID,
            injury_policy: InjurySelectionPolicy::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.low_activity_threshold.is_finite() || self.low_activity_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "low_activity_threshold",
                reason: format!("expected a non-negative number, got {}", self.low_activity_threshold),
            });
        }
        if !self.injury_movement_threshold.is_finite() || self.injury_movement_threshold < 0.0 {
            return Err(ConfigError::Invalid {
                field: "injury_movement_threshold",
                reason: format!(
                    "expected a non-negative number, got {}",
                    self.injury_movement_threshold
                ),
            });
        }
        if self.injury_window == 0 {
            return Err(ConfigError::Invalid {
                field: "injury_window",
                reason: "window must hold at least one sample".to_string(),
            });
        }
        if self.injury_stop_threshold > self.injury_window {
            return Err(ConfigError::Invalid {
                field: "injury_stop_threshold",
                reason: format!(
                    "{} stops can never fit in a window of {}",
                    self.injury_stop_threshold, self.injury_window
                ),
            });
        }
        if self.ranking_limit == 0 {
            return Err(ConfigError::Invalid {
                field: "ranking_limit",
                reason: "limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_named_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.low_activity_threshold, 1.0);
        assert_eq!(config.injury_movement_threshold, 100.0);
        assert_eq!(config.injury_window, 30);
        assert_eq!(config.injury_stop_threshold, 20);
        assert_eq!(config.ranking_limit, 10);
        assert_eq!(config.unassigned_entity_id, -1);
        assert_eq!(config.injury_policy, InjurySelectionPolicy::FirstEncountered);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"injury_window": 40, "injury_policy": "most_severe"}"#)
                .unwrap();
        assert_eq!(config.injury_window, 40);
        assert_eq!(config.injury_policy, InjurySelectionPolicy::MostSevere);
        assert_eq!(config.injury_stop_threshold, DEFAULT_INJURY_STOP_THRESHOLD);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed = serde_json::from_str::<AnalysisConfig>(r#"{"injury_windw": 40}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn stop_threshold_larger_than_window_is_invalid() {
        let config = AnalysisConfig {
            injury_window: 10,
            injury_stop_threshold: 11,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "injury_stop_threshold", .. })
        ));
    }

    #[test]
    fn negative_threshold_is_invalid() {
        let config = AnalysisConfig {
            low_activity_threshold: -0.5,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ranking_limit": 5, "low_activity_threshold": 0.5}}"#).unwrap();
        let config = AnalysisConfig::from_path(file.path()).unwrap();
        assert_eq!(config.ranking_limit, 5);
        assert_eq!(config.low_activity_threshold, 0.5);
    }

    #[test]
    fn invalid_config_on_disk_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"ranking_limit": 0}}"#).unwrap();
        assert!(AnalysisConfig::from_path(file.path()).is_err());
    }
}
