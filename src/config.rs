//! Engine configuration file support.
//!
//! Tunable knobs for the scheduling engine, read from a TOML file with
//! sensible defaults for every field. The server binary resolves the file
//! path from the `CTS_CONFIG` environment variable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub scoring: ScoringWeights,
}

/// Search-space bounds and attempt budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// How many days ahead the backtracking search enumerates windows.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// First placeable window start, hour of day.
    #[serde(default = "default_grid_start_hour")]
    pub grid_start_hour: u32,
    /// Last placeable window start, hour of day.
    #[serde(default = "default_grid_end_hour")]
    pub grid_end_hour: u32,
    /// All windows must end strictly before this hour.
    #[serde(default = "default_latest_end_hour")]
    pub latest_end_hour: u32,
    /// Grid step between candidate window starts.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    /// Attempt budget for the first scheduling pass.
    #[serde(default = "default_first_pass_attempts")]
    pub first_pass_attempts: u32,
    /// Attempt budget for the batch retry pass.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            grid_start_hour: default_grid_start_hour(),
            grid_end_hour: default_grid_end_hour(),
            latest_end_hour: default_latest_end_hour(),
            step_minutes: default_step_minutes(),
            first_pass_attempts: default_first_pass_attempts(),
            retry_attempts: default_retry_attempts(),
        }
    }
}

fn default_horizon_days() -> i64 {
    30
}

fn default_grid_start_hour() -> u32 {
    8
}

fn default_grid_end_hour() -> u32 {
    17
}

fn default_latest_end_hour() -> u32 {
    18
}

fn default_step_minutes() -> i64 {
    30
}

fn default_first_pass_attempts() -> u32 {
    5
}

fn default_retry_attempts() -> u32 {
    10
}

/// Soft-constraint penalties and bonuses applied to hard-valid assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Score every hard-valid assignment starts from.
    #[serde(default = "default_base_score")]
    pub base: f64,
    #[serde(default = "default_preferred_hours_penalty")]
    pub preferred_hours_penalty: f64,
    #[serde(default = "default_lunch_penalty")]
    pub lunch_penalty: f64,
    #[serde(default = "default_back_to_back_penalty")]
    pub back_to_back_penalty: f64,
    /// Penalty for soft warnings without a dedicated weight.
    #[serde(default = "default_unclassified_penalty")]
    pub unclassified_penalty: f64,
    /// Bonus per positive signal (e.g. an optimal back-to-back gap).
    #[serde(default = "default_positive_bonus")]
    pub positive_bonus: f64,
    /// Penalty per hour of drift from the caller's preferred start.
    #[serde(default = "default_drift_penalty_per_hour")]
    pub drift_penalty_per_hour: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: default_base_score(),
            preferred_hours_penalty: default_preferred_hours_penalty(),
            lunch_penalty: default_lunch_penalty(),
            back_to_back_penalty: default_back_to_back_penalty(),
            unclassified_penalty: default_unclassified_penalty(),
            positive_bonus: default_positive_bonus(),
            drift_penalty_per_hour: default_drift_penalty_per_hour(),
        }
    }
}

fn default_base_score() -> f64 {
    100.0
}

fn default_preferred_hours_penalty() -> f64 {
    20.0
}

fn default_lunch_penalty() -> f64 {
    15.0
}

fn default_back_to_back_penalty() -> f64 {
    10.0
}

fn default_unclassified_penalty() -> f64 {
    5.0
}

fn default_positive_bonus() -> f64 {
    10.0
}

fn default_drift_penalty_per_hour() -> f64 {
    5.0
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Resolve configuration from the environment.
    ///
    /// Reads the file named by `CTS_CONFIG` when set, otherwise returns
    /// defaults.
    pub fn from_env() -> Result<Self, String> {
        match std::env::var("CTS_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.search.horizon_days, 30);
        assert_eq!(config.search.first_pass_attempts, 5);
        assert_eq!(config.search.retry_attempts, 10);
        assert_eq!(config.scoring.base, 100.0);
        assert_eq!(config.scoring.preferred_hours_penalty, 20.0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: EngineConfig = toml::from_str(
            r#"
            [search]
            horizon_days = 14

            [scoring]
            lunch_penalty = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.search.horizon_days, 14);
        // Unset fields keep their defaults.
        assert_eq!(config.search.step_minutes, 30);
        assert_eq!(config.scoring.lunch_penalty, 25.0);
        assert_eq!(config.scoring.positive_bonus, 10.0);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.search.grid_start_hour, 8);
        assert_eq!(config.search.latest_end_hour, 18);
    }
}
