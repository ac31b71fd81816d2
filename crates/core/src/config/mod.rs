use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{exercise::validate_thresholds, ExerciseRule, RepCounterError, Result};

/// Top-level configuration structure for the rep counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum gap between two accepted stage transitions.
    pub cooldown_ms: u64,
    /// How often the progress tracker samples the running totals.
    pub tracking_interval_secs: u64,
    pub points_per_level: u32,
    /// Per-exercise threshold replacements keyed by exercise name.
    pub thresholds: BTreeMap<String, ThresholdOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 300,
            tracking_interval_secs: 5,
            points_per_level: 50,
            thresholds: BTreeMap::new(),
        }
    }
}

/// Replacement thresholds for a single exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdOverride {
    pub high: f32,
    pub low: f32,
}

impl EngineConfig {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.points_per_level == 0 {
            return Err(RepCounterError::invalid_config(
                "points_per_level must be greater than zero",
            ));
        }
        for (name, limits) in &self.thresholds {
            if ExerciseRule::lookup(name).is_none() {
                return Err(RepCounterError::invalid_config(format!(
                    "threshold override names unsupported exercise `{name}`"
                )));
            }
            validate_thresholds(name, limits.high, limits.low)?;
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn tracking_interval(&self) -> Duration {
        Duration::from_secs(self.tracking_interval_secs)
    }

    /// Resolves the effective rule for `exercise`, applying any configured
    /// override. Unknown exercises resolve to `None`.
    pub fn rule_for(&self, exercise: &str) -> Result<Option<ExerciseRule>> {
        let Some(rule) = ExerciseRule::lookup(exercise) else {
            return Ok(None);
        };
        match self.thresholds.get(exercise) {
            Some(limits) => rule.with_thresholds(limits.high, limits.low).map(Some),
            None => Ok(Some(rule)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.cooldown(), Duration::from_millis(300));
    }

    #[test]
    fn applies_threshold_overrides() {
        let config = EngineConfig::from_json_str(
            r#"{"cooldown_ms": 450, "thresholds": {"Squats": {"high": 150.0, "low": 100.0}}}"#,
        )
        .unwrap();

        let squats = config.rule_for("Squats").unwrap().unwrap();
        assert_eq!(squats.high_threshold, 150.0);
        assert_eq!(squats.low_threshold, 100.0);

        let push_ups = config.rule_for("Push-ups").unwrap().unwrap();
        assert_eq!(push_ups.high_threshold, 160.0);
        assert!(config.rule_for("Juggling").unwrap().is_none());
    }

    #[test]
    fn rejects_bad_overrides() {
        let unknown = EngineConfig::from_json_str(
            r#"{"thresholds": {"Juggling": {"high": 2.0, "low": 1.0}}}"#,
        );
        assert!(matches!(unknown, Err(RepCounterError::InvalidConfig(_))));

        let inverted = EngineConfig::from_json_str(
            r#"{"thresholds": {"Squats": {"high": 80.0, "low": 90.0}}}"#,
        );
        assert!(matches!(inverted, Err(RepCounterError::InvalidConfig(_))));

        let zero_level = EngineConfig::from_json_str(r#"{"points_per_level": 0}"#);
        assert!(zero_level.is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let err = EngineConfig::from_json_str("{cooldown_ms").unwrap_err();
        assert!(matches!(err, RepCounterError::Json(_)));
    }
}
