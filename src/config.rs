//! Engine configuration
//!
//! Bundles the category table and the behavior weighting policy so both can be
//! audited, persisted and swapped as one unit.

use crate::dimension::{BehaviorWeighting, CategoryProfile};
use crate::error::UniverseError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration consumed by the dimension engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub category_profile: CategoryProfile,
    #[serde(default)]
    pub behavior_weighting: BehaviorWeighting,
}

impl EngineConfig {
    pub fn new(category_profile: CategoryProfile, behavior_weighting: BehaviorWeighting) -> Self {
        Self {
            category_profile,
            behavior_weighting,
        }
    }

    /// Check both tables
    pub fn validate(&self) -> Result<(), UniverseError> {
        self.category_profile.validate()?;
        self.behavior_weighting.validate()
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, UniverseError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| UniverseError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_path(path: &Path) -> Result<Self, UniverseError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            UniverseError::InvalidConfig(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, UniverseError> {
        serde_json::to_string_pretty(self).map_err(UniverseError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::CategoryWeights;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_round_trip() {
        let config = EngineConfig::default();
        let json = config.to_json().unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "category_profile": {
                "asmr": { "cognition": 0.0, "empathy": 0.4, "pleasure": 0.6 }
            }
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.behavior_weighting, BehaviorWeighting::standard());
        assert_eq!(
            config.category_profile.lookup("asmr"),
            Some(CategoryWeights::new(0.0, 0.4, 0.6))
        );
        assert!(!config.category_profile.contains("knowledge"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{
            "behavior_weighting": { "rules": [ { "signal": "liked", "multiplier": -2.0 } ] }
        }"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(UniverseError::InvalidConfig(_))
        ));

        assert!(matches!(
            EngineConfig::from_json("not json"),
            Err(UniverseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::from_path(Path::new("/nonexistent/xian-config.json"));
        assert!(matches!(result, Err(UniverseError::InvalidConfig(_))));
    }
}
