//! Behavior weighting
//!
//! Turns one watch event into a positive importance weight. The policy is an
//! ordered list of (predicate, multiplier) rules; every rule that matches
//! multiplies the base weight of 1.0.

use crate::error::UniverseError;
use crate::types::WatchEvent;
use serde::{Deserialize, Serialize};

/// Base weight of an event that triggers no rule
pub const BASE_BEHAVIOR_WEIGHT: f64 = 1.0;

/// Watch fraction at or above which an event counts as completed
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 0.8;

/// Engagement signal a rule tests for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum BehaviorSignal {
    /// Watched at least `min_fraction` of the content
    Completed { min_fraction: f64 },
    Liked,
    Commented,
    NightTime,
}

impl BehaviorSignal {
    /// Whether the event exhibits this signal
    pub fn matches(&self, event: &WatchEvent) -> bool {
        match self {
            BehaviorSignal::Completed { min_fraction } => event.watch_fraction >= *min_fraction,
            BehaviorSignal::Liked => event.liked,
            BehaviorSignal::Commented => event.commented,
            BehaviorSignal::NightTime => event.is_night_time,
        }
    }
}

/// A signal paired with the multiplier it applies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRule {
    #[serde(flatten)]
    pub signal: BehaviorSignal,
    pub multiplier: f64,
}

impl BehaviorRule {
    pub const fn new(signal: BehaviorSignal, multiplier: f64) -> Self {
        Self { signal, multiplier }
    }
}

/// Ordered multiplicative weighting policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorWeighting {
    pub rules: Vec<BehaviorRule>,
}

impl Default for BehaviorWeighting {
    fn default() -> Self {
        Self::standard()
    }
}

impl BehaviorWeighting {
    /// Completion ×1.5, like ×2.0, comment ×2.5, late night ×1.3
    pub fn standard() -> Self {
        Self {
            rules: vec![
                BehaviorRule::new(
                    BehaviorSignal::Completed {
                        min_fraction: DEFAULT_COMPLETION_THRESHOLD,
                    },
                    1.5,
                ),
                BehaviorRule::new(BehaviorSignal::Liked, 2.0),
                BehaviorRule::new(BehaviorSignal::Commented, 2.5),
                BehaviorRule::new(BehaviorSignal::NightTime, 1.3),
            ],
        }
    }

    /// Policy with no rules; every event weighs 1.0
    pub fn flat() -> Self {
        Self { rules: Vec::new() }
    }

    /// Behavior weight of a single event
    pub fn weight(&self, event: &WatchEvent) -> f64 {
        self.rules
            .iter()
            .filter(|rule| rule.signal.matches(event))
            .fold(BASE_BEHAVIOR_WEIGHT, |acc, rule| acc * rule.multiplier)
    }

    /// Reject multipliers that could make a weight zero, negative or non-finite
    pub fn validate(&self) -> Result<(), UniverseError> {
        for rule in &self.rules {
            if !rule.multiplier.is_finite() || rule.multiplier <= 0.0 {
                return Err(UniverseError::InvalidConfig(format!(
                    "rule {:?} has non-positive multiplier {}",
                    rule.signal, rule.multiplier
                )));
            }
            if let BehaviorSignal::Completed { min_fraction } = rule.signal {
                if !(0.0..=1.0).contains(&min_fraction) {
                    return Err(UniverseError::InvalidConfig(format!(
                        "completion threshold {min_fraction} outside [0, 1]"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_weight() {
        let weighting = BehaviorWeighting::standard();
        let event = WatchEvent::new("news", 0.3);
        assert_eq!(weighting.weight(&event), 1.0);
    }

    #[test]
    fn test_individual_boosts() {
        let weighting = BehaviorWeighting::standard();

        assert_eq!(weighting.weight(&WatchEvent::new("news", 0.8)), 1.5);
        assert_eq!(weighting.weight(&WatchEvent::new("news", 0.79)), 1.0);
        assert_eq!(weighting.weight(&WatchEvent::new("news", 0.1).liked(true)), 2.0);
        assert_eq!(weighting.weight(&WatchEvent::new("news", 0.1).commented(true)), 2.5);
        assert_eq!(weighting.weight(&WatchEvent::new("news", 0.1).at_night(true)), 1.3);
    }

    #[test]
    fn test_boosts_compound() {
        let weighting = BehaviorWeighting::standard();

        let liked_and_finished = WatchEvent::new("knowledge", 0.9).liked(true);
        assert!((weighting.weight(&liked_and_finished) - 3.0).abs() < 1e-12);

        let everything = WatchEvent::new("knowledge", 1.0)
            .liked(true)
            .commented(true)
            .at_night(true);
        assert!((weighting.weight(&everything) - 1.5 * 2.0 * 2.5 * 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_flat_weighting() {
        let event = WatchEvent::new("news", 1.0).liked(true);
        assert_eq!(BehaviorWeighting::flat().weight(&event), 1.0);
    }

    #[test]
    fn test_validate() {
        assert!(BehaviorWeighting::standard().validate().is_ok());

        let zero = BehaviorWeighting {
            rules: vec![BehaviorRule::new(BehaviorSignal::Liked, 0.0)],
        };
        assert!(zero.validate().is_err());

        let bad_threshold = BehaviorWeighting {
            rules: vec![BehaviorRule::new(
                BehaviorSignal::Completed { min_fraction: 1.5 },
                1.5,
            )],
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_rule_serialization() {
        let json = serde_json::to_value(BehaviorWeighting::standard()).unwrap();
        assert_eq!(json["rules"][0]["signal"], "completed");
        assert_eq!(json["rules"][0]["min_fraction"], 0.8);
        assert_eq!(json["rules"][0]["multiplier"], 1.5);
        assert_eq!(json["rules"][3]["signal"], "night_time");

        let parsed: BehaviorWeighting = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, BehaviorWeighting::standard());
    }
}
