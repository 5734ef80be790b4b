//! Hard constraints and soft objective weights.

use std::fmt;

use decksmith_card::DECK_SIZE;
use serde::{Deserialize, Serialize};

/// Minimum counts a deck must reach to be considered valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardConstraints {
    pub min_win_conditions: i32,
    pub min_spells: i32,
    pub min_air_defense: i32,
    pub min_tank_killers: i32,
}

impl Default for HardConstraints {
    fn default() -> Self {
        Self {
            min_win_conditions: 1,
            min_spells: 1,
            min_air_defense: 2,
            min_tank_killers: 1,
        }
    }
}

impl HardConstraints {
    /// Constraints that every 8-card deck satisfies.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min_win_conditions: 0,
            min_spells: 0,
            min_air_defense: 0,
            min_tank_killers: 0,
        }
    }

    fn fields(&self) -> [(&'static str, i32); 4] {
        [
            ("hard.min_win_conditions", self.min_win_conditions),
            ("hard.min_spells", self.min_spells),
            ("hard.min_air_defense", self.min_air_defense),
            ("hard.min_tank_killers", self.min_tank_killers),
        ]
    }
}

/// Relative weights of the five composite sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftWeights {
    pub synergy: f64,
    pub coverage: f64,
    pub role_fit: f64,
    pub elixir_fit: f64,
    pub card_quality: f64,
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            synergy: 0.30,
            coverage: 0.25,
            role_fit: 0.20,
            elixir_fit: 0.15,
            card_quality: 0.10,
        }
    }
}

impl SoftWeights {
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.synergy + self.coverage + self.role_fit + self.elixir_fit + self.card_quality
    }

    fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("soft.synergy", self.synergy),
            ("soft.coverage", self.coverage),
            ("soft.role_fit", self.role_fit),
            ("soft.elixir_fit", self.elixir_fit),
            ("soft.card_quality", self.card_quality),
        ]
    }
}

/// Hard requirements plus soft objective weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    pub hard: HardConstraints,
    pub soft: SoftWeights,
}

/// One invalid configuration field.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("{field} must be in [0,{DECK_SIZE}], got {value}")]
    HardBoundOutOfRange { field: &'static str, value: i32 },
    #[display("{field} must be a non-negative number, got {value}")]
    NegativeSoftWeight { field: &'static str, value: f64 },
    #[display("soft weights must sum to > 0, got {sum}")]
    SoftWeightSumNotPositive { sum: f64 },
}

/// Every field that failed validation, in declaration order.
#[derive(Debug, Clone, PartialEq, derive_more::Error)]
pub struct InvalidConstraintConfig {
    pub errors: Vec<ConfigError>,
}

impl fmt::Display for InvalidConstraintConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid constraint config: ")?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl ConstraintConfig {
    /// Checks hard bounds and soft weights, reporting every offending field.
    pub fn validate(&self) -> Result<(), InvalidConstraintConfig> {
        let mut errors = vec![];
        let max = i32::try_from(DECK_SIZE).unwrap_or(i32::MAX);
        for (field, value) in self.hard.fields() {
            if !(0..=max).contains(&value) {
                errors.push(ConfigError::HardBoundOutOfRange { field, value });
            }
        }
        for (field, value) in self.soft.fields() {
            if value.is_nan() || value < 0.0 {
                errors.push(ConfigError::NegativeSoftWeight { field, value });
            }
        }
        let sum = self.soft.sum();
        if errors.is_empty() && sum <= 0.0 {
            errors.push(ConfigError::SoftWeightSumNotPositive { sum });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(InvalidConstraintConfig { errors })
        }
    }

    /// Soft weights scaled to sum to 1, or the defaults if they cannot be.
    #[must_use]
    pub fn normalized_soft_weights(&self) -> SoftWeights {
        let sum = self.soft.sum();
        if !sum.is_finite() || sum <= 0.0 {
            return SoftWeights::default();
        }
        SoftWeights {
            synergy: self.soft.synergy / sum,
            coverage: self.soft.coverage / sum,
            role_fit: self.soft.role_fit / sum,
            elixir_fit: self.soft.elixir_fit / sum,
            card_quality: self.soft.card_quality / sum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ConstraintConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_hard_bound_above_deck_size() {
        let mut config = ConstraintConfig::default();
        config.hard.min_air_defense = 9;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.errors,
            [ConfigError::HardBoundOutOfRange {
                field: "hard.min_air_defense",
                value: 9
            }]
        );
        assert!(err.to_string().contains("hard.min_air_defense must be in [0,8], got 9"));
    }

    #[test]
    fn test_reports_one_error_per_field() {
        let mut config = ConstraintConfig::default();
        config.hard.min_spells = -1;
        config.hard.min_tank_killers = 12;
        config.soft.role_fit = -0.1;
        let err = config.validate().unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(matches!(
            err.errors[2],
            ConfigError::NegativeSoftWeight {
                field: "soft.role_fit",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_weight_sum() {
        let config = ConstraintConfig {
            hard: HardConstraints::default(),
            soft: SoftWeights {
                synergy: 0.0,
                coverage: 0.0,
                role_fit: 0.0,
                elixir_fit: 0.0,
                card_quality: 0.0,
            },
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err.errors[..],
            [ConfigError::SoftWeightSumNotPositive { .. }]
        ));
    }

    #[test]
    fn test_normalizes_soft_weights() {
        let config = ConstraintConfig {
            hard: HardConstraints::default(),
            soft: SoftWeights {
                synergy: 3.0,
                coverage: 2.0,
                role_fit: 2.0,
                elixir_fit: 2.0,
                card_quality: 1.0,
            },
        };
        let weights = config.normalized_soft_weights();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!((weights.synergy - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConstraintConfig =
            serde_json::from_str(r#"{"hard":{"min_air_defense":3}}"#).unwrap();
        assert_eq!(config.hard.min_air_defense, 3);
        assert_eq!(config.hard.min_win_conditions, 1);
        assert_eq!(config.soft, SoftWeights::default());
    }
}
