//! Multi-objective deck scoring.
//!
//! Five sub-scores, each in `[0, 1]`, are combined into one composite value
//! with the normalized soft weights of a [`ConstraintConfig`]. The individual
//! sub-score functions are public so the search strategies can reuse them for
//! incremental decisions (the role-first method scores partial decks with
//! them).
//!
//! The tuning constants below are empirical and kept as-is.

use std::sync::Arc;

use decksmith_card::{CardCandidate, SynergyLookup};
use serde::{Deserialize, Serialize};

use crate::{
    config::{ConstraintConfig, HardConstraints, SoftWeights},
    constraints::{self, DeckProfile},
};

/// Coverage weights for win condition, spell, air defense, tank killer, splash.
const COVERAGE_WEIGHTS: [f64; 5] = [0.20, 0.20, 0.25, 0.20, 0.15];
/// Role-fit weights for win condition, spell, support/cycle and air profiles.
const ROLE_FIT_WEIGHTS: [f64; 4] = [0.30, 0.25, 0.25, 0.20];
/// Ideal average elixir cost.
pub const ELIXIR_TARGET: f64 = 3.3;
/// Distance from [`ELIXIR_TARGET`] at which elixir fit reaches 0.
pub const ELIXIR_TOLERANCE: f64 = 2.0;
const SYNERGY_AVERAGE_WEIGHT: f64 = 0.75;
const SYNERGY_COVERAGE_WEIGHT: f64 = 0.25;

fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[expect(clippy::cast_precision_loss)]
fn ratio(count: usize, target: usize) -> f64 {
    clamp01(count as f64 / target as f64)
}

/// Weighted presence of the five capability categories.
#[must_use]
pub fn coverage_score(deck: &[&CardCandidate]) -> f64 {
    if deck.is_empty() {
        return 0.0;
    }
    let profile = DeckProfile::of(deck);
    let components = [
        ratio(profile.win_conditions, 1),
        ratio(profile.spells, 1),
        ratio(profile.air_defense, 2),
        ratio(profile.tank_killers, 1),
        ratio(profile.splash, 1),
    ];
    components
        .iter()
        .zip(COVERAGE_WEIGHTS)
        .map(|(c, w)| c * w)
        .sum()
}

/// Closeness to the ideal role profile: one win condition, one to three
/// spells, a support/cycle core and two air answers.
#[must_use]
pub fn role_fit_score(deck: &[&CardCandidate]) -> f64 {
    if deck.is_empty() {
        return 0.0;
    }
    let profile = DeckProfile::of(deck);
    #[expect(clippy::cast_precision_loss)]
    let win_fit = 1.0 - (profile.win_conditions as f64 - 1.0).abs() * 0.5;
    let spell_fit = match profile.spells {
        0 => 0.0,
        1..=3 => 1.0,
        _ => 0.5,
    };
    let support_fit = ratio(profile.support_or_cycle, 3);
    let air_fit = ratio(profile.air_defense, 2);
    let components = [win_fit, spell_fit, support_fit, air_fit];
    clamp01(
        components
            .iter()
            .zip(ROLE_FIT_WEIGHTS)
            .map(|(c, w)| c * w)
            .sum(),
    )
}

/// Triangular falloff around [`ELIXIR_TARGET`].
#[must_use]
pub fn elixir_fit_score(deck: &[&CardCandidate]) -> f64 {
    if deck.is_empty() {
        return 0.0;
    }
    let average = DeckProfile::of(deck).average_elixir();
    clamp01(1.0 - (average - ELIXIR_TARGET).abs() / ELIXIR_TOLERANCE)
}

/// Mean level ratio of the deck.
#[must_use]
pub fn card_quality_score(deck: &[&CardCandidate]) -> f64 {
    if deck.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss)]
    let n = deck.len() as f64;
    clamp01(deck.iter().map(|c| c.level_ratio()).sum::<f64>() / n)
}

/// Mean pairwise synergy blended with the share of pairs that have any.
#[must_use]
pub fn synergy_score(deck: &[&CardCandidate], synergy: &dyn SynergyLookup) -> f64 {
    if deck.is_empty() {
        return 0.0;
    }
    let names = deck.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
    let analysis = synergy.analyze_deck(&names);
    let max_pairs = deck.len() * (deck.len() - 1) / 2;
    let pair_coverage = if max_pairs == 0 {
        0.0
    } else {
        ratio(analysis.pair_count(), max_pairs)
    };
    clamp01(
        analysis.average_score * SYNERGY_AVERAGE_WEIGHT + pair_coverage * SYNERGY_COVERAGE_WEIGHT,
    )
}

/// Score breakdown of one deck.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeckMetrics {
    pub composite: f64,
    pub synergy: f64,
    pub coverage: f64,
    pub role_fit: f64,
    pub elixir_fit: f64,
    pub card_quality: f64,
    #[serde(default)]
    pub constraint_violations: Vec<String>,
    /// Build time of the strategy that produced the deck.
    #[serde(default)]
    pub runtime_ms: u64,
}

impl DeckMetrics {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.constraint_violations.is_empty()
    }
}

/// Composite scorer bound to one synergy source and constraint config.
#[derive(Debug, Clone)]
pub struct CompositeScorer {
    synergy: Arc<dyn SynergyLookup>,
    hard: HardConstraints,
    weights: SoftWeights,
}

impl CompositeScorer {
    #[must_use]
    pub fn new(synergy: Arc<dyn SynergyLookup>, config: &ConstraintConfig) -> Self {
        Self {
            synergy,
            hard: config.hard,
            weights: config.normalized_soft_weights(),
        }
    }

    #[must_use]
    pub fn synergy(&self) -> &dyn SynergyLookup {
        self.synergy.as_ref()
    }

    #[must_use]
    pub fn hard_constraints(&self) -> &HardConstraints {
        &self.hard
    }

    /// Composite value only.
    ///
    /// Used by hot loops that do not need the violation list.
    #[must_use]
    pub fn composite(&self, deck: &[&CardCandidate]) -> f64 {
        let w = &self.weights;
        clamp01(
            w.synergy * synergy_score(deck, self.synergy())
                + w.coverage * coverage_score(deck)
                + w.role_fit * role_fit_score(deck)
                + w.elixir_fit * elixir_fit_score(deck)
                + w.card_quality * card_quality_score(deck),
        )
    }

    /// Full breakdown with the constraint violations attached.
    ///
    /// Violations are informational; they never change the numbers.
    #[must_use]
    pub fn score(&self, deck: &[&CardCandidate]) -> DeckMetrics {
        let synergy = synergy_score(deck, self.synergy());
        let coverage = coverage_score(deck);
        let role_fit = role_fit_score(deck);
        let elixir_fit = elixir_fit_score(deck);
        let card_quality = card_quality_score(deck);
        let w = &self.weights;
        let composite = clamp01(
            w.synergy * synergy
                + w.coverage * coverage
                + w.role_fit * role_fit
                + w.elixir_fit * elixir_fit
                + w.card_quality * card_quality,
        );
        DeckMetrics {
            composite,
            synergy,
            coverage,
            role_fit,
            elixir_fit,
            card_quality,
            constraint_violations: constraints::validate_deck(deck, &self.hard).messages(),
            runtime_ms: 0,
        }
    }
}
