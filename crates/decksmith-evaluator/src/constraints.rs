//! Hard-constraint validation.
//!
//! [`validate_deck`] checks a deck against [`HardConstraints`] and reports
//! every rule it breaks. A deck is valid iff the report is empty. The checks
//! run in a fixed order (size, duplicates, then the four minimum counts) so
//! reports are stable across runs.

use std::collections::HashSet;

use decksmith_card::{CardCandidate, CardRole, DECK_SIZE};

use crate::config::HardConstraints;

/// Capability counts of a deck, shared by the validator and the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckProfile {
    pub size: usize,
    pub win_conditions: usize,
    pub spells: usize,
    pub air_defense: usize,
    pub tank_killers: usize,
    pub splash: usize,
    pub support_or_cycle: usize,
    pub total_elixir: u32,
}

impl DeckProfile {
    #[must_use]
    pub fn of(deck: &[&CardCandidate]) -> Self {
        let mut profile = Self {
            size: deck.len(),
            ..Self::default()
        };
        for card in deck {
            profile.win_conditions += usize::from(card.is_win_condition());
            profile.spells += usize::from(card.is_spell());
            profile.air_defense += usize::from(card.can_target_air());
            profile.tank_killers += usize::from(card.is_tank_killer());
            profile.splash += usize::from(card.is_splash());
            profile.support_or_cycle += usize::from(matches!(
                card.role,
                Some(CardRole::Support | CardRole::Cycle)
            ));
            profile.total_elixir += card.elixir;
        }
        profile
    }

    /// Mean card cost, 0 for an empty deck.
    #[must_use]
    pub fn average_elixir(&self) -> f64 {
        if self.size == 0 {
            return 0.0;
        }
        f64::from(self.total_elixir) / f64::from(u32::try_from(self.size).unwrap_or(u32::MAX))
    }
}

/// Category a hard minimum applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Requirement {
    #[display("win condition(s)")]
    WinConditions,
    #[display("spell(s)")]
    Spells,
    #[display("air-defense card(s)")]
    AirDefense,
    #[display("tank-killer(s)")]
    TankKillers,
}

/// One broken hard rule.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConstraintViolation {
    #[display("deck size must be {expected}, got {actual}")]
    DeckSize { expected: usize, actual: usize },
    #[display("duplicate card: {name}")]
    DuplicateCard { name: String },
    #[display("must include at least {required} {requirement}, found {actual}")]
    BelowMinimum {
        requirement: Requirement,
        required: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintReport {
    pub violations: Vec<ConstraintViolation>,
}

impl ConstraintReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Validates a deck against the hard minimums.
#[must_use]
pub fn validate_deck(deck: &[&CardCandidate], hard: &HardConstraints) -> ConstraintReport {
    let mut violations = vec![];
    if deck.len() != DECK_SIZE {
        violations.push(ConstraintViolation::DeckSize {
            expected: DECK_SIZE,
            actual: deck.len(),
        });
    }

    let mut seen = HashSet::new();
    for card in deck {
        if !seen.insert(card.name.as_str()) {
            violations.push(ConstraintViolation::DuplicateCard {
                name: card.name.clone(),
            });
        }
    }

    let profile = DeckProfile::of(deck);
    let minimums = [
        (Requirement::WinConditions, hard.min_win_conditions, profile.win_conditions),
        (Requirement::Spells, hard.min_spells, profile.spells),
        (Requirement::AirDefense, hard.min_air_defense, profile.air_defense),
        (Requirement::TankKillers, hard.min_tank_killers, profile.tank_killers),
    ];
    for (requirement, required, actual) in minimums {
        let required = usize::try_from(required).unwrap_or(0);
        if actual < required {
            violations.push(ConstraintViolation::BelowMinimum {
                requirement,
                required,
                actual,
            });
        }
    }

    ConstraintReport { violations }
}

/// Shorthand for `validate_deck(deck, hard).is_valid()`.
#[must_use]
pub fn is_valid_deck(deck: &[&CardCandidate], hard: &HardConstraints) -> bool {
    validate_deck(deck, hard).is_valid()
}
