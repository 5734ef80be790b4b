//! Play-style labelling.
//!
//! The guess is attached to results for diagnostics only and never feeds back
//! into scoring or search.

use std::fmt;

use decksmith_card::{CardCandidate, CardRole};
use serde::{Deserialize, Serialize};

use crate::constraints::DeckProfile;

const SIEGE_NAMES: [&str; 2] = ["X-Bow", "Mortar"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    #[display("beatdown")]
    Beatdown,
    #[display("siege")]
    Siege,
    #[display("cycle")]
    Cycle,
    #[display("control")]
    Control,
    #[display("bridge_spam")]
    BridgeSpam,
    #[display("unknown")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeGuess {
    pub archetype: Archetype,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

impl ArchetypeGuess {
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            archetype: Archetype::Unknown,
            confidence: 0.0,
        }
    }
}

/// Best-guess play style of a deck.
pub trait ArchetypeDetector: fmt::Debug + Send + Sync {
    fn detect(&self, deck: &[&CardCandidate]) -> ArchetypeGuess;
}

/// Rule-based detector looking at win-condition cost, siege buildings,
/// average elixir and spell count.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicArchetypeDetector;

impl HeuristicArchetypeDetector {
    const BEATDOWN_WIN_CONDITION_COST: u32 = 6;
    const CYCLE_MAX_AVERAGE: f64 = 3.1;
    const BRIDGE_SPAM_MIN_AVERAGE: f64 = 3.6;
}

fn guess(archetype: Archetype, confidence: f64) -> ArchetypeGuess {
    ArchetypeGuess {
        archetype,
        confidence: confidence.clamp(0.0, 1.0),
    }
}

impl ArchetypeDetector for HeuristicArchetypeDetector {
    fn detect(&self, deck: &[&CardCandidate]) -> ArchetypeGuess {
        let win_conditions = deck
            .iter()
            .filter(|c| c.is_win_condition() || SIEGE_NAMES.contains(&c.name.as_str()))
            .collect::<Vec<_>>();
        let Some(heaviest) = win_conditions.iter().map(|c| c.elixir).max() else {
            return ArchetypeGuess::unknown();
        };
        let profile = DeckProfile::of(deck);
        let average = profile.average_elixir();

        if win_conditions
            .iter()
            .any(|c| SIEGE_NAMES.contains(&c.name.as_str()))
        {
            return guess(Archetype::Siege, 0.9);
        }
        if heaviest >= Self::BEATDOWN_WIN_CONDITION_COST {
            return guess(Archetype::Beatdown, 0.6 + (average - 3.5) / 4.0);
        }
        if average <= Self::CYCLE_MAX_AVERAGE {
            return guess(
                Archetype::Cycle,
                0.6 + (Self::CYCLE_MAX_AVERAGE - average) / 2.0,
            );
        }
        if average >= Self::BRIDGE_SPAM_MIN_AVERAGE && profile.spells <= 2 {
            return guess(Archetype::BridgeSpam, 0.55);
        }
        let buildings = deck
            .iter()
            .filter(|c| c.has_role(CardRole::Building))
            .count();
        if profile.spells >= 3 || buildings > 0 {
            #[expect(clippy::cast_precision_loss)]
            let weight = (profile.spells + buildings) as f64;
            return guess(Archetype::Control, 0.4 + 0.1 * weight);
        }
        guess(Archetype::Unknown, 0.2)
    }
}

#[cfg(test)]
mod tests {
    use decksmith_card::fixtures;

    use super::*;

    #[test]
    fn test_low_cost_hog_deck_is_cycle() {
        let pool = fixtures::standard_pool();
        let deck = pool.resolve(&fixtures::valid_deck_names());
        let guess = HeuristicArchetypeDetector.detect(&deck);
        assert_eq!(guess.archetype, Archetype::Cycle);
        assert!((0.0..=1.0).contains(&guess.confidence));
    }

    #[test]
    fn test_heavy_win_condition_is_beatdown() {
        let pool = fixtures::standard_pool();
        let deck = pool.resolve(&[
            "Royal Giant",
            "Mini P.E.K.K.A",
            "Musketeer",
            "Baby Dragon",
            "Fireball",
            "Zap",
            "Cannon",
            "Ice Spirit",
        ]);
        assert_eq!(
            HeuristicArchetypeDetector.detect(&deck).archetype,
            Archetype::Beatdown
        );
    }

    #[test]
    fn test_siege_building() {
        let xbow = CardCandidate::new("X-Bow", 13, 15, 6).with_role(CardRole::Building);
        let log = CardCandidate::new("The Log", 13, 15, 2).with_role(CardRole::SmallSpell);
        let guess = HeuristicArchetypeDetector.detect(&[&xbow, &log]);
        assert_eq!(guess.archetype, Archetype::Siege);
    }

    #[test]
    fn test_no_win_condition_is_unknown() {
        let pool = fixtures::standard_pool();
        let deck = pool.resolve(&["Zap", "The Log"]);
        assert_eq!(HeuristicArchetypeDetector.detect(&deck), ArchetypeGuess::unknown());
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&Archetype::BridgeSpam).unwrap(),
            "\"bridge_spam\""
        );
        assert_eq!(Archetype::BridgeSpam.to_string(), "bridge_spam");
    }
}
