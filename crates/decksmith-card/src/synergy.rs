//! Pairwise card synergy lookup.
//!
//! Synergy data lives outside the search core; the core only needs the
//! read-only [`SynergyLookup`] interface. [`SynergyTable`] is a simple
//! in-memory implementation backed by a list of known pairs, which is what the
//! command-line tools load from JSON.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::{Deserialize, Serialize};

/// Broad pattern a synergy pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynergyCategory {
    TankSupport,
    Bait,
    SpellCombo,
    WinCondition,
    Defensive,
    Cycle,
    BridgeSpam,
}

/// A known synergy between two cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyPair {
    pub card1: String,
    pub card2: String,
    pub synergy_type: SynergyCategory,
    /// Strength of the synergy in `[0, 1]`.
    pub score: f64,
    #[serde(default)]
    pub description: String,
}

/// Synergy summary of a whole deck.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckSynergyAnalysis {
    /// Mean score over the pairs that have a known synergy (0 when none do).
    pub average_score: f64,
    /// Number of synergy-contributing pairs per category.
    pub category_pair_counts: BTreeMap<SynergyCategory, usize>,
}

impl DeckSynergyAnalysis {
    /// Total number of pairs that contributed any synergy.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.category_pair_counts.values().sum()
    }
}

/// Read-only access to pairwise synergy data.
pub trait SynergyLookup: fmt::Debug + Send + Sync {
    /// Synergy between two cards in `[0, 1]`, independent of argument order.
    fn synergy(&self, card1: &str, card2: &str) -> f64;

    /// Analyzes all pairs of a deck.
    fn analyze_deck(&self, names: &[&str]) -> DeckSynergyAnalysis;
}

/// In-memory synergy table keyed by unordered card pairs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "SynergyTableData")]
pub struct SynergyTable {
    pairs: HashMap<(String, String), SynergyPair>,
}

#[derive(Debug, Deserialize)]
struct SynergyTableData {
    pairs: Vec<SynergyPair>,
}

impl From<SynergyTableData> for SynergyTable {
    fn from(data: SynergyTableData) -> Self {
        Self::from_pairs(data.pairs)
    }
}

fn pair_key(card1: &str, card2: &str) -> (String, String) {
    if card1 <= card2 {
        (card1.to_owned(), card2.to_owned())
    } else {
        (card2.to_owned(), card1.to_owned())
    }
}

impl SynergyTable {
    /// Builds a table; a later pair for the same two cards replaces an earlier one.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = SynergyPair>,
    {
        let pairs = pairs
            .into_iter()
            .map(|mut pair| {
                pair.score = pair.score.clamp(0.0, 1.0);
                (pair_key(&pair.card1, &pair.card2), pair)
            })
            .collect();
        Self { pairs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn pair(&self, card1: &str, card2: &str) -> Option<&SynergyPair> {
        self.pairs.get(&pair_key(card1, card2))
    }
}

impl SynergyLookup for SynergyTable {
    fn synergy(&self, card1: &str, card2: &str) -> f64 {
        self.pair(card1, card2).map_or(0.0, |p| p.score)
    }

    fn analyze_deck(&self, names: &[&str]) -> DeckSynergyAnalysis {
        let mut total = 0.0;
        let mut count = 0_u32;
        let mut category_pair_counts = BTreeMap::new();
        for (i, a) in names.iter().enumerate() {
            for b in &names[i + 1..] {
                if let Some(pair) = self.pair(a, b) {
                    total += pair.score;
                    count += 1;
                    *category_pair_counts.entry(pair.synergy_type).or_insert(0) += 1;
                }
            }
        }
        let average_score = if count == 0 {
            0.0
        } else {
            total / f64::from(count)
        };
        DeckSynergyAnalysis {
            average_score,
            category_pair_counts,
        }
    }
}
