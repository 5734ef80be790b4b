use std::collections::HashMap;

use crate::{CardCandidate, DECK_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PoolError {
    #[display("need at least {required} cards, got {actual}")]
    TooFewCandidates { required: usize, actual: usize },
    #[display("candidate at position {index} has an empty name")]
    EmptyName { index: usize },
    #[display("duplicate candidate name: {name}")]
    DuplicateName { name: String },
    #[display("candidate {name} has non-positive elixir cost")]
    InvalidCost { name: String },
}

/// The set of candidates a search is allowed to draw from.
///
/// Candidate order is preserved; every strategy iterates the pool in this
/// order so that a fixed seed yields a fixed deck.
#[derive(Debug, Clone, Default)]
pub struct CardPool {
    cards: Vec<CardCandidate>,
    index: HashMap<String, usize>,
}

impl CardPool {
    /// Builds a pool, rejecting empty names, duplicate names and zero costs.
    pub fn new(cards: Vec<CardCandidate>) -> Result<Self, PoolError> {
        let mut index = HashMap::with_capacity(cards.len());
        for (i, card) in cards.iter().enumerate() {
            if card.name.trim().is_empty() {
                return Err(PoolError::EmptyName { index: i });
            }
            if card.elixir == 0 {
                return Err(PoolError::InvalidCost {
                    name: card.name.clone(),
                });
            }
            if index.insert(card.name.clone(), i).is_some() {
                return Err(PoolError::DuplicateName {
                    name: card.name.clone(),
                });
            }
        }
        Ok(Self { cards, index })
    }

    /// Fails unless the pool can supply a full deck.
    pub fn ensure_deck_capacity(&self) -> Result<(), PoolError> {
        if self.cards.len() < DECK_SIZE {
            return Err(PoolError::TooFewCandidates {
                required: DECK_SIZE,
                actual: self.cards.len(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[must_use]
    pub fn cards(&self) -> &[CardCandidate] {
        &self.cards
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardCandidate> + '_ {
        self.cards.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CardCandidate> {
        self.index.get(name).map(|&i| &self.cards[i])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Looks up names in order, silently skipping unknown ones.
    #[must_use]
    pub fn resolve<S>(&self, names: &[S]) -> Vec<&CardCandidate>
    where
        S: AsRef<str>,
    {
        names
            .iter()
            .filter_map(|name| self.get(name.as_ref()))
            .collect()
    }

    /// Returns a copy of the pool without the cards matching `predicate`.
    #[must_use]
    pub fn without<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&CardCandidate) -> bool,
    {
        let cards = self.cards.iter().filter(|c| !predicate(c)).cloned().collect::<Vec<_>>();
        let index = cards
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
        Self { cards, index }
    }
}
