//! Fitness functions and memoization.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use decksmith_card::CardCandidate;
use decksmith_evaluator::CompositeScorer;

/// Scores a resolved 8-card deck; higher is better.
///
/// Implementations must be pure: the optimizer calls them concurrently and
/// memoizes the results by card set.
pub trait DeckFitness: fmt::Debug + Send + Sync {
    fn fitness(&self, deck: &[&CardCandidate]) -> f64;
}

/// Production fitness: the composite score.
#[derive(Debug, Clone)]
pub struct CompositeFitness {
    scorer: CompositeScorer,
}

impl CompositeFitness {
    #[must_use]
    pub fn new(scorer: CompositeScorer) -> Self {
        Self { scorer }
    }
}

impl DeckFitness for CompositeFitness {
    fn fitness(&self, deck: &[&CardCandidate]) -> f64 {
        self.scorer.composite(deck)
    }
}

/// Fitness memo owned by one optimizer run.
///
/// Keys are the sorted card names joined with `|`, so the same eight cards
/// in any order share an entry.
#[derive(Debug, Default)]
pub struct FitnessCache {
    entries: RwLock<HashMap<String, f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl FitnessCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical key of a card set.
    #[must_use]
    pub fn key<S>(cards: &[S]) -> String
    where
        S: AsRef<str>,
    {
        let mut names = cards.iter().map(|s| s.as_ref()).collect::<Vec<&str>>();
        names.sort_unstable();
        names.join("|")
    }

    /// Looks up a card set, counting the hit or miss.
    pub fn get<S>(&self, cards: &[S]) -> Option<f64>
    where
        S: AsRef<str>,
    {
        let key = Self::key(cards);
        let value = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied();
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    pub fn insert<S>(&self, cards: &[S], fitness: f64)
    where
        S: AsRef<str>,
    {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(Self::key(cards), fitness);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
