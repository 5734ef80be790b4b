//! Deck genomes and the repair step shared by the genetic operators.

use std::collections::HashSet;

use decksmith_card::{CardCandidate, CardPool, DECK_SIZE, SynergyLookup};
use rand::{Rng, seq::IndexedRandom};

use crate::{
    GeneticError,
    fitness::{DeckFitness, FitnessCache},
};

/// Read-only data the genetic operators draw from.
#[derive(Debug, Clone, Copy)]
pub struct SearchSpace<'a> {
    pub pool: &'a CardPool,
    pub synergy: &'a dyn SynergyLookup,
}

impl<'a> SearchSpace<'a> {
    #[must_use]
    pub fn new(pool: &'a CardPool, synergy: &'a dyn SynergyLookup) -> Self {
        Self { pool, synergy }
    }

    pub(crate) fn card(&self, name: &str) -> Option<&'a CardCandidate> {
        self.pool.get(name)
    }

    pub(crate) fn is_win_condition(&self, name: &str) -> bool {
        self.card(name).is_some_and(CardCandidate::is_win_condition)
    }

    /// Pool cards not in `used`, in pool order.
    pub(crate) fn unused<'s>(
        self,
        used: &'s HashSet<String>,
    ) -> impl Iterator<Item = &'a CardCandidate> + 's
    where
        'a: 's,
    {
        self.pool.iter().filter(move |c| !used.contains(&c.name))
    }
}

/// One candidate solution: eight card names and a lazily computed fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckGenome {
    pub(crate) cards: Vec<String>,
    pub(crate) fitness: Option<f64>,
}

impl DeckGenome {
    /// Random deck with at least one win condition when the pool has any.
    pub fn random<R>(space: &SearchSpace<'_>, rng: &mut R) -> Result<Self, GeneticError>
    where
        R: Rng + ?Sized,
    {
        space.pool.ensure_deck_capacity()?;

        let mut cards = Vec::with_capacity(DECK_SIZE);
        let win_conditions = space
            .pool
            .iter()
            .filter(|c| c.is_win_condition())
            .collect::<Vec<_>>();
        if let Some(card) = win_conditions.choose(rng) {
            cards.push(card.name.clone());
        }

        let mut rest = space
            .pool
            .iter()
            .filter(|c| !cards.contains(&c.name))
            .collect::<Vec<_>>();
        while cards.len() < DECK_SIZE && !rest.is_empty() {
            let card = rest.swap_remove(rng.random_range(0..rest.len()));
            cards.push(card.name.clone());
        }

        Ok(Self {
            cards,
            fitness: None,
        })
    }

    /// Genome from an explicit deck; every name must be a distinct pool card.
    pub fn from_cards<S>(names: &[S], space: &SearchSpace<'_>) -> Result<Self, GeneticError>
    where
        S: AsRef<str>,
    {
        if names.len() != DECK_SIZE {
            return Err(GeneticError::DeckSize {
                actual: names.len(),
            });
        }
        let mut seen = HashSet::new();
        for name in names {
            let name = name.as_ref();
            if !space.pool.contains(name) {
                return Err(GeneticError::UnknownCard { name: name.into() });
            }
            if !seen.insert(name) {
                return Err(GeneticError::DuplicateCard { name: name.into() });
            }
        }
        Ok(Self {
            cards: names.iter().map(|n| n.as_ref().to_owned()).collect(),
            fitness: None,
        })
    }

    #[must_use]
    pub fn cards(&self) -> &[String] {
        &self.cards
    }

    /// Fitness, or `None` until evaluated.
    #[must_use]
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness for ranking; unevaluated genomes rank last.
    pub(crate) fn rank(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Canonical card-set key, shared with the fitness cache.
    #[must_use]
    pub fn key(&self) -> String {
        FitnessCache::key(&self.cards)
    }

    /// Resolves the deck and computes (or recalls) its fitness.
    pub fn evaluate(
        &mut self,
        space: &SearchSpace<'_>,
        fitness: &dyn DeckFitness,
        cache: &FitnessCache,
    ) -> Result<f64, GeneticError> {
        let deck = space.pool.resolve(&self.cards);
        if deck.len() != DECK_SIZE {
            return Err(GeneticError::UnresolvedCards {
                resolved: deck.len(),
            });
        }
        let value = match cache.get(&self.cards) {
            Some(value) => value,
            None => {
                let value = fitness.fitness(&deck);
                cache.insert(&self.cards, value);
                value
            }
        };
        self.fitness = Some(value);
        Ok(value)
    }
}

/// Turns an arbitrary card list into eight distinct pool cards.
///
/// Keeps the first occurrence of each known card, tops up from the parents
/// and then from random pool cards, and finally forces a win condition into
/// the last slot if the deck has none.
pub(crate) fn repair<R>(
    cards: &[String],
    parents: &[&[String]],
    space: &SearchSpace<'_>,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut used = HashSet::new();
    let mut repaired = Vec::with_capacity(DECK_SIZE);
    let mut add = |name: &str, repaired: &mut Vec<String>| {
        if repaired.len() < DECK_SIZE && space.pool.contains(name) && used.insert(name.to_owned()) {
            repaired.push(name.to_owned());
        }
    };

    for name in cards.iter().chain(parents.iter().flat_map(|p| p.iter())) {
        add(name.as_str(), &mut repaired);
    }
    if repaired.len() < DECK_SIZE {
        let mut remaining = space
            .pool
            .iter()
            .filter(|c| !repaired.contains(&c.name))
            .collect::<Vec<_>>();
        while repaired.len() < DECK_SIZE && !remaining.is_empty() {
            let card = remaining.swap_remove(rng.random_range(0..remaining.len()));
            add(card.name.as_str(), &mut repaired);
        }
    }

    if !repaired.iter().any(|name| space.is_win_condition(name)) {
        let options = space
            .pool
            .iter()
            .filter(|c| c.is_win_condition() && !repaired.contains(&c.name))
            .collect::<Vec<_>>();
        if let (Some(card), Some(last)) = (options.choose(rng), repaired.last_mut()) {
            last.clone_from(&card.name);
        }
    }

    repaired
}

#[cfg(test)]
mod tests {
    use decksmith_card::{CardRole, PoolError, SynergyTable, fixtures};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    fn names(cards: &[&str]) -> Vec<String> {
        cards.iter().map(|&c| c.to_owned()).collect()
    }

    fn assert_valid(cards: &[String], pool: &CardPool) {
        assert_eq!(cards.len(), DECK_SIZE, "{cards:?}");
        let unique = cards.iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), DECK_SIZE, "{cards:?}");
        assert!(cards.iter().all(|c| pool.contains(c)), "{cards:?}");
    }

    #[derive(Debug, Default)]
    struct CountingFitness {
        calls: std::sync::atomic::AtomicUsize,
    }

    impl DeckFitness for CountingFitness {
        fn fitness(&self, deck: &[&CardCandidate]) -> f64 {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            deck.iter().map(|c| f64::from(c.elixir)).sum::<f64>() / 100.0
        }
    }

    #[test]
    fn test_random_genome_has_win_condition() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..20 {
            let genome = DeckGenome::random(&space, &mut rng).unwrap();
            assert_valid(genome.cards(), &pool);
            assert!(genome.cards().iter().any(|c| space.is_win_condition(c)));
            assert_eq!(genome.fitness(), None);
        }
    }

    #[test]
    fn test_random_genome_needs_full_pool() {
        let pool = CardPool::new(fixtures::standard_cards().into_iter().take(7).collect()).unwrap();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let err = DeckGenome::random(&space, &mut Pcg64::seed_from_u64(0)).unwrap_err();
        assert!(matches!(
            err,
            GeneticError::Pool {
                source: PoolError::TooFewCandidates { actual: 7, .. }
            }
        ));
    }

    #[test]
    fn test_from_cards_rejects_bad_decks() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        assert!(DeckGenome::from_cards(&fixtures::valid_deck_names(), &space).is_ok());

        let mut unknown = fixtures::valid_deck_names();
        unknown[3] = "Golem";
        assert!(matches!(
            DeckGenome::from_cards(&unknown, &space),
            Err(GeneticError::UnknownCard { .. })
        ));

        let mut duplicate = fixtures::valid_deck_names();
        duplicate[3] = duplicate[0];
        assert!(matches!(
            DeckGenome::from_cards(&duplicate, &space),
            Err(GeneticError::DuplicateCard { .. })
        ));
        assert!(matches!(
            DeckGenome::from_cards(&["Zap"], &space),
            Err(GeneticError::DeckSize { actual: 1 })
        ));
    }

    #[test]
    fn test_clone_is_independent() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let original = DeckGenome::from_cards(&fixtures::valid_deck_names(), &space).unwrap();
        let mut clone = original.clone();
        clone.cards[0] = "Royal Giant".into();
        assert_eq!(original.cards()[0], "Hog Rider");
    }

    #[test]
    fn test_evaluate_uses_cache_for_same_card_set() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let cache = FitnessCache::new();
        let fitness = CountingFitness::default();

        let mut a = DeckGenome::from_cards(&fixtures::valid_deck_names(), &space).unwrap();
        let mut reversed = fixtures::valid_deck_names();
        reversed.reverse();
        let mut b = DeckGenome::from_cards(&reversed, &space).unwrap();

        let fa = a.evaluate(&space, &fitness, &cache).unwrap();
        let fb = b.evaluate(&space, &fitness, &cache).unwrap();
        assert_eq!(fa.to_bits(), fb.to_bits());
        assert_eq!(fitness.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(b.fitness(), Some(fb));
    }

    #[test]
    fn test_evaluate_fails_on_unresolved_cards() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let mut genome = DeckGenome::from_cards(&fixtures::valid_deck_names(), &space).unwrap();
        genome.cards[0] = "Golem".into();
        let err = genome
            .evaluate(&space, &CountingFitness::default(), &FitnessCache::new())
            .unwrap_err();
        assert!(matches!(err, GeneticError::UnresolvedCards { resolved: 7 }));
    }

    #[test]
    fn test_repair_dedupes_and_tops_up() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(3);

        let cards = names(&["Zap", "Zap", "Golem", "Hog Rider"]);
        let parent = names(&["Cannon", "Zap", "Fireball"]);
        let repaired = repair(&cards, &[parent.as_slice()], &space, &mut rng);
        assert_valid(&repaired, &pool);
        assert_eq!(
            &repaired[..4],
            names(&["Zap", "Hog Rider", "Cannon", "Fireball"]).as_slice()
        );
    }

    #[test]
    fn test_repair_forces_win_condition_into_last_slot() {
        let pool = fixtures::standard_pool();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(11);
        let cards = names(&[
            "Zap",
            "The Log",
            "Fireball",
            "Poison",
            "Cannon",
            "Skeletons",
            "Ice Spirit",
            "Musketeer",
        ]);
        let repaired = repair(&cards, &[], &space, &mut rng);
        assert_valid(&repaired, &pool);
        assert_eq!(repaired[..7], cards[..7]);
        assert_eq!(pool.get(&repaired[7]).unwrap().role, Some(CardRole::WinCondition));
    }
}
