//! Recombination of two parent decks.
//!
//! Three operators are chosen uniformly at random; whatever they produce is
//! passed through [`repair`] so the child is always eight distinct pool cards.

use std::collections::{BTreeMap, HashSet};

use decksmith_card::{CardRole, DECK_SIZE};
use rand::Rng;

use crate::genome::{DeckGenome, SearchSpace, repair};

/// Minimum pair synergy considered by the synergy-aware operator.
pub const SYNERGY_CROSSOVER_THRESHOLD: f64 = 0.8;
/// Cards the synergy-aware operator assembles from pairs before filling.
const SYNERGY_PAIR_CARDS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverOperator {
    /// Per position, take either parent's card.
    Uniform,
    /// Per role, take one parent's whole group of cards.
    RoleGrouped,
    /// Keep strong synergy pairs from both parents.
    SynergyAware,
}

impl CrossoverOperator {
    const ALL: [Self; 3] = [Self::Uniform, Self::RoleGrouped, Self::SynergyAware];

    fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

impl DeckGenome {
    /// Child of `self` and `other` from a randomly chosen operator.
    #[must_use]
    pub fn crossover<R>(&self, other: &Self, space: &SearchSpace<'_>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let operator = CrossoverOperator::random(rng);
        self.crossover_with(operator, other, space, rng)
    }

    #[must_use]
    pub fn crossover_with<R>(
        &self,
        operator: CrossoverOperator,
        other: &Self,
        space: &SearchSpace<'_>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let cards = match operator {
            CrossoverOperator::Uniform => uniform(&self.cards, &other.cards, rng),
            CrossoverOperator::RoleGrouped => role_grouped(&self.cards, &other.cards, space, rng),
            CrossoverOperator::SynergyAware => {
                synergy_aware(&self.cards, &other.cards, space, rng)
            }
        };
        Self {
            cards: repair(&cards, &[self.cards.as_slice(), other.cards.as_slice()], space, rng),
            fitness: None,
        }
    }
}

fn uniform<R>(a: &[String], b: &[String], rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    a.iter()
        .zip(b)
        .map(|(x, y)| (if rng.random_bool(0.5) { x } else { y }).clone())
        .collect()
}

fn role_grouped<R>(a: &[String], b: &[String], space: &SearchSpace<'_>, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    // BTreeMap keeps the role order, and so the rng draws, stable
    let mut groups = BTreeMap::<Option<CardRole>, [Vec<&String>; 2]>::new();
    for (parent, cards) in [a, b].into_iter().enumerate() {
        for name in cards {
            let role = space.card(name).and_then(|c| c.role);
            groups.entry(role).or_default()[parent].push(name);
        }
    }
    let mut child = Vec::with_capacity(DECK_SIZE);
    for [from_a, from_b] in groups.into_values() {
        let group = if rng.random_bool(0.5) { from_a } else { from_b };
        child.extend(group.into_iter().cloned());
    }
    child
}

fn synergy_pairs<'c>(cards: &'c [String], space: &SearchSpace<'_>) -> Vec<(&'c str, &'c str, f64)> {
    let mut pairs = vec![];
    for (i, x) in cards.iter().enumerate() {
        for y in &cards[i + 1..] {
            let score = space.synergy.synergy(x, y);
            if score >= SYNERGY_CROSSOVER_THRESHOLD {
                pairs.push((x.as_str(), y.as_str(), score));
            }
        }
    }
    pairs
}

fn synergy_aware<R>(a: &[String], b: &[String], space: &SearchSpace<'_>, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut pairs = synergy_pairs(a, space);
    pairs.extend(synergy_pairs(b, space));
    pairs.sort_by(|x, y| y.2.total_cmp(&x.2));

    let mut used = HashSet::new();
    let mut child = Vec::with_capacity(DECK_SIZE);
    for (x, y, _) in pairs {
        if child.len() + 2 > SYNERGY_PAIR_CARDS {
            break;
        }
        if used.contains(x) || used.contains(y) {
            continue;
        }
        used.extend([x, y]);
        child.extend([x.to_owned(), y.to_owned()]);
    }

    let mut parent_pool = a.iter().chain(b).collect::<Vec<_>>();
    while child.len() < DECK_SIZE && !parent_pool.is_empty() {
        let name = parent_pool.swap_remove(rng.random_range(0..parent_pool.len()));
        if used.insert(name.as_str()) {
            child.push(name.clone());
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use decksmith_card::{CardPool, SynergyTable, fixtures};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    use super::*;

    fn genome(cards: &[&str]) -> DeckGenome {
        DeckGenome {
            cards: cards.iter().map(|&c| c.to_owned()).collect(),
            fitness: Some(0.5),
        }
    }

    fn assert_valid(child: &DeckGenome, pool: &CardPool) {
        let cards = child.cards();
        assert_eq!(cards.len(), DECK_SIZE, "{cards:?}");
        assert_eq!(cards.iter().collect::<HashSet<_>>().len(), DECK_SIZE, "{cards:?}");
        assert!(cards.iter().all(|c| pool.contains(c)));
        assert!(child.fitness().is_none());
    }

    const LEFT: [&str; 8] = [
        "Hog Rider",
        "Ice Spirit",
        "Skeletons",
        "Fireball",
        "The Log",
        "Cannon",
        "Musketeer",
        "Zap",
    ];
    const RIGHT: [&str; 8] = [
        "Royal Giant",
        "Mini P.E.K.K.A",
        "Baby Dragon",
        "Poison",
        "Hog Rider",
        "Zap",
        "Cannon",
        "Musketeer",
    ];

    #[test]
    fn test_every_operator_yields_valid_child() {
        let pool = fixtures::standard_pool();
        let synergy = fixtures::standard_synergy();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(42);
        let (a, b) = (genome(&LEFT), genome(&RIGHT));
        for operator in CrossoverOperator::ALL {
            for _ in 0..25 {
                assert_valid(&a.crossover_with(operator, &b, &space, &mut rng), &pool);
                assert_valid(&b.crossover_with(operator, &a, &space, &mut rng), &pool);
            }
        }
    }

    #[test]
    fn test_identical_parents() {
        let pool = fixtures::standard_pool();
        let synergy = fixtures::standard_synergy();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(1);
        let a = genome(&LEFT);
        for _ in 0..25 {
            let child = a.crossover(&a, &space, &mut rng);
            assert_valid(&child, &pool);
            let mut sorted = child.cards().to_vec();
            sorted.sort();
            let mut expected = a.cards().to_vec();
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_disjoint_parents_from_larger_pool() {
        let mut cards = fixtures::standard_cards();
        cards.extend(
            (0..6).map(|i| decksmith_card::CardCandidate::new(format!("Extra {i}"), 10, 15, 3)),
        );
        let pool = CardPool::new(cards).unwrap();
        let synergy = SynergyTable::default();
        let space = SearchSpace::new(&pool, &synergy);
        let a = genome(&[
            "Extra 0", "Extra 1", "Extra 2", "Extra 3", "Extra 4", "Extra 5", "Zap", "Poison",
        ]);
        let b = genome(&LEFT);
        let mut rng = Pcg64::seed_from_u64(9);
        for _ in 0..50 {
            let child = a.crossover(&b, &space, &mut rng);
            assert_valid(&child, &pool);
            assert!(child.cards().iter().any(|c| space.is_win_condition(c)));
        }
    }

    #[test]
    fn test_synergy_aware_keeps_strong_pairs() {
        let pool = fixtures::standard_pool();
        let synergy = fixtures::standard_synergy();
        let space = SearchSpace::new(&pool, &synergy);
        let mut rng = Pcg64::seed_from_u64(5);
        let cards = synergy_aware(&genome(&LEFT).cards, &genome(&RIGHT).cards, &space, &mut rng);
        // Ice Spirit+Skeletons (0.9), Hog Rider+Fireball (0.8) survive greedy assembly
        assert_eq!(cards[..4], ["Ice Spirit", "Skeletons", "Hog Rider", "Fireball"]);
        assert_eq!(cards.len(), DECK_SIZE);
    }
}
