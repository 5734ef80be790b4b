//! Constraint-guided strategy: randomized construction followed by
//! hill-climbing.
//!
//! Each trial first samples cards that satisfy the hard minimums in a fixed
//! order (win conditions, spells, air defense, tank killers), fills the rest
//! with random unused cards and discards the deck if it is still invalid.
//! Surviving decks are improved by single-card swaps that keep the deck valid
//! and strictly raise the composite score. The best deck over all trials
//! wins.

use std::{collections::HashSet, time::Instant};

use decksmith_card::{CardCandidate, CardPool, DECK_SIZE};
use decksmith_evaluator::{CompositeScorer, HardConstraints, is_valid_deck};
use rand::{Rng, SeedableRng, seq::IndexedRandom};
use rand_pcg::Pcg64;

use crate::strategy::{self, BuildContext, DeckResult, Strategy, StrategyError, StrategyKind};

/// Offset applied to the context seed.
const SEED_OFFSET: u64 = 17;
const BASE_TRIALS: usize = 300;
const TRIALS_PER_RESULT: usize = 40;
const IMPROVEMENT_STEPS: usize = 80;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintGuidedStrategy;

/// Asking for more than one result buys 40 trials per requested result,
/// the first one included.
fn trial_count(top_n: usize) -> usize {
    if top_n > 1 {
        BASE_TRIALS + TRIALS_PER_RESULT * top_n
    } else {
        BASE_TRIALS
    }
}

/// Samples a deck meeting the hard minimums, or `None` if the sample fails
/// validation.
fn construct<'p, R>(pool: &'p CardPool, hard: &HardConstraints, rng: &mut R) -> Option<Vec<&'p CardCandidate>>
where
    R: Rng + ?Sized,
{
    let mut deck = Vec::with_capacity(DECK_SIZE);
    let mut used = HashSet::new();
    let requirements: [(fn(&CardCandidate) -> bool, i32); 4] = [
        (CardCandidate::is_win_condition, hard.min_win_conditions),
        (CardCandidate::is_spell, hard.min_spells),
        (CardCandidate::can_target_air, hard.min_air_defense),
        (CardCandidate::is_tank_killer, hard.min_tank_killers),
    ];
    for (is_match, minimum) in requirements {
        for _ in 0..minimum {
            if deck.len() == DECK_SIZE {
                break;
            }
            let options = pool
                .iter()
                .filter(|c| !used.contains(c.name.as_str()) && is_match(c))
                .collect::<Vec<_>>();
            let Some(&card) = options.choose(rng) else {
                break;
            };
            used.insert(card.name.as_str());
            deck.push(card);
        }
    }

    let mut rest = pool
        .iter()
        .filter(|c| !used.contains(c.name.as_str()))
        .collect::<Vec<_>>();
    while deck.len() < DECK_SIZE && !rest.is_empty() {
        deck.push(rest.swap_remove(rng.random_range(0..rest.len())));
    }

    is_valid_deck(&deck, hard).then_some(deck)
}

/// Single-card-swap hill climbing that never leaves the valid region.
fn improve<'p, R>(
    mut deck: Vec<&'p CardCandidate>,
    pool: &'p CardPool,
    scorer: &CompositeScorer,
    rng: &mut R,
) -> (Vec<&'p CardCandidate>, f64)
where
    R: Rng + ?Sized,
{
    let cards = pool.cards();
    let mut best = scorer.composite(&deck);
    for _ in 0..IMPROVEMENT_STEPS {
        let position = rng.random_range(0..deck.len());
        let candidate = &cards[rng.random_range(0..cards.len())];
        if deck.iter().any(|c| c.name == candidate.name) {
            continue;
        }
        let mut trial = deck.clone();
        trial[position] = candidate;
        if !is_valid_deck(&trial, scorer.hard_constraints()) {
            continue;
        }
        let score = scorer.composite(&trial);
        if score > best {
            best = score;
            deck = trial;
        }
    }
    (deck, best)
}

impl Strategy for ConstraintGuidedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Constraint
    }

    fn build(&self, pool: &CardPool, ctx: &BuildContext) -> Result<DeckResult, StrategyError> {
        let started = Instant::now();
        let scorer = strategy::prepare(pool, ctx)?;
        let mut rng = Pcg64::seed_from_u64(ctx.seed.wrapping_add(SEED_OFFSET));

        let attempts = trial_count(ctx.top_n);
        let mut failures = 0;
        let mut best: Option<(Vec<&CardCandidate>, f64)> = None;
        for trial in 0..attempts {
            let Some(deck) = construct(pool, scorer.hard_constraints(), &mut rng) else {
                failures += 1;
                tracing::trace!(trial, "discarded invalid construction");
                continue;
            };
            let (deck, score) = improve(deck, pool, &scorer, &mut rng);
            if best.as_ref().is_none_or(|(_, best_score)| score > *best_score) {
                best = Some((deck, score));
            }
        }
        if failures > 0 {
            tracing::debug!(attempts, failures, "discarded invalid constructions");
        }

        let (deck, _) = best.ok_or(StrategyError::ConstraintSearchExhausted { attempts, failures })?;
        Ok(strategy::finish(self.kind(), &deck, &scorer, ctx, started))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use decksmith_card::{CardRole, fixtures};

    use super::*;

    fn context(seed: u64) -> BuildContext {
        BuildContext {
            synergy: Arc::new(fixtures::standard_synergy()),
            ..BuildContext::new(seed)
        }
    }

    #[test]
    fn test_trial_count() {
        assert_eq!(trial_count(0), 300);
        assert_eq!(trial_count(1), 300);
        assert_eq!(trial_count(2), 380);
        assert_eq!(trial_count(3), 420);
    }

    #[test]
    fn test_construct_meets_minimums_first() {
        let pool = fixtures::standard_pool();
        let hard = HardConstraints::default();
        let mut rng = Pcg64::seed_from_u64(0);
        for _ in 0..50 {
            let deck = construct(&pool, &hard, &mut rng).unwrap();
            assert_eq!(deck.len(), DECK_SIZE);
            assert!(deck[0].is_win_condition());
            assert!(deck[1].is_spell());
            assert!(is_valid_deck(&deck, &hard));
        }
    }

    #[test]
    fn test_improve_never_lowers_score_or_validity() {
        let pool = fixtures::standard_pool();
        let scorer = CompositeScorer::new(Arc::new(fixtures::standard_synergy()), &Default::default());
        let mut rng = Pcg64::seed_from_u64(2);
        let deck = pool.resolve(&fixtures::valid_deck_names());
        let before = scorer.composite(&deck);
        let (improved, score) = improve(deck, &pool, &scorer, &mut rng);
        assert!(score >= before);
        assert!((score - scorer.composite(&improved)).abs() < 1e-12);
        assert!(is_valid_deck(&improved, scorer.hard_constraints()));
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let pool = fixtures::standard_pool();
        let a = ConstraintGuidedStrategy.build(&pool, &context(11)).unwrap();
        let b = ConstraintGuidedStrategy.build(&pool, &context(11)).unwrap();
        assert_eq!(a.deck, b.deck);
        assert!(a.metrics.is_valid());
    }

    #[test]
    fn test_exhausted_without_air_defense() {
        let pool = fixtures::pool_without_air_defense();
        let err = ConstraintGuidedStrategy.build(&pool, &context(0)).unwrap_err();
        assert!(matches!(
            err,
            StrategyError::ConstraintSearchExhausted {
                attempts: 300,
                failures: 300
            }
        ));
        assert!(err.to_string().contains("300 attempts"));
    }

    #[test]
    fn test_relaxed_constraints_allow_deck_without_air_defense() {
        let pool = fixtures::pool_without_air_defense();
        let mut ctx = context(0);
        ctx.constraints.hard.min_air_defense = 0;
        let result = ConstraintGuidedStrategy.build(&pool, &ctx).unwrap();
        assert!(result.metrics.is_valid());
        assert!(
            result
                .deck
                .iter()
                .any(|name| pool.get(name).and_then(|c| c.role) == Some(CardRole::WinCondition))
        );
    }
}
