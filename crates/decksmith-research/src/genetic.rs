//! Genetic strategy: the optimizer with the composite score as fitness.

use std::time::Instant;

use decksmith_card::CardPool;
use decksmith_evaluator::is_valid_deck;
use decksmith_genetic::{CompositeFitness, GeneticOptimizer};
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::strategy::{self, BuildContext, DeckResult, Strategy, StrategyError, StrategyKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct GeneticStrategy;

impl Strategy for GeneticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Genetic
    }

    fn build(&self, pool: &CardPool, ctx: &BuildContext) -> Result<DeckResult, StrategyError> {
        let started = Instant::now();
        let scorer = strategy::prepare(pool, ctx)?;
        let fitness = CompositeFitness::new(scorer.clone());

        let mut optimizer = GeneticOptimizer::new(ctx.genetic.clone(), pool, ctx.synergy.as_ref(), &fitness)?
            .with_cancellation(ctx.cancel.clone());
        let result = optimizer.run(&mut Pcg64::seed_from_u64(ctx.seed))?;

        // prefer the best deck that also meets the hard minimums
        let decks = result
            .hall_of_fame
            .iter()
            .map(|genome| pool.resolve(genome.cards()))
            .collect::<Vec<_>>();
        let deck = decks
            .iter()
            .find(|deck| is_valid_deck(deck, scorer.hard_constraints()))
            .or_else(|| decks.first())
            .ok_or(StrategyError::EmptyHallOfFame)?;
        tracing::debug!(
            generations = result.generations_run,
            stop_reason = %result.stop_reason,
            hall_of_fame = result.hall_of_fame.len(),
            "genetic search complete"
        );
        Ok(strategy::finish(self.kind(), deck, &scorer, ctx, started))
    }
}
