//! The common contract of every deck-building strategy.

use std::{fmt, str::FromStr, sync::Arc, time::Instant};

use decksmith_card::{CardCandidate, CardPool, PoolError, SynergyLookup, SynergyTable};
use decksmith_evaluator::{
    Archetype, ArchetypeDetector, CompositeScorer, ConstraintConfig, DeckMetrics,
    HeuristicArchetypeDetector, InvalidConstraintConfig,
};
use decksmith_genetic::{CancellationToken, GeneticConfig, GeneticError};
use serde::{Deserialize, Serialize};

use crate::{
    baseline::{BaselineBuildError, BaselineStrategy, ExternalDeckBuilder},
    constraint_guided::ConstraintGuidedStrategy,
    genetic::GeneticStrategy,
    role_first::RoleFirstStrategy,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    #[display("baseline")]
    Baseline,
    #[display("genetic")]
    Genetic,
    #[display("constraint")]
    Constraint,
    #[display("role-first")]
    RoleFirst,
}

impl StrategyKind {
    pub const ALL: [Self; 4] = [Self::Baseline, Self::Genetic, Self::Constraint, Self::RoleFirst];
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown strategy: {name}")]
pub struct UnknownStrategy {
    pub name: String,
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s.trim())
            .ok_or_else(|| UnknownStrategy { name: s.to_owned() })
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StrategyError {
    #[display("invalid constraints: {source}")]
    InvalidConstraints { source: InvalidConstraintConfig },
    #[display("{source}")]
    Pool { source: PoolError },
    #[display("genetic optimization failed: {source}")]
    Genetic { source: GeneticError },
    #[display("genetic optimization produced no hall-of-fame deck")]
    EmptyHallOfFame,
    #[display("baseline builder is not configured")]
    BaselineUnavailable,
    #[display("baseline builder failed: {source}")]
    Baseline { source: BaselineBuildError },
    #[display("baseline builder returned {resolved} distinct pool cards, want 8")]
    IncompleteBaselineDeck { resolved: usize },
    #[display(
        "constraint search could not generate a valid deck after {attempts} attempts \
         ({failures} failed constructions); relax hard minima or increase candidate pool"
    )]
    ConstraintSearchExhausted { attempts: usize, failures: usize },
    #[display("unable to fill role-first slot {slot}")]
    SlotUnfilled { slot: usize },
}

impl From<PoolError> for StrategyError {
    fn from(source: PoolError) -> Self {
        Self::Pool { source }
    }
}

impl From<InvalidConstraintConfig> for StrategyError {
    fn from(source: InvalidConstraintConfig) -> Self {
        Self::InvalidConstraints { source }
    }
}

impl From<GeneticError> for StrategyError {
    fn from(source: GeneticError) -> Self {
        Self::Genetic { source }
    }
}

/// Inputs shared by every strategy for one build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Root seed; each strategy derives its own generator from it.
    pub seed: u64,
    /// Number of results the caller is interested in.
    pub top_n: usize,
    pub constraints: ConstraintConfig,
    pub synergy: Arc<dyn SynergyLookup>,
    pub archetypes: Arc<dyn ArchetypeDetector>,
    /// Used by the genetic strategy only.
    pub genetic: GeneticConfig,
    pub cancel: CancellationToken,
}

impl BuildContext {
    /// Context with default constraints, an empty synergy table and the
    /// benchmark genetic preset.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            top_n: 1,
            constraints: ConstraintConfig::default(),
            synergy: Arc::new(SynergyTable::default()),
            archetypes: Arc::new(HeuristicArchetypeDetector),
            genetic: GeneticConfig::benchmark_preset(),
            cancel: CancellationToken::new(),
        }
    }
}

/// One strategy's deck for one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckResult {
    pub method: StrategyKind,
    pub deck: Vec<String>,
    pub metrics: DeckMetrics,
    pub detected_archetype: Archetype,
    pub archetype_confidence: f64,
}

/// Builds one deck from a candidate pool.
pub trait Strategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn build(&self, pool: &CardPool, ctx: &BuildContext) -> Result<DeckResult, StrategyError>;
}

/// Instantiates the strategy for `kind`.
///
/// `baseline` is only consulted for [`StrategyKind::Baseline`].
#[must_use]
pub fn strategy_for(
    kind: StrategyKind,
    baseline: Option<Arc<dyn ExternalDeckBuilder>>,
) -> Box<dyn Strategy> {
    match kind {
        StrategyKind::Baseline => Box::new(BaselineStrategy::new(baseline)),
        StrategyKind::Genetic => Box::new(GeneticStrategy),
        StrategyKind::Constraint => Box::new(ConstraintGuidedStrategy),
        StrategyKind::RoleFirst => Box::new(RoleFirstStrategy),
    }
}

/// Validates the constraints and the pool, then builds the scorer.
pub(crate) fn prepare(pool: &CardPool, ctx: &BuildContext) -> Result<CompositeScorer, StrategyError> {
    ctx.constraints.validate()?;
    pool.ensure_deck_capacity()?;
    Ok(CompositeScorer::new(ctx.synergy.clone(), &ctx.constraints))
}

/// Scores a finished deck and packages it.
pub(crate) fn finish(
    kind: StrategyKind,
    deck: &[&CardCandidate],
    scorer: &CompositeScorer,
    ctx: &BuildContext,
    started: Instant,
) -> DeckResult {
    let mut metrics = scorer.score(deck);
    metrics.runtime_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let guess = ctx.archetypes.detect(deck);
    tracing::info!(
        strategy = %kind,
        composite = metrics.composite,
        violations = metrics.constraint_violations.len(),
        runtime_ms = metrics.runtime_ms,
        "strategy finished"
    );
    DeckResult {
        method: kind,
        deck: deck.iter().map(|c| c.name.clone()).collect(),
        metrics,
        detected_archetype: guess.archetype,
        archetype_confidence: guess.confidence,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use decksmith_card::{DECK_SIZE, fixtures};
    use decksmith_evaluator::{HardConstraints, is_valid_deck};

    use super::*;
    use crate::baseline::LevelFirstBuilder;

    fn context(seed: u64) -> BuildContext {
        BuildContext {
            synergy: Arc::new(fixtures::standard_synergy()),
            genetic: GeneticConfig {
                population_size: 30,
                generations: 25,
                convergence_generations: 10,
                ..GeneticConfig::benchmark_preset()
            },
            ..BuildContext::new(seed)
        }
    }

    fn all_strategies() -> Vec<Box<dyn Strategy>> {
        StrategyKind::ALL
            .into_iter()
            .map(|kind| strategy_for(kind, Some(Arc::new(LevelFirstBuilder))))
            .collect()
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>(), Ok(kind));
        }
        assert_eq!("role-first".parse::<StrategyKind>(), Ok(StrategyKind::RoleFirst));
        assert_eq!(
            serde_json::to_string(&StrategyKind::RoleFirst).unwrap(),
            "\"role-first\""
        );
        assert!("greedy".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn test_every_strategy_returns_valid_deck_from_standard_pool() {
        let pool = fixtures::standard_pool();
        let ctx = context(42);
        for strategy in all_strategies() {
            let result = strategy.build(&pool, &ctx).unwrap();
            assert_eq!(result.method, strategy.kind());
            assert_eq!(result.deck.len(), DECK_SIZE);
            assert_eq!(result.deck.iter().collect::<HashSet<_>>().len(), DECK_SIZE);
            let deck = pool.resolve(&result.deck);
            assert_eq!(deck.len(), DECK_SIZE, "{}", result.method);
            assert!(
                is_valid_deck(&deck, &HardConstraints::default()),
                "{}: {:?}",
                result.method,
                result.metrics.constraint_violations
            );
            assert!(result.metrics.constraint_violations.is_empty());
            assert!((0.0..=1.0).contains(&result.metrics.composite));
            assert!((0.0..=1.0).contains(&result.archetype_confidence));
        }
    }

    #[test]
    fn test_every_strategy_rejects_small_pool() {
        let pool = CardPool::new(fixtures::standard_cards().into_iter().take(7).collect()).unwrap();
        let ctx = context(1);
        for strategy in all_strategies() {
            let err = strategy.build(&pool, &ctx).unwrap_err();
            assert!(matches!(err, StrategyError::Pool { .. }), "{}: {err}", strategy.kind());
        }
    }

    #[test]
    fn test_every_strategy_rejects_invalid_constraints() {
        let pool = fixtures::standard_pool();
        let mut ctx = context(1);
        ctx.constraints.hard.min_spells = 9;
        for strategy in all_strategies() {
            let err = strategy.build(&pool, &ctx).unwrap_err();
            assert!(
                matches!(err, StrategyError::InvalidConstraints { .. }),
                "{}: {err}",
                strategy.kind()
            );
        }
    }

    #[test]
    fn test_result_serializes_with_stable_field_names() {
        let pool = fixtures::standard_pool();
        let result = strategy_for(StrategyKind::RoleFirst, None)
            .build(&pool, &context(3))
            .unwrap();
        let value = serde_json::to_value(&result).unwrap();
        let keys = value.as_object().unwrap().keys().cloned().collect::<HashSet<_>>();
        let expected = ["method", "deck", "metrics", "detected_archetype", "archetype_confidence"];
        assert_eq!(keys, expected.into_iter().map(String::from).collect::<HashSet<_>>());
        assert_eq!(value["method"], "role-first");
    }
}
