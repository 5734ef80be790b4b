//! Baseline strategy: delegates to an existing deck builder.

use std::{collections::HashSet, fmt, sync::Arc, time::Instant};

use decksmith_card::{CardCandidate, CardPool, DECK_SIZE};

use crate::strategy::{self, BuildContext, DeckResult, Strategy, StrategyError, StrategyKind};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{reason}")]
pub struct BaselineBuildError {
    pub reason: String,
}

impl BaselineBuildError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A deck builder that exists outside the search core.
pub trait ExternalDeckBuilder: fmt::Debug + Send + Sync {
    /// Returns the names of the chosen cards.
    fn build_deck(&self, pool: &CardPool) -> Result<Vec<String>, BaselineBuildError>;
}

/// Picks the best-levelled win condition, then the best-levelled other cards.
///
/// Ties keep pool order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelFirstBuilder;

impl ExternalDeckBuilder for LevelFirstBuilder {
    fn build_deck(&self, pool: &CardPool) -> Result<Vec<String>, BaselineBuildError> {
        let by_level_desc = |a: &&CardCandidate, b: &&CardCandidate| b.level_ratio().total_cmp(&a.level_ratio());

        let mut win_conditions = pool.iter().filter(|c| c.is_win_condition()).collect::<Vec<_>>();
        win_conditions.sort_by(by_level_desc);
        let mut deck = win_conditions
            .first()
            .map(|c| vec![c.name.clone()])
            .unwrap_or_default();

        let mut rest = pool.iter().filter(|c| !deck.contains(&c.name)).collect::<Vec<_>>();
        rest.sort_by(by_level_desc);
        deck.extend(rest.into_iter().take(DECK_SIZE - deck.len()).map(|c| c.name.clone()));

        if deck.len() < DECK_SIZE {
            return Err(BaselineBuildError::new(format!(
                "pool has only {} cards",
                deck.len()
            )));
        }
        Ok(deck)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BaselineStrategy {
    builder: Option<Arc<dyn ExternalDeckBuilder>>,
}

impl BaselineStrategy {
    #[must_use]
    pub fn new(builder: Option<Arc<dyn ExternalDeckBuilder>>) -> Self {
        Self { builder }
    }
}

impl Strategy for BaselineStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Baseline
    }

    fn build(&self, pool: &CardPool, ctx: &BuildContext) -> Result<DeckResult, StrategyError> {
        let started = Instant::now();
        let scorer = strategy::prepare(pool, ctx)?;
        let builder = self.builder.as_ref().ok_or(StrategyError::BaselineUnavailable)?;
        tracing::debug!(?builder, "running baseline builder");

        let names = builder
            .build_deck(pool)
            .map_err(|source| StrategyError::Baseline { source })?;
        let mut seen = HashSet::new();
        let deck = pool
            .resolve(&names)
            .into_iter()
            .filter(|c| seen.insert(c.name.as_str()))
            .collect::<Vec<_>>();
        if deck.len() != DECK_SIZE || names.len() != DECK_SIZE {
            return Err(StrategyError::IncompleteBaselineDeck {
                resolved: deck.len(),
            });
        }
        Ok(strategy::finish(self.kind(), &deck, &scorer, ctx, started))
    }
}

#[cfg(test)]
mod tests {
    use decksmith_card::fixtures;

    use super::*;

    #[derive(Debug)]
    struct FixedBuilder(Vec<&'static str>);

    impl ExternalDeckBuilder for FixedBuilder {
        fn build_deck(&self, _pool: &CardPool) -> Result<Vec<String>, BaselineBuildError> {
            Ok(self.0.iter().map(|&s| s.to_owned()).collect())
        }
    }

    #[derive(Debug)]
    struct FailingBuilder;

    impl ExternalDeckBuilder for FailingBuilder {
        fn build_deck(&self, _pool: &CardPool) -> Result<Vec<String>, BaselineBuildError> {
            Err(BaselineBuildError::new("no collection data"))
        }
    }

    #[test]
    fn test_level_first_prefers_high_levels() {
        let pool = fixtures::standard_pool();
        let deck = LevelFirstBuilder.build_deck(&pool).unwrap();
        assert_eq!(
            deck,
            [
                "Hog Rider",
                "Royal Giant",
                "Skeletons",
                "Ice Spirit",
                "Mini P.E.K.K.A",
                "Musketeer",
                "Baby Dragon",
                "Fireball",
            ]
        );
    }

    #[test]
    fn test_missing_builder_is_unavailable() {
        let pool = fixtures::standard_pool();
        let err = BaselineStrategy::new(None)
            .build(&pool, &BuildContext::new(0))
            .unwrap_err();
        assert!(matches!(err, StrategyError::BaselineUnavailable));
    }

    #[test]
    fn test_builder_failure_is_propagated() {
        let pool = fixtures::standard_pool();
        let err = BaselineStrategy::new(Some(Arc::new(FailingBuilder)))
            .build(&pool, &BuildContext::new(0))
            .unwrap_err();
        assert_eq!(err.to_string(), "baseline builder failed: no collection data");
    }

    #[test]
    fn test_rejects_deck_with_unknown_or_duplicate_cards() {
        let pool = fixtures::standard_pool();
        let mut names = fixtures::valid_deck_names().to_vec();
        names[7] = names[0];
        let err = BaselineStrategy::new(Some(Arc::new(FixedBuilder(names))))
            .build(&pool, &BuildContext::new(0))
            .unwrap_err();
        assert!(matches!(err, StrategyError::IncompleteBaselineDeck { resolved: 7 }));

        let mut names = fixtures::valid_deck_names().to_vec();
        names[7] = "Golem";
        let err = BaselineStrategy::new(Some(Arc::new(FixedBuilder(names))))
            .build(&pool, &BuildContext::new(0))
            .unwrap_err();
        assert!(matches!(err, StrategyError::IncompleteBaselineDeck { resolved: 7 }));
    }

    #[test]
    fn test_keeps_builder_order() {
        let pool = fixtures::standard_pool();
        let names = fixtures::valid_deck_names().to_vec();
        let result = BaselineStrategy::new(Some(Arc::new(FixedBuilder(names.clone()))))
            .build(&pool, &BuildContext::new(0))
            .unwrap();
        assert_eq!(result.deck, names);
        assert_eq!(result.method, StrategyKind::Baseline);
    }
}
