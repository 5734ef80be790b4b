//! Runs strategies over many inputs and aggregates the outcome.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{DateTime, Utc};
use decksmith_card::{CardCandidate, CardPool, PoolError, SynergyLookup, SynergyTable};
use decksmith_evaluator::{ArchetypeDetector, ConstraintConfig, HeuristicArchetypeDetector, InvalidConstraintConfig};
use decksmith_genetic::{CancellationToken, GeneticConfig};
use decksmith_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

use crate::{
    baseline::ExternalDeckBuilder,
    strategy::{self, BuildContext, DeckResult, StrategyError, StrategyKind},
};

/// One benchmark input: an identity plus its own candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkInput {
    pub tag: String,
    #[serde(default)]
    pub name: String,
    pub candidates: Vec<CardCandidate>,
}

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub seed: u64,
    pub top_n: usize,
    pub strategies: Vec<StrategyKind>,
    pub constraints: ConstraintConfig,
    pub genetic: GeneticConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            top_n: 1,
            strategies: StrategyKind::ALL.to_vec(),
            constraints: ConstraintConfig::default(),
            genetic: GeneticConfig::benchmark_preset(),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BenchmarkError {
    #[display("no inputs provided")]
    NoInputs,
    #[display("invalid benchmark constraints: {source}")]
    InvalidConstraints { source: InvalidConstraintConfig },
    #[display("invalid candidate pool for {tag}: {source}")]
    InvalidPool { tag: String, source: PoolError },
    #[display("{strategy} failed for {tag}: {source}")]
    StrategyFailed {
        strategy: StrategyKind,
        tag: String,
        source: StrategyError,
    },
}

/// All strategy runs for one input, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_tag: String,
    pub player_name: String,
    pub method_runs: Vec<DeckResult>,
    pub winner: Option<StrategyKind>,
    pub winner_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkAggregate {
    pub method: StrategyKind,
    pub runs: usize,
    pub mean_composite: f64,
    pub median_composite: f64,
    pub mean_runtime_ms: f64,
    pub constraint_violation_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub timestamp: DateTime<Utc>,
    pub seed: u64,
    pub methods: Vec<StrategyKind>,
    pub player_runs: Vec<PlayerResult>,
    /// Sorted by mean composite, best first.
    pub aggregates: Vec<BenchmarkAggregate>,
    pub recommendations: Vec<String>,
}

/// Drives every configured strategy over every input.
#[derive(Debug, Clone)]
pub struct BenchmarkRunner {
    synergy: Arc<dyn SynergyLookup>,
    archetypes: Arc<dyn ArchetypeDetector>,
    baseline: Option<Arc<dyn ExternalDeckBuilder>>,
    cancel: CancellationToken,
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self {
            synergy: Arc::new(SynergyTable::default()),
            archetypes: Arc::new(HeuristicArchetypeDetector),
            baseline: None,
            cancel: CancellationToken::new(),
        }
    }
}

impl BenchmarkRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_synergy(mut self, synergy: Arc<dyn SynergyLookup>) -> Self {
        self.synergy = synergy;
        self
    }

    #[must_use]
    pub fn with_archetypes(mut self, archetypes: Arc<dyn ArchetypeDetector>) -> Self {
        self.archetypes = archetypes;
        self
    }

    #[must_use]
    pub fn with_baseline(mut self, builder: Arc<dyn ExternalDeckBuilder>) -> Self {
        self.baseline = Some(builder);
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the benchmark; any single failure aborts the whole run.
    pub fn run(
        &self,
        config: &BenchmarkConfig,
        inputs: &[BenchmarkInput],
    ) -> Result<BenchmarkReport, BenchmarkError> {
        if inputs.is_empty() {
            return Err(BenchmarkError::NoInputs);
        }
        config
            .constraints
            .validate()
            .map_err(|source| BenchmarkError::InvalidConstraints { source })?;
        let kinds = unique_strategies(&config.strategies);
        tracing::info!(
            inputs = inputs.len(),
            strategies = kinds.len(),
            seed = config.seed,
            "starting benchmark"
        );

        let strategies = kinds
            .iter()
            .map(|&kind| strategy::strategy_for(kind, self.baseline.clone()))
            .collect::<Vec<_>>();

        let mut player_runs = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let pool = CardPool::new(input.candidates.clone()).map_err(|source| {
                BenchmarkError::InvalidPool {
                    tag: input.tag.clone(),
                    source,
                }
            })?;
            let ctx = BuildContext {
                seed: config.seed.wrapping_add(index as u64),
                top_n: config.top_n,
                constraints: config.constraints,
                synergy: self.synergy.clone(),
                archetypes: self.archetypes.clone(),
                genetic: config.genetic.clone(),
                cancel: self.cancel.clone(),
            };

            let mut method_runs = Vec::with_capacity(strategies.len());
            for strategy in &strategies {
                let result = strategy.build(&pool, &ctx).map_err(|source| {
                    BenchmarkError::StrategyFailed {
                        strategy: strategy.kind(),
                        tag: input.tag.clone(),
                        source,
                    }
                })?;
                tracing::info!(
                    tag = %input.tag,
                    strategy = %result.method,
                    composite = result.metrics.composite,
                    runtime_ms = result.metrics.runtime_ms,
                    "benchmark run complete"
                );
                method_runs.push(result);
            }
            player_runs.push(player_result(input, method_runs));
        }

        let aggregates = aggregate(&kinds, &player_runs);
        let recommendations = recommend(&aggregates);
        Ok(BenchmarkReport {
            timestamp: Utc::now(),
            seed: config.seed,
            methods: kinds,
            player_runs,
            aggregates,
            recommendations,
        })
    }
}

/// Strategies in first-seen order, each listed once.
fn unique_strategies(strategies: &[StrategyKind]) -> Vec<StrategyKind> {
    let mut unique = Vec::with_capacity(strategies.len());
    for &kind in strategies {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    unique
}

fn player_result(input: &BenchmarkInput, mut method_runs: Vec<DeckResult>) -> PlayerResult {
    method_runs.sort_by(|a, b| b.metrics.composite.total_cmp(&a.metrics.composite));
    let winner = method_runs.first();
    PlayerResult {
        player_tag: input.tag.clone(),
        player_name: input.name.clone(),
        winner: winner.map(|r| r.method),
        winner_score: winner.map_or(0.0, |r| r.metrics.composite),
        method_runs,
    }
}

/// Per-strategy statistics, best mean composite first.
///
/// Strategies without any run are omitted.
#[must_use]
pub fn aggregate(strategies: &[StrategyKind], player_runs: &[PlayerResult]) -> Vec<BenchmarkAggregate> {
    let mut runs = BTreeMap::<StrategyKind, Vec<&DeckResult>>::new();
    for result in player_runs.iter().flat_map(|p| &p.method_runs) {
        runs.entry(result.method).or_default().push(result);
    }

    let mut aggregates = vec![];
    for kind in &unique_strategies(strategies) {
        let Some(results) = runs.get(kind) else {
            continue;
        };
        #[expect(clippy::cast_precision_loss)]
        let runtimes = results.iter().map(|r| r.metrics.runtime_ms as f64);
        let (Some(composite), Some(runtime)) = (
            DescriptiveStats::new(results.iter().map(|r| r.metrics.composite)),
            DescriptiveStats::new(runtimes),
        ) else {
            continue;
        };
        aggregates.push(BenchmarkAggregate {
            method: *kind,
            runs: results.len(),
            mean_composite: composite.mean,
            median_composite: composite.median,
            mean_runtime_ms: runtime.mean,
            constraint_violation_count: results
                .iter()
                .map(|r| r.metrics.constraint_violations.len())
                .sum(),
        });
    }
    aggregates.sort_by(|a, b| b.mean_composite.total_cmp(&a.mean_composite));
    aggregates
}

/// Textual next steps derived from sorted aggregates.
#[must_use]
pub fn recommend(aggregates: &[BenchmarkAggregate]) -> Vec<String> {
    let Some(top) = aggregates.first() else {
        return vec!["No method results available.".to_owned()];
    };
    let mut recommendations = vec![format!("Top method by mean composite: {}", top.method)];
    if let Some(second) = aggregates.get(1) {
        recommendations.push(format!("Second-best method: {}", second.method));
    }
    for a in aggregates.iter().filter(|a| a.constraint_violation_count > 0) {
        recommendations.push(format!(
            "Method {} needs constraint hardening ({} violations).",
            a.method, a.constraint_violation_count
        ));
    }
    recommendations
}
