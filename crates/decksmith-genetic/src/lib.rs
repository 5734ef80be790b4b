//! Genetic search for 8-card decks.
//!
//! # Overview
//!
//! A [`DeckGenome`] is an ordered list of eight distinct card names drawn
//! from a [`CardPool`](decksmith_card::CardPool), plus a fitness that is
//! computed lazily by a [`DeckFitness`] implementation. The
//! [`GeneticOptimizer`] evolves a population of genomes generation by
//! generation:
//!
//! 1. **Selection**: parents are drawn by tournament among the current
//!    population.
//! 2. **Crossover** ([`crossover`]): with probability `crossover_rate`, two
//!    parents produce two children through a uniform, role-grouped or
//!    synergy-aware recombination.
//! 3. **Mutation** ([`mutation`]): with probability `mutation_rate`, a child
//!    has some of its cards replaced through one of five operators.
//! 4. **Repair**: every child is forced back into eight distinct pool cards
//!    with at least one win condition when the pool has one.
//! 5. **Elitism**: the best `elite_count` genomes survive unchanged.
//!
//! # Islands
//!
//! With `island_model` enabled the population is split evenly into
//! independent islands. Every `migration_interval` generations the best
//! genomes of each island replace the worst of the next one (ring topology).
//! Islands step in parallel when `parallel_evaluations` is set.
//!
//! # Termination
//!
//! A run ends at the generation limit, when the best fitness reaches
//! `target_fitness` (if positive), after `convergence_generations` without
//! improvement (if positive), or when its [`CancellationToken`] is cancelled.
//! The result carries a hall of fame of distinct decks, best first.
//!
//! # Determinism
//!
//! All randomness derives from the generator passed to
//! [`GeneticOptimizer::run`]. Each island owns a PCG generator seeded from
//! it, so a fixed seed reproduces the same hall of fame even with parallel
//! evaluation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use decksmith_card::{CardCandidate, CardPool, CardRole, SynergyTable};
//! use decksmith_evaluator::{CompositeScorer, ConstraintConfig};
//! use decksmith_genetic::{CompositeFitness, GeneticConfig, GeneticOptimizer};
//! use rand::SeedableRng;
//! use rand_pcg::Pcg64;
//!
//! let mut cards = vec![CardCandidate::new("Hog Rider", 14, 15, 4).with_role(CardRole::WinCondition)];
//! cards.extend((0..9).map(|i| CardCandidate::new(format!("Card {i}"), 12, 15, 3)));
//! let pool = CardPool::new(cards).unwrap();
//!
//! let synergy = Arc::new(SynergyTable::default());
//! let scorer = CompositeScorer::new(synergy.clone(), &ConstraintConfig::default());
//! let fitness = CompositeFitness::new(scorer);
//! let config = GeneticConfig {
//!     population_size: 12,
//!     generations: 3,
//!     ..GeneticConfig::default()
//! };
//!
//! let mut optimizer = GeneticOptimizer::new(config, &pool, synergy.as_ref(), &fitness).unwrap();
//! let result = optimizer.run(&mut Pcg64::seed_from_u64(0)).unwrap();
//! let best = result.best().unwrap();
//! assert_eq!(best.cards().len(), 8);
//! assert!(best.cards().iter().any(|c| c == "Hog Rider"));
//! ```

pub use self::{
    config::{GeneticConfig, GeneticConfigError, InvalidGeneticConfig},
    crossover::CrossoverOperator,
    fitness::{CompositeFitness, DeckFitness, FitnessCache},
    genome::{DeckGenome, SearchSpace},
    mutation::MutationOperator,
    optimizer::{
        CancellationToken, GenerationProgress, GeneticError, GeneticOptimizer, GeneticResult,
        StopReason,
    },
};

pub mod config;
pub mod crossover;
pub mod fitness;
pub mod genome;
pub mod mutation;
pub mod optimizer;
