//! Interchangeable deck-building strategies and a harness to compare them.
//!
//! # Strategies
//!
//! Every strategy implements [`Strategy`]: given a [`CardPool`] and a
//! [`BuildContext`], return eight distinct pool cards scored by the composite
//! scorer, with the runtime and an archetype guess attached.
//!
//! | Kind | Approach |
//! |---|---|
//! | `baseline` | delegates to an [`ExternalDeckBuilder`] |
//! | `genetic` | genetic optimizer with the composite score as fitness |
//! | `constraint` | randomized construction plus hill-climbing, valid decks only |
//! | `role-first` | greedy slot filling with fixed semantic targets |
//!
//! All strategies validate the constraint configuration before the pool, and
//! draw every random decision from a generator derived from
//! [`BuildContext::seed`], so a fixed seed reproduces the same deck.
//!
//! # Benchmarking
//!
//! [`BenchmarkRunner`] runs a list of strategies over a list of inputs, each
//! with its own pool and a seed offset by the input index. Any failure
//! aborts the run. The resulting [`BenchmarkReport`] carries per-input
//! winners, per-strategy aggregates and recommendations; [`render_markdown`]
//! turns it into a summary document.
//!
//! [`CardPool`]: decksmith_card::CardPool

pub use self::{
    baseline::{BaselineBuildError, BaselineStrategy, ExternalDeckBuilder, LevelFirstBuilder},
    benchmark::{
        BenchmarkAggregate, BenchmarkConfig, BenchmarkError, BenchmarkInput, BenchmarkReport,
        BenchmarkRunner, PlayerResult,
    },
    constraint_guided::ConstraintGuidedStrategy,
    genetic::GeneticStrategy,
    report::{render_markdown, write_markdown},
    role_first::RoleFirstStrategy,
    strategy::{
        BuildContext, DeckResult, Strategy, StrategyError, StrategyKind, UnknownStrategy,
        strategy_for,
    },
};

pub mod baseline;
pub mod benchmark;
pub mod constraint_guided;
pub mod genetic;
pub mod report;
pub mod role_first;
pub mod strategy;
