//! Deck evaluation: hard constraints and the composite quality score.
//!
//! # Overview
//!
//! A deck is judged along two independent axes:
//!
//! - **Validity** ([`constraints`]): does the deck reach the configured hard
//!   minimums (win conditions, spells, air defense, tank killers)? Validity is
//!   binary; the report lists every broken rule.
//! - **Quality** ([`composite`]): how good is the deck? Five sub-scores in
//!   `[0, 1]` (synergy, coverage, role fit, elixir fit, card quality) are
//!   combined with normalized soft weights into a single composite score.
//!
//! The two never mix: violations are attached to [`DeckMetrics`] for
//! diagnostics but do not alter the numbers. Search strategies decide for
//! themselves whether an invalid deck is acceptable.
//!
//! [`archetype`] adds an informational play-style guess.
//!
//! # Configuration
//!
//! [`ConstraintConfig`] carries both the hard minimums and the soft weights.
//! It is validated eagerly; [`ConstraintConfig::validate`] reports one error
//! per offending field so a bad config file can be fixed in one pass.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use decksmith_card::{CardCandidate, CardRole, SynergyTable};
//! use decksmith_evaluator::{CompositeScorer, ConstraintConfig};
//!
//! let config = ConstraintConfig::default();
//! config.validate().unwrap();
//!
//! let scorer = CompositeScorer::new(Arc::new(SynergyTable::default()), &config);
//! let hog = CardCandidate::new("Hog Rider", 14, 15, 4).with_role(CardRole::WinCondition);
//! let metrics = scorer.score(&[&hog]);
//! assert!((0.0..=1.0).contains(&metrics.composite));
//! assert!(!metrics.constraint_violations.is_empty());
//! ```

pub use self::{
    archetype::{Archetype, ArchetypeDetector, ArchetypeGuess, HeuristicArchetypeDetector},
    composite::{CompositeScorer, DeckMetrics},
    config::{ConfigError, ConstraintConfig, HardConstraints, InvalidConstraintConfig, SoftWeights},
    constraints::{ConstraintReport, ConstraintViolation, DeckProfile, is_valid_deck, validate_deck},
};

pub mod archetype;
pub mod composite;
pub mod config;
pub mod constraints;
