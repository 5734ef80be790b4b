//! Card model shared by every part of the deck search.
//!
//! This crate holds the immutable description of the items a search can pick
//! from ([`CardCandidate`]), the validated pool they are drawn from
//! ([`CardPool`]) and the read-only synergy interface consumed by the scorer
//! and the genetic operators ([`SynergyLookup`]).
//!
//! Nothing here performs I/O; candidate pools and synergy tables are built by
//! callers (the CLI reads them from JSON).
//!
//! # Example
//!
//! ```
//! use decksmith_card::{CardCandidate, CardPool, CardRole};
//!
//! let pool = CardPool::new(vec![
//!     CardCandidate::new("Hog Rider", 14, 15, 4).with_role(CardRole::WinCondition),
//!     CardCandidate::new("Zap", 13, 15, 2).with_role(CardRole::SmallSpell),
//! ])
//! .unwrap();
//! assert!(pool.get("Zap").unwrap().is_spell());
//! assert!(pool.ensure_deck_capacity().is_err());
//! ```

pub use self::{card::*, pool::*, synergy::*};

pub mod card;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
pub mod pool;
pub mod synergy;

/// Number of cards in a deck.
pub const DECK_SIZE: usize = 8;
