//! Role-first greedy strategy.
//!
//! Eight slots are filled in order, each with a semantic target. Every
//! eligible unused card is scored as
//!
//! ```text
//! level_ratio + 0.35 * synergy(deck + card) + 0.35 * coverage(deck + card)
//!     - 0.04 * max(0, elixir - 5) - 0.03 * (picked cards sharing its role)
//! ```
//!
//! and the best one is taken. Every card within [`TIE_BAND`] of the best
//! score is considered tied, and the pick among them is uniformly random.

use std::time::Instant;

use arrayvec::ArrayVec;
use decksmith_card::{CardCandidate, CardPool, CardRole, DECK_SIZE, SynergyLookup};
use decksmith_evaluator::composite::{coverage_score, synergy_score};
use rand::{Rng, SeedableRng, seq::IndexedRandom};
use rand_pcg::Pcg64;

use crate::strategy::{self, BuildContext, DeckResult, Strategy, StrategyError, StrategyKind};

const SEED_OFFSET: u64 = 91;
const SYNERGY_WEIGHT: f64 = 0.35;
const COVERAGE_WEIGHT: f64 = 0.35;
/// Penalty per elixir above [`ELIXIR_PENALTY_FREE`].
const ELIXIR_PENALTY: f64 = 0.04;
const ELIXIR_PENALTY_FREE: u32 = 5;
const ROLE_DUPLICATE_PENALTY: f64 = 0.03;
/// Scores closer than this to the best are treated as ties.
pub const TIE_BAND: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotTarget {
    WinCondition,
    TankKiller,
    Splash,
    AirDefense,
    BigSpell,
    SmallSpell,
    Any,
}

const SLOTS: [SlotTarget; DECK_SIZE] = [
    SlotTarget::WinCondition,
    SlotTarget::TankKiller,
    SlotTarget::Splash,
    SlotTarget::AirDefense,
    SlotTarget::BigSpell,
    SlotTarget::SmallSpell,
    SlotTarget::Any,
    SlotTarget::Any,
];

impl SlotTarget {
    fn accepts(self, card: &CardCandidate) -> bool {
        match self {
            Self::WinCondition => card.is_win_condition(),
            Self::TankKiller => card.is_tank_killer(),
            Self::Splash => card.is_splash(),
            Self::AirDefense => card.can_target_air(),
            Self::BigSpell => card.has_role(CardRole::BigSpell),
            Self::SmallSpell => card.has_role(CardRole::SmallSpell),
            Self::Any => true,
        }
    }
}

type PartialDeck<'p> = ArrayVec<&'p CardCandidate, DECK_SIZE>;

fn slot_score(deck: &PartialDeck<'_>, card: &CardCandidate, synergy: &dyn SynergyLookup) -> f64 {
    let mut trial = deck.iter().copied().collect::<Vec<_>>();
    trial.push(card);

    let elixir_penalty = f64::from(card.elixir.saturating_sub(ELIXIR_PENALTY_FREE)) * ELIXIR_PENALTY;
    let duplicates = card.role.map_or(0, |role| {
        deck.iter().filter(|c| c.role == Some(role)).count()
    });
    #[expect(clippy::cast_precision_loss)]
    let role_penalty = duplicates as f64 * ROLE_DUPLICATE_PENALTY;

    card.level_ratio() + SYNERGY_WEIGHT * synergy_score(&trial, synergy)
        + COVERAGE_WEIGHT * coverage_score(&trial)
        - elixir_penalty
        - role_penalty
}

/// Best card for `target`, falling back to any unused card when no unused
/// card matches.
fn pick_for_slot<'p, R>(
    pool: &'p CardPool,
    deck: &PartialDeck<'p>,
    target: SlotTarget,
    synergy: &dyn SynergyLookup,
    rng: &mut R,
) -> Option<&'p CardCandidate>
where
    R: Rng + ?Sized,
{
    let unused = pool
        .iter()
        .filter(|c| !deck.iter().any(|d| d.name == c.name))
        .collect::<Vec<_>>();
    let eligible = unused
        .iter()
        .copied()
        .filter(|c| target.accepts(c))
        .collect::<Vec<_>>();
    let eligible = if eligible.is_empty() { unused } else { eligible };

    let scored = eligible
        .into_iter()
        .map(|card| (card, slot_score(deck, card, synergy)))
        .collect::<Vec<_>>();
    let best = scored
        .iter()
        .map(|&(_, score)| score)
        .max_by(f64::total_cmp)?;
    let tied = scored
        .iter()
        .filter(|&&(_, score)| best - score < TIE_BAND)
        .map(|&(card, _)| card)
        .collect::<Vec<_>>();
    tied.choose(rng).copied()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleFirstStrategy;

impl Strategy for RoleFirstStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RoleFirst
    }

    fn build(&self, pool: &CardPool, ctx: &BuildContext) -> Result<DeckResult, StrategyError> {
        let started = Instant::now();
        let scorer = strategy::prepare(pool, ctx)?;
        let mut rng = Pcg64::seed_from_u64(ctx.seed.wrapping_add(SEED_OFFSET));

        let mut deck = PartialDeck::new();
        for (slot, target) in SLOTS.into_iter().enumerate() {
            let card = pick_for_slot(pool, &deck, target, scorer.synergy(), &mut rng)
                .ok_or(StrategyError::SlotUnfilled { slot })?;
            tracing::trace!(slot, ?target, card = %card.name, "filled slot");
            deck.push(card);
        }
        Ok(strategy::finish(self.kind(), &deck, &scorer, ctx, started))
    }
}
