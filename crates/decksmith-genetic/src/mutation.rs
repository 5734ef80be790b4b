//! Card-replacement mutation.
//!
//! A mutation replaces `max(1, round(8 * intensity))` distinct positions. Each
//! position picks its replacement through one of five operators chosen
//! uniformly at random, and the result is repaired. Candidates already in the
//! deck, including the card being replaced, are never offered.

use std::collections::HashSet;

use decksmith_card::{CardCandidate, DECK_SIZE};
use rand::{Rng, seq::IndexedRandom};

use crate::genome::{DeckGenome, SearchSpace, repair};

/// Minimum synergy gain for the synergy-guided operator to accept a card.
pub const SYNERGY_MUTATION_THRESHOLD: f64 = 0.6;
/// Probability of preferring an evolution-capable card when one is available.
pub const EVOLUTION_BIAS: f64 = 0.7;
/// Re-rolls allowed when a mutation happens to reproduce the original deck.
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOperator {
    Random,
    RoleBased,
    SynergyGuided,
    EvolutionAware,
    /// Delegates to one of the role, synergy or evolution operators.
    Mixed,
}

impl MutationOperator {
    pub const ALL: [Self; 5] = [
        Self::Random,
        Self::RoleBased,
        Self::SynergyGuided,
        Self::EvolutionAware,
        Self::Mixed,
    ];

    fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Number of positions a mutation touches.
#[must_use]
pub fn mutation_count(intensity: f64) -> usize {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = (8.0 * intensity.clamp(0.0, 1.0)).round() as usize;
    count.clamp(1, DECK_SIZE)
}

/// Where a replacement is being chosen.
struct Slot<'d> {
    deck: &'d [String],
    position: usize,
}

impl Slot<'_> {
    fn old(&self) -> &str {
        &self.deck[self.position]
    }

    /// Mean synergy of `card` with every other position of the deck.
    fn synergy_with_rest(&self, card: &str, space: &SearchSpace<'_>) -> f64 {
        let others = self
            .deck
            .iter()
            .enumerate()
            .filter(|&(i, name)| i != self.position && name != card)
            .map(|(_, name)| space.synergy.synergy(card, name))
            .collect::<Vec<_>>();
        if others.is_empty() {
            return 0.0;
        }
        #[expect(clippy::cast_precision_loss)]
        let n = others.len() as f64;
        others.iter().sum::<f64>() / n
    }
}

fn options<'a>(
    space: &SearchSpace<'a>,
    used: &HashSet<String>,
    old: &str,
) -> Vec<&'a CardCandidate> {
    space.unused(used).filter(|c| c.name != old).collect()
}

fn random_swap<R>(slot: &Slot<'_>, used: &HashSet<String>, space: &SearchSpace<'_>, rng: &mut R) -> Option<String>
where
    R: Rng + ?Sized,
{
    options(space, used, slot.old())
        .choose(rng)
        .map(|c| c.name.clone())
}

fn role_based<R>(slot: &Slot<'_>, used: &HashSet<String>, space: &SearchSpace<'_>, rng: &mut R) -> Option<String>
where
    R: Rng + ?Sized,
{
    let Some(role) = space.card(slot.old()).and_then(|c| c.role) else {
        return random_swap(slot, used, space, rng);
    };
    let same_role = options(space, used, slot.old())
        .into_iter()
        .filter(|c| c.has_role(role))
        .collect::<Vec<_>>();
    match same_role.choose(rng) {
        Some(card) => Some(card.name.clone()),
        None => random_swap(slot, used, space, rng),
    }
}

fn synergy_guided<R>(
    slot: &Slot<'_>,
    used: &HashSet<String>,
    space: &SearchSpace<'_>,
    rng: &mut R,
) -> Option<String>
where
    R: Rng + ?Sized,
{
    let mut best_score = slot.synergy_with_rest(slot.old(), space);
    let mut best = None;
    for card in options(space, used, slot.old()) {
        let score = slot.synergy_with_rest(&card.name, space);
        if score >= best_score + SYNERGY_MUTATION_THRESHOLD {
            best_score = score;
            best = Some(card.name.clone());
        }
    }
    best.or_else(|| role_based(slot, used, space, rng))
}

fn evolution_aware<R>(
    slot: &Slot<'_>,
    used: &HashSet<String>,
    space: &SearchSpace<'_>,
    rng: &mut R,
) -> Option<String>
where
    R: Rng + ?Sized,
{
    let (evolved, normal): (Vec<_>, Vec<_>) = options(space, used, slot.old())
        .into_iter()
        .partition(|c| c.is_evolution_capable());
    if !evolved.is_empty() && rng.random_bool(EVOLUTION_BIAS) {
        return evolved.choose(rng).map(|c| c.name.clone());
    }
    if let Some(card) = normal.choose(rng) {
        return Some(card.name.clone());
    }
    random_swap(slot, used, space, rng)
}

impl MutationOperator {
    fn replacement<R>(
        self,
        slot: &Slot<'_>,
        used: &HashSet<String>,
        space: &SearchSpace<'_>,
        rng: &mut R,
    ) -> Option<String>
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Random => random_swap(slot, used, space, rng),
            Self::RoleBased => role_based(slot, used, space, rng),
            Self::SynergyGuided => synergy_guided(slot, used, space, rng),
            Self::EvolutionAware => evolution_aware(slot, used, space, rng),
            Self::Mixed => match rng.random_range(0..3) {
                0 => role_based(slot, used, space, rng),
                1 => synergy_guided(slot, used, space, rng),
                _ => evolution_aware(slot, used, space, rng),
            },
        }
    }
}

impl DeckGenome {
    /// Replaces cards in place and clears the fitness.
    pub fn mutate<R>(&mut self, intensity: f64, space: &SearchSpace<'_>, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let original = self.cards.clone();
        for _ in 0..MAX_ATTEMPTS {
            self.cards = mutated(&original, intensity, space, rng);
            if self.cards != original {
                break;
            }
        }
        self.fitness = None;
    }
}

fn mutated<R>(original: &[String], intensity: f64, space: &SearchSpace<'_>, rng: &mut R) -> Vec<String>
where
    R: Rng + ?Sized,
{
    let mut cards = original.to_vec();
    let mut used = cards.iter().cloned().collect::<HashSet<_>>();
    let count = mutation_count(intensity).min(cards.len());
    let positions = rand::seq::index::sample(rng, cards.len(), count).into_vec();

    for position in positions {
        let old = cards[position].clone();
        used.remove(&old);
        let operator = MutationOperator::random(rng);
        let slot = Slot {
            deck: &cards,
            position,
        };
        match operator.replacement(&slot, &used, space, rng) {
            Some(new) if new != old => {
                used.insert(new.clone());
                cards[position] = new;
            }
            _ => {
                used.insert(old);
            }
        }
    }

    repair(&cards, &[], space, rng)
}
