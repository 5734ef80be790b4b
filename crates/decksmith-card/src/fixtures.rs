//! Shared candidate pools and synergy data for tests across the workspace.

use crate::{
    CardCandidate, CardPool, CardRole, CombatStats, SynergyCategory, SynergyPair, SynergyTable,
    TargetType,
};

fn card(
    name: &str,
    level: u32,
    elixir: u32,
    role: CardRole,
    dps: f64,
    radius: f64,
    targets: Option<TargetType>,
) -> CardCandidate {
    CardCandidate::new(name, level, 15, elixir)
        .with_role(role)
        .with_stats(CombatStats {
            damage_per_second: dps,
            radius,
            targets,
        })
}

/// Twelve cards: 2 win conditions, 3 support, 2 big spells, 2 small spells,
/// 1 building and 2 cycle cards. Three of them can hit air.
#[must_use]
pub fn standard_cards() -> Vec<CardCandidate> {
    use CardRole::{BigSpell, Building, Cycle, SmallSpell, Support, WinCondition};
    use TargetType::{AirAndGround, Buildings, Ground};
    vec![
        card("Hog Rider", 14, 4, WinCondition, 150.0, 0.0, Some(Buildings)),
        card("Royal Giant", 14, 6, WinCondition, 180.0, 0.0, Some(Buildings)),
        card("Mini P.E.K.K.A", 13, 4, Support, 330.0, 0.0, Some(Ground)),
        card("Musketeer", 13, 4, Support, 181.0, 0.0, Some(AirAndGround)),
        card("Baby Dragon", 13, 4, Support, 0.0, 1.0, Some(AirAndGround)).with_evolution(0, 1),
        card("Fireball", 13, 4, BigSpell, 0.0, 2.5, None),
        card("Poison", 13, 4, BigSpell, 0.0, 3.0, None),
        card("The Log", 13, 2, SmallSpell, 0.0, 1.8, None),
        card("Zap", 13, 2, SmallSpell, 0.0, 0.0, Some(AirAndGround)),
        card("Cannon", 13, 3, Building, 140.0, 0.0, Some(Ground)),
        card("Skeletons", 14, 1, Cycle, 0.0, 0.0, Some(Ground)).with_evolution(1, 1),
        card("Ice Spirit", 14, 1, Cycle, 0.0, 0.0, Some(Ground)),
    ]
}

#[must_use]
pub fn standard_pool() -> CardPool {
    CardPool::new(standard_cards()).expect("fixture pool is valid")
}

/// The standard pool with every air-capable card removed.
#[must_use]
pub fn pool_without_air_defense() -> CardPool {
    standard_pool().without(CardCandidate::can_target_air)
}

/// Eight cards that satisfy the default hard constraints.
#[must_use]
pub fn valid_deck_names() -> [&'static str; 8] {
    [
        "Hog Rider",
        "Musketeer",
        "Fireball",
        "The Log",
        "Cannon",
        "Baby Dragon",
        "Skeletons",
        "Zap",
    ]
}

/// A handful of synergies between cards of the standard pool.
#[must_use]
pub fn standard_synergy() -> SynergyTable {
    let pair = |a: &str, b: &str, category, score| SynergyPair {
        card1: a.into(),
        card2: b.into(),
        synergy_type: category,
        score,
        description: String::new(),
    };
    SynergyTable::from_pairs([
        pair("Hog Rider", "Ice Spirit", SynergyCategory::Cycle, 0.85),
        pair("Hog Rider", "Fireball", SynergyCategory::SpellCombo, 0.8),
        pair("Hog Rider", "The Log", SynergyCategory::SpellCombo, 0.75),
        pair("Hog Rider", "Skeletons", SynergyCategory::Cycle, 0.8),
        pair("Royal Giant", "Fireball", SynergyCategory::WinCondition, 0.7),
        pair("Royal Giant", "Mini P.E.K.K.A", SynergyCategory::TankSupport, 0.65),
        pair("Musketeer", "Cannon", SynergyCategory::Defensive, 0.75),
        pair("Baby Dragon", "Poison", SynergyCategory::SpellCombo, 0.6),
        pair("Zap", "The Log", SynergyCategory::Bait, 0.5),
        pair("Ice Spirit", "Skeletons", SynergyCategory::Cycle, 0.9),
    ])
}
