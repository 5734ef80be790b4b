//! Card candidates and their capability predicates.
//!
//! A [`CardCandidate`] is one ownable card as seen by the deck search: how far
//! the player has levelled it, what it costs, what role the reference table
//! assigns to it and (optionally) a handful of combat stats. The predicates in
//! this module classify candidates into the capability categories used by
//! both the constraint engine and the composite scorer, so the two can never
//! disagree about what counts as, say, an air-defense card.

use serde::{Deserialize, Serialize};

/// Damage-per-second at or above which a card is treated as a tank killer.
pub const TANK_KILLER_DPS: f64 = 150.0;

const TANK_KILLER_NAMES: [&str; 4] = ["Inferno Dragon", "Inferno Tower", "Mini P.E.K.K.A", "P.E.K.K.A"];
const SPLASH_NAMES: [&str; 4] = ["Baby Dragon", "Wizard", "Executioner", "Bowler"];

/// Strategic role of a card inside a deck.
///
/// Serialized with the names used by the static role reference table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum CardRole {
    /// Primary tower-damaging cards.
    #[serde(rename = "win_conditions", alias = "win_condition")]
    #[display("win_conditions")]
    WinCondition,
    /// Defensive buildings.
    #[serde(rename = "buildings", alias = "building")]
    #[display("buildings")]
    Building,
    /// High-cost damage spells.
    #[serde(rename = "spells_big", alias = "big_spell")]
    #[display("spells_big")]
    BigSpell,
    /// Low-cost utility spells.
    #[serde(rename = "spells_small", alias = "small_spell")]
    #[display("spells_small")]
    SmallSpell,
    /// Mid-cost support troops.
    #[serde(rename = "support")]
    #[display("support")]
    Support,
    /// Low-cost cycle cards.
    #[serde(rename = "cycle")]
    #[display("cycle")]
    Cycle,
}

impl CardRole {
    /// Returns `true` for both spell roles.
    #[must_use]
    pub fn is_spell(self) -> bool {
        matches!(self, Self::BigSpell | Self::SmallSpell)
    }
}

/// What a card is able to attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum TargetType {
    #[serde(rename = "Ground")]
    #[display("Ground")]
    Ground,
    #[serde(rename = "Air")]
    #[display("Air")]
    Air,
    #[serde(rename = "Air & Ground")]
    #[display("Air & Ground")]
    AirAndGround,
    #[serde(rename = "Buildings")]
    #[display("Buildings")]
    Buildings,
}

impl TargetType {
    #[must_use]
    pub fn can_hit_air(self) -> bool {
        matches!(self, Self::Air | Self::AirAndGround)
    }
}

/// Optional combat statistics from the static stats registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    #[serde(default)]
    pub damage_per_second: f64,
    #[serde(default)]
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<TargetType>,
}

/// One ownable card considered for deck building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardCandidate {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    #[serde(default)]
    pub rarity: String,
    pub elixir: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<CardRole>,
    #[serde(default)]
    pub has_evolution: bool,
    #[serde(default)]
    pub evolution_level: u32,
    #[serde(default)]
    pub max_evolution_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CombatStats>,
}

impl CardCandidate {
    /// Creates a candidate with no role, stats or evolution data.
    #[must_use]
    pub fn new(name: impl Into<String>, level: u32, max_level: u32, elixir: u32) -> Self {
        Self {
            name: name.into(),
            level,
            max_level,
            rarity: String::new(),
            elixir,
            role: None,
            has_evolution: false,
            evolution_level: 0,
            max_evolution_level: 0,
            stats: None,
        }
    }

    #[must_use]
    pub fn with_role(mut self, role: CardRole) -> Self {
        self.role = Some(role);
        self
    }

    #[must_use]
    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = Some(stats);
        self
    }

    #[must_use]
    pub fn with_evolution(mut self, evolution_level: u32, max_evolution_level: u32) -> Self {
        self.has_evolution = true;
        self.evolution_level = evolution_level;
        self.max_evolution_level = max_evolution_level;
        self
    }

    #[must_use]
    pub fn has_role(&self, role: CardRole) -> bool {
        self.role == Some(role)
    }

    #[must_use]
    pub fn is_win_condition(&self) -> bool {
        self.has_role(CardRole::WinCondition)
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.role.is_some_and(CardRole::is_spell)
    }

    /// Returns `true` if the stats registry says the card can hit flying units.
    #[must_use]
    pub fn can_target_air(&self) -> bool {
        self.stats
            .as_ref()
            .and_then(|s| s.targets)
            .is_some_and(TargetType::can_hit_air)
    }

    /// High single-target damage, or one of the well-known tank answers.
    #[must_use]
    pub fn is_tank_killer(&self) -> bool {
        if self
            .stats
            .as_ref()
            .is_some_and(|s| s.damage_per_second >= TANK_KILLER_DPS)
        {
            return true;
        }
        TANK_KILLER_NAMES.contains(&self.name.as_str())
    }

    /// Area damage by stats, or one of the well-known splash troops.
    #[must_use]
    pub fn is_splash(&self) -> bool {
        if self.stats.as_ref().is_some_and(|s| s.radius > 0.0) {
            return true;
        }
        SPLASH_NAMES.contains(&self.name.as_str())
    }

    #[must_use]
    pub fn is_evolution_capable(&self) -> bool {
        self.has_evolution || self.evolution_level > 0 || self.max_evolution_level > 0
    }

    /// Progression of the card relative to its maximum, in `[0, 1]`.
    ///
    /// Below max level this is the plain level ratio. Once the base level is
    /// maxed, evolution progress is folded in so that an evolved card ranks
    /// above a maxed but unevolved one.
    #[must_use]
    pub fn level_ratio(&self) -> f64 {
        if self.max_level == 0 {
            return 0.0;
        }
        let level = self.level.min(self.max_level);
        if level < self.max_level || self.max_evolution_level == 0 {
            return f64::from(level) / f64::from(self.max_level);
        }
        let evolution = self.evolution_level.min(self.max_evolution_level);
        f64::from(self.max_level + evolution) / f64::from(self.max_level + self.max_evolution_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(dps: f64, radius: f64, targets: Option<TargetType>) -> CombatStats {
        CombatStats {
            damage_per_second: dps,
            radius,
            targets,
        }
    }

    #[test]
    fn test_air_targeting_requires_stats() {
        let no_stats = CardCandidate::new("Musketeer", 13, 15, 4);
        assert!(!no_stats.can_target_air());

        let ground = no_stats.clone().with_stats(stats(0.0, 0.0, Some(TargetType::Ground)));
        assert!(!ground.can_target_air());

        let both = no_stats.with_stats(stats(0.0, 0.0, Some(TargetType::AirAndGround)));
        assert!(both.can_target_air());
    }

    #[test]
    fn test_tank_killer_by_dps_or_name() {
        let fast = CardCandidate::new("Hunter", 13, 15, 4).with_stats(stats(150.0, 0.0, None));
        assert!(fast.is_tank_killer());

        let slow = CardCandidate::new("Knight", 13, 15, 3).with_stats(stats(149.9, 0.0, None));
        assert!(!slow.is_tank_killer());

        let named = CardCandidate::new("Inferno Tower", 13, 15, 5);
        assert!(named.is_tank_killer());
    }

    #[test]
    fn test_splash_by_radius_or_name() {
        let spell = CardCandidate::new("Fireball", 13, 15, 4).with_stats(stats(0.0, 2.5, None));
        assert!(spell.is_splash());
        assert!(CardCandidate::new("Wizard", 13, 15, 5).is_splash());
        assert!(!CardCandidate::new("Knight", 13, 15, 3).is_splash());
    }

    #[test]
    fn test_level_ratio_plain_and_evolved() {
        assert!((CardCandidate::new("A", 12, 15, 3).level_ratio() - 0.8).abs() < 1e-9);
        assert!(CardCandidate::new("A", 12, 0, 3).level_ratio().abs() < 1e-9);

        // evolution ignored until the base level is maxed
        let unmaxed = CardCandidate::new("A", 14, 15, 3).with_evolution(1, 1);
        assert!((unmaxed.level_ratio() - 14.0 / 15.0).abs() < 1e-9);

        let maxed = CardCandidate::new("A", 15, 15, 3).with_evolution(0, 1);
        let evolved = CardCandidate::new("A", 15, 15, 3).with_evolution(1, 1);
        assert!(maxed.level_ratio() > unmaxed.level_ratio());
        assert!(maxed.level_ratio() < 1.0);
        assert!((evolved.level_ratio() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_role_serde_names() {
        let json = serde_json::to_string(&CardRole::WinCondition).unwrap();
        assert_eq!(json, "\"win_conditions\"");
        let role: CardRole = serde_json::from_str("\"spells_small\"").unwrap();
        assert_eq!(role, CardRole::SmallSpell);
        assert!(role.is_spell());

        let targets: TargetType = serde_json::from_str("\"Air & Ground\"").unwrap();
        assert_eq!(targets, TargetType::AirAndGround);
    }

    #[test]
    fn test_candidate_deserializes_with_defaults() {
        let card: CardCandidate =
            serde_json::from_str(r#"{"name":"Zap","level":13,"max_level":15,"elixir":2}"#).unwrap();
        assert_eq!(card.role, None);
        assert!(card.stats.is_none());
        assert!(!card.is_evolution_capable());
    }
}
