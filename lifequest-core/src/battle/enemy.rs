//! Enemies, waves, and loot tables.

use super::status::{StatusKind, StatusList};
use crate::dice;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Reward tiers
// ============================================================================

/// Which loot table a wave's victories draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardTier {
    Basic,
    Standard,
    Elite,
}

impl RewardTier {
    /// Items a victory can drop, one picked uniformly.
    pub fn loot_table(&self) -> &'static [&'static str] {
        match self {
            RewardTier::Basic => &["Bandage", "Snack"],
            RewardTier::Standard => &["Bandage", "Stamina Tonic", "Focus Charm"],
            RewardTier::Elite => &["Focus Charm", "Stamina Tonic", "Shadow Shard"],
        }
    }
}

// ============================================================================
// Templates and live enemies
// ============================================================================

/// Static stats an enemy is spawned from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub stamina_regen_rate: f64,
    pub mana: i32,
    pub vulnerabilities: BTreeSet<StatusKind>,
}

impl EnemyTemplate {
    pub fn new(name: impl Into<String>, health: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            health,
            attack,
            defense,
            stamina_regen_rate: 2.0,
            mana: 20,
            vulnerabilities: BTreeSet::new(),
        }
    }

    pub fn with_reserves(mut self, stamina_regen_rate: f64, mana: i32) -> Self {
        self.stamina_regen_rate = stamina_regen_rate;
        self.mana = mana;
        self
    }

    pub fn vulnerable_to(mut self, kind: StatusKind) -> Self {
        self.vulnerabilities.insert(kind);
        self
    }

    /// A fresh enemy at full health with no statuses.
    pub fn spawn(&self, difficulty: u32, reward_tier: RewardTier) -> Enemy {
        Enemy {
            name: self.name.clone(),
            health: self.health,
            max_health: self.health,
            attack: self.attack,
            defense: self.defense,
            stamina_regen_rate: self.stamina_regen_rate,
            mana: self.mana,
            difficulty,
            reward_tier,
            vulnerabilities: self.vulnerabilities.clone(),
            statuses: StatusList::new(),
        }
    }
}

/// An enemy in a battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub stamina_regen_rate: f64,
    pub mana: i32,
    pub difficulty: u32,
    pub reward_tier: RewardTier,
    pub vulnerabilities: BTreeSet<StatusKind>,
    pub statuses: StatusList,
}

impl Enemy {
    pub fn is_vulnerable_to(&self, kind: StatusKind) -> bool {
        self.vulnerabilities.contains(&kind)
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }
}

// ============================================================================
// Waves
// ============================================================================

/// A difficulty band and its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub tier: u32,
    pub label: String,
    pub difficulty: u32,
    pub reward_tier: RewardTier,
    pub roster: Vec<EnemyTemplate>,
}

impl Wave {
    /// Pick one roster entry uniformly and spawn it. `None` for an empty roster.
    pub fn spawn_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Enemy> {
        dice::pick(rng, &self.roster).map(|t| t.spawn(self.difficulty, self.reward_tier))
    }

    pub fn summary(&self) -> WaveSummary {
        WaveSummary {
            tier: self.tier,
            label: self.label.clone(),
            difficulty: self.difficulty,
        }
    }
}

/// What a battle remembers about the wave it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveSummary {
    pub tier: u32,
    pub label: String,
    pub difficulty: u32,
}

/// The wave for a player level: above 20 tier 3, above 10 tier 2, else tier 1.
pub fn select_wave(level: u32) -> &'static Wave {
    let idx = match level {
        0..=10 => 0,
        11..=20 => 1,
        _ => 2,
    };
    &WAVES[idx]
}

lazy_static::lazy_static! {
    /// The three waves, in tier order.
    pub static ref WAVES: Vec<Wave> = vec![
        Wave {
            tier: 1,
            label: "Everyday Stress".to_string(),
            difficulty: 1,
            reward_tier: RewardTier::Basic,
            roster: vec![
                EnemyTemplate::new("Anxiety", 12, 2, 0)
                    .with_reserves(2.0, 20)
                    .vulnerable_to(StatusKind::Burn),
                EnemyTemplate::new("Anger", 20, 3, 1).with_reserves(3.0, 15),
                EnemyTemplate::new("Self-Doubt", 14, 2, 1)
                    .with_reserves(4.5, 25)
                    .vulnerable_to(StatusKind::Burn),
            ],
        },
        Wave {
            tier: 2,
            label: "Creeping Gloom".to_string(),
            difficulty: 2,
            reward_tier: RewardTier::Standard,
            roster: vec![
                EnemyTemplate::new("Procrastination", 28, 5, 1)
                    .with_reserves(2.0, 20)
                    .vulnerable_to(StatusKind::Burn),
                EnemyTemplate::new("Depression", 30, 4, 2).with_reserves(3.0, 30),
                EnemyTemplate::new("Loneliness", 32, 4, 2)
                    .with_reserves(3.0, 25)
                    .vulnerable_to(StatusKind::Burn),
            ],
        },
        Wave {
            tier: 3,
            label: "Shadow Depths".to_string(),
            difficulty: 3,
            reward_tier: RewardTier::Elite,
            roster: vec![
                EnemyTemplate::new("Burnout", 45, 6, 3).with_reserves(4.0, 35),
                EnemyTemplate::new("Despair", 50, 7, 2)
                    .with_reserves(4.0, 40)
                    .vulnerable_to(StatusKind::Burn),
                EnemyTemplate::new("Impostor Syndrome", 40, 8, 3).with_reserves(5.0, 30),
            ],
        },
    ];
}
