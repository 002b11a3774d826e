//! Progression tracker: XP curve, level-ups, and level names.

use crate::player::Player;
use serde::{Deserialize, Serialize};

/// Level thresholds and their display names, ascending.
const LEVEL_NAMES: [(u32, &str); 10] = [
    (1, "Noob"),
    (5, "Novice"),
    (10, "Apprentice"),
    (15, "Adept"),
    (20, "Journeyman"),
    (30, "Expert"),
    (40, "Master"),
    (50, "Grandmaster"),
    (75, "Legend"),
    (100, "Transcendent"),
];

/// Tunables for the XP curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Highest reachable level.
    pub max_level: u32,
    /// `xp_to_next_level` is multiplied by this on every level-up.
    pub level_growth: f64,
    /// `base_xp_multiplier` is multiplied by this on every level-up.
    pub xp_gain_growth: f64,
    /// Action points granted per level gained.
    pub ap_bonus: u32,
}

impl ProgressionConfig {
    pub fn new() -> Self {
        Self {
            max_level: 100,
            level_growth: 1.2,
            xp_gain_growth: 1.05,
            ap_bonus: 2,
        }
    }

    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_level_growth(mut self, growth: f64) -> Self {
        self.level_growth = growth;
        self
    }

    pub fn with_xp_gain_growth(mut self, growth: f64) -> Self {
        self.xp_gain_growth = growth;
        self
    }

    pub fn with_ap_bonus(mut self, bonus: u32) -> Self {
        self.ap_bonus = bonus;
        self
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One level gained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUp {
    pub new_level: u32,
    pub xp_to_next_level: u64,
    pub base_xp_multiplier: f64,
}

/// Apply every level-up the player's XP pays for.
///
/// Overflow XP carries into the next level, so a single large gain can jump
/// several levels. Calling this when `current_xp < xp_to_next_level` is a
/// no-op.
pub fn check_level_up(player: &mut Player, config: &ProgressionConfig) -> Vec<LevelUp> {
    let mut gained = Vec::new();

    while player.current_xp >= player.xp_to_next_level && player.level < config.max_level {
        player.current_xp -= player.xp_to_next_level;
        player.level += 1;
        player.xp_to_next_level = (player.xp_to_next_level as f64 * config.level_growth) as u64;
        player.base_xp_multiplier = round2(player.base_xp_multiplier * config.xp_gain_growth);
        player.action_points += config.ap_bonus;

        tracing::info!(
            target: "lifequest::progression",
            level = player.level,
            next = player.xp_to_next_level,
            multiplier = player.base_xp_multiplier,
            "Level up"
        );

        gained.push(LevelUp {
            new_level: player.level,
            xp_to_next_level: player.xp_to_next_level,
            base_xp_multiplier: player.base_xp_multiplier,
        });
    }

    gained
}

/// Display name for a level.
pub fn level_name(level: u32) -> &'static str {
    LEVEL_NAMES
        .iter()
        .rev()
        .find(|(threshold, _)| level >= *threshold)
        .map(|(_, name)| *name)
        .unwrap_or(LEVEL_NAMES[0].1)
}

/// Timer scaling tier for a level: 0 below 15, 1 below 30, 2 below 50, else 3.
pub fn level_tier(level: u32) -> u32 {
    match level {
        0..=14 => 0,
        15..=29 => 1,
        30..=49 => 2,
        _ => 3,
    }
}

/// Multiplier applied to base action timers for a level.
pub fn timer_scale(level: u32) -> f64 {
    1.0 + level_tier(level) as f64 * 0.2
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
