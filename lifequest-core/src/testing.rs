//! Testing utilities for the Life Quest engine.
//!
//! This module provides tools for deterministic tests:
//! - `ScriptedRng` for scripting exact random draws
//! - Player fixtures at a given level or readiness
//! - Assertion helpers for verifying player state

use crate::player::Player;
use crate::progression::ProgressionConfig;
use rand::RngCore;
use std::collections::VecDeque;

/// An RNG that replays scripted uniform draws.
///
/// Each queued value is what the next `rng.gen::<f64>()` returns. Every
/// engine decision consumes exactly one draw (see [`crate::dice`]), so a
/// script of `[0.9, 0.1]` means "first roll fails a 0.7 check, second
/// passes". Once the script runs out every draw returns `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRng {
    draws: VecDeque<f64>,
}

impl ScriptedRng {
    /// Create an RNG with the given draws queued in order.
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of scripted draws not consumed yet.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    /// Encode a unit float so that rand's `Standard` f64 sampling returns it.
    fn encode(value: f64) -> u64 {
        let clamped = value.clamp(0.0, 1.0 - f64::EPSILON);
        ((clamped * (1u64 << 53) as f64) as u64) << 11
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let draw = self.draws.pop_front().unwrap_or(0.0);
        Self::encode(draw)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A default player raised to `level` with the standard XP curve applied.
pub fn player_at_level(level: u32) -> Player {
    let config = ProgressionConfig::default();
    let mut player = Player::new();
    while player.level < level.min(config.max_level) {
        player.level += 1;
        player.xp_to_next_level = (player.xp_to_next_level as f64 * config.level_growth) as u64;
    }
    player
}

/// A default player whose timer is ready and whose AP pool is full.
pub fn ready_player() -> Player {
    let mut player = Player::new();
    player.timer = 0;
    player.action_points = 10;
    player
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert the player's wallet holds exactly the given amounts.
#[track_caller]
pub fn assert_wallet(player: &Player, gold: u64, essence: u64) {
    assert_eq!(
        (player.player_money, player.shadow_essence),
        (gold, essence),
        "Expected wallet {gold} gold / {essence} essence, got {} / {}",
        player.player_money,
        player.shadow_essence
    );
}

/// Assert the player carries `quantity` of `item`.
#[track_caller]
pub fn assert_holds(player: &Player, item: &str, quantity: u32) {
    let actual = player.inventory.quantity(item);
    assert_eq!(
        actual, quantity,
        "Expected {quantity} x {item} in inventory, found {actual}"
    );
}
