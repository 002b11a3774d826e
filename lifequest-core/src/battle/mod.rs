//! Turn-based battles against the player's inner enemies.
//!
//! A battle is a small state machine driven by an async loop:
//!
//! ```text
//! Idle -> InProgress -> PlayerWon
//!                    -> PlayerLost
//! ```
//!
//! The player and the enemy strictly alternate half-turns, with a
//! `tokio::time::sleep` between them for pacing. Callers observe progress
//! through [`BattleHooks`] and get the final [`BattleState`] back in a
//! [`BattleOutcome`].
//!
//! The loop holds `&mut Player` for its whole lifetime, so nothing else can
//! mutate the player while a battle future is alive.

pub mod enemy;
pub mod status;

pub use enemy::{select_wave, Enemy, EnemyTemplate, RewardTier, Wave, WaveSummary, WAVES};
pub use status::{ActiveStatus, StatusEffect, StatusKind, StatusList, StatusTick};

use crate::dice;
use crate::player::Player;
use crate::progression::{check_level_up, LevelUp, ProgressionConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Configuration
// ============================================================================

/// Battle tunables.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleConfig {
    pub player_crit_chance: f64,
    pub player_crit_multiplier: f64,
    pub enemy_crit_chance: f64,
    pub enemy_crit_multiplier: f64,
    /// Burn chance against enemies without a burn vulnerability.
    pub burn_chance: f64,
    pub burn_vulnerable_chance: f64,
    /// Burn per-tick damage before the wave difficulty is added.
    pub burn_base_damage: i32,
    pub burn_duration: u32,
    pub weaken_chance: f64,
    pub weaken_duration: u32,
    /// Applied to the enemy's attack while the player is weakened.
    pub weaken_multiplier: f64,
    pub bleed_chance: f64,
    pub bleed_duration: u32,
    /// Pause after every half-turn.
    pub turn_delay: Duration,
    pub progression: ProgressionConfig,
}

impl BattleConfig {
    pub fn new() -> Self {
        Self {
            player_crit_chance: 0.2,
            player_crit_multiplier: 1.75,
            enemy_crit_chance: 0.1,
            enemy_crit_multiplier: 1.5,
            burn_chance: 0.15,
            burn_vulnerable_chance: 0.4,
            burn_base_damage: 2,
            burn_duration: 3,
            weaken_chance: 0.2,
            weaken_duration: 2,
            weaken_multiplier: 0.8,
            bleed_chance: 0.15,
            bleed_duration: 2,
            turn_delay: Duration::from_secs(1),
            progression: ProgressionConfig::default(),
        }
    }

    pub fn with_turn_delay(mut self, delay: Duration) -> Self {
        self.turn_delay = delay;
        self
    }

    pub fn with_player_crit(mut self, chance: f64, multiplier: f64) -> Self {
        self.player_crit_chance = chance;
        self.player_crit_multiplier = multiplier;
        self
    }

    pub fn with_enemy_crit(mut self, chance: f64, multiplier: f64) -> Self {
        self.enemy_crit_chance = chance;
        self.enemy_crit_multiplier = multiplier;
        self
    }

    pub fn with_burn_chances(mut self, base: f64, vulnerable: f64) -> Self {
        self.burn_chance = base;
        self.burn_vulnerable_chance = vulnerable;
        self
    }

    pub fn with_weaken_chance(mut self, chance: f64) -> Self {
        self.weaken_chance = chance;
        self
    }

    pub fn with_bleed_chance(mut self, chance: f64) -> Self {
        self.bleed_chance = chance;
        self
    }

    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    /// Critical hits never happen.
    pub fn without_crits(self) -> Self {
        self.with_player_crit(0.0, 1.0).with_enemy_crit(0.0, 1.0)
    }

    /// Statuses are never applied.
    pub fn without_statuses(self) -> Self {
        self.with_burn_chances(0.0, 0.0)
            .with_weaken_chance(0.0)
            .with_bleed_chance(0.0)
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// State
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle,
    InProgress,
    PlayerWon,
    PlayerLost,
}

/// What a victory paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRewards {
    pub gold: u64,
    pub essence: u64,
    pub xp: u64,
    pub loot: Option<String>,
}

/// Everything about a battle in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleState {
    pub enemy: Enemy,
    pub wave: WaveSummary,
    /// Statuses on the player. They only exist for the length of a battle.
    pub player_statuses: StatusList,
    pub log: Vec<String>,
    pub phase: BattlePhase,
    /// Player turns taken.
    pub turns: u32,
    /// Set only when the player wins.
    pub rewards: Option<BattleRewards>,
}

impl BattleState {
    fn new(enemy: Enemy, wave: WaveSummary) -> Self {
        Self {
            enemy,
            wave,
            player_statuses: StatusList::new(),
            log: Vec::new(),
            phase: BattlePhase::Idle,
            turns: 0,
            rewards: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase == BattlePhase::InProgress
    }

    fn push_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }
}

/// The result of a finished battle.
#[derive(Debug, Clone, PartialEq)]
pub struct BattleOutcome {
    pub state: BattleState,
    pub won: bool,
    pub level_ups: Vec<LevelUp>,
}

impl BattleOutcome {
    pub fn rewards(&self) -> Option<&BattleRewards> {
        self.state.rewards.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("You're in no shape to fight (health {health}).")]
    PlayerIncapacitated { health: i32 },

    #[error("Wave '{0}' has no enemies.")]
    EmptyWave(String),
}

// ============================================================================
// Hooks
// ============================================================================

pub type StateHook<'a> = Box<dyn FnMut(&BattleState, &Player) + Send + 'a>;
pub type EndHook<'a> = Box<dyn FnMut(&BattleState, &Player, bool) + Send + 'a>;

/// Optional callbacks fired as a battle progresses.
#[derive(Default)]
pub struct BattleHooks<'a> {
    on_start: Option<StateHook<'a>>,
    on_update: Option<StateHook<'a>>,
    on_end: Option<EndHook<'a>>,
}

impl<'a> BattleHooks<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fired once with the initial state.
    pub fn on_start(mut self, hook: impl FnMut(&BattleState, &Player) + Send + 'a) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    /// Fired after the start and after every half-turn.
    pub fn on_update(mut self, hook: impl FnMut(&BattleState, &Player) + Send + 'a) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    /// Fired once with the final state and whether the player won.
    pub fn on_end(mut self, hook: impl FnMut(&BattleState, &Player, bool) + Send + 'a) -> Self {
        self.on_end = Some(Box::new(hook));
        self
    }

    fn start(&mut self, state: &BattleState, player: &Player) {
        if let Some(hook) = self.on_start.as_mut() {
            hook(state, player);
        }
    }

    fn update(&mut self, state: &BattleState, player: &Player) {
        if let Some(hook) = self.on_update.as_mut() {
            hook(state, player);
        }
    }

    fn end(&mut self, state: &BattleState, player: &Player, won: bool) {
        if let Some(hook) = self.on_end.as_mut() {
            hook(state, player, won);
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// The enemy a battle would start against right now. Does not touch the player.
pub fn preview_enemy<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> Result<Enemy, BattleError> {
    let wave = select_wave(player.level);
    wave.spawn_random(rng)
        .ok_or_else(|| BattleError::EmptyWave(wave.label.clone()))
}

/// Fight one enemy from the player's level-appropriate wave.
pub async fn start_battle<R: Rng + ?Sized>(
    player: &mut Player,
    rng: &mut R,
    config: &BattleConfig,
    hooks: BattleHooks<'_>,
) -> Result<BattleOutcome, BattleError> {
    let wave = select_wave(player.level);
    start_battle_in_wave(wave, player, rng, config, hooks).await
}

/// Fight one enemy from a specific wave.
pub async fn start_battle_in_wave<R: Rng + ?Sized>(
    wave: &Wave,
    player: &mut Player,
    rng: &mut R,
    config: &BattleConfig,
    mut hooks: BattleHooks<'_>,
) -> Result<BattleOutcome, BattleError> {
    if player.is_defeated() {
        return Err(BattleError::PlayerIncapacitated {
            health: player.health,
        });
    }
    let enemy = wave
        .spawn_random(rng)
        .ok_or_else(|| BattleError::EmptyWave(wave.label.clone()))?;

    let mut state = BattleState::new(enemy, wave.summary());
    state.phase = BattlePhase::InProgress;
    state.push_log(format!(
        "{} ({}) confronts you! [{}]",
        state.enemy.name, state.enemy.health, wave.label
    ));

    tracing::info!(
        target: "lifequest::battle",
        enemy = %state.enemy.name,
        wave = wave.tier,
        level = player.level,
        "Battle started"
    );

    hooks.start(&state, player);
    hooks.update(&state, player);

    loop {
        player_turn(&mut state, player, rng, config);
        hooks.update(&state, player);
        if state.enemy.is_defeated() {
            state.phase = BattlePhase::PlayerWon;
            break;
        }
        pause(config).await;

        player.regenerate_stamina();

        enemy_turn(&mut state, player, rng, config);
        hooks.update(&state, player);
        if player.is_defeated() {
            state.phase = BattlePhase::PlayerLost;
            break;
        }
        pause(config).await;
    }

    let won = state.phase == BattlePhase::PlayerWon;
    let level_ups = if won {
        let rewards = roll_rewards(&state.enemy, rng);
        let level_ups = grant_rewards(player, &rewards, &config.progression);
        state.push_log(format!(
            "{} is defeated! +{} gold, +{} essence, +{} XP.",
            state.enemy.name, rewards.gold, rewards.essence, rewards.xp
        ));
        if let Some(item) = &rewards.loot {
            state.push_log(format!("You found a {item}."));
        }
        state.rewards = Some(rewards);
        level_ups
    } else {
        state.push_log(format!("{} overwhelms you.", state.enemy.name));
        Vec::new()
    };

    tracing::info!(
        target: "lifequest::battle",
        enemy = %state.enemy.name,
        won,
        turns = state.turns,
        health = player.health,
        "Battle ended"
    );

    hooks.end(&state, player, won);

    Ok(BattleOutcome {
        state,
        won,
        level_ups,
    })
}

async fn pause(config: &BattleConfig) {
    if !config.turn_delay.is_zero() {
        tokio::time::sleep(config.turn_delay).await;
    }
}

// ============================================================================
// Turns
// ============================================================================

/// Defense-reduced damage, floored at zero and rounded.
pub fn mitigated_damage(raw: f64, defense: i32) -> i32 {
    (raw - defense as f64).max(0.0).round() as i32
}

fn player_turn<R: Rng + ?Sized>(
    state: &mut BattleState,
    player: &Player,
    rng: &mut R,
    config: &BattleConfig,
) {
    state.turns += 1;

    let crit = dice::chance(rng, config.player_crit_chance);
    let multiplier = if crit { config.player_crit_multiplier } else { 1.0 };
    let damage = mitigated_damage(player.damage as f64 * multiplier, state.enemy.defense);
    state.enemy.health -= damage;

    let line = format!("You hit {} for {damage} damage.", state.enemy.name);
    state.push_log(if crit {
        format!("Critical! {line}")
    } else {
        line
    });

    let burn_chance = if state.enemy.is_vulnerable_to(StatusKind::Burn) {
        config.burn_vulnerable_chance
    } else {
        config.burn_chance
    };
    if dice::chance(rng, burn_chance) {
        let burn = StatusEffect::Burn {
            damage: config.burn_base_damage + state.wave.difficulty as i32,
        };
        state.enemy.statuses.apply(burn, config.burn_duration);
        state.push_log(format!("{} catches fire.", state.enemy.name));
    }

    let name = state.enemy.name.clone();
    let tick = state.enemy.statuses.tick(&name);
    state.enemy.health -= tick.damage;
    state.log.extend(tick.log);

    tracing::debug!(
        target: "lifequest::battle",
        turn = state.turns,
        damage,
        crit,
        enemy_health = state.enemy.health,
        "Player turn"
    );
}

fn enemy_turn<R: Rng + ?Sized>(
    state: &mut BattleState,
    player: &mut Player,
    rng: &mut R,
    config: &BattleConfig,
) {
    let weakened = if state.player_statuses.has(StatusKind::Weaken) {
        config.weaken_multiplier
    } else {
        1.0
    };
    let crit = dice::chance(rng, config.enemy_crit_chance);
    let multiplier = if crit { config.enemy_crit_multiplier } else { 1.0 };
    let damage = mitigated_damage(
        state.enemy.attack as f64 * weakened * multiplier,
        player.defense,
    );
    player.health -= damage;

    let line = format!("{} hits you for {damage} damage.", state.enemy.name);
    state.push_log(if crit {
        format!("Critical! {line}")
    } else {
        line
    });

    if dice::chance(rng, config.weaken_chance) {
        state
            .player_statuses
            .apply(StatusEffect::Weaken, config.weaken_duration);
        state.push_log("You feel weakened.");
    }
    if dice::chance(rng, config.bleed_chance) {
        let bleed = StatusEffect::Bleed {
            damage: state.wave.difficulty as i32 + 1,
        };
        state.player_statuses.apply(bleed, config.bleed_duration);
        state.push_log("You start bleeding.");
    }

    let tick = state.player_statuses.tick("you");
    player.health -= tick.damage;
    state.log.extend(tick.log);

    tracing::debug!(
        target: "lifequest::battle",
        turn = state.turns,
        damage,
        crit,
        player_health = player.health,
        "Enemy turn"
    );
}

// ============================================================================
// Rewards
// ============================================================================

/// Roll a victory's payout. Draws gold, then XP, then loot.
pub fn roll_rewards<R: Rng + ?Sized>(enemy: &Enemy, rng: &mut R) -> BattleRewards {
    let d = enemy.difficulty as f64;
    let gold = (12.0 * d + dice::uniform(rng, 0.0, 6.0 * d)).floor() as u64;
    let essence = ((d * 0.6).ceil() as u64).max(1);
    let xp = (9.0 * d + dice::uniform(rng, 0.0, 3.0 * d)).floor() as u64;
    let loot = dice::pick(rng, enemy.reward_tier.loot_table()).map(|item| item.to_string());

    BattleRewards {
        gold,
        essence,
        xp,
        loot,
    }
}

fn grant_rewards(
    player: &mut Player,
    rewards: &BattleRewards,
    progression: &ProgressionConfig,
) -> Vec<LevelUp> {
    player.player_money += rewards.gold;
    player.shadow_essence += rewards.essence;
    player.current_xp += rewards.xp;
    if let Some(item) = &rewards.loot {
        player.inventory.add(item, 1);
    }
    check_level_up(player, progression)
}
