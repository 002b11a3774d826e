//! GameSession - the primary public API for Life Quest gameplay.
//!
//! This module wraps the player, the injected RNG, the engine
//! configuration, and a save slot into a single interface. Every mutating
//! call takes `&mut self`, so an idle tick can never run while a battle is
//! borrowing the session.

use crate::actions::{ActionCatalog, ActionId};
use crate::battle::{self, BattleConfig, BattleError, BattleHooks, BattleOutcome, Enemy};
use crate::idle::{self, TickOutcome};
use crate::persist::{self, PersistError, SaveSlot};
use crate::player::{ItemError, Player};
use crate::progression::ProgressionConfig;
use crate::rules::{ActionOutcome, ActionRejection, ActionResolver};
use crate::shop::{self, ShopError};
use rand::RngCore;
use thiserror::Error;

/// Errors from GameSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rejected(#[from] ActionRejection),

    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error(transparent)]
    Item(#[from] ItemError),

    #[error(transparent)]
    Battle(#[from] BattleError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),
}

/// Configuration for a game session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub catalog: ActionCatalog,
    pub progression: ProgressionConfig,
    pub battle: BattleConfig,
    /// Whether the idle scheduler acts on its own when the timer runs out.
    pub idle_enabled: bool,
    /// Save after every mutation.
    pub autosave: bool,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            catalog: ActionCatalog::standard(),
            progression: ProgressionConfig::default(),
            battle: BattleConfig::default(),
            idle_enabled: false,
            autosave: true,
        }
    }

    /// Use a custom action catalog.
    pub fn with_catalog(mut self, catalog: ActionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the XP curve. Applies to battle rewards as well.
    pub fn with_progression(mut self, progression: ProgressionConfig) -> Self {
        self.progression = progression;
        self
    }

    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_idle(mut self, enabled: bool) -> Self {
        self.idle_enabled = enabled;
        self
    }

    pub fn with_autosave(mut self, enabled: bool) -> Self {
        self.autosave = enabled;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A Life Quest game session.
pub struct GameSession {
    player: Player,
    resolver: ActionResolver,
    battle_config: BattleConfig,
    idle_enabled: bool,
    autosave: bool,
    rng: Box<dyn RngCore + Send>,
    slot: Box<dyn SaveSlot>,
}

impl GameSession {
    /// Start a session from whatever the slot holds.
    pub async fn load(
        config: SessionConfig,
        slot: impl SaveSlot + 'static,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        let player = persist::load_player(&slot).await;
        Self::with_player(player, config, slot, rng)
    }

    /// Start a session for a given player.
    pub fn with_player(
        player: Player,
        config: SessionConfig,
        slot: impl SaveSlot + 'static,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        let resolver = ActionResolver::new()
            .with_catalog(config.catalog)
            .with_progression(config.progression.clone());
        let battle_config = config.battle.with_progression(config.progression);

        Self {
            player,
            resolver,
            battle_config,
            idle_enabled: config.idle_enabled,
            autosave: config.autosave,
            rng: Box::new(rng),
            slot: Box::new(slot),
        }
    }

    /// Perform an action chosen by the player.
    pub async fn perform_action(
        &mut self,
        action: ActionId,
    ) -> Result<ActionOutcome, SessionError> {
        let outcome = self
            .resolver
            .perform(&mut self.player, action, self.rng.as_mut())?;
        self.auto_save().await;
        Ok(outcome)
    }

    /// Advance one second. Saves whenever the tick acted or levelled up.
    pub async fn tick(&mut self) -> TickOutcome {
        let level_before = self.player.level;
        let outcome = idle::tick(
            &mut self.player,
            &self.resolver,
            self.idle_enabled,
            self.rng.as_mut(),
        );
        if matches!(outcome, TickOutcome::Acted(_)) || self.player.level != level_before {
            self.auto_save().await;
        }
        outcome
    }

    /// Fight one battle to the end.
    pub async fn battle(&mut self, hooks: BattleHooks<'_>) -> Result<BattleOutcome, SessionError> {
        let outcome = battle::start_battle(
            &mut self.player,
            self.rng.as_mut(),
            &self.battle_config,
            hooks,
        )
        .await?;
        self.auto_save().await;
        Ok(outcome)
    }

    /// The enemy the next battle would roll, without starting it.
    pub fn preview_enemy(&mut self) -> Result<Enemy, SessionError> {
        Ok(battle::preview_enemy(&self.player, self.rng.as_mut())?)
    }

    pub async fn purchase(&mut self, item_id: &str) -> Result<String, SessionError> {
        let message = shop::purchase_item(&mut self.player, item_id)?;
        self.auto_save().await;
        Ok(message)
    }

    pub async fn craft(&mut self, recipe_id: &str) -> Result<String, SessionError> {
        let message = shop::craft(&mut self.player, recipe_id)?;
        self.auto_save().await;
        Ok(message)
    }

    pub async fn use_item(&mut self, name: &str) -> Result<String, SessionError> {
        let message = self.player.use_item(name)?;
        self.auto_save().await;
        Ok(message)
    }

    /// Save now.
    pub async fn save(&self) -> Result<(), SessionError> {
        persist::save_player(self.slot.as_ref(), &self.player).await?;
        Ok(())
    }

    async fn auto_save(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save().await {
            tracing::warn!(target: "lifequest::persist", error = %e, "Autosave failed");
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn catalog(&self) -> &ActionCatalog {
        self.resolver.catalog()
    }

    pub fn idle_enabled(&self) -> bool {
        self.idle_enabled
    }

    pub fn set_idle(&mut self, enabled: bool) {
        self.idle_enabled = enabled;
        tracing::info!(target: "lifequest::idle", enabled, "Idle mode changed");
    }
}
