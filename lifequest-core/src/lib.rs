//! Life Quest: an idle RPG engine built from everyday tasks.
//!
//! This crate provides:
//! - Timed life actions with success rolls, pity rewards, buffs and upgrades
//! - An idle scheduler that acts on the player's behalf once per second
//! - Levelling with a compounding XP curve
//! - Async turn-based battles against wave-gated enemies
//! - Inventory, shop, consumables and crafting
//! - Versioned save slots
//!
//! # Quick Start
//!
//! ```ignore
//! use lifequest_core::{ActionId, FileSlot, GameSession, SessionConfig};
//! use rand::SeedableRng;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let slot = FileSlot::new("lifequest.json");
//!     let rng = rand::rngs::StdRng::from_entropy();
//!     let mut session = GameSession::load(SessionConfig::new(), slot, rng).await;
//!
//!     let outcome = session.perform_action(ActionId::CleanRoom).await?;
//!     println!("{}", outcome.messages.join(" "));
//!
//!     session.save().await?;
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod battle;
pub mod dice;
pub mod idle;
pub mod inventory;
pub mod persist;
pub mod player;
pub mod progression;
pub mod rules;
pub mod session;
pub mod shop;
pub mod testing;

// Primary public API
pub use actions::{ActionCatalog, ActionDefinition, ActionId, ApRule, CatalogError};
pub use battle::{
    preview_enemy, start_battle, BattleConfig, BattleError, BattleHooks, BattleOutcome,
    BattlePhase, BattleRewards, BattleState,
};
pub use idle::TickOutcome;
pub use inventory::{Inventory, ItemStack};
pub use persist::{FileSlot, MemorySlot, PersistError, SaveSlot, SavedPlayer};
pub use player::{ActionBuff, ItemError, Player, Upgrade};
pub use progression::{check_level_up, level_name, LevelUp, ProgressionConfig};
pub use rules::{perform_action, ActionOutcome, ActionRejection, ActionResolver, Effect};
pub use session::{GameSession, SessionConfig, SessionError};
pub use shop::{craft, purchase_item, ShopError};
