//! QA tests for save/load and persistence functionality.
//!
//! These tests verify that player state is properly saved and restored.
//! Run with: `cargo test -p lifequest-core --test qa_persistence`

use lifequest_core::persist::{
    load_player, save_player, FileSlot, MemorySlot, SaveSlot, SAVE_VERSION,
};
use lifequest_core::player::{ActionBuff, Upgrade};
use lifequest_core::testing::{player_at_level, ScriptedRng};
use lifequest_core::{ActionId, GameSession, Player, SessionConfig};
use std::sync::Arc;
use tempfile::TempDir;

fn seasoned_player() -> Player {
    let mut player = player_at_level(12);
    player.current_xp = 77;
    player.base_xp_multiplier = 1.71;
    player.action_points = 4;
    player.timer = 13;
    player.player_money = 321;
    player.shadow_essence = 9;
    player.action_success_rate = 0.72;
    player.stamina = 63.5;
    player.health = 41;
    player.inventory.add("Focus Charm", 2);
    player.inventory.add("Shadow Shard", 1);
    player.upgrades.insert(Upgrade::TimeManagement);
    player
}

// =============================================================================
// TEST 1: Save and load round-trips every field except the buff
// =============================================================================

#[tokio::test]
async fn test_file_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let slot = FileSlot::new(temp_dir.path().join("saves").join("player.json"));

    let mut player = seasoned_player();
    player.active_action_buff = Some(ActionBuff::new("Snack", 3));

    save_player(&slot, &player).await.expect("Failed to save");
    assert!(slot.path().exists());

    let loaded = load_player(&slot).await;
    assert!(loaded.active_action_buff.is_none());

    player.active_action_buff = None;
    assert_eq!(loaded, player);
}

// =============================================================================
// TEST 2: Bad records fall back to a fresh player
// =============================================================================

#[tokio::test]
async fn test_malformed_save_falls_back() {
    for contents in [
        "",
        "not json at all",
        "{\"version\": 1, \"saved_at\": \"0\", \"player\": \"nobody\"}",
        "{\"version\": 2, \"saved_at\": \"0\", \"player\": {\"level\": 50}}",
    ] {
        let slot = MemorySlot::with_contents(contents);
        assert_eq!(load_player(&slot).await, Player::default(), "input: {contents}");
    }
}

#[tokio::test]
async fn test_missing_file_is_fresh_start() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let slot = FileSlot::new(temp_dir.path().join("nothing-here.json"));

    assert!(slot.read().await.unwrap().is_none());
    assert_eq!(load_player(&slot).await, Player::default());
}

#[tokio::test]
async fn test_corrupt_file_is_fresh_start() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("player.json");
    tokio::fs::write(&path, "{ truncated").await.unwrap();

    assert_eq!(load_player(&FileSlot::new(&path)).await, Player::default());
}

// =============================================================================
// TEST 3: Sessions save as they go and resume where they left off
// =============================================================================

#[tokio::test]
async fn test_session_resumes_from_slot() {
    let slot = Arc::new(MemorySlot::new());

    let mut session =
        GameSession::load(SessionConfig::new(), slot.clone(), ScriptedRng::new([0.0])).await;
    session.perform_action(ActionId::PracticeCoding).await.unwrap();
    let after_action = session.player().clone();
    drop(session);

    let record = slot.contents().await.expect("autosave wrote a record");
    assert!(record.contains(&format!("\"version\": {SAVE_VERSION}")));

    let resumed = GameSession::load(SessionConfig::new(), slot.clone(), ScriptedRng::new([])).await;
    assert_eq!(resumed.player(), &after_action);
    assert_eq!(resumed.player().player_money, 20);
    assert_eq!(resumed.player().timer, 35);
}

#[tokio::test]
async fn test_autosave_can_be_disabled() {
    let slot = Arc::new(MemorySlot::new());
    let config = SessionConfig::new().with_autosave(false);

    let mut session = GameSession::load(config, slot.clone(), ScriptedRng::new([0.0])).await;
    session.perform_action(ActionId::CleanRoom).await.unwrap();
    assert!(slot.contents().await.is_none());

    session.save().await.unwrap();
    assert!(slot.contents().await.is_some());
}
