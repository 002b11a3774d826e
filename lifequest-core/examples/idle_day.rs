//! Simulate a seeded idle day, then pick a fight with the spoils.

use lifequest_core::battle::BattleConfig;
use lifequest_core::{
    BattleHooks, GameSession, MemorySlot, SessionConfig, TickOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Life Quest: one idle day ===\n");

    let config = SessionConfig::new()
        .with_idle(true)
        .with_battle(BattleConfig::default().with_turn_delay(Duration::ZERO));
    let mut session =
        GameSession::load(config, MemorySlot::new(), StdRng::seed_from_u64(7)).await;

    let mut actions = 0;
    for second in 0..(60 * 60 * 8) {
        if let TickOutcome::Acted(outcome) = session.tick().await {
            actions += 1;
            for level_up in &outcome.level_ups {
                println!(
                    "[{:>5}s] level {} after {}",
                    second, level_up.new_level, outcome.action
                );
            }
        }
    }

    let player = session.player();
    println!(
        "\n{actions} actions: level {}, {} gold, {} AP left\n",
        player.level, player.player_money, player.action_points
    );

    for item in ["bandage", "snack"] {
        match session.purchase(item).await {
            Ok(message) => println!("{message}"),
            Err(e) => println!("{item}: {e}"),
        }
    }

    let hooks = BattleHooks::new().on_end(|state, player, won| {
        for line in &state.log {
            println!("  {line}");
        }
        println!("Won: {won}, health {}/{}", player.health, player.max_health);
    });
    session.battle(hooks).await?;

    Ok(())
}
