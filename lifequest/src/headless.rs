//! Headless mode for Life Quest.
//!
//! A line-oriented driver: commands arrive on stdin, the idle heartbeat
//! ticks once per second, and everything the game says goes to stdout.

use lifequest_core::battle::{BattleConfig, BattleHooks};
use lifequest_core::progression::level_name;
use lifequest_core::{
    ActionId, FileSlot, GameSession, SessionConfig, SessionError, TickOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Save file used when neither `--save` nor `LIFEQUEST_SAVE` is given.
pub const DEFAULT_SAVE_PATH: &str = "lifequest-save.json";

/// Settings for a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessConfig {
    pub save_path: PathBuf,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub idle: bool,
    /// Battles play out without pauses.
    pub fast: bool,
}

impl HeadlessConfig {
    pub fn new(save_path: impl Into<PathBuf>) -> Self {
        Self {
            save_path: save_path.into(),
            seed: None,
            idle: false,
            fast: false,
        }
    }
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Do(ActionId),
    Battle,
    Preview,
    Buy(String),
    Use(String),
    Craft(String),
    Idle(bool),
    Status,
    Save,
    Help,
    Quit,
}

/// Parse one input line such as `#do cleanRoom` or `#use Stamina Tonic`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let Some(body) = line.trim().strip_prefix('#') else {
        return Err("Commands start with '#'. Type #help for help.".to_string());
    };
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    let argument = |usage: &str| {
        if rest.is_empty() {
            Err(format!("Usage: {usage}"))
        } else {
            Ok(rest.to_string())
        }
    };

    match name.to_lowercase().as_str() {
        "do" => {
            let action = argument("#do <action>")?;
            action
                .parse::<ActionId>()
                .map(Command::Do)
                .map_err(|e| e.to_string())
        }
        "battle" | "fight" => Ok(Command::Battle),
        "preview" => Ok(Command::Preview),
        "buy" => argument("#buy <item-id>").map(Command::Buy),
        "use" => argument("#use <item>").map(Command::Use),
        "craft" => argument("#craft <recipe-id>").map(Command::Craft),
        "idle" => match rest.to_lowercase().as_str() {
            "on" => Ok(Command::Idle(true)),
            "off" => Ok(Command::Idle(false)),
            _ => Err("Usage: #idle on|off".to_string()),
        },
        "status" => Ok(Command::Status),
        "save" => Ok(Command::Save),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err("Unknown command. Type #help for help.".to_string()),
    }
}

/// Tracks whether `[READY]` has been printed since the player last acted.
#[derive(Debug, Default)]
struct ReadyNotice {
    announced: bool,
}

impl ReadyNotice {
    /// Feed one tick outcome; true when `[READY]` should be printed now.
    fn observe(&mut self, outcome: &TickOutcome) -> bool {
        match outcome {
            TickOutcome::Ready { .. } => !std::mem::replace(&mut self.announced, true),
            _ => {
                self.announced = false;
                false
            }
        }
    }

    fn reset(&mut self) {
        self.announced = false;
    }
}

/// Run the game in headless mode.
///
/// This provides a simple line-oriented protocol:
/// - Lines starting with `#` are commands
/// - Output lines are tagged, e.g. `[ACTION]`, `[BATTLE]`, `[IDLE]`
pub async fn run_headless(config: HeadlessConfig) -> Result<(), SessionError> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut battle = BattleConfig::default();
    if config.fast {
        battle = battle.with_turn_delay(Duration::ZERO);
    }
    let session_config = SessionConfig::new()
        .with_battle(battle)
        .with_idle(config.idle);

    let slot = FileSlot::new(&config.save_path);
    let mut game = GameSession::load(session_config, slot, rng).await;

    println!("=== Life Quest Headless Mode ===");
    println!("Save file: {}", config.save_path.display());
    print_status(&game);
    println!();
    print_help();
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut heartbeat = tokio::time::interval(Duration::from_secs(1));
    let mut ready = ReadyNotice::default();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let outcome = game.tick().await;
                if ready.observe(&outcome) {
                    println!("[READY] You can act again.");
                }
                match outcome {
                    TickOutcome::Ready { level_ups } => {
                        for level_up in level_ups {
                            println!("[LEVEL] You reached level {}!", level_up.new_level);
                        }
                    }
                    TickOutcome::Acted(outcome) => {
                        println!("[IDLE] {}: {}", outcome.action, outcome.messages.join(" "));
                        for level_up in &outcome.level_ups {
                            println!("[LEVEL] You reached level {}!", level_up.new_level);
                        }
                    }
                    TickOutcome::Rejected { action, rejection } => {
                        println!("[IDLE] {action} refused: {rejection}");
                    }
                    TickOutcome::NothingAffordable | TickOutcome::Waiting { .. } => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("Error reading input: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("[ERROR] {message}");
                        continue;
                    }
                };
                if command == Command::Quit {
                    break;
                }
                if matches!(command, Command::Do(_) | Command::Battle) {
                    ready.reset();
                }
                handle_command(&mut game, command).await;
                // The battle held the session; don't let missed ticks burst.
                heartbeat.reset();
            }
        }
        io::stdout().flush().ok();
    }

    finish(&mut game).await;
    Ok(())
}

/// Final save on the way out, whether by `#quit`, end of input, or Ctrl-C.
async fn finish(game: &mut GameSession) {
    match game.save().await {
        Ok(()) => println!("[SAVED] Progress saved. Goodbye!"),
        Err(e) => println!("[ERROR] Save failed: {e}"),
    }
}

async fn handle_command(game: &mut GameSession, command: Command) {
    match command {
        Command::Do(action) => match game.perform_action(action).await {
            Ok(outcome) => {
                let tag = if outcome.success { "SUCCESS" } else { "FAILED" };
                println!("[{tag}] {}", outcome.messages.join(" "));
                for level_up in &outcome.level_ups {
                    println!("[LEVEL] You reached level {}!", level_up.new_level);
                }
            }
            Err(e) => println!("[ERROR] {e}"),
        },
        Command::Battle => {
            let printed = AtomicUsize::new(0);
            let print_new = |log: &[String]| {
                let from = printed.swap(log.len(), Ordering::Relaxed);
                for line in log.iter().skip(from) {
                    println!("[BATTLE] {line}");
                }
            };
            let hooks = BattleHooks::new()
                .on_update(|state, _| print_new(&state.log))
                .on_end(|state, player, won| {
                    print_new(&state.log);
                    let result = if won { "Victory" } else { "Defeat" };
                    println!(
                        "[BATTLE] {result} after {} turns. Health {}/{}.",
                        state.turns, player.health, player.max_health
                    );
                });
            if let Err(e) = game.battle(hooks).await {
                println!("[ERROR] {e}");
            }
        }
        Command::Preview => match game.preview_enemy() {
            Ok(enemy) => println!(
                "[PREVIEW] {} (health {}, attack {}, defense {}, difficulty {})",
                enemy.name, enemy.health, enemy.attack, enemy.defense, enemy.difficulty
            ),
            Err(e) => println!("[ERROR] {e}"),
        },
        Command::Buy(id) => report(game.purchase(&id).await),
        Command::Use(item) => report(game.use_item(&item).await),
        Command::Craft(id) => report(game.craft(&id).await),
        Command::Idle(enabled) => {
            game.set_idle(enabled);
            println!("[IDLE] Idle mode {}.", if enabled { "on" } else { "off" });
        }
        Command::Status => print_status(game),
        Command::Save => match game.save().await {
            Ok(()) => println!("[SAVED] Progress saved."),
            Err(e) => println!("[ERROR] Save failed: {e}"),
        },
        Command::Help => print_help(),
        Command::Quit => {}
    }
}

fn report(result: Result<String, SessionError>) {
    match result {
        Ok(message) => println!("[OK] {message}"),
        Err(e) => println!("[ERROR] {e}"),
    }
}

fn print_status(game: &GameSession) {
    let player = game.player();
    println!("[STATUS]");
    println!(
        "  Level {} ({}), XP {}/{} (x{:.2})",
        player.level,
        level_name(player.level),
        player.current_xp,
        player.xp_to_next_level,
        player.base_xp_multiplier
    );
    println!("  AP: {}  Timer: {}s", player.action_points, player.timer.max(0));
    println!(
        "  Gold: {}  Essence: {}",
        player.player_money, player.shadow_essence
    );
    println!(
        "  Health: {}/{}  Stamina: {:.0}",
        player.health, player.max_health, player.stamina
    );
    if !player.inventory.is_empty() {
        let items: Vec<String> = player
            .inventory
            .iter()
            .map(|e| format!("{} x{}", e.name, e.quantity))
            .collect();
        println!("  Inventory: {}", items.join(", "));
    }
    if !player.upgrades.is_empty() {
        let upgrades: Vec<&str> = player.upgrades.iter().map(|u| u.name()).collect();
        println!("  Upgrades: {}", upgrades.join(", "));
    }
    if let Some(buff) = &player.active_action_buff {
        println!("  Buff: {}", buff.source);
    }
    println!("  Idle: {}", if game.idle_enabled() { "on" } else { "off" });
}

fn print_help() {
    println!("Commands:");
    println!("  #do <action>      - Perform an action (cleanRoom, washDishes, cookMeal,");
    println!("                      studyExam, practiceCoding, takeWalk, meditate,");
    println!("                      exercise, playGame, sleep)");
    println!("  #battle           - Fight an enemy from your wave");
    println!("  #preview          - Peek at the enemy you'd face");
    println!("  #buy <item-id>    - Buy from the shop (bandage, snack, focus-charm, ...)");
    println!("  #use <item>       - Use a consumable");
    println!("  #craft <recipe>   - Craft (clarity-draught, warding-charm)");
    println!("  #idle on|off      - Toggle idle mode");
    println!("  #status           - Show your stats");
    println!("  #save             - Save now");
    println!("  #quit             - Save and exit");
}

/// Parse headless configuration from command line arguments.
pub fn parse_config_from_args(args: &[String]) -> HeadlessConfig {
    let default_path =
        std::env::var("LIFEQUEST_SAVE").unwrap_or_else(|_| DEFAULT_SAVE_PATH.to_string());
    let mut config = HeadlessConfig::new(default_path);

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--save" => {
                if let Some(path) = args.get(i + 1) {
                    config.save_path = PathBuf::from(path);
                    i += 1;
                }
            }
            "--seed" => {
                if let Some(seed) = args.get(i + 1) {
                    config.seed = seed.parse().ok();
                    i += 1;
                }
            }
            "--idle" => config.idle = true,
            "--fast" => config.fast = true,
            _ => {}
        }
        i += 1;
    }

    config
}
