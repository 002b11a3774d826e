//! Life Quest command-line driver.
//!
//! Runs the game headless over stdin/stdout:
//!
//! ```bash
//! cargo run -p lifequest -- --save quest.json --idle
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG` (e.g. `RUST_LOG=lifequest=debug`).

mod headless;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lifequest=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = headless::parse_config_from_args(&args);
    tracing::info!(
        target: "lifequest",
        save = %config.save_path.display(),
        seed = ?config.seed,
        "Starting"
    );
    headless::run_headless(config).await.map_err(|e| e.into())
}

fn print_help() {
    println!("Life Quest - an idle RPG built from everyday tasks");
    println!();
    println!("USAGE:");
    println!("  lifequest [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help       Show this help message");
    println!(
        "  --save <PATH>    Save file (default: $LIFEQUEST_SAVE or {})",
        headless::DEFAULT_SAVE_PATH
    );
    println!("  --seed <N>       Seed the RNG for a reproducible run");
    println!("  --idle           Start with idle mode on");
    println!("  --fast           Play battles without pauses");
    println!();
    println!("EXAMPLES:");
    println!("  lifequest                              # Play with the default save");
    println!("  lifequest --idle --seed 7              # Watch a seeded idle run");
    println!("  echo '#do cleanRoom' | lifequest --save /tmp/q.json");
}
