/// Courtside Terminal Demo - Bouncing Basketball
///
/// Renders the court, hoop, ball and player in the terminal.
/// Controls:
///   - WASD / mouse drag: Move and turn the camera
///   - Arrows, R/F, J/L: Move, raise and turn the player
///   - Space: Reset the ball
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use courtside_core::SceneConfig;
use courtside_terminal::TerminalApp;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "Bouncing basketball scene rendered in the terminal")]
struct Args {
    /// Scene configuration (TOML); built-in layout when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log file; the terminal itself is used for rendering
    #[arg(long, default_value = "courtside.log")]
    log_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    let config = match &args.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };

    let mut app = TerminalApp::new(&config)?;
    app.run()?;

    println!("Thank you for using Courtside!");
    Ok(())
}
