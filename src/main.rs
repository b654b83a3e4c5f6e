mod app;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::{App, Exit};
use level_quest::config::AppConfig;
use level_quest::content::{load_catalog, load_table, table_paths};
use level_quest::rewards::Navigation;

const FRAME: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "level-quest")]
#[command(about = "Bite-sized quiz, story, reflex and journal games in the terminal")]
#[command(version)]
struct Cli {
    /// Directory of game content tables (overrides the config file)
    #[arg(short, long, global = true)]
    games: Option<PathBuf>,

    /// Path to the config file (defaults to ./level-quest.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every game in the catalog
    List,

    /// Validate every content table and report problems
    Check,

    /// Play a game in the terminal
    Play {
        /// Game id, as shown by `list`
        id: String,

        #[command(flatten)]
        nav: NavArgs,
    },
}

/// Reward and navigation values a launcher can pass along
#[derive(Args)]
struct NavArgs {
    #[arg(long)]
    coins_per_level: Option<u32>,
    #[arg(long)]
    total_coins: Option<u32>,
    #[arg(long)]
    total_xp: Option<u32>,
    /// Where to go after this game instead of the next one in the catalog
    #[arg(long)]
    next_path: Option<String>,
    #[arg(long)]
    next_id: Option<String>,
}

impl From<NavArgs> for Navigation {
    fn from(args: NavArgs) -> Self {
        Navigation {
            coins_per_level: args.coins_per_level,
            total_coins: args.total_coins,
            total_xp: args.total_xp,
            next_game_path: args.next_path,
            next_game_id: args.next_id,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let interactive = matches!(cli.command, Commands::Play { .. });
    let log_level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    init_logging(log_level, config.log_file.as_deref(), interactive)?;

    let games_dir = cli.games.clone().unwrap_or_else(|| config.games_dir.clone());

    match cli.command {
        Commands::List => list_games(&games_dir),
        Commands::Check => check_games(&games_dir),
        Commands::Play { id, nav } => play(&games_dir, &id, nav.into(), &config),
    }
}

fn init_logging(level: &str, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // The terminal UI owns the screen while playing
        None if interactive => builder.with_writer(io::sink).init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn list_games(games_dir: &Path) -> Result<()> {
    let catalog = load_catalog(games_dir)
        .with_context(|| format!("Failed to load games from {}", games_dir.display()))?;

    if catalog.is_empty() {
        println!("No games found in {}", games_dir.display());
        return Ok(());
    }

    println!("Available games:");
    for table in catalog.iter() {
        println!(
            "  {:<28} {:<8} {:>3} levels  {}",
            table.id(),
            table.meta.family.as_str(),
            table.len(),
            table.meta.title
        );
    }
    Ok(())
}

fn check_games(games_dir: &Path) -> Result<()> {
    let paths = table_paths(games_dir)?;
    let mut failures = 0;

    for path in &paths {
        match load_table(path) {
            Ok(table) => println!(
                "  ok    {:<28} {:>3} levels  {:<14} {:<6} max score {}",
                table.id(),
                table.len(),
                table.rules.scoring.as_str(),
                table.rules.reward.as_str(),
                table.max_score()
            ),
            Err(err) => {
                failures += 1;
                println!("  FAIL  {}: {}", path.display(), err);
            }
        }
    }

    // Catches cross-file problems such as duplicate ids
    if failures == 0 {
        load_catalog(games_dir)?;
    }

    println!("\n{} tables checked, {} failed", paths.len(), failures);
    if failures > 0 {
        anyhow::bail!("{} content table(s) failed validation", failures);
    }
    Ok(())
}

/// Restores the terminal even when the game loop bails out with an error.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

fn play(games_dir: &Path, id: &str, mut nav: Navigation, config: &AppConfig) -> Result<()> {
    let catalog = load_catalog(games_dir)
        .with_context(|| format!("Failed to load games from {}", games_dir.display()))?;
    catalog.table(id)?;

    let mut game_id = id.to_string();
    let mut summaries = Vec::new();

    {
        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        loop {
            let table = catalog.table(&game_id)?.clone();
            let mut app = App::new(table, &catalog, &nav, config.timing());
            info!(game = %game_id, "starting game");

            let exit = run_app(&mut terminal, &mut app)?;
            if app.engine.is_completed() {
                summaries.push(summary_line(&app));
            }

            match exit {
                Exit::Quit => break,
                Exit::Next(next) => {
                    if catalog.table(&next).is_err() {
                        warn!(game = %next, "next game is not in the catalog");
                        break;
                    }
                    game_id = next;
                    // Navigation state only applies to the game it was passed to
                    nav = Navigation::default();
                }
            }
        }
    }

    for line in summaries {
        println!("{line}");
    }
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<Exit> {
    let mut last = Instant::now();
    loop {
        terminal.draw(|f| ui::draw_ui(f, app))?;

        if event::poll(FRAME)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(exit) = app.handle_key(key) {
                        return Ok(exit);
                    }
                }
            }
        }

        let now = Instant::now();
        app.on_tick(now - last);
        last = now;
    }
}

fn summary_line(app: &App) -> String {
    let report = app.report();
    let badge = report
        .badge_earned
        .map(|name| format!(", badge: {name}"))
        .unwrap_or_default();
    format!(
        "{}: {}/{} points, {} coins, {} XP{}",
        app.engine.table().meta.title,
        report.score,
        report.max_score,
        report.coins_earned,
        report.total_xp,
        badge
    )
}
