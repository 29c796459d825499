//! bb - play and manage simulated baseball games from the terminal.
//!
//! - `bb play` - start a game (autoplay, optional manager mode)
//! - `bb resume` - continue a saved game
//! - `bb saves` - list or delete saves
//! - `bb export` / `bb import` - signed JSON save files
//! - `bb signature` - print the opening event signature for a seed

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use bb_core::engine::{Decision, DecisionChoice, GameSession};
use bb_core::error::GameError;
use bb_core::live::LiveGame;
use bb_core::models::{OnePitchModifier, Strategy, TeamSide};
use bb_core::roster::{InMemoryRoster, RosterProvider};
use bb_core::save::{export_save, import_save, FileStore, MemoryStore, SaveError, SaveId, SaveStore};
use bb_core::scheduler::{
    run_autoplay, Advance, AutoplayScheduler, AutoplayStop, AutoplayTarget, CancelToken,
    SilentSpeech, SystemClock, TargetStatus,
};
use bb_core::stats::{event_signature, BoxScore};
use bb_core::{MatchSpeed, Seed, SimConfig};

const DEFAULT_STORE: &str = "bb_saves";

#[derive(Parser)]
#[command(name = "bb")]
#[command(about = "Deterministic pitch-by-pitch baseball", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new game
    Play {
        /// Base-36 seed (random when omitted)
        #[arg(long)]
        seed: Option<String>,

        /// Away club id
        #[arg(long, default_value = "rav")]
        away: String,

        /// Home club id
        #[arg(long, default_value = "owl")]
        home: String,

        /// Manage one club's decisions
        #[arg(long, value_enum)]
        manage: Option<Side>,

        #[command(flatten)]
        options: PlayOptions,
    },

    /// Continue a saved game
    Resume {
        id: String,

        #[command(flatten)]
        options: PlayOptions,
    },

    /// List saves
    Saves {
        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Delete this save instead of listing
        #[arg(long)]
        delete: Option<String>,
    },

    /// Write a save as signed JSON
    Export {
        id: String,

        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Import a signed JSON save
    Import {
        file: PathBuf,

        #[arg(long, default_value = DEFAULT_STORE)]
        store: PathBuf,

        /// Roster YAML to check team ids against (built-in clubs otherwise)
        #[arg(long)]
        roster: Option<PathBuf>,
    },

    /// Print the signature of the first N events for a seed
    Signature {
        #[arg(long)]
        seed: String,

        #[arg(short, default_value_t = 5)]
        n: usize,
    },
}

#[derive(Args)]
struct PlayOptions {
    #[arg(long, default_value = DEFAULT_STORE)]
    store: PathBuf,

    /// YAML simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roster YAML (built-in clubs otherwise)
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Override the configured pacing
    #[arg(long, value_enum)]
    speed: Option<Speed>,

    /// How manager decisions are answered
    #[arg(long, value_enum, default_value_t = DecisionMode::Prompt)]
    decisions: DecisionMode,

    /// Only print the final box score
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    Away,
    Home,
}

#[derive(Clone, Copy, ValueEnum)]
enum Speed {
    Instant,
    Fast,
    Normal,
    Slow,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DecisionMode {
    Accept,
    Skip,
    Prompt,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).with_writer(io::stderr).init();

    match cli.command {
        Commands::Play { seed, away, home, manage, options } => {
            play(seed, &away, &home, manage, &options)
        }
        Commands::Resume { id, options } => resume(&id, &options),
        Commands::Saves { store, delete } => saves(&store, delete),
        Commands::Export { id, store, out } => export(&store, &id, out.as_deref()),
        Commands::Import { file, store, roster } => import(&file, &store, roster.as_deref()),
        Commands::Signature { seed, n } => signature(&seed, n),
    }
}

// ============================================
// Commands
// ============================================

fn play(
    seed: Option<String>,
    away: &str,
    home: &str,
    manage: Option<Side>,
    options: &PlayOptions,
) -> Result<()> {
    let roster = load_roster(options.roster.as_deref())?;
    let config = load_config(options)?;
    let seed = match seed {
        Some(text) => Seed::parse(&text).with_context(|| format!("invalid seed '{}'", text))?,
        None => Seed::random(),
    };

    let mut setup = roster
        .setup(away, home)
        .ok_or_else(|| anyhow!("unknown club: choose from {}", club_list(&roster)))?;
    if let Some(side) = manage {
        setup = setup.with_manager(side.into());
    }

    let store = FileStore::open(&options.store)
        .with_context(|| format!("cannot open save store {}", options.store.display()))?;
    let session = GameSession::new(seed, setup).with_bench(roster.has_bench(away), roster.has_bench(home));
    let game = LiveGame::start(store, session, config.autosave);

    println!("Seed: {}", seed);
    drive(game, &roster, &config, options)
}

fn resume(id: &str, options: &PlayOptions) -> Result<()> {
    let roster = load_roster(options.roster.as_deref())?;
    let config = load_config(options)?;
    let store = FileStore::open(&options.store)
        .with_context(|| format!("cannot open save store {}", options.store.display()))?;

    let game = LiveGame::resume(store, &SaveId::new(id)).map_err(user_facing)?;
    let [away, home] = &game.state().teams;
    let bench = (roster.has_bench(&away.id), roster.has_bench(&home.id));
    let game = game.with_bench(bench.0, bench.1);

    println!("Seed: {}", game.session().seed());
    if let Some(source) = game.resumed_from() {
        debug!(?source, "resume source");
    }
    drive(game, &roster, &config, options)
}

fn saves(store: &Path, delete: Option<String>) -> Result<()> {
    let mut store = FileStore::open(store)?;
    if let Some(id) = delete {
        store.delete_save(&SaveId::new(&id)).map_err(user_facing)?;
        println!("Deleted {}", id);
        return Ok(());
    }

    let saves = store.list_saves()?;
    if saves.is_empty() {
        println!("No saves.");
        return Ok(());
    }
    for save in saves {
        let p = save.progress;
        let status = if p.game_over {
            "final".to_string()
        } else {
            format!("{} {}", p.half.label(), p.inning)
        };
        println!(
            "{}  seed {:<13}  {} {} - {} {}  {:<10}  {} events{}",
            save.id,
            save.seed.to_string(),
            save.away,
            p.score[0],
            p.score[1],
            save.home,
            status,
            save.events,
            if save.has_snapshot { "" } else { " (no resume point)" },
        );
    }
    Ok(())
}

fn export(store: &Path, id: &str, out: Option<&Path>) -> Result<()> {
    let store = FileStore::open(store)?;
    let json = export_save(&store, &SaveId::new(id)).map_err(user_facing)?;
    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn import(file: &Path, store: &Path, roster: Option<&Path>) -> Result<()> {
    let roster = load_roster(roster)?;
    let json = fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))?;
    let mut store = FileStore::open(store)?;
    let id = import_save(&mut store, &json, Some(&roster as &dyn RosterProvider)).map_err(user_facing)?;
    println!("Imported as {}", id);
    Ok(())
}

fn signature(seed: &str, n: usize) -> Result<()> {
    let seed = Seed::parse(seed).with_context(|| format!("invalid seed '{}'", seed))?;
    let setup = InMemoryRoster::demo()
        .setup("rav", "owl")
        .ok_or_else(|| anyhow!("built-in clubs missing"))?;
    let mut game = LiveGame::start(MemoryStore::new(), GameSession::new(seed, setup), true);
    for _ in 0..n {
        game.step()?;
    }
    let id = game.save_id().cloned().ok_or_else(|| anyhow!("save was not created"))?;
    let doc = game.store().load(&id)?;
    println!("{}", event_signature(&doc.events, n));
    Ok(())
}

// ============================================
// Autoplay
// ============================================

/// Prints new play-by-play lines as the scheduler advances the game.
struct Narrated<'a, S: SaveStore> {
    game: &'a mut LiveGame<S>,
    printed: usize,
    quiet: bool,
}

impl<S: SaveStore> Narrated<'_, S> {
    fn catch_up(&mut self) {
        let lines = &self.game.state().play_by_play;
        if !self.quiet {
            for line in &lines[self.printed.min(lines.len())..] {
                println!("{}", line);
            }
        }
        self.printed = lines.len();
    }
}

impl<S: SaveStore> AutoplayTarget for Narrated<'_, S> {
    fn status(&self) -> TargetStatus {
        self.game.status()
    }

    fn advance(&mut self) -> Result<Advance, GameError> {
        let advance = self.game.advance()?;
        self.catch_up();
        Ok(advance)
    }
}

fn drive<S: SaveStore>(
    mut game: LiveGame<S>,
    roster: &InMemoryRoster,
    config: &SimConfig,
    options: &PlayOptions,
) -> Result<()> {
    let mut scheduler = AutoplayScheduler::new(config.pacing.clone(), config.muted);
    let mut clock = SystemClock::new();
    let cancel = CancelToken::new();
    let mut printed = 0;

    loop {
        let mut target = Narrated { game: &mut game, printed, quiet: options.quiet };
        target.catch_up();
        let report =
            run_autoplay(&mut target, &mut clock, &SilentSpeech, &mut scheduler, &cancel, usize::MAX)?;
        printed = target.printed;

        match report.stop {
            AutoplayStop::GameOver | AutoplayStop::Cancelled | AutoplayStop::StepLimit => break,
            AutoplayStop::DecisionPending => {
                let decision = game
                    .session()
                    .pending_decision()
                    .cloned()
                    .ok_or_else(|| anyhow!("autoplay stopped without a decision"))?;
                let choice = choose(&decision, options.decisions)?;
                game.resolve_decision(choice)?;
            }
        }
        if let Some(notice) = game.save_notice() {
            eprintln!("{}", notice);
        }
    }

    let boxscore = BoxScore::from_state(game.state(), Some(roster as &dyn RosterProvider));
    println!();
    println!("{}", boxscore.render());
    if let Some(id) = game.save_id() {
        println!("Saved as {}", id);
    }
    if let Some(notice) = game.save_notice() {
        eprintln!("{}", notice);
    }
    Ok(())
}

fn choose(decision: &Decision, mode: DecisionMode) -> Result<DecisionChoice> {
    match mode {
        DecisionMode::Accept => Ok(DecisionChoice::Accept),
        DecisionMode::Skip => Ok(DecisionChoice::Skip),
        DecisionMode::Prompt => prompt(decision),
    }
}

fn prompt(decision: &Decision) -> Result<DecisionChoice> {
    let stdin = io::stdin();
    loop {
        print!("{} ", decision.describe());
        match decision {
            Decision::CountBased { options } => {
                let names: Vec<&str> = options.iter().map(|m| m.as_str()).collect();
                print!("[{} / skip] ", names.join(" / "));
            }
            Decision::PinchHitter => print!("[contact / power / patient / aggressive / skip] "),
            _ => print!("[y / n] "),
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(DecisionChoice::Skip);
        }
        if let Some(choice) = parse_choice(line.trim(), decision) {
            return Ok(choice);
        }
        println!("Not an option here.");
    }
}

fn parse_choice(answer: &str, decision: &Decision) -> Option<DecisionChoice> {
    let answer = answer.to_ascii_lowercase();
    match answer.as_str() {
        "" | "n" | "no" | "skip" => return Some(DecisionChoice::Skip),
        "y" | "yes" => return Some(DecisionChoice::Accept),
        _ => {}
    }
    match decision {
        Decision::CountBased { options } => options
            .iter()
            .copied()
            .find(|m| modifier_name(*m) == answer)
            .map(DecisionChoice::OnePitch),
        Decision::PinchHitter => {
            let strategy = match answer.as_str() {
                "contact" => Strategy::Contact,
                "power" => Strategy::Power,
                "patient" => Strategy::Patient,
                "aggressive" => Strategy::Aggressive,
                "balanced" => Strategy::Balanced,
                _ => return None,
            };
            Some(DecisionChoice::PinchHitter(strategy))
        }
        _ => None,
    }
}

fn modifier_name(modifier: OnePitchModifier) -> &'static str {
    match modifier {
        OnePitchModifier::SwingAway => "swing",
        OnePitchModifier::Take => "take",
        OnePitchModifier::Protect => "protect",
    }
}

// ============================================
// Helpers
// ============================================

impl From<Side> for TeamSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Away => TeamSide::Away,
            Side::Home => TeamSide::Home,
        }
    }
}

impl From<Speed> for MatchSpeed {
    fn from(speed: Speed) -> Self {
        match speed {
            Speed::Instant => MatchSpeed::Instant,
            Speed::Fast => MatchSpeed::Fast,
            Speed::Normal => MatchSpeed::Normal,
            Speed::Slow => MatchSpeed::Slow,
        }
    }
}

fn load_roster(path: Option<&Path>) -> Result<InMemoryRoster> {
    match path {
        Some(path) => InMemoryRoster::load(path)
            .with_context(|| format!("cannot load roster {}", path.display())),
        None => Ok(InMemoryRoster::demo()),
    }
}

fn load_config(options: &PlayOptions) -> Result<SimConfig> {
    let mut config = match &options.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(speed) = options.speed {
        config.pacing.speed = speed.into();
    }
    Ok(config)
}

fn club_list(roster: &InMemoryRoster) -> String {
    roster.team_ids().collect::<Vec<_>>().join(", ")
}

/// Keep internal detail in the log; show the player the safe message.
fn user_facing(error: SaveError) -> anyhow::Error {
    debug!(%error, "save operation failed");
    if matches!(error, SaveError::Io(_)) {
        return anyhow::Error::new(error);
    }
    anyhow!(error.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_choice() {
        let count = Decision::CountBased {
            options: vec![OnePitchModifier::SwingAway, OnePitchModifier::Take],
        };
        assert_eq!(parse_choice("swing", &count), Some(DecisionChoice::OnePitch(OnePitchModifier::SwingAway)));
        assert_eq!(parse_choice("protect", &count), None);
        assert_eq!(parse_choice("", &count), Some(DecisionChoice::Skip));
        assert_eq!(
            parse_choice("Power", &Decision::PinchHitter),
            Some(DecisionChoice::PinchHitter(Strategy::Power))
        );
        assert_eq!(parse_choice("y", &Decision::Bunt), Some(DecisionChoice::Accept));
        assert_eq!(parse_choice("maybe", &Decision::Bunt), None);
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "bb", "play", "--seed", "deadbeef", "--manage", "home", "--decisions", "skip", "--speed",
            "instant",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Play { manage: Some(Side::Home), .. }));

        let cli = Cli::try_parse_from(["bb", "signature", "--seed", "seed1", "-n", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Signature { n: 3, .. }));
    }

    #[test]
    fn test_export_import_through_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let store_dir = dir.path().join("saves");
        let setup = InMemoryRoster::demo().setup("rav", "owl").unwrap();
        let mut game = LiveGame::start(
            FileStore::open(&store_dir).unwrap(),
            GameSession::new(Seed::from_value(3), setup),
            true,
        );
        for _ in 0..12 {
            game.step().unwrap();
        }
        let id = game.save_id().unwrap().to_string();

        let out = dir.path().join("game.json");
        export(&store_dir, &id, Some(&out)).unwrap();
        import(&out, &store_dir, None).unwrap();
        assert_eq!(FileStore::open(&store_dir).unwrap().list_saves().unwrap().len(), 2);

        fs::write(&out, "{}").unwrap();
        let err = import(&out, &store_dir, None).unwrap_err();
        assert_eq!(err.to_string(), "This file is not a valid saved game.");
    }
}
