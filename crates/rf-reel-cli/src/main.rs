//! rf-reels command line
//!
//! Usage:
//!   rf-reels spin                   - Play one spin and print its events
//!   rf-reels play --spins 200       - Auto-repeat session with a balance
//!   rf-reels enumerate              - Exact hit and scatter frequency
//!   rf-reels simulate -n 1000000    - Monte Carlo RTP
//!   rf-reels config --format yaml   - Print a preset configuration
//!
//! Every game command takes `--config FILE` or `--preset NAME`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rf_reel_sim::{SimulationConfig, enumerate, simulate};
use rf_reels::{
    AutoSpinStop, CancelToken, ConfigFormat, Entropy, Game, GameConfig, GameSession,
    PRESET_NAMES, ReelEngine, SecureEntropy, SeededEntropy, SpinRequest,
};

#[derive(Parser)]
#[command(name = "rf-reels", about = "Three-reel outcome engine", version)]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GameArgs {
    /// Game configuration file (.json, .yaml); takes precedence over --preset
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in game
    #[arg(short, long, default_value = "cascade")]
    preset: String,
}

impl GameArgs {
    fn load_config(&self) -> Result<GameConfig> {
        match &self.config {
            Some(path) => GameConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display())),
            None => GameConfig::preset(&self.preset).with_context(|| {
                format!(
                    "Unknown preset '{}' (available: {})",
                    self.preset,
                    PRESET_NAMES.join(", ")
                )
            }),
        }
    }

    fn load(&self) -> Result<Arc<Game>> {
        self.load_config()?
            .build()
            .context("Invalid game configuration")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play one spin and print its events
    Spin {
        #[command(flatten)]
        game: GameArgs,
        /// Bet amount (defaults to the game's default bet)
        #[arg(short, long)]
        bet: Option<f64>,
        /// Deterministic seed instead of OS entropy
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Auto-repeat session; free spins are played through
    Play {
        #[command(flatten)]
        game: GameArgs,
        /// Maximum spins, free spins included
        #[arg(short = 'n', long, default_value_t = 100)]
        spins: u32,
        #[arg(short, long)]
        bet: Option<f64>,
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Exact base-line statistics over every strip combination
    Enumerate {
        #[command(flatten)]
        game: GameArgs,
        #[arg(long)]
        json: bool,
    },
    /// Monte Carlo RTP over the full spin procedure
    Simulate {
        #[command(flatten)]
        game: GameArgs,
        #[arg(short = 'n', long, default_value_t = 1_000_000)]
        trials: u64,
        #[arg(short, long)]
        bet: Option<f64>,
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Worker threads (defaults to the CPU count)
        #[arg(long)]
        threads: Option<usize>,
        /// Play triggered free spins inside each trial
        #[arg(long)]
        with_bonus: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print a game configuration
    Config {
        #[command(flatten)]
        game: GameArgs,
        #[arg(short, long, default_value = "json")]
        format: ConfigFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Spin {
            game,
            bet,
            seed,
            json,
        } => run_spin(&game, bet, seed, json),
        Commands::Play {
            game,
            spins,
            bet,
            seed,
        } => run_play(&game, spins, bet, seed),
        Commands::Enumerate { game, json } => run_enumerate(&game, json),
        Commands::Simulate {
            game,
            trials,
            bet,
            seed,
            threads,
            with_bonus,
            json,
        } => {
            let mut config = SimulationConfig::default()
                .with_trials(trials)
                .with_seed(seed)
                .with_bonus(with_bonus);
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }
            run_simulate(&game, config, bet, json)
        }
        Commands::Config { game, format } => {
            let config = game.load_config()?;
            config.validate().context("Invalid game configuration")?;
            print!("{}", config.render(format)?);
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

fn entropy(seed: Option<u64>) -> Box<dyn Entropy> {
    match seed {
        Some(seed) => {
            log::debug!("Using seeded entropy ({seed})");
            Box::new(SeededEntropy::new(seed))
        }
        None => Box::new(SecureEntropy::new()),
    }
}

fn run_spin(args: &GameArgs, bet: Option<f64>, seed: Option<u64>, json: bool) -> Result<()> {
    let game = args.load()?;
    let engine = ReelEngine::new(Arc::clone(&game));
    let mut state = engine.new_state();
    if let Some(bet) = bet {
        state.set_bet(bet, game.bet_limits())?;
    }

    let mut entropy = entropy(seed);
    let request = SpinRequest::new(state.bet_amount());
    let outcome = engine
        .spin(&mut state, request, entropy.as_mut())
        .context("Spin rejected")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    for event in &outcome.events {
        println!("{event}");
    }
    println!();
    println!("Reels: {}", outcome.final_line);
    println!("Payout: {:.2}", outcome.total_payout);
    if outcome.is_win() {
        println!("Peak Multiplier: x{}", outcome.peak_multiplier());
    }
    println!("Balance: {:.2}", state.balance());
    Ok(())
}

fn run_play(args: &GameArgs, spins: u32, bet: Option<f64>, seed: Option<u64>) -> Result<()> {
    let game = args.load()?;
    let bet = bet.unwrap_or(game.bet_limits().default);
    game.bet_limits().check(bet)?;

    let session = GameSession::new(Arc::clone(&game), entropy(seed));
    let token = CancelToken::new();
    let start = session.state().balance();

    let mut played = 0;
    let mut wagered = 0.0;
    let mut won = 0.0;
    let stop = loop {
        let summary = session.auto_spin(bet, spins - played, &token)?;
        played += summary.spins;
        wagered += summary.total_wagered;
        won += summary.total_won;

        if summary.stop == AutoSpinStop::BonusEntered {
            let state = session.state();
            println!(
                "Free spins awarded after spin {played}: {} at x{}",
                state.bonus_spins_remaining(),
                state.multiplier()
            );
            token.reset();
            if played < spins {
                continue;
            }
        }
        break summary.stop;
    };

    let state = session.state();
    println!("Spins played: {played} ({stop:?})");
    println!("Total Wagered: {wagered:.2}");
    println!("Total Won: {won:.2}");
    println!("Balance: {start:.2} -> {:.2}", state.balance());
    if state.last_bonus_total() > 0.0 {
        println!("Last Bonus Total: {:.2}", state.last_bonus_total());
    }
    if state.in_bonus() {
        println!("Free spins left: {}", state.bonus_spins_remaining());
    }
    Ok(())
}

fn run_enumerate(args: &GameArgs, json: bool) -> Result<()> {
    let game = args.load()?;
    let report = enumerate(&game);
    if json {
        println!("{}", report.to_json());
    } else {
        print!("{report}");
    }
    Ok(())
}

fn run_simulate(
    args: &GameArgs,
    config: SimulationConfig,
    bet: Option<f64>,
    json: bool,
) -> Result<()> {
    let game = args.load()?;
    let bet = bet.unwrap_or(game.bet_limits().default);
    let result = simulate(game, config.with_bet(bet)).context("Simulation failed")?;
    if json {
        println!("{}", result.to_json());
    } else {
        print!("{result}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rf-reels").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_preset_defaults_to_cascade() {
        let Commands::Enumerate { game, json } = parse(&["enumerate"]).command else {
            panic!("expected enumerate");
        };
        assert!(!json);
        assert_eq!(game.load().unwrap().name(), "cascade");
    }

    #[test]
    fn test_unknown_preset_lists_available() {
        let Commands::Spin { game, .. } = parse(&["spin", "--preset", "nope"]).command else {
            panic!("expected spin");
        };
        let err = game.load().unwrap_err().to_string();
        assert!(err.contains("scatter_boost"));
    }

    #[test]
    fn test_simulate_arguments() {
        let cli = parse(&[
            "simulate", "-n", "5000", "--seed", "3", "--threads", "2", "--with-bonus", "-v",
        ]);
        assert!(cli.verbose);
        let Commands::Simulate {
            trials,
            seed,
            threads,
            with_bonus,
            ..
        } = cli.command
        else {
            panic!("expected simulate");
        };
        assert_eq!(trials, 5000);
        assert_eq!(seed, 3);
        assert_eq!(threads, Some(2));
        assert!(with_bonus);
    }

    #[test]
    fn test_config_format_parses() {
        let Commands::Config { format, .. } = parse(&["config", "--format", "yaml"]).command
        else {
            panic!("expected config");
        };
        assert_eq!(format, ConfigFormat::Yaml);
        assert!(Cli::try_parse_from(["rf-reels", "config", "--format", "toml"]).is_err());
    }
}
