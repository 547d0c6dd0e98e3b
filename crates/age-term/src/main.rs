use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use age_engine::{Game, SoundSystem};
use age_term::{AsciiView, GameRunner, RawTerminal, RunOutcome, RunSummary, TerminalBell, TerminalKeys};
use flappy_bird::FlappyBird;
use space_invaders::SpaceInvaders;

#[derive(Parser, Debug)]
#[command(name = "age")]
#[command(about = "Play ASCII games in the terminal. q quits, m mutes, Ctrl-C aborts.")]
struct Cli {
    /// Which game to play
    #[arg(short, long, value_enum, default_value_t = GameChoice::Flappy)]
    game: GameChoice,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Milliseconds per tick, overriding the game's own pace
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Start with sound muted
    #[arg(long)]
    mute: bool,

    /// Seed for the game's random numbers
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GameChoice {
    Flappy,
    Invaders,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let summary = match cli.game {
        GameChoice::Flappy => play(FlappyBird::new(), &cli)?,
        GameChoice::Invaders => play(SpaceInvaders::new(), &cli)?,
    };

    match summary.outcome {
        RunOutcome::GameOver { won: true } => println!("You win!"),
        RunOutcome::GameOver { won: false } => println!("Game over."),
        RunOutcome::Quit => println!("Bye."),
        RunOutcome::TickLimit => {}
    }
    println!(
        "Score: {}  Level: {}  Ticks: {}",
        summary.score, summary.level, summary.ticks
    );
    Ok(())
}

fn play<G: Game>(game: G, cli: &Cli) -> Result<RunSummary> {
    let mut config = game.config();
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(ms) = cli.tick_ms {
        config.tick_seconds = ms as f32 / 1000.0;
    }
    log::info!("starting {:?} at {:.3}s per tick", cli.game, config.tick_seconds);

    let mut runner = GameRunner::with_config(game, config, AsciiView::stdout().with_crlf());
    let mut bell = TerminalBell::stdout();
    bell.set_muted(cli.mute);
    runner.engine_mut().set_sound_system(Box::new(bell));
    runner.init().context("game setup failed")?;

    // Restored when dropped, before the summary is printed.
    let _terminal = RawTerminal::enable().context("could not switch the terminal to raw mode")?;
    let mut keys = TerminalKeys::new();
    runner.run(&mut keys, cli.ticks)
}
