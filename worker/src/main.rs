use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use colored::Colorize;
use games::checkers::Checkers;
use games::connect_four::ConnectFour;
use games::tic_tac_toe::TicTacToe;

const NAME: &str = "Palantir worker";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "palantir-worker", version, about = "Worker node for the Palantir cluster")]
struct Args {
    /// Coordinator address to poll for work
    #[arg(default_value_t = format!("localhost:{}", wire::WORKER_PORT))]
    coordinator: String,

    /// The game this cluster searches; must match the coordinator's
    #[arg(long, value_enum, default_value_t = GameKind::ConnectFour)]
    game: GameKind,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameKind {
    TicTacToe,
    ConnectFour,
    Checkers,
}

fn main() -> Result<()> {
    let args = Args::parse();

    eprintln!("{}: {NAME} {VERSION}", "Worker".blue());

    match args.game {
        GameKind::TicTacToe => worker::run::<TicTacToe>(&args.coordinator),
        GameKind::ConnectFour => worker::run::<ConnectFour>(&args.coordinator),
        GameKind::Checkers => worker::run::<Checkers>(&args.coordinator),
    }
}
