use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use colored::Colorize;
use games::checkers::Checkers;
use games::connect_four::ConnectFour;
use games::tic_tac_toe::TicTacToe;
use games::Game;
use palantir::service::Server;

const BANNER: &str = r"
           |              |   o
;-. ,-. |  ,-: ;-. |-- . ;-.
|-' | | |  | | | | |   | |
'   `-' `- `-' ' ' `-- ' '   ";

const NAME: &str = "Palantir";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The coordinator binds both ports with sensible defaults, so it runs
/// with no arguments at all.
#[derive(Parser)]
#[command(name = "palantir", version, about = "Distributed game-tree search coordinator")]
struct Args {
    /// Port workers poll for jobs
    #[arg(long, default_value_t = wire::WORKER_PORT)]
    worker_port: u16,

    /// Port users submit positions to
    #[arg(long, default_value_t = wire::USER_PORT)]
    user_port: u16,

    /// The game this cluster searches
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

    eprintln!("{}", BANNER.blue());
    eprintln!("{}: {NAME} {VERSION}", "Coordinator".blue());

    match args.game {
        GameKind::TicTacToe => run::<TicTacToe>(&args),
        GameKind::ConnectFour => run::<ConnectFour>(&args),
        GameKind::Checkers => run::<Checkers>(&args),
    }
}

fn run<G: Game>(args: &Args) -> Result<()> {
    let server = Server::<G>::bind(("0.0.0.0", args.worker_port), ("0.0.0.0", args.user_port))?;

    eprintln!("{}: listening on port {}", "Workers".blue(), args.worker_port);
    eprintln!("{}: listening on port {}", "Users".blue(), args.user_port);
    eprintln!();

    server.serve()
}
