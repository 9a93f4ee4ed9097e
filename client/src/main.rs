//! Ask the cluster for the best move in a position.
//!
//! The position is given as a list of moves played out from the game's
//! starting position: column numbers for Connect Four, square numbers for
//! tic-tac-toe, and indices into the legal-move list for checkers.

use std::fmt::Display;
use std::net::TcpStream;
use std::time::Instant;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::ValueEnum;
use colored::Colorize;
use games::checkers::Checkers;
use games::connect_four::ConnectFour;
use games::connect_four::COLS;
use games::tic_tac_toe::TicTacToe;
use games::Game;
use wire::Codec;
use wire::DoWorkRequest;
use wire::DoWorkResponse;
use wire::Reply;

#[derive(Parser)]
#[command(name = "palantir-client", version, about = "Query the Palantir cluster for a move")]
struct Args {
    /// Coordinator address to submit the position to
    #[arg(long, default_value_t = format!("localhost:{}", wire::USER_PORT))]
    coordinator: String,

    /// The game this cluster searches; must match the coordinator's
    #[arg(long, value_enum, default_value_t = GameKind::ConnectFour)]
    game: GameKind,

    /// Wall-clock budget granted to the workers
    #[arg(long, default_value_t = 3000)]
    budget_ms: u64,

    /// Moves from the starting position to the position to analyze
    moves: Vec<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameKind {
    TicTacToe,
    ConnectFour,
    Checkers,
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.game {
        GameKind::TicTacToe => {
            query(&args, TicTacToe::new(), |state, square| state.play_square(square))
        }
        GameKind::ConnectFour => query(&args, ConnectFour::new(), |state, col| {
            if col < COLS { state.drop(col) } else { None }
        }),
        GameKind::Checkers => query(&args, Checkers::new(), |state, index| {
            state.moves().nth(index)
        }),
    }
}

fn query<G>(args: &Args, start: G, apply: impl Fn(&G, usize) -> Option<G>) -> Result<()>
where
    G: Game + Display,
{
    let mut state = start;
    for (ply, &mv) in args.moves.iter().enumerate() {
        state = apply(&state, mv)
            .ok_or_else(|| anyhow!("move {mv} at ply {} is not legal", ply + 1))?;
    }

    println!("{}", "Position:".bright_blue());
    println!("{state}");

    let stream = TcpStream::connect(&args.coordinator)
        .with_context(|| format!("connecting to the coordinator at {}", args.coordinator))?;
    let mut codec = Codec::new(stream)?;

    let started = Instant::now();
    codec.send(&DoWorkRequest { state: state.encode()?, budget_ms: args.budget_ms })?;

    let reply: Reply<DoWorkResponse> = codec.recv()?;
    let response = reply.into_result()?;
    eprintln!("{}: answered in {:?}", "Cluster".blue(), started.elapsed());

    let Some(best_move) = response.best_move else {
        bail!("the coordinator is busy with another request; try again shortly");
    };

    println!("{}", "Recommended move:".bright_blue());
    println!("{}", G::decode(&best_move)?);

    Ok(())
}
