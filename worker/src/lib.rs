//! The worker node's poll loop.
//!
//! A worker is a long-lived client of the coordinator. Each `GetWork` call
//! doubles as the delivery channel for the previous batch's results: the
//! coordinator never hears about batch N until the worker polls for batch
//! N+1. The very first poll of a worker's life carries nothing.
//!
//! Any RPC or decode failure is fatal to the worker. Work it had computed
//! but not yet submitted is simply lost; the coordinator carries no
//! re-dispatch logic for it.

use std::net::TcpStream;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use colored::Colorize;
use games::Game;
use itertools::Itertools;
use search::time_limited;
use wire::Codec;
use wire::GetWorkRequest;
use wire::GetWorkResponse;
use wire::Reply;
use wire::WireResult;

/// Connect to the coordinator at `address` and poll for work forever.
///
/// Only returns on error.
pub fn run<G: Game + Sync>(address: &str) -> Result<()> {
    let stream = TcpStream::connect(address)
        .with_context(|| format!("connecting to the coordinator at {address}"))?;
    let mut codec = Codec::new(stream)?;

    eprintln!("{}: connected to {address}", "Coordinator".blue());

    let mut results: Vec<WireResult> = Vec::new();

    loop {
        codec.send(&GetWorkRequest { results: std::mem::take(&mut results) })?;

        let reply: Reply<GetWorkResponse> = codec.recv()?;
        let batch = reply.into_result()?;

        let states = batch
            .states
            .iter()
            .map(|bytes| G::decode(bytes))
            .collect::<Result<Vec<_>>>()
            .context("decoding the work batch")?;
        let budget = Duration::from_millis(batch.budget_ms);

        // Search every job concurrently. The set of results is what
        // matters; the order the searches finish in is not.
        let outcomes = thread::scope(|scope| {
            let searches = states
                .iter()
                .map(|state| scope.spawn(move || time_limited(state, budget)))
                .collect::<Vec<_>>();

            searches
                .into_iter()
                .map(|search| search.join().expect("a search thread panicked"))
                .collect::<Vec<_>>()
        });

        eprintln!(
            "{}: {} jobs in {}ms, values [{}]",
            "Batch".blue(),
            states.len(),
            batch.budget_ms,
            outcomes.iter().map(|outcome| outcome.value).join(", "),
        );

        results = states
            .iter()
            .zip(&outcomes)
            .map(|(state, outcome)| {
                Ok(WireResult {
                    state: state.encode()?,
                    value: outcome.value,
                    nodes: outcome.nodes,
                })
            })
            .collect::<Result<Vec<_>>>()?;
    }
}
