//! The two RPC surfaces, and the TCP plumbing that carries them.
//!
//! Every accepted connection gets its own thread. Worker connections loop
//! on `GetWork`: forward any piggy-backed results, park in the registry,
//! block until a batch is dispatched, reply. User connections loop on
//! `DoWork`: claim the busy flag, plan, dispatch, and block until the
//! aggregation run publishes the best move.

use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::thread;

use anyhow::ensure;
use anyhow::Context;
use anyhow::Result;
use colored::Colorize;
use crossbeam::channel::bounded;
use games::Game;
use wire::Codec;
use wire::DoWorkRequest;
use wire::DoWorkResponse;
use wire::GetWorkRequest;
use wire::GetWorkResponse;
use wire::Reply;

use crate::aggregator;
use crate::aggregator::JobResult;
use crate::coordinator::Coordinator;
use crate::dispatcher::dispatch;
use crate::planner::plan;

/// Both listening sockets plus the coordinator state they share.
pub struct Server<G: Game> {
    workers: TcpListener,
    users: TcpListener,
    coordinator: Arc<Coordinator<G>>,
}

impl<G: Game> Server<G> {
    pub fn bind(workers: impl ToSocketAddrs, users: impl ToSocketAddrs) -> Result<Self> {
        Ok(Self {
            workers: TcpListener::bind(workers).context("binding the worker port")?,
            users: TcpListener::bind(users).context("binding the user port")?,
            coordinator: Arc::new(Coordinator::new()),
        })
    }

    pub fn worker_addr(&self) -> Result<SocketAddr> {
        Ok(self.workers.local_addr()?)
    }

    pub fn user_addr(&self) -> Result<SocketAddr> {
        Ok(self.users.local_addr()?)
    }

    /// Accept connections forever on both ports.
    pub fn serve(self) -> Result<()> {
        let coordinator = Arc::clone(&self.coordinator);
        let workers = self.workers;
        thread::spawn(move || accept_loop(workers, coordinator, worker_connection));

        accept_loop(self.users, self.coordinator, user_connection);
        Ok(())
    }
}

fn accept_loop<G: Game>(
    listener: TcpListener,
    coordinator: Arc<Coordinator<G>>,
    handler: fn(TcpStream, Arc<Coordinator<G>>),
) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let coordinator = Arc::clone(&coordinator);
                thread::spawn(move || handler(stream, coordinator));
            }
            Err(err) => eprintln!("[{}]: accepting a connection: {err}", "Error".red()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////
//
// Worker-facing surface: GetWork
//
////////////////////////////////////////////////////////////////////////////

fn worker_connection<G: Game>(stream: TcpStream, coordinator: Arc<Coordinator<G>>) {
    let peer = stream.peer_addr().map_or("unknown".into(), |addr| addr.to_string());
    eprintln!("[{}]: worker connected from {peer}", "Workers".blue());

    let serve = move || -> Result<()> {
        let mut codec = Codec::new(stream)?;

        loop {
            let request: GetWorkRequest = codec.recv()?;

            match get_work(&request, &coordinator) {
                Ok(response) => codec.send(&Reply::Ok(response))?,
                Err(err) => codec.send(&Reply::<GetWorkResponse>::Err(format!("{err:#}")))?,
            }
        }
    };

    if serve().is_err() {
        eprintln!("[{}]: worker {peer} disconnected", "Workers".blue());
    }
}

fn get_work<G: Game>(
    request: &GetWorkRequest,
    coordinator: &Coordinator<G>,
) -> Result<GetWorkResponse> {
    // Decode everything before forwarding anything: a malformed result
    // fails this call without half-poisoning the live aggregation run.
    let results = request
        .results
        .iter()
        .map(|result| {
            Ok(JobResult {
                state: G::decode(&result.state)?,
                value: result.value,
                nodes: result.nodes,
            })
        })
        .collect::<Result<Vec<_>>>()
        .context("decoding submitted results")?;

    if !results.is_empty() {
        coordinator.submit_results(results);
    }

    let slot = coordinator.park_worker()?;
    let batch = slot.recv().context("the coordinator is shutting down")?;

    let states = batch
        .states
        .iter()
        .map(G::encode)
        .collect::<Result<Vec<_>>>()
        .context("encoding the work batch")?;

    Ok(GetWorkResponse { states, budget_ms: batch.budget_ms })
}

////////////////////////////////////////////////////////////////////////////
//
// User-facing surface: DoWork
//
////////////////////////////////////////////////////////////////////////////

fn user_connection<G: Game>(stream: TcpStream, coordinator: Arc<Coordinator<G>>) {
    let serve = move || -> Result<()> {
        let mut codec = Codec::new(stream)?;

        loop {
            let request: DoWorkRequest = codec.recv()?;

            match do_work(&request, &coordinator) {
                Ok(response) => codec.send(&Reply::Ok(response))?,
                Err(err) => {
                    eprintln!("[{}]: request failed: {err:#}", "Error".red());
                    codec.send(&Reply::<DoWorkResponse>::Err(format!("{err:#}")))?;
                }
            }
        }
    };

    let _ = serve();
}

fn do_work<G: Game>(
    request: &DoWorkRequest,
    coordinator: &Arc<Coordinator<G>>,
) -> Result<DoWorkResponse> {
    // One user at a time: a request landing while another is in flight is
    // refused with an empty response rather than queued.
    if !coordinator.try_begin() {
        return Ok(DoWorkResponse { best_move: None });
    }

    match run_request(request, coordinator) {
        Ok(best_move) => Ok(DoWorkResponse { best_move: Some(best_move) }),
        Err(err) => {
            coordinator.finish();
            Err(err)
        }
    }
}

fn run_request<G: Game>(
    request: &DoWorkRequest,
    coordinator: &Arc<Coordinator<G>>,
) -> Result<Vec<u8>> {
    let root = G::decode(&request.state).context("decoding the root state")?;

    let mut slots = coordinator.waiting_workers();
    ensure!(!slots.is_empty(), "no workers are connected");

    let jobs = plan(&root, slots.len())?;
    eprintln!(
        "[{}]: planned {} jobs across {} workers, {}ms budget",
        "Plan".blue(),
        jobs.len(),
        slots.len(),
        request.budget_ms,
    );

    // Expansion can stop early on decided positions and come up with fewer
    // jobs than waiting workers; the excess keep waiting for the next
    // request.
    for slot in slots.split_off(jobs.len().min(slots.len())) {
        coordinator.repark(slot);
    }

    let (done_tx, done) = bounded(1);
    let releaser = Arc::clone(coordinator);
    let inbox = aggregator::spawn(root, jobs.len(), move |best: G| {
        let encoded = best.encode().expect("encoding the chosen move");
        let _ = done_tx.send(encoded);
        releaser.finish();
    });

    coordinator.install_aggregator(inbox);
    dispatch(&jobs, &slots, request.budget_ms);

    done.recv().context("the aggregation run died before answering")
}
