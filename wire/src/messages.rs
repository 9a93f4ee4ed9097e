//! The RPC message types.

use anyhow::anyhow;
use anyhow::Result;
use games::Value;
use serde::Deserialize;
use serde::Serialize;

/// One evaluated job, reported back by a worker: the job state as it was
/// handed out, the sub-tree value the worker computed for it, and how many
/// states the search analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResult {
    pub state: Vec<u8>,
    pub value: Value,
    pub nodes: u64,
}

/// A worker's poll. The results of the previous batch ride along; the
/// first poll of a worker's life carries none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWorkRequest {
    pub results: Vec<WireResult>,
}

/// A batch of job states plus the user's time budget, propagated verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWorkResponse {
    pub states: Vec<Vec<u8>>,
    pub budget_ms: u64,
}

/// A user's request: the position to analyze and the wall-clock budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWorkRequest {
    pub state: Vec<u8>,
    pub budget_ms: u64,
}

/// The coordinator's answer. `best_move` is `None` when the coordinator
/// was busy with another user's request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoWorkResponse {
    pub best_move: Option<Vec<u8>>,
}

/// The envelope around every RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Reply<T> {
    Ok(T),
    Err(String),
}

impl<T> Reply<T> {
    /// Unwrap the envelope, turning a remote error into a local one.
    pub fn into_result(self) -> Result<T> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Err(message) => Err(anyhow!("rpc failed: {message}")),
        }
    }
}
