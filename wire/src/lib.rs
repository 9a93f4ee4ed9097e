//! The wire surface between the Palantir nodes.
//!
//! Two RPC methods exist in the whole system: workers poll the coordinator
//! with `GetWork` (carrying the previous batch's results piggy-back), and
//! users submit a position with `DoWork`. Messages travel as one JSON value
//! per line over plain TCP; game states are opaque byte strings produced by
//! each game's own codec, so this crate never needs to know which game is
//! being played.

pub mod codec;
pub mod messages;

pub use codec::Codec;
pub use messages::DoWorkRequest;
pub use messages::DoWorkResponse;
pub use messages::GetWorkRequest;
pub use messages::GetWorkResponse;
pub use messages::Reply;
pub use messages::WireResult;

/// The port workers poll for jobs.
pub const WORKER_PORT: u16 = 14782;

/// The port users submit positions to.
pub const USER_PORT: u16 = 14783;
