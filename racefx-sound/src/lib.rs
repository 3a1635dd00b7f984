//! # RaceFX Sound Engine (racefx-sound)
//!
//! Asynchronous sound command engine.
//!
//! **Purpose:** Some audio backends block the calling thread inside their
//! `play()` call. The engine moves every backend call onto one dedicated
//! worker thread; game code on any thread only enqueues commands and gets
//! back an opaque [`PlayId`].
//!
//! **Architecture:**
//! - [`command`]: command sum type and play ids
//! - [`pool`]: recycled command boxes
//! - [`channel`]: bounded transport and the backpressure policy
//! - [`registry`]: worker-private table of playing sounds
//! - [`worker`]: the single consumer loop
//! - [`engine`]: public façade and lifecycle
//!
//! Backpressure is asymmetric: most commands are dropped when the queue is
//! full, but `Stop` and `Shutdown` block until delivered. A dropped `Stop`
//! would leave a looping sound playing with nothing able to silence it.

pub mod backend;
pub mod channel;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod pool;
pub mod registry;
pub mod stats;
pub mod worker;

pub use backend::{AudioBackend, SimulatedBackend};
pub use command::{Command, CommandKind, PlayId};
pub use config::SoundEngineConfig;
pub use engine::{EngineState, SoundEngine};
pub use error::{Error, Result};
pub use stats::StatsSnapshot;
