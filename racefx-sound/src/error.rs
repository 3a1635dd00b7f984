//! Error types for racefx-sound
//!
//! Most of these never reach a caller: queue-full and invalid-id conditions
//! are logged where they happen and turned into `PlayId::INVALID` or a no-op.
//! Only lifecycle and configuration operations return them.

use crate::command::{CommandKind, PlayId};
use thiserror::Error;

/// Main error type for the sound engine
#[derive(Error, Debug)]
pub enum Error {
    /// Non-blocking enqueue failed because the command queue is at capacity
    #[error("Sound command queue is full, discarding {0} command")]
    QueueFull(CommandKind),

    /// Command referenced a play id with no registry entry
    #[error("Invalid play id: {0}")]
    InvalidPlayId(PlayId),

    /// Worker's blocking wait ended without a shutdown command
    #[error("Sound worker interrupted: command channel disconnected")]
    WorkerInterrupted,

    /// Worker is gone, so the command can never be delivered
    #[error("Sound worker unavailable, cannot deliver {0} command")]
    WorkerUnavailable(CommandKind),

    /// Operation not allowed in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Worker thread could not be spawned
    #[error("Failed to spawn sound worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// Worker thread panicked outside of a backend call
    #[error("Sound worker thread panicked")]
    WorkerPanicked,

    /// Configuration errors from racefx-common
    #[error(transparent)]
    Common(#[from] racefx_common::Error),
}

/// Convenience Result type using racefx-sound Error
pub type Result<T> = std::result::Result<T, Error>;
