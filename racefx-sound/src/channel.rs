//! Bounded command channel
//!
//! Multi-producer, single-consumer FIFO between the engine façade and the
//! sound worker, with a fixed capacity. The sender side owns the
//! backpressure policy ([`CommandSender::submit`]).

use crate::command::{Command, CommandKind};
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::fmt;
use tracing::warn;

/// A command that could not be delivered, handed back to the caller
pub enum EnqueueError<S> {
    /// Channel at capacity (non-blocking enqueue only)
    Full(Box<Command<S>>),
    /// Receiving side is gone; the command can never be delivered
    Disconnected(Box<Command<S>>),
}

impl<S> EnqueueError<S> {
    /// Recover the undelivered command, e.g. to return it to the pool
    pub fn into_command(self) -> Box<Command<S>> {
        match self {
            EnqueueError::Full(command) | EnqueueError::Disconnected(command) => command,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            EnqueueError::Full(command) | EnqueueError::Disconnected(command) => command.kind(),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, EnqueueError::Full(_))
    }

    /// Crate error describing this failure
    pub fn to_error(&self) -> Error {
        match self {
            EnqueueError::Full(_) => Error::QueueFull(self.kind()),
            EnqueueError::Disconnected(_) => Error::WorkerUnavailable(self.kind()),
        }
    }
}

impl<S> fmt::Debug for EnqueueError<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnqueueError::Full(_) => write!(f, "Full({})", self.kind()),
            EnqueueError::Disconnected(_) => write!(f, "Disconnected({})", self.kind()),
        }
    }
}

/// Create a bounded command channel
///
/// `capacity` must be non-zero; a zero-capacity channel would turn every
/// non-blocking enqueue into a drop unless the worker is already waiting.
pub fn command_channel<S>(capacity: usize) -> (CommandSender<S>, CommandReceiver<S>) {
    let (tx, rx) = bounded(capacity);
    (
        CommandSender { tx, capacity },
        CommandReceiver { rx },
    )
}

/// Producer half; cheap to clone, usable from any thread
pub struct CommandSender<S> {
    tx: Sender<Box<Command<S>>>,
    capacity: usize,
}

impl<S> Clone for CommandSender<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            capacity: self.capacity,
        }
    }
}

impl<S> CommandSender<S> {
    /// Deliver without blocking; fails immediately when the channel is full
    pub fn try_enqueue(&self, command: Box<Command<S>>) -> std::result::Result<(), EnqueueError<S>> {
        self.tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(command) => EnqueueError::Full(command),
            TrySendError::Disconnected(command) => EnqueueError::Disconnected(command),
        })
    }

    /// Block until there is room, then deliver
    ///
    /// Only fails when the receiver has been dropped, so a dead worker never
    /// hangs the caller. A worker that is alive but stuck inside a backend
    /// call will block this forever.
    pub fn enqueue_blocking(&self, command: Box<Command<S>>) -> std::result::Result<(), EnqueueError<S>> {
        self.tx
            .send(command)
            .map_err(|e| EnqueueError::Disconnected(e.into_inner()))
    }

    /// Deliver according to the backpressure policy
    ///
    /// Every command is first offered without blocking. If the channel is
    /// full, commands that [`must_deliver`](Command::must_deliver) (`Stop`,
    /// `Shutdown`) wait for room; all others are handed back as `Full`.
    pub fn submit(&self, command: Box<Command<S>>) -> std::result::Result<(), EnqueueError<S>> {
        match self.try_enqueue(command) {
            Err(EnqueueError::Full(command)) if command.must_deliver() => {
                warn!(
                    "Sound command queue is full, blocking to send a {} command",
                    command.kind()
                );
                self.enqueue_blocking(command)
            }
            result => result,
        }
    }

    /// Commands currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer half, owned by the sound worker
pub struct CommandReceiver<S> {
    rx: Receiver<Box<Command<S>>>,
}

impl<S> CommandReceiver<S> {
    /// Block until a command is available
    ///
    /// Returns [`Error::WorkerInterrupted`] once every sender is gone and
    /// the queue is drained.
    pub fn dequeue_blocking(&self) -> Result<Box<Command<S>>> {
        self.rx.recv().map_err(|_| Error::WorkerInterrupted)
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
