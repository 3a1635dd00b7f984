//! Command pool
//!
//! Recycles command boxes so a busy game loop does not allocate one box per
//! sound request. Shared by every producer thread and the worker.

use crate::command::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex-guarded free list of command boxes
///
/// Parked boxes are always [`Command::Blank`], so the pool never keeps a
/// sound reference alive. At most `max_retained` boxes are parked; extra
/// releases free the box.
pub struct CommandPool<S> {
    free: Mutex<Vec<Box<Command<S>>>>,
    max_retained: usize,
    /// Total boxes allocated since creation
    allocated: AtomicU64,
}

impl<S> CommandPool<S> {
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_retained)),
            max_retained,
            allocated: AtomicU64::new(0),
        }
    }

    /// Get a blank command box, recycled when one is available
    pub fn acquire(&self) -> Box<Command<S>> {
        if let Some(command) = self.lock_free_list().pop() {
            return command;
        }
        self.allocated.fetch_add(1, Ordering::Relaxed);
        Box::new(Command::Blank)
    }

    /// Get a box already holding `command`
    pub fn acquire_with(&self, command: Command<S>) -> Box<Command<S>> {
        let mut boxed = self.acquire();
        *boxed = command;
        boxed
    }

    /// Return a box for reuse
    pub fn release(&self, mut command: Box<Command<S>>) {
        *command = Command::Blank;
        let mut free = self.lock_free_list();
        if free.len() < self.max_retained {
            free.push(command);
        }
    }

    /// Number of parked boxes ready for reuse
    pub fn available(&self) -> usize {
        self.lock_free_list().len()
    }

    /// Number of boxes allocated since the pool was created
    pub fn allocated(&self) -> u64 {
        self.allocated.load(Ordering::Relaxed)
    }

    // A panic while holding the lock cannot leave the Vec inconsistent.
    fn lock_free_list(&self) -> MutexGuard<'_, Vec<Box<Command<S>>>> {
        self.free.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
