//! Sound engine façade and lifecycle
//!
//! [`SoundEngine`] is what game code holds. Every method is callable from any
//! thread; all of them only enqueue a command, the actual backend call
//! happens later on the worker thread.
//!
//! # Lifecycle
//!
//! ```text
//! Created --start()--> Running --shutdown()--> Stopping --(worker joined)--> Stopped
//! ```
//!
//! Commands issued while `Created` wait in the queue until `start()`.
//! Commands issued after the worker has exited are dropped.
//!
//! # Blocking
//!
//! Only [`SoundEngine::stop`] and [`SoundEngine::shutdown`] can block, and
//! only while the queue is full. If the backend hangs inside a call, these
//! block until it returns.
//!
//! Before `start()` nothing drains the queue. A `stop()` issued on a full
//! queue in that state blocks until another thread calls `start()`, and
//! forever if the blocked thread is the one meant to start the engine.

use crate::backend::AudioBackend;
use crate::channel::{command_channel, CommandSender};
use crate::command::{Command, PlayId};
use crate::config::SoundEngineConfig;
use crate::error::{Error, Result};
use crate::pool::CommandPool;
use crate::stats::{EngineStats, StatsSnapshot};
use crate::worker::{SoundWorker, WorkerExit};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Externally visible lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Created,
    Running,
    Stopping,
    Stopped,
}

enum Lifecycle<B: AudioBackend> {
    /// Worker built but not yet running
    Created(SoundWorker<B>),
    Running(JoinHandle<WorkerExit>),
    Stopping,
    Stopped,
}

impl<B: AudioBackend> Lifecycle<B> {
    fn state(&self) -> EngineState {
        match self {
            Lifecycle::Created(_) => EngineState::Created,
            Lifecycle::Running(_) => EngineState::Running,
            Lifecycle::Stopping => EngineState::Stopping,
            Lifecycle::Stopped => EngineState::Stopped,
        }
    }
}

/// Plays sounds on a dedicated worker thread
pub struct SoundEngine<B: AudioBackend> {
    config: SoundEngineConfig,
    sender: CommandSender<B::Sound>,
    pool: Arc<CommandPool<B::Sound>>,
    stats: Arc<EngineStats>,
    next_id: AtomicI64,
    lifecycle: Mutex<Lifecycle<B>>,
    /// Signalled when `lifecycle` reaches `Stopped`
    stopped: Condvar,
}

impl<B: AudioBackend> SoundEngine<B> {
    /// Build an engine around `backend`; call [`start`](Self::start) to run it
    pub fn new(backend: B, config: SoundEngineConfig) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = command_channel(config.queue_capacity);
        let pool = Arc::new(CommandPool::new(config.pool_capacity));
        let stats = Arc::new(EngineStats::new());
        let worker = SoundWorker::new(backend, receiver, Arc::clone(&pool), Arc::clone(&stats));

        debug!(
            "Sound engine created: queue_capacity={}, pool_capacity={}",
            config.queue_capacity, config.pool_capacity
        );

        Ok(Self {
            config,
            sender,
            pool,
            stats,
            next_id: AtomicI64::new(0),
            lifecycle: Mutex::new(Lifecycle::Created(worker)),
            stopped: Condvar::new(),
        })
    }

    /// Spawn the worker thread
    ///
    /// Only valid once, from `Created`.
    pub fn start(&self) -> Result<()> {
        let mut lifecycle = self.lock_lifecycle();
        let worker = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Created(worker) => worker,
            other => {
                let state = other.state();
                *lifecycle = other;
                return Err(Error::InvalidState(format!(
                    "cannot start sound engine while {:?}",
                    state
                )));
            }
        };

        // On spawn failure the worker is lost and the engine stays Stopped
        let thread = thread::Builder::new()
            .name(self.config.worker_thread_name.clone())
            .spawn(move || worker.run())
            .map_err(Error::WorkerSpawn)?;

        *lifecycle = Lifecycle::Running(thread);
        info!(
            "Sound engine started on thread '{}'",
            self.config.worker_thread_name
        );
        Ok(())
    }

    /// Stop the worker and wait for it to exit
    ///
    /// Queues `Shutdown` behind whatever is already pending, so the caller
    /// waits for the worker to drain up to it. A concurrent call waits
    /// until the worker has been joined. Calling this on an engine that was
    /// never started, or again after it stopped, is a no-op.
    pub fn shutdown(&self) -> Result<()> {
        let thread = {
            let mut lifecycle = self.lock_lifecycle();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopping) {
                Lifecycle::Running(thread) => thread,
                Lifecycle::Created(_) => {
                    // Dropping the unstarted worker disconnects the channel
                    *lifecycle = Lifecycle::Stopped;
                    info!("Sound engine stopped before it was started");
                    return Ok(());
                }
                Lifecycle::Stopping => {
                    // Another caller owns the join
                    while matches!(*lifecycle, Lifecycle::Stopping) {
                        lifecycle = self
                            .stopped
                            .wait(lifecycle)
                            .unwrap_or_else(PoisonError::into_inner);
                    }
                    return Ok(());
                }
                Lifecycle::Stopped => {
                    *lifecycle = Lifecycle::Stopped;
                    return Ok(());
                }
            }
        };

        debug!("Sound engine stopping, {} commands pending", self.sender.len());
        self.submit(Command::Shutdown);
        let joined = thread.join();
        *self.lock_lifecycle() = Lifecycle::Stopped;
        self.stopped.notify_all();

        match joined {
            Ok(exit) => {
                info!("Sound engine stopped ({:?})", exit);
                Ok(())
            }
            Err(_) => {
                error!("Sound worker thread panicked");
                Err(Error::WorkerPanicked)
            }
        }
    }

    pub fn state(&self) -> EngineState {
        self.lock_lifecycle().state()
    }

    /// Play a sound that cannot be controlled afterwards
    pub fn play_and_forget(&self, sound: B::Sound, volume: f32) {
        self.submit(Command::PlayAndForget { sound, volume });
    }

    /// Play a sound at normal pitch
    ///
    /// Returns [`PlayId::INVALID`] if the queue was full.
    pub fn play(&self, sound: B::Sound, volume: f32) -> PlayId {
        self.play_with_pitch(sound, volume, 1.0)
    }

    /// Play a sound; the returned id works with `stop`, `set_volume` and
    /// `set_pitch`. Returns [`PlayId::INVALID`] if the queue was full.
    pub fn play_with_pitch(&self, sound: B::Sound, volume: f32, pitch: f32) -> PlayId {
        let id = self.allocate_id();
        self.tracked(id, Command::Play { id, sound, volume, pitch })
    }

    /// Play a sound in a loop until [`stop`](Self::stop) is called
    ///
    /// Returns [`PlayId::INVALID`] if the queue was full.
    pub fn loop_sound(&self, sound: B::Sound, volume: f32, pitch: f32) -> PlayId {
        let id = self.allocate_id();
        self.tracked(id, Command::Loop { id, sound, volume, pitch })
    }

    /// Stop a sound started with `play` or `loop_sound`
    ///
    /// Never dropped: blocks while the queue is full. Returns once the
    /// command is queued, not once it has executed. On an engine that has
    /// not been started yet, a full queue blocks until `start()` is called
    /// from another thread.
    pub fn stop(&self, id: PlayId) {
        self.submit(Command::Stop { id });
    }

    pub fn set_volume(&self, id: PlayId, volume: f32) {
        self.submit(Command::SetVolume { id, volume });
    }

    pub fn set_pitch(&self, id: PlayId, pitch: f32) {
        self.submit(Command::SetPitch { id, pitch });
    }

    /// Commands waiting for the worker
    pub fn pending(&self) -> usize {
        self.sender.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn config(&self) -> &SoundEngineConfig {
        &self.config
    }

    fn allocate_id(&self) -> PlayId {
        PlayId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn tracked(&self, id: PlayId, command: Command<B::Sound>) -> PlayId {
        if self.submit(command) {
            id
        } else {
            PlayId::INVALID
        }
    }

    /// Queue `command` under the backpressure policy; false if it was dropped
    fn submit(&self, command: Command<B::Sound>) -> bool {
        let command = self.pool.acquire_with(command);
        match self.sender.submit(command) {
            Ok(()) => {
                self.stats.record_submitted();
                true
            }
            Err(e) => {
                self.stats.record_dropped();
                if e.is_full() || e.kind().must_deliver() {
                    warn!("{}", e.to_error());
                } else {
                    debug!("{}", e.to_error());
                }
                self.pool.release(e.into_command());
                false
            }
        }
    }

    fn lock_lifecycle(&self) -> MutexGuard<'_, Lifecycle<B>> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: AudioBackend> Drop for SoundEngine<B> {
    fn drop(&mut self) {
        if self.state() == EngineState::Running {
            debug!("Sound engine dropped while running, shutting down");
            if let Err(e) = self.shutdown() {
                error!("Sound engine shutdown on drop failed: {}", e);
            }
        }
    }
}
