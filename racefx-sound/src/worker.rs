//! Sound worker
//!
//! The single consumer of the command channel. Owns the backend and the
//! playing-sound registry and executes one command at a time.
//!
//! **Failure handling:**
//! - Unknown play ids are logged and skipped
//! - A panic inside a backend call is caught and logged; the loop continues
//! - The loop only ends on `Shutdown` or when every sender is gone

use crate::backend::AudioBackend;
use crate::channel::CommandReceiver;
use crate::command::{Command, CommandKind, PlayId};
use crate::error::Error;
use crate::pool::CommandPool;
use crate::registry::SoundRegistry;
use crate::stats::EngineStats;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why the worker loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A `Shutdown` command was received
    Shutdown,
    /// The channel disconnected without a `Shutdown`
    Interrupted,
}

pub struct SoundWorker<B: AudioBackend> {
    backend: B,
    receiver: CommandReceiver<B::Sound>,
    pool: Arc<CommandPool<B::Sound>>,
    registry: SoundRegistry<B::Sound, B::Voice>,
    stats: Arc<EngineStats>,
}

impl<B: AudioBackend> SoundWorker<B> {
    pub fn new(
        backend: B,
        receiver: CommandReceiver<B::Sound>,
        pool: Arc<CommandPool<B::Sound>>,
        stats: Arc<EngineStats>,
    ) -> Self {
        Self {
            backend,
            receiver,
            pool,
            registry: SoundRegistry::new(),
            stats,
        }
    }

    /// Run the worker loop on the current thread until shutdown
    pub fn run(mut self) -> WorkerExit {
        info!("Sound worker started");

        let exit = loop {
            let mut command = match self.receiver.dequeue_blocking() {
                Ok(command) => command,
                Err(e) => {
                    error!("{}", e);
                    break WorkerExit::Interrupted;
                }
            };

            let owned = std::mem::replace(&mut *command, Command::Blank);
            if self.execute_guarded(owned).is_break() {
                break WorkerExit::Shutdown;
            }

            self.stats.record_executed();
            self.stats.set_playing(self.registry.len());
            self.pool.release(command);
        };

        if !self.registry.is_empty() {
            debug!(
                "Sound worker exiting with {} sounds still registered",
                self.registry.len()
            );
        }
        info!("Sound worker stopped ({:?})", exit);
        exit
    }

    fn execute_guarded(&mut self, command: Command<B::Sound>) -> ControlFlow<()> {
        let kind = command.kind();
        match panic::catch_unwind(AssertUnwindSafe(|| self.execute(command))) {
            Ok(flow) => flow,
            Err(_) => {
                self.stats.record_backend_panic();
                error!("Audio backend panicked while executing {} command", kind);
                ControlFlow::Continue(())
            }
        }
    }

    fn execute(&mut self, command: Command<B::Sound>) -> ControlFlow<()> {
        match command {
            Command::Shutdown => return ControlFlow::Break(()),
            Command::Blank => warn!("Ignoring blank sound command"),
            Command::PlayAndForget { sound, volume } => {
                if self.backend.play(&sound, volume, 1.0).is_none() {
                    self.refused(CommandKind::PlayAndForget, None);
                }
            }
            Command::Play { id, sound, volume, pitch } => {
                let voice = self.backend.play(&sound, volume, pitch);
                self.register(CommandKind::Play, id, sound, voice);
            }
            Command::Loop { id, sound, volume, pitch } => {
                let voice = self.backend.play_looped(&sound, volume, pitch);
                self.register(CommandKind::Loop, id, sound, voice);
            }
            Command::Stop { id } => match self.registry.take(id) {
                Ok(playing) => self.backend.stop(&playing.sound, playing.voice),
                Err(e) => self.invalid_id(e),
            },
            Command::SetVolume { id, volume } => match self.registry.get(id) {
                Ok(playing) => self.backend.set_volume(&playing.sound, playing.voice, volume),
                Err(e) => self.invalid_id(e),
            },
            Command::SetPitch { id, pitch } => match self.registry.get(id) {
                Ok(playing) => self.backend.set_pitch(&playing.sound, playing.voice, pitch),
                Err(e) => self.invalid_id(e),
            },
        }
        ControlFlow::Continue(())
    }

    fn register(&mut self, kind: CommandKind, id: PlayId, sound: B::Sound, voice: Option<B::Voice>) {
        let Some(voice) = voice else {
            self.refused(kind, Some(id));
            return;
        };
        if let Some(replaced) = self.registry.insert(id, sound, voice) {
            warn!(
                "Play id {} registered twice, replacing voice {:?}",
                id, replaced.voice
            );
        }
    }

    fn refused(&self, kind: CommandKind, id: Option<PlayId>) {
        self.stats.record_refused();
        match id {
            Some(id) => warn!("Audio backend could not start {} command for play id {}", kind, id),
            None => warn!("Audio backend could not start {} command", kind),
        }
    }

    fn invalid_id(&self, e: Error) {
        self.stats.record_invalid_id();
        warn!("{}", e);
    }
}
