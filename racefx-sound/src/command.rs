//! Sound commands and play ids
//!
//! A [`Command`] describes one requested audio operation. Commands are built
//! by producer threads, travel through the command channel, are executed once
//! by the worker and then go back to the pool.

use std::fmt;

/// Opaque id handed back by `play`/`loop` and used to control that sound later
///
/// Ids are allocated from a monotonically increasing counter and never
/// reused. [`PlayId::INVALID`] is returned when the command could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayId(i64);

impl PlayId {
    /// Returned by `play`/`loop` when the command was dropped
    pub const INVALID: PlayId = PlayId(-1);

    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn as_i64(self) -> i64 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl From<i64> for PlayId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One requested audio operation
///
/// `S` is the backend's sound reference (see [`crate::AudioBackend::Sound`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Command<S> {
    /// Pooled command with no operation assigned yet
    Blank,

    /// Play once; the sound cannot be controlled afterwards
    PlayAndForget { sound: S, volume: f32 },

    /// Play once and track it under `id`
    Play {
        id: PlayId,
        sound: S,
        volume: f32,
        pitch: f32,
    },

    /// Play in a loop and track it under `id`
    Loop {
        id: PlayId,
        sound: S,
        volume: f32,
        pitch: f32,
    },

    Stop { id: PlayId },

    SetVolume { id: PlayId, volume: f32 },

    SetPitch { id: PlayId, pitch: f32 },

    /// Terminates the worker loop
    Shutdown,
}

impl<S> Command<S> {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Blank => CommandKind::Blank,
            Command::PlayAndForget { .. } => CommandKind::PlayAndForget,
            Command::Play { .. } => CommandKind::Play,
            Command::Loop { .. } => CommandKind::Loop,
            Command::Stop { .. } => CommandKind::Stop,
            Command::SetVolume { .. } => CommandKind::SetVolume,
            Command::SetPitch { .. } => CommandKind::SetPitch,
            Command::Shutdown => CommandKind::Shutdown,
        }
    }

    /// True for commands that must never be dropped under backpressure
    ///
    /// Skipping a `Stop` could leave a looped sound playing forever, and
    /// skipping `Shutdown` would leak the worker thread.
    pub fn must_deliver(&self) -> bool {
        self.kind().must_deliver()
    }
}

/// Field-less discriminant of [`Command`], used for logging and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Blank,
    PlayAndForget,
    Play,
    Loop,
    Stop,
    SetVolume,
    SetPitch,
    Shutdown,
}

impl CommandKind {
    pub fn must_deliver(self) -> bool {
        matches!(self, CommandKind::Stop | CommandKind::Shutdown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Blank => "blank",
            CommandKind::PlayAndForget => "play-and-forget",
            CommandKind::Play => "play",
            CommandKind::Loop => "loop",
            CommandKind::Stop => "stop",
            CommandKind::SetVolume => "set-volume",
            CommandKind::SetPitch => "set-pitch",
            CommandKind::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
