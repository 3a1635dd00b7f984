//! Audio backend seam
//!
//! The engine never talks to an audio library directly. It drives an
//! [`AudioBackend`], which is moved onto the worker thread at start-up and
//! only ever called from there.

use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// The blocking-prone primitives of an audio library
///
/// Implementations may block inside any of these calls; that is the reason
/// the engine exists.
pub trait AudioBackend: Send + 'static {
    /// Opaque reference to a loaded sound, supplied by the asset loader
    type Sound: Clone + Send + 'static;

    /// Native handle for one playing instance of a sound
    type Voice: Copy + fmt::Debug + Send + 'static;

    /// Start playing once. `None` if the backend could not play the sound.
    fn play(&mut self, sound: &Self::Sound, volume: f32, pitch: f32) -> Option<Self::Voice>;

    /// Start playing in a loop. `None` if the backend could not play the sound.
    fn play_looped(&mut self, sound: &Self::Sound, volume: f32, pitch: f32) -> Option<Self::Voice>;

    fn stop(&mut self, sound: &Self::Sound, voice: Self::Voice);

    fn set_volume(&mut self, sound: &Self::Sound, voice: Self::Voice, volume: f32);

    fn set_pitch(&mut self, sound: &Self::Sound, voice: Self::Voice, pitch: f32);
}

/// Backend that plays nothing
///
/// Hands out sequential voice ids and sleeps `latency` in every call to
/// emulate a platform whose play call blocks. Used by the soak tool.
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    latency: Duration,
    next_voice: u64,
    calls: u64,
}

impl SimulatedBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            next_voice: 0,
            calls: 0,
        }
    }

    /// Backend calls made so far
    pub fn calls(&self) -> u64 {
        self.calls
    }

    fn simulate_call(&mut self) {
        self.calls += 1;
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }

    fn next_voice(&mut self) -> u64 {
        let voice = self.next_voice;
        self.next_voice += 1;
        voice
    }
}

impl AudioBackend for SimulatedBackend {
    type Sound = String;
    type Voice = u64;

    fn play(&mut self, sound: &String, volume: f32, pitch: f32) -> Option<u64> {
        self.simulate_call();
        let voice = self.next_voice();
        trace!("play {} volume={} pitch={} -> voice {}", sound, volume, pitch, voice);
        Some(voice)
    }

    fn play_looped(&mut self, sound: &String, volume: f32, pitch: f32) -> Option<u64> {
        self.simulate_call();
        let voice = self.next_voice();
        trace!("loop {} volume={} pitch={} -> voice {}", sound, volume, pitch, voice);
        Some(voice)
    }

    fn stop(&mut self, sound: &String, voice: u64) {
        self.simulate_call();
        trace!("stop {} voice {}", sound, voice);
    }

    fn set_volume(&mut self, sound: &String, voice: u64, volume: f32) {
        self.simulate_call();
        trace!("set_volume {} voice {} -> {}", sound, voice, volume);
    }

    fn set_pitch(&mut self, sound: &String, voice: u64, pitch: f32) {
        self.simulate_call();
        trace!("set_pitch {} voice {} -> {}", sound, voice, pitch);
    }
}
