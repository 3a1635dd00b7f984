//! Shared test helpers for racefx-sound integration tests
//!
//! - [`RecordingBackend`]: records every backend call, voices start at 1000
//! - [`Gate`]: closes to stall the worker inside a backend call
//! - [`wait_until`]: polls a condition with a timeout

#![allow(dead_code)]

use racefx_sound::AudioBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const TIMEOUT: Duration = Duration::from_secs(5);

/// One call observed by the recording backend
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play { sound: &'static str, volume: f32, pitch: f32, voice: u64 },
    Loop { sound: &'static str, volume: f32, pitch: f32, voice: u64 },
    Stop { sound: &'static str, voice: u64 },
    SetVolume { voice: u64, volume: f32 },
    SetPitch { voice: u64, pitch: f32 },
}

#[derive(Default)]
struct GateState {
    closed: bool,
    waiting: usize,
}

/// Blocks backend calls while closed
#[derive(Default)]
pub struct Gate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl Gate {
    pub fn close(&self) {
        self.state.lock().unwrap().closed = true;
    }

    pub fn open(&self) {
        self.state.lock().unwrap().closed = false;
        self.changed.notify_all();
    }

    /// Threads currently held at the gate
    pub fn waiting(&self) -> usize {
        self.state.lock().unwrap().waiting
    }

    fn pass(&self) {
        let mut state = self.state.lock().unwrap();
        state.waiting += 1;
        self.changed.notify_all();
        while state.closed {
            state = self.changed.wait(state).unwrap();
        }
        state.waiting -= 1;
    }
}

/// State shared between a test and its backend on the worker thread
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<Call>>,
    pub gate: Gate,
    dropped: AtomicBool,
}

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stops(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Stop { .. }))
            .collect()
    }

    /// Voice handed out for the first play/loop of `sound`
    pub fn voice_of(&self, sound: &str) -> Option<u64> {
        self.calls().into_iter().find_map(|call| match call {
            Call::Play { sound: s, voice, .. } | Call::Loop { sound: s, voice, .. } if s == sound => {
                Some(voice)
            }
            _ => None,
        })
    }

    /// True once the backend has been dropped (i.e. the worker exited)
    pub fn backend_dropped(&self) -> bool {
        self.dropped.load(Ordering::SeqCst)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

pub struct RecordingBackend {
    recorder: Arc<Recorder>,
    next_voice: u64,
}

impl RecordingBackend {
    pub fn new() -> (Self, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let backend = Self {
            recorder: Arc::clone(&recorder),
            next_voice: 1000,
        };
        (backend, recorder)
    }

    fn voice(&mut self) -> u64 {
        let voice = self.next_voice;
        self.next_voice += 1;
        voice
    }
}

impl Drop for RecordingBackend {
    fn drop(&mut self) {
        self.recorder.dropped.store(true, Ordering::SeqCst);
    }
}

impl AudioBackend for RecordingBackend {
    type Sound = &'static str;
    type Voice = u64;

    fn play(&mut self, sound: &&'static str, volume: f32, pitch: f32) -> Option<u64> {
        self.recorder.gate.pass();
        let voice = self.voice();
        self.recorder.record(Call::Play { sound: *sound, volume, pitch, voice });
        Some(voice)
    }

    fn play_looped(&mut self, sound: &&'static str, volume: f32, pitch: f32) -> Option<u64> {
        self.recorder.gate.pass();
        let voice = self.voice();
        self.recorder.record(Call::Loop { sound: *sound, volume, pitch, voice });
        Some(voice)
    }

    fn stop(&mut self, sound: &&'static str, voice: u64) {
        self.recorder.gate.pass();
        self.recorder.record(Call::Stop { sound: *sound, voice });
    }

    fn set_volume(&mut self, _sound: &&'static str, voice: u64, volume: f32) {
        self.recorder.gate.pass();
        self.recorder.record(Call::SetVolume { voice, volume });
    }

    fn set_pitch(&mut self, _sound: &&'static str, voice: u64, pitch: f32) {
        self.recorder.gate.pass();
        self.recorder.record(Call::SetPitch { voice, pitch });
    }
}

/// Poll `condition` until it holds or [`TIMEOUT`] elapses
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
