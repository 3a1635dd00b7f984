//! Integration tests for the sound engine
//!
//! Drive the public API from test threads against a recording backend. The
//! backend's gate stalls the worker inside a call to simulate a slow
//! platform and saturate the command queue.

mod helpers;

use helpers::{wait_until, Call, Recorder, RecordingBackend};
use racefx_sound::{EngineState, PlayId, SoundEngine, SoundEngineConfig};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const CAPACITY: usize = 8;

fn engine_with_capacity(capacity: usize) -> (SoundEngine<RecordingBackend>, Arc<Recorder>) {
    let (backend, recorder) = RecordingBackend::new();
    let config = SoundEngineConfig::default().with_queue_capacity(capacity);
    let engine = SoundEngine::new(backend, config).expect("engine should build");
    (engine, recorder)
}

fn running_engine() -> (Arc<SoundEngine<RecordingBackend>>, Arc<Recorder>) {
    let (engine, recorder) = engine_with_capacity(CAPACITY);
    engine.start().expect("engine should start");
    (Arc::new(engine), recorder)
}

/// Stall the worker inside a backend call for `id`, then fill the queue
fn saturate(engine: &SoundEngine<RecordingBackend>, recorder: &Recorder, id: PlayId) {
    recorder.gate.close();
    engine.set_volume(id, 0.0);
    assert!(wait_until(|| recorder.gate.waiting() == 1), "worker should block at the gate");

    for step in 0..CAPACITY {
        engine.set_volume(id, step as f32 / 10.0);
    }
    assert_eq!(engine.pending(), CAPACITY);
}

#[test]
fn test_loop_then_stop_end_to_end() {
    let (engine, recorder) = running_engine();

    let id = engine.loop_sound("engine", 1.0, 1.0);
    assert!(id.is_valid());
    assert!(wait_until(|| engine.stats().playing == 1), "loop should be registered");

    engine.stop(id);
    assert!(wait_until(|| engine.stats().playing == 0), "stop should unregister the loop");

    let voice = recorder.voice_of("engine").expect("loop should reach the backend");
    assert_eq!(recorder.stops(), vec![Call::Stop { sound: "engine", voice }]);

    engine.shutdown().unwrap();
    assert_eq!(recorder.stops().len(), 1, "backend stop called exactly once");
}

#[test]
fn test_play_ids_unique_across_threads() {
    let (engine, _recorder) = engine_with_capacity(4096);
    engine.start().unwrap();
    let engine = Arc::new(engine);

    let producers: Vec<_> = (0..8)
        .map(|index| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                (0..200)
                    .map(|i| {
                        if (index + i) % 2 == 0 {
                            engine.play("tick", 0.5)
                        } else {
                            engine.loop_sound("hum", 0.5, 1.0)
                        }
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for producer in producers {
        for id in producer.join().unwrap() {
            assert!(id.is_valid(), "queue is large enough that nothing is dropped");
            assert!(seen.insert(id), "play id {} handed out twice", id);
        }
    }
    assert_eq!(seen.len(), 1600);
    assert_eq!(seen.iter().max(), Some(&PlayId::new(1599)));

    engine.shutdown().unwrap();
}

#[test]
fn test_stop_is_never_dropped() {
    let (engine, recorder) = running_engine();
    let id = engine.loop_sound("engine", 1.0, 1.0);
    assert!(wait_until(|| engine.stats().playing == 1));

    saturate(&engine, &recorder, id);

    let stopper = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.stop(id))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!stopper.is_finished(), "stop should wait for room instead of dropping");

    recorder.gate.open();
    stopper.join().unwrap();

    assert!(wait_until(|| engine.stats().playing == 0), "stop should eventually execute");
    let voice = recorder.voice_of("engine").unwrap();
    assert_eq!(recorder.stops(), vec![Call::Stop { sound: "engine", voice }]);
    assert_eq!(engine.stats().dropped, 0);

    engine.shutdown().unwrap();
}

#[test]
fn test_backpressure_drop_is_visible() {
    let (engine, recorder) = running_engine();
    let id = engine.loop_sound("engine", 1.0, 1.0);
    assert!(wait_until(|| engine.stats().playing == 1));

    saturate(&engine, &recorder, id);

    assert_eq!(engine.play("horn", 1.0), PlayId::INVALID);
    assert_eq!(engine.loop_sound("siren", 1.0, 1.0), PlayId::INVALID);
    engine.play_and_forget("crash", 1.0);
    engine.set_pitch(id, 2.0);
    assert_eq!(engine.stats().dropped, 4);
    assert_eq!(engine.pending(), CAPACITY);

    recorder.gate.open();
    engine.shutdown().unwrap();

    // The dropped commands never reached the backend
    assert!(recorder.voice_of("horn").is_none());
    assert!(recorder.voice_of("siren").is_none());
    assert!(!recorder
        .calls()
        .iter()
        .any(|call| matches!(call, Call::SetPitch { .. })));
}

#[test]
fn test_invalid_play_id_is_harmless() {
    let (engine, recorder) = running_engine();
    let unknown = PlayId::new(9999);

    engine.set_volume(unknown, 0.5);
    engine.set_pitch(unknown, 1.5);
    engine.stop(unknown);
    engine.stop(PlayId::INVALID);

    let id = engine.play("horn", 1.0);
    assert!(id.is_valid());
    assert!(wait_until(|| engine.stats().executed == 5));

    let stats = engine.stats();
    assert_eq!(stats.invalid_ids, 4);
    assert_eq!(engine.state(), EngineState::Running);
    assert_eq!(
        recorder.calls(),
        vec![Call::Play { sound: "horn", volume: 1.0, pitch: 1.0, voice: 1000 }]
    );

    engine.shutdown().unwrap();
}

#[test]
fn test_shutdown_drains_in_order() {
    let (engine, recorder) = running_engine();

    let id = engine.loop_sound("siren", 1.0, 1.0);
    engine.shutdown().unwrap();

    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(recorder.backend_dropped(), "worker thread should have exited");
    assert_eq!(
        recorder.calls(),
        vec![Call::Loop { sound: "siren", volume: 1.0, pitch: 1.0, voice: 1000 }]
    );

    // Nothing issued afterwards reaches the backend
    assert_eq!(engine.play("late", 1.0), PlayId::INVALID);
    engine.set_volume(id, 0.1);
    engine.stop(id);
    assert_eq!(recorder.calls().len(), 1);
}

#[test]
fn test_commands_behind_shutdown_never_execute() {
    let (engine, recorder) = running_engine();

    recorder.gate.close();
    engine.play_and_forget("first", 1.0);
    assert!(wait_until(|| recorder.gate.waiting() == 1));

    let shutdown = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.shutdown())
    };
    assert!(wait_until(|| engine.pending() == 1), "shutdown should be queued");
    assert_eq!(engine.state(), EngineState::Stopping);

    // Accepted by the queue, but behind Shutdown
    let late = engine.play("late", 1.0);
    assert!(late.is_valid());

    recorder.gate.open();
    shutdown.join().unwrap().unwrap();

    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(recorder.voice_of("first").is_some());
    assert!(recorder.voice_of("late").is_none());
}

#[test]
fn test_concurrent_shutdown_waits_for_worker() {
    let (engine, recorder) = running_engine();

    recorder.gate.close();
    engine.play_and_forget("first", 1.0);
    assert!(wait_until(|| recorder.gate.waiting() == 1));

    let first = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.shutdown())
    };
    assert!(wait_until(|| engine.state() == EngineState::Stopping));

    let second = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || {
            let result = engine.shutdown();
            (result, engine.state())
        })
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!second.is_finished(), "second shutdown must wait for the worker");
    assert!(!recorder.backend_dropped());

    recorder.gate.open();
    let (result, state) = second.join().unwrap();
    result.unwrap();
    assert_eq!(state, EngineState::Stopped);
    assert!(recorder.backend_dropped(), "worker joined before second shutdown returned");

    first.join().unwrap().unwrap();
}

#[test]
fn test_commands_before_start_are_queued() {
    let (engine, recorder) = engine_with_capacity(CAPACITY);

    let id = engine.loop_sound("idle", 0.3, 1.0);
    engine.set_pitch(id, 1.2);
    assert!(id.is_valid());
    thread::sleep(Duration::from_millis(20));
    assert!(recorder.calls().is_empty());

    engine.start().unwrap();
    assert!(wait_until(|| recorder.calls().len() == 2));
    assert_eq!(
        recorder.calls()[1],
        Call::SetPitch { voice: 1000, pitch: 1.2 }
    );

    engine.shutdown().unwrap();
}

#[test]
fn test_stop_before_start_waits_for_start() {
    let (engine, recorder) = engine_with_capacity(CAPACITY);
    let engine = Arc::new(engine);
    let id = PlayId::new(42);

    for step in 0..CAPACITY {
        engine.set_volume(id, step as f32 / 10.0);
    }
    assert_eq!(engine.pending(), CAPACITY);

    let stopper = {
        let engine = Arc::clone(&engine);
        thread::spawn(move || engine.stop(id))
    };
    thread::sleep(Duration::from_millis(50));
    assert!(!stopper.is_finished(), "nothing drains the queue before start");

    engine.start().unwrap();
    stopper.join().unwrap();
    assert!(wait_until(|| engine.stats().executed == CAPACITY as u64 + 1));
    assert_eq!(engine.stats().invalid_ids, CAPACITY as u64 + 1);
    assert_eq!(engine.stats().dropped, 0);
    assert!(recorder.calls().is_empty());

    engine.shutdown().unwrap();
}

#[test]
fn test_drop_shuts_down_worker() {
    let (engine, recorder) = engine_with_capacity(CAPACITY);
    engine.start().unwrap();
    engine.loop_sound("engine", 1.0, 1.0);

    drop(engine);

    assert!(recorder.backend_dropped());
    assert_eq!(recorder.calls().len(), 1, "queued loop runs before the worker exits");
}
