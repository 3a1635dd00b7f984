//! Playing-sound registry
//!
//! Maps a [`PlayId`] to the backend's native voice handle. Owned and touched
//! only by the sound worker, so it needs no synchronization.

use crate::command::PlayId;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// A sound started by `Play` or `Loop` that can still be controlled
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingSound<S, V> {
    /// Sound reference the voice was started from
    pub sound: S,
    /// Handle returned by the backend's play/loop call
    pub voice: V,
}

/// Worker-private table of controllable sounds
#[derive(Debug)]
pub struct SoundRegistry<S, V> {
    sounds: HashMap<PlayId, PlayingSound<S, V>>,
}

impl<S, V> Default for SoundRegistry<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V> SoundRegistry<S, V> {
    pub fn new() -> Self {
        Self {
            sounds: HashMap::with_capacity(16),
        }
    }

    /// Register a sound; returns the entry it replaced, if any
    pub fn insert(&mut self, id: PlayId, sound: S, voice: V) -> Option<PlayingSound<S, V>> {
        self.sounds.insert(id, PlayingSound { sound, voice })
    }

    pub fn get(&self, id: PlayId) -> Result<&PlayingSound<S, V>> {
        self.sounds.get(&id).ok_or(Error::InvalidPlayId(id))
    }

    /// Remove and return the entry for `id`
    pub fn take(&mut self, id: PlayId) -> Result<PlayingSound<S, V>> {
        self.sounds.remove(&id).ok_or(Error::InvalidPlayId(id))
    }

    pub fn contains(&self, id: PlayId) -> bool {
        self.sounds.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}
