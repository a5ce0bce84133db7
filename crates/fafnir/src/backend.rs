//! # Backend Contracts — Audio and Input Providers
//!
//! The runtime core never touches a device. Audio output and input hardware
//! are reached through the narrow traits here, implemented by the host
//! application and handed in at wiring time. The core consumes the traits;
//! [`NullAudio`] and [`NullInput`] are the inert implementations used by
//! tests and headless runs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Failure inside a backend provider, reported as an opaque message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ── Audio ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundFormat {
    Wav,
    OggVorbis,
}

impl SoundFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" => Some(Self::Wav),
            "ogg" => Some(Self::OggVorbis),
            _ => None,
        }
    }
}

/// A decoded, playable sound. The handle is meaningful only to the backend
/// that created it.
#[derive(Debug, Clone)]
pub struct Sound {
    pub format: SoundFormat,
    pub handle: u64,
}

/// Audio device provider. `create_sound` is called by the sound asset loader
/// during materialization; `play` by gameplay code.
pub trait AudioBackend: Send + Sync {
    fn create_sound(&self, data: &[u8], format: SoundFormat) -> Result<Sound, BackendError>;

    fn play(&self, sound: &Sound) -> Result<(), BackendError>;
}

/// Audio backend that decodes nothing and plays silently. Wav data is still
/// sanity-checked so loader error paths stay testable.
#[derive(Debug, Default)]
pub struct NullAudio {
    next_handle: AtomicU64,
    plays: AtomicU64,
}

impl NullAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `play` calls so far.
    pub fn play_count(&self) -> u64 {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AudioBackend for NullAudio {
    fn create_sound(&self, data: &[u8], format: SoundFormat) -> Result<Sound, BackendError> {
        if format == SoundFormat::Wav && !data.starts_with(b"RIFF") {
            return Err(BackendError::new("wav data missing RIFF header"));
        }
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        Ok(Sound { format, handle })
    }

    fn play(&self, _sound: &Sound) -> Result<(), BackendError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── Input ────────────────────────────────────────────────────────────────

/// Hardware input state captured once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Keys currently held, by backend-defined key name.
    pub pressed: HashSet<String>,
}

impl InputSnapshot {
    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.contains(key)
    }
}

/// Per-frame source of hardware input state.
pub trait InputProvider: Send {
    fn snapshot(&self) -> InputSnapshot;
}

/// Input device provider.
pub trait InputBackend: Send + Sync {
    fn create_input_provider(&self) -> Box<dyn InputProvider>;
}

/// Input backend whose providers report nothing pressed.
#[derive(Debug, Default)]
pub struct NullInput;

impl InputBackend for NullInput {
    fn create_input_provider(&self) -> Box<dyn InputProvider> {
        struct Idle;
        impl InputProvider for Idle {
            fn snapshot(&self) -> InputSnapshot {
                InputSnapshot::default()
            }
        }
        Box::new(Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(SoundFormat::from_extension("wav"), Some(SoundFormat::Wav));
        assert_eq!(SoundFormat::from_extension("OGG"), Some(SoundFormat::OggVorbis));
        assert_eq!(SoundFormat::from_extension("mp3"), None);
    }

    #[test]
    fn null_audio_validates_wav_header() {
        let audio = NullAudio::new();
        assert!(audio.create_sound(b"junk", SoundFormat::Wav).is_err());
        assert!(audio.create_sound(b"RIFF....WAVE", SoundFormat::Wav).is_ok());
        // Ogg data is taken as-is.
        assert!(audio.create_sound(b"junk", SoundFormat::OggVorbis).is_ok());
    }

    #[test]
    fn null_audio_counts_plays_and_hands_out_distinct_handles() {
        let audio = NullAudio::new();
        let a = audio.create_sound(b"RIFF", SoundFormat::Wav).unwrap();
        let b = audio.create_sound(b"RIFF", SoundFormat::Wav).unwrap();
        assert_ne!(a.handle, b.handle);

        audio.play(&a).unwrap();
        audio.play(&b).unwrap();
        assert_eq!(audio.play_count(), 2);
    }

    #[test]
    fn null_input_reports_nothing_pressed() {
        let provider = NullInput.create_input_provider();
        assert!(!provider.snapshot().is_pressed("space"));
    }
}
