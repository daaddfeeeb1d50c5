//! Read-aloud
//!
//! The speech engine is an injected capability behind [`SpeechEngine`].
//! [`ReadAloud`] tracks the `idle | playing | paused` state for one reading
//! session and holds the handle of the utterance in flight. Only one page's
//! text is queued at a time.
//!
//! ```text
//! idle --play--> playing --pause--> paused --resume--> playing
//! playing --end--> idle
//! any --cancel--> idle
//! ```

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Identifies one utterance handed to a speech engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpeechHandle(pub u64);

/// Errors reported by a speech engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// No speech capability in this environment
    #[error("Read-aloud is not available: {0}")]
    Unavailable(String),

    #[error("Speech engine error: {0}")]
    Engine(String),
}

/// Text-to-speech capability
///
/// Completion is reported back by the host calling
/// [`ReadAloud::on_end`] (usually through the reading session) with the
/// handle returned by `speak`.
pub trait SpeechEngine {
    fn speak(&mut self, text: &str) -> Result<SpeechHandle, SpeechError>;
    fn pause(&mut self, handle: SpeechHandle) -> Result<(), SpeechError>;
    fn resume(&mut self, handle: SpeechHandle) -> Result<(), SpeechError>;
    fn cancel(&mut self, handle: SpeechHandle);
}

impl<T: SpeechEngine + ?Sized> SpeechEngine for Box<T> {
    fn speak(&mut self, text: &str) -> Result<SpeechHandle, SpeechError> {
        (**self).speak(text)
    }

    fn pause(&mut self, handle: SpeechHandle) -> Result<(), SpeechError> {
        (**self).pause(handle)
    }

    fn resume(&mut self, handle: SpeechHandle) -> Result<(), SpeechError> {
        (**self).resume(handle)
    }

    fn cancel(&mut self, handle: SpeechHandle) {
        (**self).cancel(handle)
    }
}

/// Engine for hosts without speech support; every request fails
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSpeech;

impl SpeechEngine for UnavailableSpeech {
    fn speak(&mut self, _text: &str) -> Result<SpeechHandle, SpeechError> {
        Err(SpeechError::Unavailable(
            "no speech engine configured".to_string(),
        ))
    }

    fn pause(&mut self, _handle: SpeechHandle) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable(
            "no speech engine configured".to_string(),
        ))
    }

    fn resume(&mut self, _handle: SpeechHandle) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable(
            "no speech engine configured".to_string(),
        ))
    }

    fn cancel(&mut self, _handle: SpeechHandle) {}
}

/// Read-aloud state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsState {
    #[default]
    Idle,
    Playing,
    Paused,
}

/// Read-aloud state machine for a session
#[derive(Debug, Default)]
pub struct ReadAloud {
    state: TtsState,
    handle: Option<SpeechHandle>,
}

impl ReadAloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TtsState {
        self.state
    }

    /// Handle of the utterance in flight
    pub fn handle(&self) -> Option<SpeechHandle> {
        self.handle
    }

    /// Start speaking `text`
    ///
    /// From `paused` this resumes instead; while `playing` it does nothing.
    pub fn play<E: SpeechEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        text: &str,
    ) -> Result<TtsState, SpeechError> {
        match self.state {
            TtsState::Idle => {
                let handle = engine.speak(text)?;
                self.handle = Some(handle);
                self.state = TtsState::Playing;
                debug!("Read-aloud started ({:?})", handle);
            }
            TtsState::Paused => return self.resume(engine),
            TtsState::Playing => {}
        }
        Ok(self.state)
    }

    pub fn pause<E: SpeechEngine + ?Sized>(&mut self, engine: &mut E) -> Result<TtsState, SpeechError> {
        if let (TtsState::Playing, Some(handle)) = (self.state, self.handle) {
            engine.pause(handle)?;
            self.state = TtsState::Paused;
            debug!("Read-aloud paused ({:?})", handle);
        }
        Ok(self.state)
    }

    pub fn resume<E: SpeechEngine + ?Sized>(&mut self, engine: &mut E) -> Result<TtsState, SpeechError> {
        if let (TtsState::Paused, Some(handle)) = (self.state, self.handle) {
            engine.resume(handle)?;
            self.state = TtsState::Playing;
            debug!("Read-aloud resumed ({:?})", handle);
        }
        Ok(self.state)
    }

    /// Cancel any utterance in flight and return to idle
    pub fn cancel<E: SpeechEngine + ?Sized>(&mut self, engine: &mut E) {
        if let Some(handle) = self.handle.take() {
            engine.cancel(handle);
            debug!("Read-aloud cancelled ({:?})", handle);
        }
        self.state = TtsState::Idle;
    }

    /// Natural completion of an utterance
    ///
    /// Ignored (returns false) for handles other than the one in flight,
    /// e.g. the end event of an utterance that was already cancelled.
    pub fn on_end(&mut self, handle: SpeechHandle) -> bool {
        if self.handle != Some(handle) {
            return false;
        }
        self.handle = None;
        self.state = TtsState::Idle;
        true
    }
}


#[cfg(test)]
mod tests {
    use super::fake::{FakeSpeech, SpeechCall};
    use super::*;

    #[test]
    fn test_transitions() {
        let mut engine = FakeSpeech::default();
        let mut tts = ReadAloud::new();
        assert_eq!(tts.state(), TtsState::Idle);

        assert_eq!(tts.play(&mut engine, "text").unwrap(), TtsState::Playing);
        assert_eq!(tts.pause(&mut engine).unwrap(), TtsState::Paused);
        assert_eq!(tts.resume(&mut engine).unwrap(), TtsState::Playing);

        let handle = tts.handle().unwrap();
        assert!(tts.on_end(handle));
        assert_eq!(tts.state(), TtsState::Idle);
        assert!(tts.handle().is_none());
    }

    #[test]
    fn test_play_while_paused_resumes() {
        let mut engine = FakeSpeech::default();
        let mut tts = ReadAloud::new();
        tts.play(&mut engine, "text").unwrap();
        tts.pause(&mut engine).unwrap();

        assert_eq!(tts.play(&mut engine, "text").unwrap(), TtsState::Playing);
        assert_eq!(engine.spoken().len(), 1);
        assert!(matches!(engine.calls.last(), Some(SpeechCall::Resume(_))));
    }

    #[test]
    fn test_invalid_transitions_are_noops() {
        let mut engine = FakeSpeech::default();
        let mut tts = ReadAloud::new();
        assert_eq!(tts.pause(&mut engine).unwrap(), TtsState::Idle);
        assert_eq!(tts.resume(&mut engine).unwrap(), TtsState::Idle);

        tts.play(&mut engine, "text").unwrap();
        assert_eq!(tts.play(&mut engine, "text").unwrap(), TtsState::Playing);
        assert_eq!(tts.resume(&mut engine).unwrap(), TtsState::Playing);
        assert_eq!(engine.spoken().len(), 1);
    }

    #[test]
    fn test_cancel_from_any_state() {
        let mut engine = FakeSpeech::default();
        let mut tts = ReadAloud::new();

        tts.cancel(&mut engine);
        assert_eq!(tts.state(), TtsState::Idle);

        tts.play(&mut engine, "a").unwrap();
        tts.cancel(&mut engine);
        assert_eq!(tts.state(), TtsState::Idle);

        tts.play(&mut engine, "b").unwrap();
        tts.pause(&mut engine).unwrap();
        tts.cancel(&mut engine);
        assert_eq!(tts.state(), TtsState::Idle);
        assert!(matches!(engine.calls.last(), Some(SpeechCall::Cancel(_))));
    }

    #[test]
    fn test_stale_end_event_ignored() {
        let mut engine = FakeSpeech::default();
        let mut tts = ReadAloud::new();
        tts.play(&mut engine, "first").unwrap();
        let first = tts.handle().unwrap();
        tts.cancel(&mut engine);
        tts.play(&mut engine, "second").unwrap();

        assert!(!tts.on_end(first));
        assert_eq!(tts.state(), TtsState::Playing);
    }

    #[test]
    fn test_unavailable_engine_propagates() {
        let mut engine = FakeSpeech::unavailable();
        let mut tts = ReadAloud::new();
        let err = tts.play(&mut engine, "text").unwrap_err();
        assert!(matches!(err, SpeechError::Unavailable(_)));
        assert_eq!(tts.state(), TtsState::Idle);

        let mut none = UnavailableSpeech;
        assert!(tts.play(&mut none, "text").is_err());
    }
}
