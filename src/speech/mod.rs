//! External speech-device surfaces: capture, local playback, audio sink.
//!
//! The actual devices (microphone + recogniser, system voice synthesiser,
//! audio output) are external collaborators — only their contracts live
//! here.  All traits are object-safe and `Send + Sync` so they can be held
//! behind `Arc<dyn …>` by the session controller.
//!
//! `#[cfg(test)]` mock implementations of every trait live in this file so
//! the fallback policy and session controller can be tested headlessly.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Error codes emitted by the speech-capture device.
///
/// Each code maps to a specific user-facing message via
/// [`user_message`](CaptureError::user_message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The device heard nothing before giving up.
    #[error("no-speech")]
    NoSpeech,

    /// The recogniser could not reach its backing service.
    #[error("network")]
    Network,

    /// Any other device-reported code.
    #[error("{0}")]
    Other(String),
}

impl CaptureError {
    /// The message shown to the user for this error code.
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::NoSpeech => "No speech detected, please try again.".into(),
            CaptureError::Network => "Network error, please check your connection.".into(),
            CaptureError::Other(code) => format!("Speech recognition error: {code}"),
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackError
// ---------------------------------------------------------------------------

/// Errors from the local playback device or the audio sink.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    /// No playback device is available on this system.
    #[error("speech playback is not available")]
    Unavailable,

    /// The device accepted the request but failed while playing.
    #[error("playback failed: {0}")]
    Failed(String),
}

// ---------------------------------------------------------------------------
// SpeechCapture
// ---------------------------------------------------------------------------

/// Speech-capture device: one listening attempt yields a single final
/// transcript or an error code.
///
/// The controller keeps at most one `listen` in flight.  [`stop`]
/// (SpeechCapture::stop) asks the device to finalise the current attempt
/// early; it is the only cancellable suspended operation in the system.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    /// Listen until the device produces a final transcript or fails.
    async fn listen(&self) -> Result<String, CaptureError>;

    /// Request that an in-flight listen finalise now.  No-op when idle.
    fn stop(&self);
}

// ---------------------------------------------------------------------------
// SpeechPlayback
// ---------------------------------------------------------------------------

/// Local (no-network) speech playback device: speaks text in a given locale
/// at a given rate, or fails.
#[async_trait]
pub trait SpeechPlayback: Send + Sync {
    async fn speak(&self, text: &str, lang: &str, rate: f32) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// AudioSink
// ---------------------------------------------------------------------------

/// Plays provider-synthesised audio bytes.  Decoding mechanics are the
/// sink's concern, not the caller's.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play(&self, audio: &[u8]) -> Result<(), PlaybackError>;
}

// ---------------------------------------------------------------------------
// Mocks  (test-only)
// ---------------------------------------------------------------------------

/// Test double that returns a pre-configured capture result.
#[cfg(test)]
pub struct MockCapture {
    response: Result<String, CaptureError>,
}

#[cfg(test)]
impl MockCapture {
    /// Create a mock that always yields `Ok(transcript)`.
    pub fn ok(transcript: impl Into<String>) -> Self {
        Self {
            response: Ok(transcript.into()),
        }
    }

    /// Create a mock that always yields the given error.
    pub fn err(error: CaptureError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechCapture for MockCapture {
    async fn listen(&self) -> Result<String, CaptureError> {
        self.response.clone()
    }

    fn stop(&self) {}
}

/// Test double that records every spoken text.
#[cfg(test)]
pub struct MockPlayback {
    fail: bool,
    pub spoken: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockPlayback {
    pub fn ok() -> Self {
        Self {
            fail: false,
            spoken: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            spoken: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechPlayback for MockPlayback {
    async fn speak(&self, text: &str, _lang: &str, _rate: f32) -> Result<(), PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Unavailable);
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Test double that records the size of every played audio buffer.
#[cfg(test)]
pub struct MockSink {
    fail: bool,
    pub played: std::sync::Mutex<Vec<usize>>,
}

#[cfg(test)]
impl MockSink {
    pub fn ok() -> Self {
        Self {
            fail: false,
            played: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            played: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl AudioSink for MockSink {
    async fn play(&self, audio: &[u8]) -> Result<(), PlaybackError> {
        if self.fail {
            return Err(PlaybackError::Failed("decode error".into()));
        }
        self.played.lock().unwrap().push(audio.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_speech_maps_to_specific_message() {
        assert_eq!(
            CaptureError::NoSpeech.user_message(),
            "No speech detected, please try again."
        );
    }

    #[test]
    fn network_maps_to_specific_message() {
        assert_eq!(
            CaptureError::Network.user_message(),
            "Network error, please check your connection."
        );
    }

    #[test]
    fn other_codes_are_embedded_in_generic_message() {
        let err = CaptureError::Other("audio-capture".into());
        assert_eq!(err.user_message(), "Speech recognition error: audio-capture");
    }

    /// All device traits must be object-safe.
    #[test]
    fn traits_are_object_safe() {
        let _: Box<dyn SpeechCapture> = Box::new(MockCapture::ok("好"));
        let _: Box<dyn SpeechPlayback> = Box::new(MockPlayback::ok());
        let _: Box<dyn AudioSink> = Box::new(MockSink::ok());
    }

    #[tokio::test]
    async fn mock_capture_returns_configured_transcript() {
        let capture = MockCapture::ok("我叫小明");
        assert_eq!(capture.listen().await.unwrap(), "我叫小明");
    }

    #[tokio::test]
    async fn mock_playback_records_spoken_text() {
        let playback = MockPlayback::ok();
        playback.speak("你好", "zh-CN", 0.8).await.unwrap();
        assert_eq!(playback.spoken.lock().unwrap().as_slice(), ["你好"]);
    }
}
