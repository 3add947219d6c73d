//! Terminal frontend: console-backed implementations of the presentation
//! and speech-device surfaces.
//!
//! Real audio input/output is out of scope; the console stands in for the
//! devices.  [`ConsoleCapture`] reads a typed line as the "spoken" answer,
//! [`ConsolePlayback`] and [`ConsoleSink`] print what they would have
//! played.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::session::{SessionPhase, SessionState};
use crate::speech::{AudioSink, CaptureError, PlaybackError, SpeechCapture, SpeechPlayback};
use crate::view::{badge_text, feedback_text, PracticeView};

// ---------------------------------------------------------------------------
// ConsoleView
// ---------------------------------------------------------------------------

/// Renders session snapshots to stdout.
pub struct ConsoleView;

impl ConsoleView {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl PracticeView for ConsoleView {
    fn render(&self, state: &SessionState) {
        match state.phase {
            SessionPhase::Setup => {
                println!();
                println!("Enter your practice questions (one per line), then `start`.");
            }
            SessionPhase::Presenting => {
                let (current, total) = state.progress();
                println!();
                println!("── Question {current} of {total} ──");
                if let Some(prompt) = state.current_prompt() {
                    println!("  {prompt}");
                }
                if let Some(translation) = &state.translation {
                    println!("  ({translation})");
                }
                println!("  [answer | play | translate | next | reset]");
            }
            SessionPhase::Listening => {
                println!("Listening… type your answer and press Enter:");
            }
            SessionPhase::Processing => {
                println!("Evaluating your answer…");
            }
            SessionPhase::Reviewing => {
                if let Some(transcript) = &state.transcript {
                    println!();
                    println!("You said: {transcript}");
                }
                if let Some(evaluation) = &state.evaluation {
                    println!("{}", badge_text(evaluation));
                    println!("{}", feedback_text(evaluation));
                    println!("Example answer: {}", evaluation.example);
                }
                println!("  [retry | next | reset]");
            }
            SessionPhase::Complete => {
                println!();
                println!("Session complete!");
            }
        }
    }

    fn notice(&self, message: &str) {
        println!("* {message}");
    }
}

// ---------------------------------------------------------------------------
// ConsoleCapture
// ---------------------------------------------------------------------------

/// Capture stand-in: one typed line is one "spoken" answer.
///
/// An empty line maps to [`CaptureError::NoSpeech`], mirroring a recogniser
/// that heard nothing.  `stop` is a no-op here — typing Enter already
/// finalises the attempt.
pub struct ConsoleCapture;

impl ConsoleCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechCapture for ConsoleCapture {
    async fn listen(&self) -> Result<String, CaptureError> {
        // stdin reads block, so hop to the blocking pool.
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map(|_| line.trim().to_string())
        })
        .await
        .map_err(|e| CaptureError::Other(e.to_string()))?
        .map_err(|e| CaptureError::Other(e.to_string()))?;

        if line.is_empty() {
            return Err(CaptureError::NoSpeech);
        }
        Ok(line)
    }

    fn stop(&self) {}
}

// ---------------------------------------------------------------------------
// ConsolePlayback / ConsoleSink
// ---------------------------------------------------------------------------

/// Local playback stand-in: prints the text it would have spoken.
pub struct ConsolePlayback;

impl ConsolePlayback {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsolePlayback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechPlayback for ConsolePlayback {
    async fn speak(&self, text: &str, lang: &str, rate: f32) -> Result<(), PlaybackError> {
        println!("🔊 [{lang} @ {rate:.1}x] {text}");
        io::stdout()
            .flush()
            .map_err(|e| PlaybackError::Failed(e.to_string()))
    }
}

/// Audio-sink stand-in: reports the synthesised audio it would have played.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSink for ConsoleSink {
    async fn play(&self, audio: &[u8]) -> Result<(), PlaybackError> {
        println!("🔊 [synthesised audio, {} bytes]", audio.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
