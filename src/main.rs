//! Application entry point — Chinese Question Practice.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run), overlay
//!    environment variables, log credential status.
//! 3. Build the provider registry and spawn best-effort connection
//!    diagnostics (never block session start).
//! 4. Wire the fallback policy with console-backed speech devices.
//! 5. Spawn the session controller.
//! 6. Run the console command loop on the main task until EOF or `quit`.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use chinese_practice::{
    config::AppConfig,
    fallback::{FallbackPolicy, ProviderRegistry},
    session::{new_shared_state, SessionController, SessionEvent, SessionPhase, SharedState},
    view::console::{ConsoleCapture, ConsolePlayback, ConsoleSink, ConsoleView},
};

// ---------------------------------------------------------------------------
// Startup diagnostics
// ---------------------------------------------------------------------------

/// Probe each configured adapter in the background and log the result.
/// Purely informational; failures never affect the session.
fn spawn_diagnostics(registry: &ProviderRegistry) {
    let tts = Arc::clone(&registry.tts);
    let evaluator = Arc::clone(&registry.evaluator);
    let translator = Arc::clone(&registry.translator);

    tokio::spawn(async move {
        if tts.is_ready() {
            if tts.test_connection().await {
                log::info!("{} connection OK", tts.name());
            } else {
                log::warn!("{} configured but unreachable", tts.name());
            }
        } else {
            log::info!("{} not configured; local playback will be used", tts.name());
        }

        if evaluator.is_ready() {
            if evaluator.test_connection().await {
                log::info!("{} connection OK", evaluator.name());
            } else {
                log::warn!("{} configured but unreachable", evaluator.name());
            }
        } else {
            log::info!(
                "{} not configured; heuristic evaluation will be used",
                evaluator.name()
            );
        }

        if translator.is_ready() {
            if translator.test_connection().await {
                log::info!("{} connection OK", translator.name());
            } else {
                log::warn!("{} configured but unreachable", translator.name());
            }
        } else {
            log::info!(
                "{} not configured; phrasebook translation will be used",
                translator.name()
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Console command loop
// ---------------------------------------------------------------------------

/// Read one trimmed line from stdin.  `None` on EOF or read error.
async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}

/// Upper bound on waiting for the controller to pick a listen request up.
/// Only reached when the event was ignored (e.g. sent during `Complete`).
const LISTEN_PICKUP_TIMEOUT: Duration = Duration::from_secs(1);

/// Wait for a listen request to be picked up and finish.
///
/// The capture device reads stdin while listening, so the command loop must
/// not compete for it.  Sending the event only enqueues it; polling the
/// phase right away could observe the pre-transition phase (not busy) and
/// fall through to a stdin read that races the capture.  So: first wait for
/// the session to *become* busy (bounded, in case the controller ignored
/// the event), then wait for it to go idle again.
async fn wait_until_idle(state: &SharedState) {
    let became_busy = tokio::time::timeout(LISTEN_PICKUP_TIMEOUT, async {
        loop {
            if state.lock().unwrap().phase.is_busy() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .is_ok();

    if !became_busy {
        return;
    }

    loop {
        if !state.lock().unwrap().phase.is_busy() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn command_loop(state: SharedState, event_tx: mpsc::Sender<SessionEvent>) {
    println!("Chinese Question Practice");
    println!("Enter questions one per line, then `start`.  `quit` exits.");

    // Lines typed during Setup accumulate as the prompt list.
    let mut pending = String::new();

    while let Some(line) = read_line().await {
        let in_setup = {
            let st = state.lock().unwrap();
            st.phase == SessionPhase::Setup
        };

        match line.as_str() {
            "quit" | "exit" => break,

            "start" if in_setup => {
                let raw = std::mem::take(&mut pending);
                if event_tx.send(SessionEvent::Start { raw }).await.is_err() {
                    break;
                }
            }

            _ if in_setup => {
                pending.push_str(&line);
                pending.push('\n');
                continue;
            }

            "play" => {
                let _ = event_tx.send(SessionEvent::Replay).await;
            }
            "translate" => {
                let _ = event_tx.send(SessionEvent::Translate).await;
            }
            "answer" => {
                if event_tx.send(SessionEvent::BeginListening).await.is_err() {
                    break;
                }
                wait_until_idle(&state).await;
            }
            "retry" => {
                if event_tx.send(SessionEvent::Retry).await.is_err() {
                    break;
                }
                wait_until_idle(&state).await;
            }
            "next" => {
                let _ = event_tx.send(SessionEvent::Continue).await;
            }
            "reset" => {
                let _ = event_tx.send(SessionEvent::Reset).await;
            }
            "" => {}
            other => {
                println!("Unknown command: {other}");
                println!("Commands: play, translate, answer, retry, next, reset, quit");
            }
        }

        // Give the controller a beat to render before the next prompt read.
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Chinese Question Practice starting up");

    // 2. Configuration: disk, then environment overlay
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env();
    config.log_status();

    // 3. Providers + background diagnostics
    let registry = ProviderRegistry::from_config(&config);
    spawn_diagnostics(&registry);

    // 4. Fallback policy over console speech devices
    let policy = FallbackPolicy::new(
        registry,
        Arc::new(ConsolePlayback::new()),
        Arc::new(ConsoleSink::new()),
        config.speech.clone(),
    );

    // 5. Session controller
    let state = new_shared_state();
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(16);
    let controller = SessionController::new(
        Arc::clone(&state),
        policy,
        Arc::new(ConsoleCapture::new()),
        Arc::new(ConsoleView::new()),
    );
    let controller_handle = tokio::spawn(controller.run(event_rx));

    // 6. Console command loop (blocks until quit / EOF)
    command_loop(Arc::clone(&state), event_tx).await;

    // Dropping the sender above ends the controller loop.
    controller_handle.await?;
    log::info!("Chinese Question Practice shut down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// The wait must observe the transition *into* a busy phase before it
    /// starts watching for idle — returning on the pre-transition phase
    /// would let the command loop and the capture device compete for stdin.
    #[tokio::test(start_paused = true)]
    async fn waits_through_a_delayed_listen_pickup() {
        let state = new_shared_state();
        state.lock().unwrap().phase = SessionPhase::Presenting;

        let writer = Arc::clone(&state);
        let controller_sim = tokio::spawn(async move {
            // Event sits in the queue for a while before pickup.
            tokio::time::sleep(Duration::from_millis(100)).await;
            writer.lock().unwrap().phase = SessionPhase::Listening;
            tokio::time::sleep(Duration::from_millis(200)).await;
            writer.lock().unwrap().phase = SessionPhase::Processing;
            tokio::time::sleep(Duration::from_millis(200)).await;
            writer.lock().unwrap().phase = SessionPhase::Reviewing;
        });

        wait_until_idle(&state).await;

        assert_eq!(state.lock().unwrap().phase, SessionPhase::Reviewing);
        controller_sim.await.unwrap();
    }

    /// An ignored listen request must not hang the command loop.
    #[tokio::test(start_paused = true)]
    async fn gives_up_when_no_listen_starts() {
        let state = new_shared_state();
        state.lock().unwrap().phase = SessionPhase::Presenting;

        wait_until_idle(&state).await;

        assert_eq!(state.lock().unwrap().phase, SessionPhase::Presenting);
    }
}
