// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Deferred stop of a playing tone
//!
//! Each armed tone gets its own timer thread. The thread sleeps on a wake-up
//! channel until the deadline; waking early means the tone was cancelled.
//! When the deadline passes it takes the link lock, re-checks the
//! cancellation token and the connection state, and only then writes the stop
//! frame. `cancel()` is called with the link lock held, so a cancel and a
//! fire can never both win.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{DeviceError, Result};
use crate::link::SharedLink;

/// Lifecycle of one tone request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneState {
    /// Nothing scheduled yet
    Idle,
    /// Stop frame pending until `deadline`
    Armed { deadline: Instant },
    /// Deadline elapsed, stop frame written
    Fired,
    /// Cancelled before the deadline, no stop frame written
    Cancelled,
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A tone whose timer thread may still be running
pub(crate) struct ToneTask {
    token: CancellationToken,
    wake: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl ToneTask {
    /// Wait for the timer thread to exit
    pub(crate) fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if let Err(e) = thread.join() {
                warn!("[TONE] Timer thread panicked: {:?}", e);
            }
        }
    }
}

/// Schedules the stop frame of the current tone
pub(crate) struct ToneScheduler {
    current: Option<ToneTask>,
    state: Arc<Mutex<ToneState>>,
}

impl ToneScheduler {
    pub(crate) fn new() -> Self {
        Self {
            current: None,
            state: Arc::new(Mutex::new(ToneState::Idle)),
        }
    }

    /// State of the most recent tone request
    pub(crate) fn state(&self) -> ToneState {
        *self.state.lock()
    }

    /// Write `stop_frame` through `link` once `delay` has elapsed
    ///
    /// Any previously armed tone must have been cancelled first.
    pub(crate) fn arm(&mut self, link: SharedLink, delay: Duration, stop_frame: [u8; 3]) -> Result<()> {
        debug_assert!(self.current.is_none(), "previous tone still armed");

        let token = CancellationToken::new();
        let (wake_tx, wake_rx) = channel::bounded::<()>(1);
        let deadline = Instant::now() + delay;
        let state = Arc::new(Mutex::new(ToneState::Armed { deadline }));

        let thread_token = token.clone();
        let thread_state = Arc::clone(&state);
        let thread = thread::Builder::new()
            .name("phiro-tone".to_string())
            .spawn(move || {
                // Any wake-up before the deadline, including a dropped sender, is a cancel
                match wake_rx.recv_deadline(deadline) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        *thread_state.lock() = ToneState::Cancelled;
                        debug!("[TONE] Stop cancelled before deadline");
                        return;
                    }
                }

                let mut link = link.lock();
                if thread_token.is_cancelled() || !link.is_connected() {
                    *thread_state.lock() = ToneState::Cancelled;
                    debug!("[TONE] Stop cancelled at deadline");
                    return;
                }
                if let Err(e) = link.send_frame(&stop_frame) {
                    warn!("[TONE] Failed to write stop frame: {}", e);
                }
                *thread_state.lock() = ToneState::Fired;
                debug!("[TONE] Stop frame written");
            })
            .map_err(|e| DeviceError::ThreadError(format!("Failed to spawn tone timer: {}", e)))?;

        self.state = state;
        self.current = Some(ToneTask {
            token,
            wake: wake_tx,
            thread: Some(thread),
        });
        Ok(())
    }

    /// Cancel the armed tone, if any
    ///
    /// Must be called with the link lock held. The returned task should be
    /// joined after the lock is released.
    pub(crate) fn cancel(&mut self) -> Option<ToneTask> {
        let task = self.current.take()?;
        task.token.cancel();
        // Full channel or finished thread: the token alone is enough
        let _ = task.wake.try_send(());
        Some(task)
    }
}

impl Drop for ToneTask {
    fn drop(&mut self) {
        self.token.cancel();
        let _ = self.wake.try_send(());
    }
}
