//! Background thread that keeps a platform event loop serviced.
//!
//! The thread runs no capture logic and never touches the frame queue. It
//! exists only so that platforms which dispatch device notifications through
//! a run loop have one running for as long as the stream is live.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::event_loop::{EventLoop, LoopWaker};

/// Upper bound on how long one `run_for` call may block before the running
/// flag is checked again.
pub const EVENT_SLICE: Duration = Duration::from_millis(250);

/// Owned, joinable helper thread servicing an `EventLoop`.
pub struct EventLoopThread {
    running: Arc<AtomicBool>,
    waker: Box<dyn LoopWaker>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl EventLoopThread {
    /// Spawn a thread named `name`, attach `L` on it, and start servicing it.
    ///
    /// Returns once the loop is attached. If attaching fails the thread is
    /// joined before the error is returned.
    pub fn spawn<L: EventLoop>(name: &str) -> Result<Self, CaptureError> {
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let mut event_loop = match L::attach() {
                    Ok(event_loop) => event_loop,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if ready_tx.send(Ok(event_loop.waker())).is_err() {
                    return;
                }
                while thread_running.load(Ordering::Acquire) {
                    event_loop.run_for(EVENT_SLICE);
                }
            })
            .map_err(|e| CaptureError::ThreadSpawn(e.to_string()))?;

        let ready = ready_rx
            .recv()
            .map_err(|_| CaptureError::ThreadSpawn(format!("{} exited before attaching", name)));
        match ready.and_then(|attached| attached) {
            Ok(waker) => Ok(Self {
                running,
                waker,
                handle: Mutex::new(Some(handle)),
            }),
            Err(e) => {
                let _ = handle.join();
                Err(e)
            }
        }
    }

    /// Whether the thread has been started and not yet stopped.
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Signal the loop to exit and join the thread. Safe to call repeatedly.
    pub fn stop(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        self.running.store(false, Ordering::Release);
        self.waker.wake();
        if handle.join().is_err() {
            log::error!("event loop thread panicked");
        }
    }
}

impl Drop for EventLoopThread {
    fn drop(&mut self) {
        self.stop();
    }
}
