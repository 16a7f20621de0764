use std::thread::{self, Thread};
use std::time::Duration;

use crate::models::error::CaptureError;

/// A platform event-dispatch mechanism serviced by a dedicated thread.
pub trait EventLoop: Sized + 'static {
    /// Bind to the calling thread. Called on the helper thread itself.
    fn attach() -> Result<Self, CaptureError>;

    /// Handle that can interrupt `run_for` from another thread.
    fn waker(&self) -> Box<dyn LoopWaker>;

    /// Dispatch pending events for at most `slice`, returning early if woken.
    fn run_for(&mut self, slice: Duration);
}

/// Cross-thread handle that interrupts a running `EventLoop`.
pub trait LoopWaker: Send + Sync {
    fn wake(&self);
}

/// Event loop for platforms with nothing to dispatch: parks the thread.
pub struct ParkingLoop {
    thread: Thread,
}

struct ParkingWaker(Thread);

impl LoopWaker for ParkingWaker {
    fn wake(&self) {
        self.0.unpark();
    }
}

impl EventLoop for ParkingLoop {
    fn attach() -> Result<Self, CaptureError> {
        Ok(Self {
            thread: thread::current(),
        })
    }

    fn waker(&self) -> Box<dyn LoopWaker> {
        Box::new(ParkingWaker(self.thread.clone()))
    }

    fn run_for(&mut self, slice: Duration) {
        thread::park_timeout(slice);
    }
}
