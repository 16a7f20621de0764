//! CFRunLoop-backed `EventLoop` for the capture helper thread.

use std::thread::{self, Thread};
use std::time::Duration;

use core_foundation_sys::base::{CFRelease, CFRetain, CFTypeRef};
use core_foundation_sys::runloop::{
    kCFRunLoopDefaultMode, kCFRunLoopRunFinished, CFRunLoopGetCurrent, CFRunLoopRef,
    CFRunLoopRunInMode, CFRunLoopStop, CFRunLoopWakeUp,
};

use pcm_capture_core::{CaptureError, EventLoop, LoopWaker};

/// Retained reference to a thread's run loop.
struct RetainedRunLoop(CFRunLoopRef);

// SAFETY: CFRunLoopStop and CFRunLoopWakeUp may be called from any thread,
// and the retain keeps the run loop alive after its thread exits.
unsafe impl Send for RetainedRunLoop {}
unsafe impl Sync for RetainedRunLoop {}

impl RetainedRunLoop {
    fn current() -> Self {
        // SAFETY: CFRunLoopGetCurrent never returns null; the retain is
        // balanced in Drop.
        unsafe {
            let run_loop = CFRunLoopGetCurrent();
            CFRetain(run_loop as CFTypeRef);
            Self(run_loop)
        }
    }
}

impl Clone for RetainedRunLoop {
    fn clone(&self) -> Self {
        // SAFETY: self.0 is retained for as long as self lives.
        unsafe {
            CFRetain(self.0 as CFTypeRef);
        }
        Self(self.0)
    }
}

impl Drop for RetainedRunLoop {
    fn drop(&mut self) {
        // SAFETY: balances the retain taken on construction or clone.
        unsafe { CFRelease(self.0 as CFTypeRef) }
    }
}

/// The helper thread's CFRunLoop.
///
/// `CFRunLoopRunInMode` returns immediately while no sources are attached, so
/// an idle loop parks the thread for the slice instead of spinning.
pub struct CfRunLoop {
    run_loop: RetainedRunLoop,
    thread: Thread,
}

struct CfRunLoopWaker {
    run_loop: RetainedRunLoop,
    thread: Thread,
}

impl LoopWaker for CfRunLoopWaker {
    fn wake(&self) {
        // SAFETY: the run loop reference is retained by the waker.
        unsafe {
            CFRunLoopStop(self.run_loop.0);
            CFRunLoopWakeUp(self.run_loop.0);
        }
        self.thread.unpark();
    }
}

impl EventLoop for CfRunLoop {
    fn attach() -> Result<Self, CaptureError> {
        Ok(Self {
            run_loop: RetainedRunLoop::current(),
            thread: thread::current(),
        })
    }

    fn waker(&self) -> Box<dyn LoopWaker> {
        Box::new(CfRunLoopWaker {
            run_loop: self.run_loop.clone(),
            thread: self.thread.clone(),
        })
    }

    fn run_for(&mut self, slice: Duration) {
        // SAFETY: called on the thread that owns the run loop.
        let result = unsafe { CFRunLoopRunInMode(kCFRunLoopDefaultMode, slice.as_secs_f64(), 0) };
        if result == kCFRunLoopRunFinished {
            thread::park_timeout(slice);
        }
    }
}
