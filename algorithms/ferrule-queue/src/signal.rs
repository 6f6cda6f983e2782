//! Sticky wake flag for blocking consumers.
//!
//! A `wake` that arrives while nobody waits is remembered, so a consumer that
//! checks the ring, finds it empty, and then waits cannot miss a push that
//! landed in between. The flag may also be stale (set for an item the consumer
//! already took); callers re-check the ring after every wakeup.

use crate::types::Deadline;
use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub(crate) struct Signal {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    pub(crate) const fn new() -> Self {
        Self {
            flag: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Set the flag and wake one waiter, unless already set.
    pub(crate) fn wake(&self) {
        let mut flag = self.flag.lock();
        if !*flag {
            *flag = true;
            self.cond.notify_one();
        }
    }

    /// Wait for the flag until `deadline`, then consume it.
    ///
    /// Returns whether the flag was set.
    pub(crate) fn wait(&self, deadline: Deadline) -> bool {
        let mut flag = self.flag.lock();
        match deadline {
            Deadline::Now => {}
            Deadline::At(at) => {
                while !*flag {
                    if self.cond.wait_until(&mut flag, at).timed_out() {
                        break;
                    }
                }
            }
            Deadline::Never => {
                while !*flag {
                    self.cond.wait(&mut flag);
                }
            }
        }
        core::mem::replace(&mut *flag, false)
    }
}
