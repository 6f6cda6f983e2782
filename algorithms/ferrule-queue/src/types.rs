//! Shared types used across the ferrule-queue library.

use std::error;
use std::fmt;
use std::time::{Duration, Instant};

// =============================================================================
// TIMEOUT
// =============================================================================

/// How long a pop may block waiting for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Check once and return immediately.
    #[default]
    Poll,
    /// Wait at most this long.
    After(Duration),
    /// Wait until an item arrives.
    Forever,
}

impl Timeout {
    /// Map a C-style millisecond timeout: negative waits forever, zero polls.
    pub fn from_millis(ms: i32) -> Self {
        match ms {
            0 => Self::Poll,
            ms if ms < 0 => Self::Forever,
            ms => Self::After(Duration::from_millis(u64::from(ms.unsigned_abs()))),
        }
    }

    /// Fix the point in time this timeout expires, measured from now.
    pub(crate) fn deadline(self) -> Deadline {
        match self {
            Self::Poll => Deadline::Now,
            Self::After(d) if d.is_zero() => Deadline::Now,
            Self::After(d) => Instant::now().checked_add(d).map_or(Deadline::Never, Deadline::At),
            Self::Forever => Deadline::Never,
        }
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::After(d)
    }
}

/// Absolute form of a [`Timeout`], computed once per pop so that wakeups
/// which find no data do not extend the total wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deadline {
    Now,
    At(Instant),
    Never,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned when creating a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// A queue needs at least one slot.
    ZeroCapacity,
    /// Byte slots need room for at least one byte.
    ZeroSlotSize,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => f.write_str("queue capacity must be at least 1"),
            Self::ZeroSlotSize => f.write_str("queue slot size must be at least 1 byte"),
        }
    }
}

impl error::Error for QueueError {}
