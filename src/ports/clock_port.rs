//! Time source port trait.
//!
//! The decision loop never sleeps directly; it asks the clock to wait until
//! the next cycle, so tests and replay runs can substitute a clock that does
//! not block.

use std::time::Duration;

pub trait ClockPort {
    fn sleep(&self, duration: Duration);
}
