//! Frame pacing for the render loop.

use std::time::{Duration, Instant};

/// Hands out frame deadlines at a fixed rate.
///
/// A host that misses a deadline gets one frame, and the next deadline is
/// re-anchored to now rather than replaying the backlog.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
}

impl FrameClock {
    /// `frame_rate` is clamped to at least 1 fps.
    pub fn new(frame_rate: u32) -> Self {
        Self::starting_at(frame_rate, Instant::now())
    }

    fn starting_at(frame_rate: u32, now: Instant) -> Self {
        Self {
            interval: Duration::from_secs(1) / frame_rate.max(1),
            next: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left before the next frame is due.
    pub fn until_next_frame(&self) -> Duration {
        self.next.saturating_duration_since(Instant::now())
    }

    /// Returns true once per elapsed frame and schedules the next one.
    pub fn poll(&mut self) -> bool {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}
