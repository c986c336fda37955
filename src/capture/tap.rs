//! Shared circular sample buffer between the audio callback and the analyser.

use std::sync::{Arc, Mutex, MutexGuard};

/// Default ring size in mono samples. Comfortably larger than one analysis window.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Bounded ring of mono `f32` samples.
struct SampleRing {
    samples: Vec<f32>,
    write_pos: usize,
    filled: usize,
}

impl SampleRing {
    fn push(&mut self, sample: f32) {
        let capacity = self.samples.len();
        self.samples[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % capacity;
        self.filled = (self.filled + 1).min(capacity);
    }
}

/// Cloneable handle to a sample ring.
///
/// The device callback appends; the render thread copies the latest window out.
/// The lock is only held for the copy, never across a frame.
#[derive(Clone)]
pub struct SampleTap {
    ring: Arc<Mutex<SampleRing>>,
}

impl SampleTap {
    /// Creates an empty tap holding at most `capacity` samples (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Arc::new(Mutex::new(SampleRing {
                samples: vec![0.0; capacity],
                write_pos: 0,
                filled: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SampleRing> {
        // A panicked writer leaves plain floats behind, still readable.
        self.ring.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends mono samples.
    #[cfg(test)]
    pub fn push_samples(&self, data: &[f32]) {
        let mut ring = self.lock();
        for &sample in data {
            ring.push(sample);
        }
    }

    /// Downmixes interleaved frames to mono by averaging channels, then appends.
    pub fn push_interleaved<T>(&self, data: &[T], channels: usize)
    where
        T: cpal::Sample,
        f32: cpal::FromSample<T>,
    {
        if channels == 0 {
            return;
        }

        let mut ring = self.lock();
        for frame in data.chunks_exact(channels) {
            let sum: f32 = frame
                .iter()
                .map(|&s| <f32 as cpal::Sample>::from_sample(s))
                .sum();
            ring.push(sum / channels as f32);
        }
    }

    /// Copies the most recent `out.len()` samples into `out`, oldest first.
    ///
    /// Positions older than anything captured so far are filled with silence.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let ring = self.lock();
        let capacity = ring.samples.len();
        let available = ring.filled.min(out.len());
        let missing = out.len() - available;

        out[..missing].fill(0.0);

        let start = (ring.write_pos + capacity - available) % capacity;
        for (i, slot) in out[missing..].iter_mut().enumerate() {
            *slot = ring.samples[(start + i) % capacity];
        }
    }

    /// Number of samples captured so far, saturating at capacity.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().filled
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.lock().samples.len()
    }
}

impl Default for SampleTap {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_latest_returns_recent_samples_in_order() {
        let tap = SampleTap::new(8);
        tap.push_samples(&[1.0, 2.0, 3.0, 4.0]);

        let mut out = [0.0; 3];
        tap.copy_latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_ring_wraps_and_preserves_time_order() {
        let tap = SampleTap::new(5);
        tap.push_samples(&[1.0, 2.0, 3.0]);
        tap.push_samples(&[4.0, 5.0, 6.0]);

        let mut out = [0.0; 5];
        tap.copy_latest(&mut out);
        assert_eq!(out, [2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(tap.len(), 5);
    }

    #[test]
    fn test_missing_history_is_silence() {
        let tap = SampleTap::new(16);
        tap.push_samples(&[0.5, -0.5]);

        let mut out = [9.0; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 0.5, -0.5]);
    }

    #[test]
    fn test_request_larger_than_capacity() {
        let tap = SampleTap::new(2);
        tap.push_samples(&[1.0, 2.0, 3.0]);

        let mut out = [9.0; 4];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_interleaved_stereo_is_averaged() {
        let tap = SampleTap::new(8);
        tap.push_interleaved(&[0.5f32, 0.25, -1.0, 1.0], 2);

        let mut out = [0.0; 2];
        tap.copy_latest(&mut out);
        assert_eq!(out, [0.375, 0.0]);
    }

    #[test]
    fn test_interleaved_i16_is_normalized() {
        let tap = SampleTap::new(4);
        tap.push_interleaved(&[i16::MIN, 0i16], 1);

        let mut out = [0.0; 2];
        tap.copy_latest(&mut out);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_zero_channels_is_ignored() {
        let tap = SampleTap::new(4);
        tap.push_interleaved(&[1.0f32, 1.0], 0);
        assert!(tap.is_empty());
    }

    #[test]
    fn test_clones_share_the_ring() {
        let writer = SampleTap::new(4);
        let reader = writer.clone();
        writer.push_samples(&[0.25]);
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.capacity(), 4);
    }
}
