//! Frequency and time-domain analysis over a fixed window.
//!
//! Mirrors the behaviour of a browser analyser node: Blackman window, FFT,
//! exponential smoothing between pulls, and decibel-to-byte mapping.

use crate::capture::SampleTap;
use crate::error::VizError;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Analysis window in samples.
pub const FFT_SIZE: usize = 2048;
/// Weight of the previous magnitude when smoothing consecutive pulls.
pub const SMOOTHING_TIME_CONSTANT: f32 = 0.8;
/// Magnitude mapped to byte 0.
pub const MIN_DECIBELS: f32 = -100.0;
/// Magnitude mapped to byte 255.
pub const MAX_DECIBELS: f32 = -30.0;

const BLACKMAN_ALPHA: f32 = 0.16;

/// Stateful analysis stage. All buffers are allocated once, at construction.
pub struct Analyser {
    fft: Arc<dyn Fft<f32>>,
    smoothing: f32,
    window: Vec<f32>,
    input: Vec<f32>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl Analyser {
    /// Builds an analyser for `fft_size` samples.
    ///
    /// # Errors
    /// - `VizError::AnalysisUnavailable` if `fft_size` is not a power of two in 32..=32768
    /// - `VizError::AnalysisUnavailable` if `smoothing` is outside 0..=1
    pub fn new(fft_size: usize, smoothing: f32) -> Result<Self, VizError> {
        if !fft_size.is_power_of_two() || !(32..=32768).contains(&fft_size) {
            return Err(VizError::AnalysisUnavailable(format!(
                "analysis window must be a power of two between 32 and 32768, got {fft_size}"
            )));
        }
        if !(0.0..=1.0).contains(&smoothing) {
            return Err(VizError::AnalysisUnavailable(format!(
                "smoothing must be between 0 and 1, got {smoothing}"
            )));
        }

        let fft = FftPlanner::new().plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            fft,
            smoothing,
            window: blackman_window(fft_size),
            input: vec![0.0; fft_size],
            spectrum: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            smoothed: vec![0.0; fft_size / 2],
        })
    }

    pub fn fft_size(&self) -> usize {
        self.input.len()
    }

    /// Number of frequency bins, and the length of both snapshot buffers.
    pub fn bin_count(&self) -> usize {
        self.input.len() / 2
    }

    /// Fills `out` with byte magnitudes for the lowest `out.len()` bins.
    pub fn frequency_bytes(&mut self, tap: &SampleTap, out: &mut [u8]) {
        tap.copy_latest(&mut self.input);
        self.update_smoothed_spectrum();

        let range = MAX_DECIBELS - MIN_DECIBELS;
        for (byte, &magnitude) in out.iter_mut().zip(self.smoothed.iter()) {
            let db = if magnitude > 0.0 {
                20.0 * magnitude.log10()
            } else {
                f32::NEG_INFINITY
            };
            let scaled = (255.0 / range) * (db - MIN_DECIBELS);
            *byte = scaled.floor().clamp(0.0, 255.0) as u8;
        }
    }

    /// Fills `out` with the most recent samples encoded around 128.
    pub fn time_domain_bytes(&mut self, tap: &SampleTap, out: &mut [u8]) {
        let len = out.len().min(self.input.len());
        let recent = &mut self.input[..len];
        tap.copy_latest(recent);

        for (byte, &sample) in out.iter_mut().zip(recent.iter()) {
            *byte = (128.0 * (sample + 1.0)).floor().clamp(0.0, 255.0) as u8;
        }
    }

    fn update_smoothed_spectrum(&mut self) {
        for ((slot, &sample), &w) in self
            .spectrum
            .iter_mut()
            .zip(self.input.iter())
            .zip(self.window.iter())
        {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        let scale = 1.0 / self.input.len() as f32;
        let tau = self.smoothing;
        for (prev, bin) in self.smoothed.iter_mut().zip(self.spectrum.iter()) {
            let magnitude = bin.norm() * scale;
            let next = tau * *prev + (1.0 - tau) * magnitude;
            // Keep NaN/inf from a bad sample out of the smoothing state
            *prev = if next.is_finite() { next } else { 0.0 };
        }
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    let a0 = 0.5 * (1.0 - BLACKMAN_ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * BLACKMAN_ALPHA;
    (0..size)
        .map(|i| {
            let x = i as f32 / size as f32;
            a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_tap(bin: usize, amplitude: f32) -> SampleTap {
        let tap = SampleTap::new(FFT_SIZE);
        let samples: Vec<f32> = (0..FFT_SIZE)
            .map(|i| amplitude * (2.0 * PI * bin as f32 * i as f32 / FFT_SIZE as f32).sin())
            .collect();
        tap.push_samples(&samples);
        tap
    }

    #[test]
    fn test_rejects_invalid_window() {
        assert!(Analyser::new(1000, 0.8).is_err());
        assert!(Analyser::new(16, 0.8).is_err());
        assert!(Analyser::new(FFT_SIZE, 1.5).is_err());
    }

    #[test]
    fn test_bin_count_is_half_the_window() {
        let analyser = Analyser::new(FFT_SIZE, SMOOTHING_TIME_CONSTANT).unwrap();
        assert_eq!(analyser.fft_size(), 2048);
        assert_eq!(analyser.bin_count(), 1024);
    }

    #[test]
    fn test_silence_maps_to_zero_and_midline() {
        let mut analyser = Analyser::new(FFT_SIZE, SMOOTHING_TIME_CONSTANT).unwrap();
        let tap = SampleTap::new(FFT_SIZE);

        let mut freq = vec![7u8; analyser.bin_count()];
        analyser.frequency_bytes(&tap, &mut freq);
        assert!(freq.iter().all(|&b| b == 0));

        let mut wave = vec![7u8; analyser.bin_count()];
        analyser.time_domain_bytes(&tap, &mut wave);
        assert!(wave.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let mut analyser = Analyser::new(FFT_SIZE, 0.0).unwrap();
        let tap = sine_tap(64, 0.01);

        let mut freq = vec![0u8; analyser.bin_count()];
        analyser.frequency_bytes(&tap, &mut freq);

        let peak = freq
            .iter()
            .enumerate()
            .max_by_key(|&(_, b)| *b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 64);
        assert!(freq[64] > 150);
        assert_eq!(freq[500], 0);
    }

    #[test]
    fn test_smoothing_rises_gradually() {
        let mut smooth = Analyser::new(FFT_SIZE, SMOOTHING_TIME_CONSTANT).unwrap();
        let mut raw = Analyser::new(FFT_SIZE, 0.0).unwrap();
        let tap = sine_tap(32, 0.01);

        let mut first = vec![0u8; smooth.bin_count()];
        let mut unsmoothed = vec![0u8; raw.bin_count()];
        smooth.frequency_bytes(&tap, &mut first);
        raw.frequency_bytes(&tap, &mut unsmoothed);
        assert!(first[32] < unsmoothed[32]);

        let mut later = vec![0u8; smooth.bin_count()];
        for _ in 0..50 {
            smooth.frequency_bytes(&tap, &mut later);
        }
        assert!(later[32] > first[32]);
        assert!(later[32].abs_diff(unsmoothed[32]) <= 1);
    }

    #[test]
    fn test_time_domain_encoding() {
        let mut analyser = Analyser::new(32, SMOOTHING_TIME_CONSTANT).unwrap();
        let tap = SampleTap::new(64);
        tap.push_samples(&[1.0, -1.0, 0.5, -0.5]);

        let mut wave = vec![0u8; analyser.bin_count()];
        analyser.time_domain_bytes(&tap, &mut wave);

        let tail = &wave[wave.len() - 4..];
        assert_eq!(tail, &[255, 0, 192, 64]);
        assert_eq!(wave[0], 128);
    }
}
