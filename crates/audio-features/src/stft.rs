//! Short-Time Fourier Transform

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Magnitude spectrogram: `frames` rows, `n_fft / 2 + 1` bins per row.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Per-frame magnitude spectra
    pub frames: Vec<Vec<f64>>,
    /// Sample rate of the source waveform (Hz)
    pub sample_rate: u32,
    /// FFT size used to produce the frames
    pub n_fft: usize,
}

impl Spectrogram {
    /// Number of frequency bins per frame
    pub fn bin_count(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Center frequency of a bin (Hz)
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / self.n_fft as f64
    }

    /// Nyquist frequency (Hz)
    pub fn nyquist(&self) -> f64 {
        self.sample_rate as f64 / 2.0
    }
}

/// Windowed STFT over a mono waveform.
///
/// Frames are centered: the signal is reflect-padded by `n_fft / 2` on both
/// sides so frame `t` is centered on sample `t * hop`.
pub struct StftProcessor {
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    n_fft: usize,
    hop: usize,
}

impl StftProcessor {
    /// Create a processor with a periodic Hann window.
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n_fft);
        let window = (0..n_fft)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / n_fft as f64).cos()))
            .collect();

        Self { fft, window, n_fft, hop }
    }

    /// Compute the magnitude spectrogram of a waveform.
    ///
    /// An empty signal yields a spectrogram with no frames.
    pub fn magnitude_spectrogram(&self, samples: &[f32], sample_rate: u32) -> Spectrogram {
        if samples.is_empty() {
            return Spectrogram { frames: Vec::new(), sample_rate, n_fft: self.n_fft };
        }
        let padded = reflect_pad(samples, self.n_fft / 2);
        let bins = self.n_fft / 2 + 1;

        let mut frames = Vec::new();
        let mut buffer = vec![Complex::new(0.0, 0.0); self.n_fft];

        let mut start = 0;
        while start + self.n_fft <= padded.len() {
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process(&mut buffer);

            frames.push(buffer[..bins].iter().map(|c| c.norm()).collect());
            start += self.hop;
        }

        Spectrogram { frames, sample_rate, n_fft: self.n_fft }
    }
}

/// Reflect-pad a signal by `pad` samples on each side, without repeating the
/// edge sample. Signals shorter than `pad` bounce between both edges.
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f64> {
    let len = samples.len();
    let total = len + 2 * pad;
    let mut out = Vec::with_capacity(total);
    for j in 0..total {
        let i = j as isize - pad as isize;
        out.push(samples[reflect_index(i, len)] as f64);
    }
    out
}

fn reflect_index(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut k = i.rem_euclid(period as isize) as usize;
    if k >= len {
        k = period - k;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_index_mirrors_without_edge_repeat() {
        // signal [a b c d]: index -1 → b, -2 → c, 4 → c, 5 → b
        assert_eq!(reflect_index(-1, 4), 1);
        assert_eq!(reflect_index(-2, 4), 2);
        assert_eq!(reflect_index(4, 4), 2);
        assert_eq!(reflect_index(5, 4), 1);
        assert_eq!(reflect_index(0, 4), 0);
    }

    #[test]
    fn test_reflect_pad_short_signal() {
        let padded = reflect_pad(&[1.0, 2.0], 3);
        assert_eq!(padded.len(), 8);
        // bounces: 2 1 2 | 1 2 | 1 2 1
        assert_eq!(padded, vec![2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sine_peak_lands_in_right_bin() {
        let sr = 8_000u32;
        let freq = 500.0;
        let samples: Vec<f32> = (0..8_192)
            .map(|i| (2.0 * std::f32::consts::PI * freq as f32 * i as f32 / sr as f32).sin())
            .collect();

        let stft = StftProcessor::new(2048, 512);
        let spec = stft.magnitude_spectrogram(&samples, sr);
        assert!(!spec.frames.is_empty());
        assert_eq!(spec.frames[0].len(), spec.bin_count());

        // dominant bin of a mid-stream frame should sit near 500 Hz
        let frame = &spec.frames[spec.frames.len() / 2];
        let peak_bin = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert!((spec.bin_frequency(peak_bin) - freq).abs() < 10.0);
    }

    #[test]
    fn test_empty_signal_yields_no_frames() {
        // Waveform fields are public, so an empty signal can reach the STFT
        // without going through decode's emptiness check
        let stft = StftProcessor::new(2048, 512);
        let spec = stft.magnitude_spectrogram(&[], 16_000);
        assert!(spec.frames.is_empty());
        assert_eq!(spec.bin_count(), 1025);
    }

    #[test]
    fn test_frame_count_is_stable() {
        let samples = vec![0.25f32; 4_096];
        let stft = StftProcessor::new(2048, 512);
        let a = stft.magnitude_spectrogram(&samples, 16_000);
        let b = stft.magnitude_spectrogram(&samples, 16_000);
        assert_eq!(a.frames.len(), b.frames.len());
        assert_eq!(a.frames, b.frames);
    }
}
