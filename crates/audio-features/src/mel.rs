//! Mel Filterbank and Cepstral Coefficients

use crate::stft::Spectrogram;

const DB_FLOOR: f64 = 1e-10;

/// Convert Hz to mel (HTK formula)
fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Convert mel to Hz (HTK formula)
fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filterbank, `n_mels` rows of `n_fft / 2 + 1` weights.
///
/// Filters span 0 Hz to Nyquist and are area-normalized so wider filters do
/// not dominate the band energies.
pub fn mel_filterbank(n_mels: usize, n_fft: usize, sample_rate: u32) -> Vec<Vec<f64>> {
    let bins = n_fft / 2 + 1;
    let nyquist = sample_rate as f64 / 2.0;

    let mel_max = hz_to_mel(nyquist);
    let band_edges: Vec<f64> = (0..n_mels + 2)
        .map(|m| mel_to_hz(mel_max * m as f64 / (n_mels + 1) as f64))
        .collect();

    let bin_freq = |bin: usize| bin as f64 * sample_rate as f64 / n_fft as f64;

    let mut filters = vec![vec![0.0; bins]; n_mels];
    for m in 0..n_mels {
        let (lower, center, upper) = (band_edges[m], band_edges[m + 1], band_edges[m + 2]);
        let norm = 2.0 / (upper - lower);
        for (bin, weight) in filters[m].iter_mut().enumerate() {
            let f = bin_freq(bin);
            if f > lower && f < center {
                *weight = norm * (f - lower) / (center - lower);
            } else if f >= center && f < upper {
                *weight = norm * (upper - f) / (upper - center);
            }
        }
    }
    filters
}

/// Mel spectrogram over the power spectrum: `frames × n_mels`.
pub fn mel_spectrogram(spec: &Spectrogram, filterbank: &[Vec<f64>]) -> Vec<Vec<f64>> {
    spec.frames
        .iter()
        .map(|frame| {
            filterbank
                .iter()
                .map(|filter| {
                    filter
                        .iter()
                        .zip(frame)
                        .map(|(w, m)| w * m * m)
                        .sum::<f64>()
                })
                .collect()
        })
        .collect()
}

/// Power to decibels with a fixed floor to keep the log finite
pub fn power_to_db(power: f64) -> f64 {
    10.0 * power.max(DB_FLOOR).log10()
}

/// Mel-frequency cepstral coefficients: `frames × n_mfcc`.
///
/// Orthonormal DCT-II of the dB-scaled mel spectrogram, lowest `n_mfcc`
/// coefficients kept.
pub fn mfcc(mel_frames: &[Vec<f64>], n_mfcc: usize) -> Vec<Vec<f64>> {
    mel_frames
        .iter()
        .map(|bands| {
            let n = bands.len();
            let log_bands: Vec<f64> = bands.iter().map(|&p| power_to_db(p)).collect();
            (0..n_mfcc.min(n))
                .map(|k| {
                    let scale = if k == 0 {
                        (1.0 / n as f64).sqrt()
                    } else {
                        (2.0 / n as f64).sqrt()
                    };
                    let sum: f64 = log_bands
                        .iter()
                        .enumerate()
                        .map(|(i, &x)| {
                            x * (std::f64::consts::PI * (i as f64 + 0.5) * k as f64 / n as f64)
                                .cos()
                        })
                        .sum();
                    scale * sum
                })
                .collect()
        })
        .collect()
}
