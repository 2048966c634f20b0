//! Feature Vector Assembly

use crate::decode::Waveform;
use crate::mel::{mel_filterbank, mel_spectrogram, mfcc, power_to_db};
use crate::statistics::Summary;
use crate::stft::{Spectrogram, StftProcessor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of scalar features in the vector
pub const FEATURE_COUNT: usize = 18;

/// Fixed feature-name vocabulary, in extraction order.
///
/// Downstream consumers (the persisted training tables and the trained model
/// artifacts) refer to features by these names; the list is a schema contract
/// and must not be reordered.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "T_rms_mean",
    "T_rms_std",
    "T_zcr_mean",
    "T_zcr_std",
    "F_mel_mean",
    "F_mel_std",
    "F_mel_rms_mean",
    "F_mel_rms_std",
    "F_mfcc_mean",
    "F_mfcc_std",
    "F_flatness_mean",
    "F_flatness_std",
    "F_bandwidth_mean",
    "F_bandwidth_std",
    "F_contrast_mean",
    "F_contrast_std",
    "F_rolloff_mean",
    "F_rolloff_std",
];

/// Scalar summary statistics of one recording, aligned with [`FEATURE_NAMES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Value by feature name, `None` for names outside the vocabulary
    pub fn value(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.values[i])
    }

    /// All values in schema order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.values.iter().copied())
    }
}

/// Extraction parameters.
///
/// The defaults match the persisted training tables; changing them breaks the
/// feature contract with already-trained model artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// FFT size (also the time-domain frame length)
    pub n_fft: usize,
    /// Hop between frames (samples)
    pub hop: usize,
    /// Mel filterbank size
    pub n_mels: usize,
    /// Number of cepstral coefficients
    pub n_mfcc: usize,
    /// Cumulative-energy fraction for spectral roll-off
    pub rolloff_fraction: f64,
    /// Lowest octave-band edge for spectral contrast (Hz)
    pub contrast_fmin: f64,
    /// Number of octave bands above the base band for spectral contrast
    pub contrast_bands: usize,
    /// Fraction of band bins treated as peak / valley for spectral contrast
    pub contrast_quantile: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop: 512,
            n_mels: 128,
            n_mfcc: 20,
            rolloff_fraction: 0.85,
            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,
        }
    }
}

/// Extracts the fixed feature schema from decoded waveforms.
///
/// The magnitude spectrogram is computed once per recording and reused by
/// every spectral statistic. Extraction is pure: identical input bytes yield
/// a bitwise-identical vector.
pub struct FeatureExtractor {
    config: ExtractorConfig,
    stft: StftProcessor,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl FeatureExtractor {
    /// Create an extractor with the given parameters
    pub fn new(config: ExtractorConfig) -> Self {
        let stft = StftProcessor::new(config.n_fft, config.hop);
        Self { config, stft }
    }

    /// Extract the full feature vector from a waveform.
    pub fn extract(&self, wave: &Waveform) -> FeatureVector {
        let cfg = &self.config;

        // time-domain statistics on centered frames
        let rms = frame_rms(&wave.samples, cfg.n_fft, cfg.hop);
        let zcr = frame_zcr(&wave.samples, cfg.n_fft, cfg.hop);

        // spectrogram computed once, shared by all spectral statistics
        let spec = self.stft.magnitude_spectrogram(&wave.samples, wave.sample_rate);
        debug!(
            frames = spec.frames.len(),
            sample_rate = wave.sample_rate,
            "computed spectrogram"
        );

        let filterbank = mel_filterbank(cfg.n_mels, cfg.n_fft, wave.sample_rate);
        let mel = mel_spectrogram(&spec, &filterbank);
        let cepstra = mfcc(&mel, cfg.n_mfcc);

        let freq_rms = spectrogram_rms(&spec);
        let flatness = spectral_flatness(&spec);
        let bandwidth = spectral_bandwidth(&spec);
        let contrast = spectral_contrast(
            &spec,
            cfg.contrast_fmin,
            cfg.contrast_bands,
            cfg.contrast_quantile,
        );
        let rolloff = spectral_rolloff(&spec, cfg.rolloff_fraction);

        let t_rms = Summary::compute(&rms);
        let t_zcr = Summary::compute(&zcr);
        let f_mel = Summary::compute_2d(&mel);
        let f_mel_rms = Summary::compute(&freq_rms);
        let f_mfcc = Summary::compute_2d(&cepstra);
        let f_flatness = Summary::compute(&flatness);
        let f_bandwidth = Summary::compute(&bandwidth);
        let f_contrast = Summary::compute_2d(&contrast);
        let f_rolloff = Summary::compute(&rolloff);

        FeatureVector {
            values: [
                t_rms.mean,
                t_rms.std_dev,
                t_zcr.mean,
                t_zcr.std_dev,
                f_mel.mean,
                f_mel.std_dev,
                f_mel_rms.mean,
                f_mel_rms.std_dev,
                f_mfcc.mean,
                f_mfcc.std_dev,
                f_flatness.mean,
                f_flatness.std_dev,
                f_bandwidth.mean,
                f_bandwidth.std_dev,
                f_contrast.mean,
                f_contrast.std_dev,
                f_rolloff.mean,
                f_rolloff.std_dev,
            ],
        }
    }
}

/// Centered zero-padded frame starts over a signal
fn frame_starts(len: usize, hop: usize) -> impl Iterator<Item = isize> {
    let frames = len / hop + 1;
    (0..frames).map(move |t| t as isize * hop as isize)
}

/// Per-frame root-mean-square energy of the raw signal
fn frame_rms(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f64> {
    let half = frame_len as isize / 2;
    frame_starts(samples.len(), hop)
        .map(|center| {
            let mut sum_sq = 0.0;
            for i in (center - half)..(center + half) {
                if i >= 0 && (i as usize) < samples.len() {
                    let v = samples[i as usize] as f64;
                    sum_sq += v * v;
                }
            }
            (sum_sq / frame_len as f64).sqrt()
        })
        .collect()
}

/// Per-frame zero-crossing rate of the raw signal
fn frame_zcr(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f64> {
    let half = frame_len as isize / 2;
    frame_starts(samples.len(), hop)
        .map(|center| {
            let mut crossings = 0usize;
            for i in (center - half + 1)..(center + half) {
                let (a, b) = (i - 1, i);
                if a >= 0 && (b as usize) < samples.len() {
                    let prev = samples[a as usize];
                    let curr = samples[b as usize];
                    if (prev >= 0.0) != (curr >= 0.0) {
                        crossings += 1;
                    }
                }
            }
            crossings as f64 / frame_len as f64
        })
        .collect()
}

/// Per-frame RMS over spectrogram magnitudes
fn spectrogram_rms(spec: &Spectrogram) -> Vec<f64> {
    spec.frames
        .iter()
        .map(|frame| {
            let sum_sq: f64 = frame.iter().map(|m| m * m).sum();
            (sum_sq / frame.len() as f64).sqrt()
        })
        .collect()
}

/// Per-frame spectral flatness: geometric over arithmetic mean of power
fn spectral_flatness(spec: &Spectrogram) -> Vec<f64> {
    const EPS: f64 = 1e-10;
    spec.frames
        .iter()
        .map(|frame| {
            let n = frame.len() as f64;
            let log_sum: f64 = frame.iter().map(|m| (m * m + EPS).ln()).sum();
            let geometric = (log_sum / n).exp();
            let arithmetic = frame.iter().map(|m| m * m).sum::<f64>() / n + EPS;
            geometric / arithmetic
        })
        .collect()
}

/// Per-frame spectral bandwidth about the magnitude centroid
fn spectral_bandwidth(spec: &Spectrogram) -> Vec<f64> {
    spec.frames
        .iter()
        .map(|frame| {
            let total: f64 = frame.iter().sum();
            if total <= 0.0 {
                return 0.0;
            }
            let centroid: f64 = frame
                .iter()
                .enumerate()
                .map(|(bin, m)| spec.bin_frequency(bin) * m)
                .sum::<f64>()
                / total;
            let spread: f64 = frame
                .iter()
                .enumerate()
                .map(|(bin, m)| {
                    let d = spec.bin_frequency(bin) - centroid;
                    (m / total) * d * d
                })
                .sum();
            spread.sqrt()
        })
        .collect()
}

/// Spectral contrast: peak-to-valley dB spread per octave band.
///
/// Bands are `[0, fmin)` followed by `n_bands` octaves above `fmin`, clamped
/// at Nyquist. Returns one row per band, one column per frame.
fn spectral_contrast(
    spec: &Spectrogram,
    fmin: f64,
    n_bands: usize,
    quantile: f64,
) -> Vec<Vec<f64>> {
    let mut edges = vec![0.0, fmin];
    for k in 1..=n_bands {
        edges.push(fmin * (1u64 << k) as f64);
    }

    let band_bins: Vec<Vec<usize>> = edges
        .windows(2)
        .map(|edge| {
            (0..spec.bin_count())
                .filter(|&bin| {
                    let f = spec.bin_frequency(bin);
                    f >= edge[0] && f < edge[1].min(spec.nyquist() + 1.0)
                })
                .collect()
        })
        .collect();

    band_bins
        .iter()
        .map(|bins| {
            spec.frames
                .iter()
                .map(|frame| {
                    if bins.is_empty() {
                        return 0.0;
                    }
                    let mut power: Vec<f64> = bins.iter().map(|&b| frame[b] * frame[b]).collect();
                    power.sort_by(f64::total_cmp);

                    let take = ((power.len() as f64 * quantile).round() as usize).max(1);
                    let valley: f64 = power[..take].iter().sum::<f64>() / take as f64;
                    let peak: f64 =
                        power[power.len() - take..].iter().sum::<f64>() / take as f64;
                    power_to_db(peak) - power_to_db(valley)
                })
                .collect()
        })
        .collect()
}

/// Per-frame roll-off frequency: lowest bin reaching the cumulative-energy
/// fraction of the frame's total magnitude.
fn spectral_rolloff(spec: &Spectrogram, fraction: f64) -> Vec<f64> {
    spec.frames
        .iter()
        .map(|frame| {
            let total: f64 = frame.iter().sum();
            if total <= 0.0 {
                return 0.0;
            }
            let threshold = fraction * total;
            let mut cumulative = 0.0;
            for (bin, m) in frame.iter().enumerate() {
                cumulative += m;
                if cumulative >= threshold {
                    return spec.bin_frequency(bin);
                }
            }
            spec.nyquist()
        })
        .collect()
}
