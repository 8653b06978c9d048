//! Level and pitch measurement of rendered PCM.
//!
//! Used by the `analyze` command and by tests that check what a render
//! actually sounds like.

use rustfft::{num_complex::Complex, FftPlanner};

/// Longest stretch of audio fed to the FFT.
pub const MAX_FFT_LEN: usize = 65_536;
/// Bins below this are ignored when looking for the dominant partial.
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

const FULL_SCALE: f32 = 32_768.0;

/// Largest absolute sample, normalised so that full scale is 1.0.
pub fn peak_level(samples: &[i16]) -> f32 {
    samples
        .iter()
        .map(|&s| (s as i32).unsigned_abs())
        .max()
        .map_or(0.0, |peak| peak as f32 / FULL_SCALE)
}

/// Root-mean-square level, normalised like [`peak_level`].
pub fn rms_level(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let x = s as f64 / FULL_SCALE as f64;
            x * x
        })
        .sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Frequency of the strongest partial in the first [`MAX_FFT_LEN`] samples.
///
/// Hann-windowed magnitude spectrum; the peak bin is refined by fitting a
/// parabola through it and its neighbours on a log scale. Returns `None`
/// for silence or when there is too little audio to resolve anything above
/// [`MIN_FREQUENCY_HZ`].
pub fn dominant_frequency(samples: &[i16], sample_rate: u32) -> Option<f32> {
    let len = samples.len().min(MAX_FFT_LEN);
    if len < 4 || sample_rate == 0 {
        return None;
    }

    let denom = (len - 1) as f32;
    let mut buffer: Vec<Complex<f32>> = samples[..len]
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            // Hann window
            let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / denom).cos());
            Complex::new(s as f32 / FULL_SCALE * w, 0.0)
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(len);
    fft.process(&mut buffer);

    let bin_hz = sample_rate as f32 / len as f32;
    let half = len / 2;
    let first = ((MIN_FREQUENCY_HZ / bin_hz).ceil() as usize).max(1);
    if first + 1 >= half {
        return None;
    }

    let magnitudes: Vec<f32> = buffer[..half].iter().map(|c| c.norm()).collect();
    let (peak, &peak_mag) = magnitudes[first..half - 1]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, m)| (i + first, m))?;
    if peak_mag <= f32::EPSILON {
        return None;
    }

    let ln = |m: f32| m.max(1e-12).ln();
    let (a, b, c) = (
        ln(magnitudes[peak - 1]),
        ln(peak_mag),
        ln(magnitudes[peak + 1]),
    );
    let curvature = a - 2.0 * b + c;
    let offset = if curvature.abs() > f32::EPSILON {
        (0.5 * (a - c) / curvature).clamp(-0.5, 0.5)
    } else {
        0.0
    };

    Some((peak as f32 + offset) * bin_hz)
}
