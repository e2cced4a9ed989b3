//! Resampler — piecewise-linear time-domain rate conversion.
//!
//! The original sample `i` sits at `t = i / orig_rate`; output sample `j` sits
//! at `t = j / new_rate`, stepping up to just under the original duration.
//! Each output value is the linear interpolation of the two neighbouring
//! input samples, clamped to the last sample past the end of the input.
//!
//! This is not a band-limited converter. It is good enough for the short
//! synthetic tones this crate produces, not for production audio.

/// Number of output samples produced when converting `len` samples.
///
/// Equals `ceil(len * new_rate / orig_rate)`, computed in integers so that
/// exact rate ratios never pick up a stray sample from float rounding.
pub fn resampled_len(len: usize, orig_rate: u32, new_rate: u32) -> usize {
    let num = len as u64 * new_rate as u64;
    let den = orig_rate as u64;
    num.div_ceil(den) as usize
}

/// Resample `samples` from `orig_rate` to `new_rate`.
///
/// Both rates must be non-zero; callers validate this.
pub fn resample(samples: &[f64], orig_rate: u32, new_rate: u32) -> Vec<f64> {
    debug_assert!(orig_rate > 0 && new_rate > 0);
    if orig_rate == new_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = resampled_len(samples.len(), orig_rate, new_rate);
    let last = samples.len() - 1;
    let step = orig_rate as f64 / new_rate as f64;

    tracing::debug!(
        from = orig_rate,
        to = new_rate,
        in_len = samples.len(),
        out_len,
        "resampling buffer"
    );

    (0..out_len)
        .map(|j| {
            // Fractional read position in input-sample units.
            let position = j as f64 * step;
            let idx = position.floor() as usize;
            if idx >= last {
                return samples[last];
            }
            let frac = position - idx as f64;
            samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
        })
        .collect()
}
