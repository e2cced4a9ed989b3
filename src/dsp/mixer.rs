//! Mixer — combines buffers in time.
//!
//! Both operands are brought to the higher of their two sample rates before
//! they are combined. Mixing is additive and never clips; callers own the
//! overall level.

use crate::error::{Result, invalid};

use super::buffer::{SampleBuffer, samples_for};

/// Play `b` on top of `a`, starting `offset` seconds into `a`.
///
/// The result lasts `max(a.duration(), offset + b.duration())`. Samples that
/// would fall past the end of the result are dropped.
pub fn overlay(a: &SampleBuffer, b: &SampleBuffer, offset: f64) -> Result<SampleBuffer> {
    if !offset.is_finite() || offset < 0.0 {
        return Err(invalid(format!("overlay offset must be non-negative, got {offset}")));
    }

    let rate = a.sample_rate().max(b.sample_rate());
    let duration = a.duration().max(offset + b.duration());
    let mut result = SampleBuffer::silence(duration, rate)?;
    let out = result.samples_mut();

    let a_data = a.samples_at(rate);
    let n = a_data.len().min(out.len());
    out[..n].copy_from_slice(&a_data[..n]);

    let start = samples_for(offset, rate)?.min(out.len());
    let b_data = b.samples_at(rate);
    let n = b_data.len().min(out.len() - start);
    for (dst, src) in out[start..start + n].iter_mut().zip(&b_data[..n]) {
        *dst += src;
    }

    Ok(result)
}

/// Play `b` right after `a`.
pub fn sequence(a: &SampleBuffer, b: &SampleBuffer) -> Result<SampleBuffer> {
    overlay(a, b, a.duration())
}

/// Multiply every sample by `factor`.
pub fn scale(a: &SampleBuffer, factor: f64) -> SampleBuffer {
    let mut out = a.clone();
    for s in out.samples_mut() {
        *s *= factor;
    }
    out
}

/// `count` back-to-back copies of `a`.
pub fn repeat(a: &SampleBuffer, count: usize) -> Result<SampleBuffer> {
    if count < 1 {
        return Err(invalid(format!("cannot repeat a buffer {count} times")));
    }
    let mut out = a.clone();
    for _ in 1..count {
        out = sequence(&out, a)?;
    }
    Ok(out)
}

/// Overlay every buffer at offset zero (a chord).
pub fn overlay_all<'a, I>(buffers: I) -> Result<SampleBuffer>
where
    I: IntoIterator<Item = &'a SampleBuffer>,
{
    fold(buffers, |acc, b| overlay(&acc, b, 0.0))
}

/// Play every buffer one after another (a melody).
pub fn sequence_all<'a, I>(buffers: I) -> Result<SampleBuffer>
where
    I: IntoIterator<Item = &'a SampleBuffer>,
{
    fold(buffers, |acc, b| sequence(&acc, b))
}

fn fold<'a, I, F>(buffers: I, mut combine: F) -> Result<SampleBuffer>
where
    I: IntoIterator<Item = &'a SampleBuffer>,
    F: FnMut(SampleBuffer, &SampleBuffer) -> Result<SampleBuffer>,
{
    let mut iter = buffers.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| invalid("need at least one buffer to mix"))?;
    iter.try_fold(first.clone(), |acc, b| combine(acc, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrettyError;

    fn buf(samples: &[f64], rate: u32) -> SampleBuffer {
        SampleBuffer::new(samples.to_vec(), rate).unwrap()
    }

    #[test]
    fn overlay_adds_at_offset() {
        let a = buf(&[1.0, 1.0, 1.0, 1.0], 4);
        let b = buf(&[0.5, 0.5], 4);
        let out = overlay(&a, &b, 0.25).unwrap();
        assert_eq!(out.samples(), &[1.0, 1.5, 1.5, 1.0]);
    }

    #[test]
    fn overlay_extends_past_end() {
        let a = buf(&[1.0, 1.0], 4);
        let b = buf(&[0.5, 0.5], 4);
        let out = overlay(&a, &b, 0.25).unwrap();
        assert_eq!(out.samples(), &[1.0, 1.5, 0.5]);
    }

    #[test]
    fn overlay_rejects_negative_offset() {
        let a = buf(&[1.0], 4);
        assert!(matches!(
            overlay(&a, &a, -0.5),
            Err(FrettyError::InvalidArgument(_))
        ));
    }

    #[test]
    fn overlay_at_zero_commutes() {
        let a = buf(&[0.1, 0.2, 0.3, 0.4, 0.5], 10);
        let b = buf(&[-0.3, 0.7, 0.25], 10);
        let ab = overlay(&a, &b, 0.0).unwrap();
        let ba = overlay(&b, &a, 0.0).unwrap();
        assert_eq!(ab.len(), ba.len());
        for (x, y) in ab.samples().iter().zip(ba.samples()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn overlay_reconciles_rates_upward() {
        let a = buf(&[1.0; 4], 4);
        let b = buf(&[1.0; 8], 8);
        let out = overlay(&a, &b, 0.0).unwrap();
        assert_eq!(out.sample_rate(), 8);
        assert_eq!(out.len(), 8);
        assert!(out.samples().iter().all(|&s| (s - 2.0).abs() < 1e-12));
    }

    #[test]
    fn sequence_concatenates() {
        let a = buf(&[1.0, 2.0], 2);
        let b = buf(&[3.0], 2);
        let out = sequence(&a, &b).unwrap();
        assert_eq!(out.samples(), &[1.0, 2.0, 3.0]);
        assert!((out.duration() - (a.duration() + b.duration())).abs() < 1e-12);
    }

    #[test]
    fn sequence_duration_adds_with_mixed_rates() {
        let a = SampleBuffer::silence(0.3, 8000).unwrap();
        let b = SampleBuffer::silence(0.2, 44100).unwrap();
        let out = sequence(&a, &b).unwrap();
        assert_eq!(out.sample_rate(), 44100);
        assert!((out.duration() - 0.5).abs() <= 1.0 / 44100.0);
    }

    #[test]
    fn scale_multiplies_exactly() {
        let a = buf(&[0.1, -0.3, 0.7], 3);
        let out = scale(&a, 0.5);
        assert_eq!(out.duration(), a.duration());
        for (o, s) in out.samples().iter().zip(a.samples()) {
            assert_eq!(*o, 0.5 * s);
        }
    }

    #[test]
    fn repeat_makes_copies() {
        let a = buf(&[1.0, -1.0], 2);
        let out = repeat(&a, 3).unwrap();
        assert_eq!(out.samples(), &[1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
        assert_eq!(repeat(&a, 1).unwrap(), a);
        assert!(matches!(repeat(&a, 0), Err(FrettyError::InvalidArgument(_))));
    }

    #[test]
    fn chord_and_melody_helpers() {
        let a = buf(&[1.0, 1.0], 2);
        let b = buf(&[0.5], 2);
        let chord = overlay_all([&a, &b]).unwrap();
        assert_eq!(chord.samples(), &[1.5, 1.0]);
        let melody = sequence_all(vec![&a, &b, &a]).unwrap();
        assert_eq!(melody.len(), 5);
        assert!(overlay_all(Vec::<&SampleBuffer>::new()).is_err());
    }
}
