//! End-to-end properties of the sample engine.

use fretty_audio::dsp::oscillator::RngPhase;
use fretty_audio::{
    FrettyError, SampleBuffer, StringToneParams, Synthesizer, overlay, scale, sequence,
};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Frequency of the strongest FFT bin (DC excluded) and the bin width.
fn dominant_frequency(buffer: &SampleBuffer) -> (f64, f64) {
    let n = buffer.len();
    let mut spectrum: Vec<Complex<f64>> = buffer
        .samples()
        .iter()
        .map(|&s| Complex { re: s, im: 0.0 })
        .collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut spectrum);

    let (bin, _) = spectrum[1..n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm()))
        .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
    let resolution = buffer.sample_rate() as f64 / n as f64;
    (bin as f64 * resolution, resolution)
}

fn energy(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s * s).sum()
}

#[test]
fn sine_tone_end_to_end() {
    init_tracing();
    let mut synth = Synthesizer::new();
    let tone = synth.tone(440.0, 0.5, 0.1, 44100).unwrap();
    assert_eq!(tone.frequency(), 440.0);
    assert_eq!(tone.len(), 22050);
    assert_eq!(tone.sample_rate(), 44100);
}

#[test]
fn overlay_places_tone_energy_at_offset() {
    init_tracing();
    let mut synth = Synthesizer::new();
    let bed = SampleBuffer::silence(1.0, 8000).unwrap();
    let tone = synth.tone(220.0, 0.5, 0.2, 8000).unwrap();
    let mix = overlay(&bed, &tone, 0.25).unwrap();

    assert!((mix.duration() - 1.0).abs() < 1e-12);
    let s = mix.samples();
    assert_eq!(energy(&s[..2000]), 0.0);
    assert_eq!(energy(&s[6000..]), 0.0);
    assert!(energy(&s[2000..6000]) > 0.0);
    assert_eq!(&s[2000..6000], tone.samples());
}

#[test]
fn overlay_past_end_grows_result() {
    let bed = SampleBuffer::silence(1.0, 1000).unwrap();
    let blip = SampleBuffer::new(vec![1.0; 100], 1000).unwrap();
    let mix = overlay(&bed, &blip, 0.95).unwrap();
    // The result grows to hold the whole overlay.
    assert_eq!(mix.len(), 1050);
    assert_eq!(energy(mix.samples()), 100.0);
}

#[test]
fn resample_round_trip_preserves_duration_and_energy() {
    let mut synth = Synthesizer::with_phase_source(RngPhase::seeded(5));
    for (r1, r2) in [(44100, 8000), (8000, 44100), (22050, 48000), (48000, 11025)] {
        let original = synth.tone(100.0, 0.5, 0.3, r1).unwrap().into_buffer();
        let back = original.resampled(r2).unwrap().resampled(r1).unwrap();
        // Each leg may round up by a fraction of a sample at the coarser rate.
        let period = 1.0 / r1.min(r2) as f64;
        assert!(
            (back.duration() - original.duration()).abs() <= period,
            "{r1} -> {r2} -> {r1}: {} vs {}",
            back.duration(),
            original.duration()
        );
        let drift = (back.rms() - original.rms()).abs() / original.rms();
        assert!(drift < 0.02, "{r1} -> {r2} -> {r1}: rms drift {drift}");
    }
}

#[test]
fn sequence_adds_durations_across_rates() {
    let mut synth = Synthesizer::new();
    let a = synth.tone(330.0, 0.37, 0.1, 22050).unwrap();
    let b = synth.tone(330.0, 0.21, 0.1, 44100).unwrap();
    let ab = sequence(&a, &b).unwrap();
    assert_eq!(ab.sample_rate(), 44100);
    assert!((ab.duration() - (a.duration() + b.duration())).abs() <= 1.0 / 44100.0);
}

#[test]
fn overlay_commutes_at_zero_offset() {
    let mut synth = Synthesizer::new();
    let a = synth.tone(200.0, 0.3, 0.1, 16000).unwrap();
    let b = synth.tone(300.0, 0.5, 0.1, 16000).unwrap();
    let ab = overlay(&a, &b, 0.0).unwrap();
    let ba = overlay(&b, &a, 0.0).unwrap();
    assert_eq!(ab.len(), ba.len());
    for (x, y) in ab.samples().iter().zip(ba.samples()) {
        assert!((x - y).abs() < 1e-12);
    }
}

#[test]
fn scale_is_an_exact_multiply() {
    let mut synth = Synthesizer::new();
    let a = synth.tone(500.0, 0.2, 0.4, 8000).unwrap();
    let k = -1.75;
    let scaled = scale(&a, k);
    assert_eq!(scaled.duration(), a.duration());
    for (s, x) in scaled.samples().iter().zip(a.samples()) {
        assert_eq!(*s, k * x);
    }
}

#[test]
fn string_tone_peaks_at_fundamental() {
    init_tracing();
    let mut synth = Synthesizer::new();
    for (frequency, duration) in [(110.0, 0.5), (196.0, 1.0), (329.63, 0.75)] {
        let params = StringToneParams::new(frequency)
            .duration(duration)
            .sample_rate(44100);
        let tone = synth.string_tone(&params).unwrap();
        assert_eq!(tone.len(), (duration * 44100.0_f64).round() as usize);
        assert!(tone.rms() > 0.0);

        let (peak, resolution) = dominant_frequency(&tone);
        assert!(
            (peak - frequency).abs() <= resolution,
            "peak at {peak} Hz, expected {frequency} Hz (bin {resolution} Hz)"
        );
    }
}

#[test]
fn string_tone_loudness_is_independent_of_overtone_count() {
    let mut synth = Synthesizer::with_phase_source(RngPhase::seeded(9));
    let base = StringToneParams::new(100.0)
        .duration(1.0)
        .attacked(false)
        .sample_rate(44100);
    let few = synth.string_tone(&base.clone().overtones(vec![1.0; 3])).unwrap();
    let many = synth.string_tone(&base.overtones(vec![1.0; 20])).unwrap();
    assert!((few.rms() - many.rms()).abs() < 1e-3);
}

#[test]
fn boundary_conditions() {
    init_tracing();
    let buffer = SampleBuffer::silence(0.1, 44100).unwrap();
    assert!(matches!(
        buffer.lowpassed(22050.0, 5),
        Err(FrettyError::InvalidArgument(_))
    ));

    let mut synth = Synthesizer::new();
    let tone = synth.tone(5000.0, 0.1, 0.1, 44100).unwrap();
    assert_eq!(tone.len(), 4410);
    assert!(tone.aliasing_warning().is_some());
}
