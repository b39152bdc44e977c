use super::*;
use crate::foundation::core::FrameIndex;

fn stereo(frames: usize, left: f32, right: f32) -> PcmSignal {
    let mut interleaved = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let s = if i % 2 == 0 { 1.0 } else { -1.0 };
        interleaved.extend_from_slice(&[s * left, s * right]);
    }
    PcmSignal::new(SAMPLE_RATE, 2, interleaved).unwrap()
}

#[test]
fn sequence_geometry_follows_options() {
    let opts = GenerationOptions::default();
    let seq = build_sequence(&stereo(88_200, 0.5, 0.5), &opts).unwrap();
    assert_eq!(seq.len(), 120);
    assert_eq!(seq.channels(), 1);
    let timing = seq.timing();
    assert_eq!(timing.stride, 88);
    assert_eq!(timing.bars, 50);
    assert_eq!(timing.sample_rate, SAMPLE_RATE);
    assert_eq!(seq.bar_values(FrameIndex(0))[0].len(), 50);
}

#[test]
fn stereo_keeps_channels_independent() {
    let opts = GenerationOptions {
        stereo: true,
        bars: 10,
        ..GenerationOptions::default()
    };
    // Silent left channel stays at zero; the right one carries signal.
    let seq = build_sequence(&stereo(44_100, 0.0, 0.8), &opts).unwrap();
    assert_eq!(seq.channels(), 2);
    let values = seq.bar_values(FrameIndex(30));
    assert!(values[0].iter().all(|&v| v == 0.0));
    assert!(values[1].iter().any(|&v| v > 0.1));
}

#[test]
fn normalization_makes_loudness_scale_invariant() {
    let opts = GenerationOptions {
        bars: 10,
        ..GenerationOptions::default()
    };
    let quiet = build_sequence(&stereo(44_100, 0.01, 0.01), &opts).unwrap();
    let loud = build_sequence(&stereo(44_100, 0.9, 0.9), &opts).unwrap();
    let (a, b) = (
        quiet.bar_values(FrameIndex(20)),
        loud.bar_values(FrameIndex(20)),
    );
    for (x, y) in a[0].iter().zip(&b[0]) {
        assert!((x - y).abs() < 1e-5, "{x} vs {y}");
    }
}

#[test]
fn too_short_signal_is_a_decode_error() {
    let opts = GenerationOptions::default();
    let err = build_sequence(&stereo(100, 0.5, 0.5), &opts).unwrap_err();
    assert!(matches!(err, SeewavError::Decode(_)));
}

#[test]
fn thread_pool_rejects_zero_threads() {
    assert!(build_thread_pool(Some(0)).is_err());
    assert!(build_thread_pool(Some(2)).is_ok());
}
