use super::*;

fn stereo(pairs: &[(f32, f32)]) -> PcmSignal {
    let interleaved = pairs.iter().flat_map(|&(l, r)| [l, r]).collect();
    PcmSignal::new(44_100, 2, interleaved).unwrap()
}

#[test]
fn rejects_ragged_interleaving() {
    assert!(PcmSignal::new(44_100, 2, vec![0.0; 3]).is_err());
    assert!(PcmSignal::new(0, 2, vec![]).is_err());
    assert!(PcmSignal::new(44_100, 0, vec![]).is_err());
}

#[test]
fn parses_f32le_bytes() {
    let mut bytes = Vec::new();
    for v in [0.5f32, -0.25, 1.0, 0.0] {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    let pcm = PcmSignal::from_f32le_bytes(44_100, 2, &bytes).unwrap();
    assert_eq!(pcm.frames(), 2);
    assert_eq!(pcm.channel(0), vec![0.5, 1.0]);
    assert_eq!(pcm.channel(1), vec![-0.25, 0.0]);

    assert!(PcmSignal::from_f32le_bytes(44_100, 2, &bytes[..7]).is_err());
}

#[test]
fn mixdown_averages_channels() {
    let pcm = stereo(&[(1.0, 0.0), (0.5, 0.5), (-1.0, 1.0)]);
    assert_eq!(pcm.mixdown(), vec![0.5, 0.5, 0.0]);
    assert_eq!(pcm.analysis_channels(false).len(), 1);
    assert_eq!(pcm.analysis_channels(true).len(), 2);
}

#[test]
fn mono_signal_repeats_its_channel() {
    let pcm = PcmSignal::new(44_100, 1, vec![0.25, 0.75]).unwrap();
    assert_eq!(pcm.channel(1), vec![0.25, 0.75]);
    assert_eq!(pcm.mixdown(), vec![0.25, 0.75]);
}

#[test]
fn duration_uses_sample_rate() {
    let pcm = PcmSignal::new(44_100, 2, vec![0.0; 44_100 * 2 * 2]).unwrap();
    assert!((pcm.duration_secs() - 2.0).abs() < 1e-12);
}

#[test]
fn normalization_reaches_unit_variance() {
    let mut samples: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.1).sin() * 0.2).collect();
    assert!(normalize_unit_variance(&mut samples));
    assert!((std_dev(&samples) - 1.0).abs() < 1e-3);
}

#[test]
fn normalization_skips_constant_channel() {
    let mut zeros = vec![0.0f32; 16];
    assert!(!normalize_unit_variance(&mut zeros));
    assert!(zeros.iter().all(|&v| v == 0.0));

    let mut empty: Vec<f32> = Vec::new();
    assert!(!normalize_unit_variance(&mut empty));
}

#[test]
fn accessors_expose_validated_layout() {
    let pcm = stereo(&[(0.25, -0.5), (1.0, 0.0)]);
    assert_eq!(pcm.sample_rate(), 44_100);
    assert_eq!(pcm.channels(), 2);
    assert_eq!(pcm.samples(), &[0.25, -0.5, 1.0, 0.0]);
    assert_eq!(pcm.frames(), 2);
}
