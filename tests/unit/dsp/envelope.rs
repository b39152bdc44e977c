use super::*;

#[test]
fn length_follows_stride_count() {
    let wav = vec![1.0f32; 100];
    assert_eq!(envelope(&wav, 10, 5).len(), 18);
    assert_eq!(envelope_len(100, 10, 5), 18);
}

#[test]
fn length_is_a_function_of_geometry_only() {
    for (len, window, stride) in [(200, 20, 10), (4410, 441, 110), (101, 10, 5), (11, 10, 3)] {
        let zeros = vec![0.0f32; len];
        let ones = vec![0.7f32; len];
        let expected = envelope_len(len, window, stride);
        assert_eq!(envelope(&zeros, window, stride).len(), expected);
        assert_eq!(envelope(&ones, window, stride).len(), expected);
    }
    assert_eq!(envelope_len(4410, 441, 110), 37);
}

#[test]
fn short_signals_produce_nothing() {
    assert!(envelope(&[1.0; 10], 10, 5).is_empty());
    assert!(envelope(&[1.0; 3], 10, 5).is_empty());
    assert!(envelope(&[], 10, 5).is_empty());
    assert!(envelope(&[1.0; 100], 10, 0).is_empty());
}

#[test]
fn constant_input_stays_inside_unit_interval() {
    let wav = vec![1.0f32; 200];
    let out = envelope(&wav, 20, 10);
    assert!(!out.is_empty());
    for v in out {
        assert!(v > 0.0 && v < 1.0, "value {v}");
    }
}

#[test]
fn silence_maps_to_zero() {
    let wav = vec![0.0f32; 200];
    for v in envelope(&wav, 20, 10) {
        assert!(v.abs() < 1e-3, "value {v}");
    }
}

#[test]
fn negative_samples_are_rectified_away() {
    let wav = vec![-1.0f32; 200];
    for v in envelope(&wav, 20, 10) {
        assert!(v.abs() < 1e-12);
    }
}

#[test]
fn leading_pad_lowers_the_first_window() {
    // The first window straddles `⌊window/2⌋` zeros of padding.
    let wav = vec![1.0f32; 200];
    let out = envelope(&wav, 20, 10);
    assert!(out[0] < out[1]);
    assert!((out[1] - out[2]).abs() < 1e-12);

    let full = 1.9 * (sigmoid(2.5) - 0.5);
    assert!((out[2] - full).abs() < 1e-9);
    let half = 1.9 * (sigmoid(1.25) - 0.5);
    assert!((out[0] - half).abs() < 1e-9);
}

#[test]
fn output_is_deterministic() {
    let wav: Vec<f32> = (0..5000).map(|i| ((i as f32) * 0.01).sin()).collect();
    assert_eq!(envelope(&wav, 441, 110), envelope(&wav, 441, 110));
}
