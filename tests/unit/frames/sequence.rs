use super::*;

fn close(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn padding_adds_half_bars_before_and_two_bars_after() {
    let env: Vec<f64> = (0..37).map(|i| i as f64 / 100.0).collect();
    for bars in 1..=9 {
        let padded = pad_envelopes(&[env.clone(), env.clone()], bars);
        assert_eq!(padded.len(), 2);
        for ch in &padded {
            assert_eq!(ch.len(), env.len() + bars / 2 + 2 * bars);
            assert!(ch[..bars / 2].iter().all(|&v| v == 0.0));
            assert_eq!(&ch[bars / 2..bars / 2 + env.len()], env.as_slice());
            assert!(ch[bars / 2 + env.len()..].iter().all(|&v| v == 0.0));
        }
    }
}

#[test]
fn frame_count_floors_rate_times_duration() {
    assert_eq!(frame_count(60.0, 88_200, 44_100), 120);
    assert_eq!(frame_count(30.0, 44_099, 44_100), 29);
    assert_eq!(frame_count(60.0, 0, 44_100), 0);
    assert_eq!(frame_count(60.0, 100, 0), 0);
}

#[test]
fn speedup_tracks_upcoming_loudness() {
    assert!(close(speedup(&[0.0; 8]), 0.5, 1e-12));
    assert!(close(speedup(&[]), 0.5, 1e-12));
    assert!(close(speedup(&[0.2, 1.0]), 2.0, 1e-12));
    let mid = speedup(&[0.5]);
    let expected = 0.5 + 1.5 * (10.0 * (0.5f64 + 1e-4).log10() + 6.0) / 6.0;
    assert!(close(mid, expected, 1e-9));
    assert!(mid > 0.5 && mid < 2.0);
}

#[test]
fn position_splits_segment_and_fraction() {
    let timing = FrameTiming {
        rate: 60.0,
        sample_rate: 44_100,
        stride: 88,
        bars: 50,
    };
    assert_eq!(timing.position(FrameIndex(0)), (0, 0.0));
    // 1 s of audio = 44100 / 88 / 50 ≈ 10.02 segments.
    let (segment, frac) = timing.position(FrameIndex(60));
    assert_eq!(segment, 10);
    assert!(close(frac, 44_100.0 / 88.0 / 50.0 - 10.0, 1e-9));
}

#[test]
fn midpoint_blend_averages_windows_under_taper() {
    let bars = 4;
    let env = vec![0.2, 0.2, 0.2, 0.2, 0.6, 0.6, 0.6, 0.6];
    let taper = hanning(bars);
    let out = blend_windows(&env, 0, 0.5, 4.0, &taper);
    assert_eq!(out.len(), bars);
    for (v, t) in out.iter().zip(&taper) {
        assert!(close(*v, 0.4 * t, 1e-12));
    }
}

#[test]
fn sharp_blend_holds_the_current_window() {
    let taper = vec![1.0; 3];
    let env = vec![0.3, 0.3, 0.3, 0.9, 0.9, 0.9];
    let early = blend_windows(&env, 0, 0.0, 1000.0, &taper);
    let late = blend_windows(&env, 0, 0.99, 1000.0, &taper);
    assert!(early.iter().all(|&v| close(v, 0.3, 1e-6)));
    assert!(late.iter().all(|&v| close(v, 0.9, 1e-6)));
}

#[test]
fn reads_past_the_end_are_silence() {
    let taper = vec![1.0; 3];
    let out = blend_windows(&[0.5; 4], 5, 0.3, 4.0, &taper);
    assert_eq!(out, vec![0.0; 3]);
}

#[test]
fn sequence_yields_bars_per_channel() {
    let env: Vec<f64> = (0..200).map(|i| (i % 7) as f64 / 10.0).collect();
    let bars = 10;
    let padded = pad_envelopes(&[env.clone(), env], bars);
    let timing = FrameTiming {
        rate: 30.0,
        sample_rate: 44_100,
        stride: 100,
        bars,
    };
    let seq = FrameSequence::new(padded, timing, 4.0, 12);
    assert_eq!(seq.len(), 12);
    assert!(!seq.is_empty());
    assert_eq!(seq.channels(), 2);
    for f in 0..seq.len() {
        let values = seq.bar_values(FrameIndex(f));
        assert_eq!(values.len(), 2);
        for ch in &values {
            assert_eq!(ch.len(), bars);
            assert!(ch.iter().all(|v| v.is_finite() && *v >= 0.0));
            // Hann taper pins both edges to zero.
            assert!(close(ch[0], 0.0, 1e-12));
            assert!(close(ch[bars - 1], 0.0, 1e-12));
        }
        assert_eq!(values[0], values[1]);
    }
}

#[test]
fn frames_are_pure_functions_of_their_index() {
    let env: Vec<f64> = (0..120).map(|i| ((i as f64) * 0.3).sin().abs() * 0.9).collect();
    let timing = FrameTiming {
        rate: 60.0,
        sample_rate: 44_100,
        stride: 88,
        bars: 5,
    };
    let seq = FrameSequence::new(pad_envelopes(&[env], 5), timing, 4.0, 40);
    let forward: Vec<_> = (0..40).map(|f| seq.bar_values(FrameIndex(f))).collect();
    let backward: Vec<_> = (0..40)
        .rev()
        .map(|f| seq.bar_values(FrameIndex(f)))
        .collect();
    for (i, b) in backward.iter().rev().enumerate() {
        assert_eq!(&forward[i], b);
    }
}
