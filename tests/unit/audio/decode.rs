use super::*;
use crate::encode::ffmpeg::is_ffmpeg_on_path;
use crate::session::control::CancelToken;

/// 16-bit mono PCM WAV holding a sine tone.
fn sine_wav(sample_rate: u32, secs: f64, freq: f64) -> Vec<u8> {
    let n = (f64::from(sample_rate) * secs) as u32;
    let data_len = n * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..n {
        let t = f64::from(i) / f64::from(sample_rate);
        let v = (0.5 * (2.0 * std::f64::consts::PI * freq * t).sin() * 32767.0) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn request(seek: Option<f64>, duration: Option<f64>) -> DecodeRequest {
    DecodeRequest {
        sample_rate: 44_100,
        seek,
        duration,
    }
}

#[test]
fn empty_input_is_a_decode_error() {
    let (ctl, _rx) = RunControl::new(CancelToken::new(), 1);
    let err = FfmpegDecoder
        .decode(&[], &request(None, None), &ctl)
        .unwrap_err();
    assert!(matches!(err, SeewavError::Decode(_)));
}

#[test]
fn garbage_input_is_a_decode_error() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let (ctl, _rx) = RunControl::new(CancelToken::new(), 1);
    let err = FfmpegDecoder
        .decode(b"definitely not audio", &request(None, None), &ctl)
        .unwrap_err();
    assert!(matches!(err, SeewavError::Decode(_)), "{err}");
}

#[test]
fn decodes_wav_to_stereo_pcm() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let (ctl, _rx) = RunControl::new(CancelToken::new(), 1);
    let wav = sine_wav(44_100, 1.0, 440.0);
    let pcm = FfmpegDecoder
        .decode(&wav, &request(None, None), &ctl)
        .unwrap();
    assert_eq!(pcm.channels(), 2);
    assert_eq!(pcm.sample_rate(), 44_100);
    assert_eq!(pcm.frames(), 44_100);
    let left = pcm.channel(0);
    let peak = left.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    assert!(peak > 0.4 && peak < 0.6, "peak {peak}");
}

#[test]
fn applies_seek_and_duration() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let (ctl, _rx) = RunControl::new(CancelToken::new(), 1);
    let wav = sine_wav(44_100, 1.0, 440.0);
    let pcm = FfmpegDecoder
        .decode(&wav, &request(Some(0.25), Some(0.5)), &ctl)
        .unwrap();
    let frames = pcm.frames() as i64;
    assert!((frames - 22_050).abs() < 64, "frames {frames}");
}
