//! End-to-end lifecycle and round-trip checks against libopus.

use std::sync::Arc;

use easyopus::pipeline::{decode_capacity, max_packet_bytes};
use easyopus::{
    Application, Bitrate, Channels, CodecError, CodecOpus, Complexity, Decoder, Direction,
    Encoder, Endian, FrameDuration, NopLogger, SampleRate, pcm,
};

const APPLICATIONS: [Application; 3] = [
    Application::VoIP,
    Application::Audio,
    Application::RestrictedLowdelay,
];

fn tone(frame_size: usize, channels: usize, sample_rate: i32, offset: usize) -> Vec<i16> {
    let mut out = Vec::with_capacity(frame_size * channels);
    for i in 0..frame_size {
        let t = (offset + i) as f32 / sample_rate as f32;
        let s = ((t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 8000.0) as i16;
        for _ in 0..channels {
            out.push(s);
        }
    }
    out
}

fn energy(samples: &[i16]) -> f64 {
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum::<f64>() / samples.len() as f64
}

#[test]
fn init_then_release_for_every_configuration() {
    for rate in SampleRate::ALL {
        for channels in [Channels::Mono, Channels::Stereo] {
            for app in APPLICATIONS {
                let mut encoder = Encoder::with_logger(Arc::new(NopLogger));
                encoder
                    .init(rate.hz(), channels, app)
                    .unwrap_or_else(|e| panic!("{rate:?} {channels:?} {app:?}: {e}"));
                encoder.release();
                assert!(!encoder.is_initialized());
            }

            let mut decoder = Decoder::with_logger(Arc::new(NopLogger));
            decoder.init(rate.hz(), channels).unwrap();
            decoder.release();
            assert!(!decoder.is_initialized());
        }
    }
}

#[test]
fn every_guarded_operation_fails_before_init() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    let expect = |err: CodecError, direction| match err {
        CodecError::NotInitialized { direction: d, .. } => assert_eq!(d, direction),
        other => panic!("unexpected {other:?}"),
    };

    expect(encoder.set_bitrate(Bitrate::Auto).unwrap_err(), Direction::Encoder);
    expect(encoder.bitrate().unwrap_err(), Direction::Encoder);
    expect(encoder.set_complexity(Complexity::MIN).unwrap_err(), Direction::Encoder);
    expect(encoder.complexity().unwrap_err(), Direction::Encoder);
    expect(encoder.encode(&[0; 320], 320).unwrap_err(), Direction::Encoder);
    expect(decoder.decode(&[0x48, 0x00], 320).unwrap_err(), Direction::Decoder);
    expect(decoder.decode_lost(320).unwrap_err(), Direction::Decoder);
}

#[test]
fn round_trip_preserves_length_and_energy() {
    let rate = 48000;
    let frame_size = FrameDuration::Duration20ms.frame_size(rate) as usize;

    for channels in [Channels::Mono, Channels::Stereo] {
        let n = channels.count() as usize;
        let mut encoder = Encoder::new();
        let mut decoder = Decoder::new();
        encoder.init(rate, channels, Application::Audio).unwrap();
        encoder.set_bitrate(Bitrate::Bits(64000)).unwrap();
        decoder.init(rate, channels).unwrap();

        let mut last_in = Vec::new();
        let mut last_out = Vec::new();
        for k in 0..10 {
            let frame = tone(frame_size, n, rate, k * frame_size);
            let packet = encoder.encode(&frame, frame_size as i32).unwrap();
            let decoded = decoder.decode(packet.as_bytes(), frame_size as i32).unwrap();
            assert_eq!(decoded.len(), frame.len());
            last_in = frame;
            last_out = decoded;
        }

        // The codec is lossy; the steady-state level must still be close.
        let ratio = energy(&last_out) / energy(&last_in);
        assert!((0.25..4.0).contains(&ratio), "{channels:?}: energy ratio {ratio}");
    }
}

#[test]
fn output_never_exceeds_scratch_capacity() {
    let rate = 16000;
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();
    encoder.init(rate, Channels::Mono, Application::Audio).unwrap();
    encoder.set_bitrate(Bitrate::Max).unwrap();
    decoder.init(rate, Channels::Mono).unwrap();

    for fd in [
        FrameDuration::Duration2500us,
        FrameDuration::Duration10ms,
        FrameDuration::Duration20ms,
        FrameDuration::Duration60ms,
        FrameDuration::Duration120ms,
    ] {
        let frame_size = fd.frame_size(rate);
        let pcm = tone(frame_size as usize, 1, rate, 0);
        let packet = encoder.encode(&pcm, frame_size).unwrap();
        assert!(
            packet.len() <= max_packet_bytes(frame_size, rate),
            "{fd}: {} bytes",
            packet.len()
        );

        let decoded = decoder.decode(packet.as_bytes(), frame_size).unwrap();
        assert!(decoded.len() <= decode_capacity(frame_size, 1));
        assert_eq!(decoded.len(), frame_size as usize);
    }
}

#[test]
fn invalid_channel_count_is_rejected_before_allocation() {
    assert_eq!(Channels::try_from(3), Err(CodecError::InvalidChannels(3)));

    let mut codec = CodecOpus::new();
    assert_eq!(codec.encoder_init(48000, 3, 2048), -1);
    assert!(!codec.encoder().is_initialized());
    assert_eq!(codec.encoder_set_bitrate(32000), -1);

    // A valid init afterwards works normally.
    assert_eq!(codec.encoder_init(48000, 2, 2048), 0);
    assert_eq!(codec.encoder_set_bitrate(32000), 0);
}

#[test]
fn release_is_safe_to_repeat() {
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();
    encoder.release();
    decoder.release();

    encoder.init(8000, Channels::Mono, Application::VoIP).unwrap();
    decoder.init(8000, Channels::Mono).unwrap();
    for _ in 0..3 {
        encoder.release();
        decoder.release();
    }
    assert!(encoder.encode(&[0; 160], 160).is_err());

    // The controllers are reusable after release.
    encoder.init(8000, Channels::Mono, Application::VoIP).unwrap();
    assert!(encoder.encode(&[0; 160], 160).is_ok());
}

#[test]
fn full_duplex_with_byte_buffers() {
    let rate = 24000;
    let frame_size = 480;
    let mut codec = CodecOpus::new();
    assert_eq!(codec.encoder_init(rate, 1, 2049), 0);
    assert_eq!(codec.decoder_init(rate, 1), 0);

    let samples = tone(frame_size, 1, rate, 0);
    let bytes = pcm::samples_to_bytes(&samples, Endian::Little);
    let packet = codec.encode_bytes(&bytes, bytes.len(), frame_size as i32);
    assert!(!packet.is_empty());

    let pcm_out = codec.decode_bytes(&packet, packet.len(), frame_size as i32);
    assert_eq!(pcm_out.len(), bytes.len());
    assert_eq!(CodecOpus::convert_bytes_to_shorts(&pcm_out).len(), frame_size);
}

#[test]
fn dropping_controllers_frees_instances() {
    for _ in 0..100 {
        let mut codec = CodecOpus::new();
        assert_eq!(codec.encoder_init(48000, 2, 2049), 0);
        assert_eq!(codec.decoder_create(48000, 2), 0);
    }
}
