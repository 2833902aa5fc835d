//! Frame codec pipeline.
//!
//! Every transform runs the same way: size a scratch buffer for the worst
//! case, make one native call, then copy out exactly what the call reported.
//! No second call is made to predict the output size.

use std::os::raw::c_int;
use std::ptr;

use crate::error::CodecError;
use crate::ffi;
use crate::instance::{DecoderInstance, EncoderInstance};
use crate::packet::Packet;

/// Largest compressed size of a single Opus frame (RFC 6716 §3.4, R2).
pub const MAX_FRAME_BYTES: usize = 1275;

/// Largest frame size per channel libopus decodes: 120ms at 48kHz.
pub const MAX_FRAME_SIZE: i32 = 5760;

/// Upper bound for one encoded packet carrying `frame_size` samples per
/// channel at `sample_rate`.
///
/// libopus splits anything longer than 20ms into 20ms frames, each capped at
/// `MAX_FRAME_BYTES`. Every frame may carry a two-byte length, and the packet
/// adds a TOC byte and a frame count byte.
pub fn max_packet_bytes(frame_size: i32, sample_rate: i32) -> usize {
    if frame_size <= 0 || sample_rate <= 0 {
        return 0;
    }
    // Rates below 50Hz still count one sample per frame.
    let per_20ms = (sample_rate as u64 / 50).max(1);
    let frames = (frame_size as u64).div_ceil(per_20ms).max(1) as usize;
    frames * (MAX_FRAME_BYTES + 2) + 2
}

/// Samples needed to hold one decoded frame of `frame_size` per channel.
pub fn decode_capacity(frame_size: i32, channels: i32) -> usize {
    if frame_size <= 0 || channels <= 0 {
        return 0;
    }
    frame_size as usize * channels as usize
}

/// Runs `call` against a zeroed scratch buffer of `capacity` elements.
///
/// `call` returns the native status: negative for an error, otherwise the
/// number of produced units, each `unit` elements wide.
fn transform<T, F>(capacity: usize, unit: usize, call: F) -> Result<Vec<T>, CodecError>
where
    T: Copy + Default,
    F: FnOnce(&mut [T]) -> c_int,
{
    let mut scratch = vec![T::default(); capacity];
    let n = call(&mut scratch);
    if n < 0 {
        return Err(CodecError::transform(n));
    }

    let produced = n as usize * unit;
    if produced > capacity {
        return Err(CodecError::transform(ffi::OPUS_BAD_ARG));
    }
    Ok(scratch[..produced].to_vec())
}

fn check_frame_size(frame_size: i32, max: i32) -> Result<(), CodecError> {
    if frame_size <= 0 || frame_size > max {
        return Err(CodecError::InvalidArgument(format!(
            "frame size {frame_size} outside 1..={max}"
        )));
    }
    Ok(())
}

/// Encodes one frame of interleaved samples.
pub(crate) fn encode_frame(
    inst: &mut EncoderInstance,
    pcm: &[i16],
    frame_size: i32,
) -> Result<Packet, CodecError> {
    check_frame_size(frame_size, MAX_FRAME_SIZE)?;
    let config = *inst.config();
    let expected = frame_size as usize * config.channels.count() as usize;
    if pcm.len() < expected {
        return Err(CodecError::InputTooShort {
            expected,
            actual: pcm.len(),
        });
    }

    let capacity = max_packet_bytes(frame_size, config.sample_rate);
    let handle = inst.as_ptr();
    let data = transform::<u8, _>(capacity, 1, |out| unsafe {
        ffi::opus_encode(
            handle,
            pcm.as_ptr(),
            frame_size,
            out.as_mut_ptr(),
            out.len() as i32,
        )
    })?;
    Ok(Packet::new(data))
}

/// Splits a packet into the pointer and length `opus_decode` expects.
/// An empty packet becomes a null pointer, which requests concealment.
fn packet_ptr(packet: &[u8]) -> (*const u8, i32) {
    if packet.is_empty() {
        (ptr::null(), 0)
    } else {
        (packet.as_ptr(), packet.len() as i32)
    }
}

/// Decodes one packet into interleaved samples.
pub(crate) fn decode_frame(
    inst: &mut DecoderInstance,
    packet: &[u8],
    frame_size: i32,
) -> Result<Vec<i16>, CodecError> {
    check_frame_size(frame_size, MAX_FRAME_SIZE)?;
    let channels = inst.config().channels.count();
    let capacity = decode_capacity(frame_size, channels);
    let handle = inst.as_ptr();
    let (data_ptr, data_len) = packet_ptr(packet);

    transform::<i16, _>(capacity, channels as usize, |out| unsafe {
        ffi::opus_decode(
            handle,
            data_ptr,
            data_len,
            out.as_mut_ptr(),
            frame_size,
            0, // decode_fec
        )
    })
}

/// Decodes one packet into interleaved floats in `[-1.0, 1.0]`.
pub(crate) fn decode_frame_float(
    inst: &mut DecoderInstance,
    packet: &[u8],
    frame_size: i32,
) -> Result<Vec<f32>, CodecError> {
    check_frame_size(frame_size, MAX_FRAME_SIZE)?;
    let channels = inst.config().channels.count();
    let capacity = decode_capacity(frame_size, channels);
    let handle = inst.as_ptr();
    let (data_ptr, data_len) = packet_ptr(packet);

    transform::<f32, _>(capacity, channels as usize, |out| unsafe {
        ffi::opus_decode_float(handle, data_ptr, data_len, out.as_mut_ptr(), frame_size, 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{Application, Channels};
    use crate::instance::{DecoderConfig, EncoderConfig};

    fn encoder(sample_rate: i32, channels: Channels) -> EncoderInstance {
        EncoderInstance::init_in_place(EncoderConfig {
            sample_rate,
            channels,
            application: Application::Audio,
        })
        .unwrap()
    }

    fn decoder(sample_rate: i32, channels: Channels) -> DecoderInstance {
        DecoderInstance::init_in_place(DecoderConfig {
            sample_rate,
            channels,
        })
        .unwrap()
    }

    #[test]
    fn test_max_packet_bytes() {
        // 20ms and shorter frames fit in one Opus frame.
        assert_eq!(max_packet_bytes(960, 48000), 1279);
        assert_eq!(max_packet_bytes(120, 48000), 1279);
        // 60ms splits into three 20ms frames.
        assert_eq!(max_packet_bytes(2880, 48000), 3 * 1277 + 2);
        // 120ms at 16kHz is six frames.
        assert_eq!(max_packet_bytes(1920, 16000), 6 * 1277 + 2);
        assert_eq!(max_packet_bytes(0, 48000), 0);
        assert_eq!(max_packet_bytes(960, 0), 0);
    }

    #[test]
    fn test_max_packet_bytes_below_50hz() {
        assert_eq!(max_packet_bytes(960, 40), 960 * 1277 + 2);
        assert_eq!(max_packet_bytes(1, 49), 1277 + 2);
        assert_eq!(max_packet_bytes(3, 50), 3 * 1277 + 2);
    }

    #[test]
    fn test_decode_capacity() {
        assert_eq!(decode_capacity(960, 1), 960);
        assert_eq!(decode_capacity(960, 2), 1920);
        assert_eq!(decode_capacity(-1, 2), 0);
    }

    #[test]
    fn test_transform_copies_reported_length() {
        let out = transform::<u8, _>(16, 1, |buf| {
            buf[..3].copy_from_slice(&[1, 2, 3]);
            3
        })
        .unwrap();
        assert_eq!(out, vec![1, 2, 3]);
    }

    #[test]
    fn test_transform_scales_by_unit() {
        let out = transform::<i16, _>(8, 2, |_| 3).unwrap();
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn test_transform_zero_is_success() {
        let out = transform::<u8, _>(8, 1, |_| 0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_transform_negative_is_error() {
        let err = transform::<u8, _>(8, 1, |_| -2).unwrap_err();
        assert!(matches!(err, CodecError::Transform { code: -2, .. }));
    }

    #[test]
    fn test_transform_overrun_is_error() {
        let err = transform::<u8, _>(4, 1, |_| 5).unwrap_err();
        assert!(matches!(err, CodecError::Transform { .. }));
    }

    #[test]
    fn test_encode_frame_within_capacity() {
        let mut enc = encoder(48000, Channels::Stereo);
        let pcm = vec![0i16; 960 * 2];
        let packet = encode_frame(&mut enc, &pcm, 960).unwrap();
        assert!(!packet.is_empty());
        assert!(packet.len() <= max_packet_bytes(960, 48000));
    }

    #[test]
    fn test_encode_frame_short_input() {
        let mut enc = encoder(48000, Channels::Stereo);
        let pcm = vec![0i16; 960];
        let err = encode_frame(&mut enc, &pcm, 960).unwrap_err();
        assert_eq!(
            err,
            CodecError::InputTooShort {
                expected: 1920,
                actual: 960
            }
        );
    }

    #[test]
    fn test_encode_frame_bad_frame_size() {
        let mut enc = encoder(48000, Channels::Mono);
        let pcm = vec![0i16; 960];
        // 100 samples is not a valid Opus frame duration at 48kHz.
        let err = encode_frame(&mut enc, &pcm, 100).unwrap_err();
        assert!(matches!(err, CodecError::Transform { code: ffi::OPUS_BAD_ARG, .. }));

        assert!(matches!(
            encode_frame(&mut enc, &pcm, 0),
            Err(CodecError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decode_frame_length() {
        let mut enc = encoder(16000, Channels::Mono);
        let mut dec = decoder(16000, Channels::Mono);
        let pcm = vec![0i16; 320];
        let packet = encode_frame(&mut enc, &pcm, 320).unwrap();
        let out = decode_frame(&mut dec, packet.as_bytes(), 320).unwrap();
        assert_eq!(out.len(), 320);
    }

    #[test]
    fn test_decode_frame_buffer_too_small() {
        let mut enc = encoder(48000, Channels::Mono);
        let mut dec = decoder(48000, Channels::Mono);
        let packet = encode_frame(&mut enc, &vec![0i16; 960], 960).unwrap();
        let err = decode_frame(&mut dec, packet.as_bytes(), 480).unwrap_err();
        assert!(matches!(err, CodecError::Transform { code: -2, .. }));
    }

    #[test]
    fn test_decode_frame_invalid_packet() {
        let mut dec = decoder(48000, Channels::Mono);
        // Code 3 packet announcing zero frames.
        let err = decode_frame(&mut dec, &[0x03, 0x00], 960).unwrap_err();
        assert!(matches!(err, CodecError::Transform { code: -4, .. }));
    }

    #[test]
    fn test_decode_frame_float_stereo() {
        let mut enc = encoder(48000, Channels::Stereo);
        let mut dec = decoder(48000, Channels::Stereo);
        let packet = encode_frame(&mut enc, &vec![0i16; 1920], 960).unwrap();
        let out = decode_frame_float(&mut dec, packet.as_bytes(), 960).unwrap();
        assert_eq!(out.len(), 1920);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_decode_empty_packet_conceals() {
        let mut dec = decoder(48000, Channels::Mono);
        let out = decode_frame(&mut dec, &[], 960).unwrap();
        assert_eq!(out.len(), 960);
    }
}
