//! Decoder controller.

use std::sync::Arc;

use crate::constants::Channels;
use crate::error::CodecError;
use crate::guard::{self, Direction};
use crate::instance::{DecoderConfig, DecoderInstance};
use crate::logger::{Logger, default_logger, log_debug, log_error};
use crate::pcm::{self, Endian};
use crate::pipeline;

/// Owns zero or one Opus decoder instance.
pub struct Decoder {
    instance: Option<DecoderInstance>,
    logger: Arc<dyn Logger>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder controller with no instance.
    pub fn new() -> Self {
        Self::with_logger(default_logger())
    }

    /// Creates a decoder controller reporting to `logger`.
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            instance: None,
            logger,
        }
    }

    /// Allocates decoder state and initializes it in place.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate to decode at (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Channel layout
    pub fn init(&mut self, sample_rate: i32, channels: Channels) -> Result<(), CodecError> {
        self.install("init", sample_rate, channels, DecoderInstance::init_in_place)
    }

    /// Like `init`, but libopus allocates the state itself.
    pub fn create(&mut self, sample_rate: i32, channels: Channels) -> Result<(), CodecError> {
        self.install("create", sample_rate, channels, DecoderInstance::create)
    }

    fn install(
        &mut self,
        op: &'static str,
        sample_rate: i32,
        channels: Channels,
        build: fn(DecoderConfig) -> Result<DecoderInstance, CodecError>,
    ) -> Result<(), CodecError> {
        if self.instance.is_some() {
            log_debug!(self.logger, "[{}] replacing existing decoder", op);
            self.release();
        }

        if sample_rate <= 0 {
            let err = CodecError::InvalidArgument(format!("sample rate {sample_rate}"));
            log_error!(self.logger, "[{}] couldn't init decoder: {}", op, err);
            return Err(err);
        }

        match build(DecoderConfig {
            sample_rate,
            channels,
        }) {
            Ok(instance) => {
                log_debug!(
                    self.logger,
                    "[{}] decoder successfully initialized: {}Hz, {} channel(s), state {}",
                    op,
                    sample_rate,
                    channels.count(),
                    instance.describe()
                );
                self.instance = Some(instance);
                Ok(())
            }
            Err(err) => {
                log_error!(self.logger, "[{}] couldn't init decoder: {}", op, err);
                Err(err)
            }
        }
    }

    /// Returns true while an instance is allocated.
    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Returns the configuration of the live instance.
    pub fn config(&self) -> Option<DecoderConfig> {
        self.instance.as_ref().map(|inst| *inst.config())
    }

    /// Decodes one packet to interleaved PCM samples.
    ///
    /// `frame_size` is the most samples per channel the caller accepts;
    /// the result holds `decoded * channels` samples.
    pub fn decode(&mut self, packet: &[u8], frame_size: i32) -> Result<Vec<i16>, CodecError> {
        let inst = guard::require(&mut self.instance, Direction::Decoder, "decode", self.logger.as_ref())?;
        pipeline::decode_frame(inst, packet, frame_size).inspect_err(|err| {
            log_error!(self.logger, "[decode] {}", err);
        })
    }

    /// Decodes one packet to byte-packed PCM with the given byte order.
    pub fn decode_bytes(
        &mut self,
        packet: &[u8],
        endian: Endian,
        frame_size: i32,
    ) -> Result<Vec<u8>, CodecError> {
        let inst = guard::require(
            &mut self.instance,
            Direction::Decoder,
            "decode_bytes",
            self.logger.as_ref(),
        )?;
        pipeline::decode_frame(inst, packet, frame_size)
            .map(|samples| pcm::samples_to_bytes(&samples, endian))
            .inspect_err(|err| {
                log_error!(self.logger, "[decode_bytes] {}", err);
            })
    }

    /// Decodes one packet to interleaved float samples.
    pub fn decode_float(&mut self, packet: &[u8], frame_size: i32) -> Result<Vec<f32>, CodecError> {
        let inst = guard::require(
            &mut self.instance,
            Direction::Decoder,
            "decode_float",
            self.logger.as_ref(),
        )?;
        pipeline::decode_frame_float(inst, packet, frame_size).inspect_err(|err| {
            log_error!(self.logger, "[decode_float] {}", err);
        })
    }

    /// Synthesizes `frame_size` samples per channel for a lost packet.
    pub fn decode_lost(&mut self, frame_size: i32) -> Result<Vec<i16>, CodecError> {
        let inst = guard::require(
            &mut self.instance,
            Direction::Decoder,
            "decode_lost",
            self.logger.as_ref(),
        )?;
        pipeline::decode_frame(inst, &[], frame_size).inspect_err(|err| {
            log_error!(self.logger, "[decode_lost] {}", err);
        })
    }

    /// Frees the instance. Calling it with no instance is a no-op.
    pub fn release(&mut self) {
        if self.instance.take().is_some() {
            log_debug!(self.logger, "[release] decoder released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Application;
    use crate::encoder::Encoder;
    use crate::logger::testing::RecordingLogger;

    #[test]
    fn test_decoder_init() {
        let mut decoder = Decoder::new();
        decoder.init(16000, Channels::Mono).unwrap();
        assert_eq!(
            decoder.config(),
            Some(DecoderConfig {
                sample_rate: 16000,
                channels: Channels::Mono
            })
        );
        decoder.release();
        decoder.release();
        assert!(decoder.config().is_none());
    }

    #[test]
    fn test_decode_before_init() {
        let logger = Arc::new(RecordingLogger::default());
        let mut decoder = Decoder::with_logger(logger.clone());
        let not_init = |op| CodecError::NotInitialized {
            direction: Direction::Decoder,
            op,
        };
        assert_eq!(decoder.decode(&[0x48], 960), Err(not_init("decode")));
        assert_eq!(
            decoder.decode_bytes(&[0x48], Endian::Little, 960),
            Err(not_init("decode_bytes"))
        );
        assert_eq!(decoder.decode_float(&[0x48], 960), Err(not_init("decode_float")));
        assert_eq!(decoder.decode_lost(960), Err(not_init("decode_lost")));

        let errors = logger.errors();
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("decoder.init() first"));
    }

    #[test]
    fn test_decoder_init_bad_rate() {
        let mut decoder = Decoder::new();
        assert!(matches!(
            decoder.init(22050, Channels::Stereo),
            Err(CodecError::NativeInit { .. })
        ));
        assert!(matches!(
            decoder.create(-8000, Channels::Stereo),
            Err(CodecError::InvalidArgument(_))
        ));
        assert!(!decoder.is_initialized());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut encoder = Encoder::new();
        let mut decoder = Decoder::new();
        encoder.init(16000, Channels::Mono, Application::VoIP).unwrap();
        decoder.init(16000, Channels::Mono).unwrap();

        let pcm: Vec<i16> = (0..320).map(|i| (i * 100 % 32768) as i16).collect();
        let packet = encoder.encode(&pcm, 320).unwrap();

        let samples = decoder.decode(packet.as_bytes(), 320).unwrap();
        assert_eq!(samples.len(), 320);
    }

    #[test]
    fn test_decode_bytes_stereo() {
        let mut encoder = Encoder::new();
        let mut decoder = Decoder::new();
        encoder.init(48000, Channels::Stereo, Application::Audio).unwrap();
        decoder.create(48000, Channels::Stereo).unwrap();

        let packet = encoder.encode(&vec![0i16; 1920], 960).unwrap();
        let bytes = decoder.decode_bytes(packet.as_bytes(), Endian::Little, 960).unwrap();
        assert_eq!(bytes.len(), 960 * 2 * 2);
    }

    #[test]
    fn test_decode_lost() {
        let mut decoder = Decoder::new();
        decoder.init(8000, Channels::Mono).unwrap();
        assert_eq!(decoder.decode_lost(160).unwrap().len(), 160);
    }

    #[test]
    fn test_decode_corrupt_packet_is_distinguishable() {
        let logger = Arc::new(RecordingLogger::default());
        let mut decoder = Decoder::with_logger(logger.clone());
        decoder.init(48000, Channels::Mono).unwrap();
        let err = decoder.decode(&[0x03, 0x00], 960).unwrap_err();
        assert!(matches!(err, CodecError::Transform { code: -4, .. }));
        assert!(logger.errors()[0].starts_with("[decode]"));
        // A failed transform leaves the instance usable.
        assert!(decoder.is_initialized());
    }
}
