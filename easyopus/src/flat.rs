//! Flat entry points with primitive parameters.
//!
//! `CodecOpus` holds one encoder and one decoder controller, for
//! full-duplex use. It reports failures as integer status codes, or as
//! empty sequences from encode and decode. Byte-form PCM is little-endian.
//! Short-form packets carry two packet bytes per `i16`, and the byte count
//! is passed back as `length` when decoding.

use std::sync::Arc;

use crate::constants::{Application, Bitrate, Channels, Complexity};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecError;
use crate::logger::{Logger, default_logger, log_error};
use crate::pcm::{self, Endian};

const WIRE_ENDIAN: Endian = Endian::Little;

fn status(result: Result<(), CodecError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.status_code(),
    }
}

/// Paired encoder and decoder behind status-code entry points.
pub struct CodecOpus {
    encoder: Encoder,
    decoder: Decoder,
    logger: Arc<dyn Logger>,
}

impl Default for CodecOpus {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecOpus {
    pub fn new() -> Self {
        Self::with_logger(default_logger())
    }

    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            encoder: Encoder::with_logger(logger.clone()),
            decoder: Decoder::with_logger(logger.clone()),
            logger,
        }
    }

    /// Borrows the typed encoder controller.
    pub fn encoder(&mut self) -> &mut Encoder {
        &mut self.encoder
    }

    /// Borrows the typed decoder controller.
    pub fn decoder(&mut self) -> &mut Decoder {
        &mut self.decoder
    }

    fn channels(&self, op: &str, num_channels: i32) -> Result<Channels, CodecError> {
        Channels::try_from(num_channels).inspect_err(|_| {
            log_error!(
                self.logger,
                "[{}] num_channels is incorrect: {}, it must be either 1 or 2",
                op,
                num_channels
            );
        })
    }

    fn application(&self, op: &str, application: i32) -> Result<Application, CodecError> {
        Application::try_from(application).inspect_err(|err| {
            log_error!(self.logger, "[{}] {}", op, err);
        })
    }

    //
    // Encoder
    //

    fn setup_encoder(
        &mut self,
        op: &str,
        sample_rate: i32,
        num_channels: i32,
        application: i32,
        build: fn(&mut Encoder, i32, Channels, Application) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        let channels = self.channels(op, num_channels)?;
        let application = self.application(op, application)?;
        build(&mut self.encoder, sample_rate, channels, application)
    }

    pub fn encoder_init(&mut self, sample_rate: i32, num_channels: i32, application: i32) -> i32 {
        status(self.setup_encoder(
            "encoder_init",
            sample_rate,
            num_channels,
            application,
            Encoder::init,
        ))
    }

    pub fn encoder_create(&mut self, sample_rate: i32, num_channels: i32, application: i32) -> i32 {
        status(self.setup_encoder(
            "encoder_create",
            sample_rate,
            num_channels,
            application,
            Encoder::create,
        ))
    }

    pub fn encoder_set_bitrate(&mut self, bitrate: i32) -> i32 {
        status(self.encoder.set_bitrate(Bitrate::from(bitrate)))
    }

    pub fn encoder_set_complexity(&mut self, complexity: i32) -> i32 {
        let level = match Complexity::new(complexity) {
            Ok(level) => level,
            Err(err) => {
                log_error!(self.logger, "[encoder_set_complexity] {}", err);
                return err.status_code();
            }
        };
        status(self.encoder.set_complexity(level))
    }

    /// Encodes the first `length` bytes of little-endian PCM.
    pub fn encode_bytes(&mut self, bytes: &[u8], length: usize, frame_size: i32) -> Vec<u8> {
        let input = &bytes[..length.min(bytes.len())];
        self.encoder
            .encode_bytes(input, WIRE_ENDIAN, frame_size)
            .map(Vec::from)
            .unwrap_or_default()
    }

    /// Encodes the first `length` samples; the packet comes back packed
    /// two bytes per `i16`.
    pub fn encode_shorts(&mut self, shorts: &[i16], length: usize, frame_size: i32) -> Vec<i16> {
        let input = &shorts[..length.min(shorts.len())];
        self.encoder
            .encode(input, frame_size)
            .map(|packet| pcm::pack_bytes(packet.as_bytes(), WIRE_ENDIAN))
            .unwrap_or_default()
    }

    pub fn encoder_release(&mut self) {
        self.encoder.release();
    }

    //
    // Decoder
    //

    pub fn decoder_init(&mut self, sample_rate: i32, num_channels: i32) -> i32 {
        match self.channels("decoder_init", num_channels) {
            Ok(channels) => status(self.decoder.init(sample_rate, channels)),
            Err(err) => err.status_code(),
        }
    }

    pub fn decoder_create(&mut self, sample_rate: i32, num_channels: i32) -> i32 {
        match self.channels("decoder_create", num_channels) {
            Ok(channels) => status(self.decoder.create(sample_rate, channels)),
            Err(err) => err.status_code(),
        }
    }

    /// Decodes the first `length` packet bytes to little-endian PCM.
    pub fn decode_bytes(&mut self, bytes: &[u8], length: usize, frame_size: i32) -> Vec<u8> {
        let packet = &bytes[..length.min(bytes.len())];
        self.decoder
            .decode_bytes(packet, WIRE_ENDIAN, frame_size)
            .unwrap_or_default()
    }

    /// Decodes a packet carried in `i16` words; `length` is its byte count.
    pub fn decode_shorts(&mut self, shorts: &[i16], length: usize, frame_size: i32) -> Vec<i16> {
        let packet = pcm::unpack_bytes(shorts, length, WIRE_ENDIAN);
        self.decoder.decode(&packet, frame_size).unwrap_or_default()
    }

    pub fn decoder_release(&mut self) {
        self.decoder.release();
    }

    //
    // Utils
    //

    /// Little-endian PCM bytes to samples; empty on an odd byte count.
    pub fn convert_bytes_to_shorts(bytes: &[u8]) -> Vec<i16> {
        pcm::bytes_to_samples(bytes, WIRE_ENDIAN).unwrap_or_default()
    }

    /// Samples to little-endian PCM bytes.
    pub fn convert_shorts_to_bytes(shorts: &[i16]) -> Vec<u8> {
        pcm::samples_to_bytes(shorts, WIRE_ENDIAN)
    }
}
