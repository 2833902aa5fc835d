//! Encoder controller.

use std::sync::Arc;

use crate::constants::{Application, Bitrate, Channels, Complexity, FrameDuration};
use crate::error::CodecError;
use crate::ffi;
use crate::guard::{self, Direction};
use crate::instance::{EncoderConfig, EncoderInstance};
use crate::logger::{Logger, default_logger, log_debug, log_error};
use crate::packet::Packet;
use crate::pcm::{self, Endian};
use crate::pipeline;

/// Owns zero or one Opus encoder instance.
///
/// Every operation except `init`, `create` and `release` requires a live
/// instance and fails with `CodecError::NotInitialized` otherwise.
pub struct Encoder {
    instance: Option<EncoderInstance>,
    logger: Arc<dyn Logger>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    /// Creates an encoder controller with no instance.
    pub fn new() -> Self {
        Self::with_logger(default_logger())
    }

    /// Creates an encoder controller reporting to `logger`.
    pub fn with_logger(logger: Arc<dyn Logger>) -> Self {
        Self {
            instance: None,
            logger,
        }
    }

    /// Allocates encoder state and initializes it in place.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Channel layout
    /// - `application`: Intended application type
    pub fn init(
        &mut self,
        sample_rate: i32,
        channels: Channels,
        application: Application,
    ) -> Result<(), CodecError> {
        self.install("init", sample_rate, channels, application, EncoderInstance::init_in_place)
    }

    /// Like `init`, but libopus allocates the state itself.
    pub fn create(
        &mut self,
        sample_rate: i32,
        channels: Channels,
        application: Application,
    ) -> Result<(), CodecError> {
        self.install("create", sample_rate, channels, application, EncoderInstance::create)
    }

    fn install(
        &mut self,
        op: &'static str,
        sample_rate: i32,
        channels: Channels,
        application: Application,
        build: fn(EncoderConfig) -> Result<EncoderInstance, CodecError>,
    ) -> Result<(), CodecError> {
        if self.instance.is_some() {
            log_debug!(self.logger, "[{}] replacing existing encoder", op);
            self.release();
        }

        if sample_rate <= 0 {
            let err = CodecError::InvalidArgument(format!("sample rate {sample_rate}"));
            log_error!(self.logger, "[{}] couldn't init encoder: {}", op, err);
            return Err(err);
        }

        let config = EncoderConfig {
            sample_rate,
            channels,
            application,
        };
        match build(config) {
            Ok(instance) => {
                log_debug!(
                    self.logger,
                    "[{}] encoder successfully initialized: {}Hz, {} channel(s), {:?}, state {}",
                    op,
                    sample_rate,
                    channels.count(),
                    application,
                    instance.describe()
                );
                self.instance = Some(instance);
                Ok(())
            }
            Err(err) => {
                log_error!(self.logger, "[{}] couldn't init encoder: {}", op, err);
                Err(err)
            }
        }
    }

    /// Returns true while an instance is allocated.
    pub fn is_initialized(&self) -> bool {
        self.instance.is_some()
    }

    /// Returns the configuration of the live instance.
    pub fn config(&self) -> Option<EncoderConfig> {
        self.instance.as_ref().map(|inst| *inst.config())
    }

    /// Returns the frame size for a given duration at the configured rate.
    pub fn frame_size_for_duration(&self, fd: FrameDuration) -> Option<i32> {
        self.config().map(|config| fd.frame_size(config.sample_rate))
    }

    /// Sets the target bitrate.
    pub fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<(), CodecError> {
        self.ctl_set("set_bitrate", ffi::OPUS_SET_BITRATE_REQUEST, bitrate.to_ffi())
    }

    /// Returns the current bitrate. Under `Bitrate::Auto` libopus reports the
    /// value it picked rather than `Auto`.
    pub fn bitrate(&mut self) -> Result<Bitrate, CodecError> {
        self.ctl_get("bitrate", ffi::OPUS_GET_BITRATE_REQUEST)
            .map(Bitrate::from_ffi)
    }

    /// Sets the encoder complexity (0-10).
    pub fn set_complexity(&mut self, complexity: Complexity) -> Result<(), CodecError> {
        self.ctl_set(
            "set_complexity",
            ffi::OPUS_SET_COMPLEXITY_REQUEST,
            complexity.level(),
        )
    }

    /// Returns the current complexity.
    pub fn complexity(&mut self) -> Result<Complexity, CodecError> {
        let level = self.ctl_get("complexity", ffi::OPUS_GET_COMPLEXITY_REQUEST)?;
        Complexity::new(level)
    }

    fn ctl_set(&mut self, op: &'static str, request: i32, value: i32) -> Result<(), CodecError> {
        let inst = guard::require(&mut self.instance, Direction::Encoder, op, self.logger.as_ref())?;
        let ret = unsafe { ffi::opus_encoder_ctl(inst.as_ptr(), request, value) };
        if ret != ffi::OPUS_OK {
            let err = CodecError::control(request, ret);
            log_error!(self.logger, "[{}] {} rejected: {}", op, value, err);
            return Err(err);
        }
        Ok(())
    }

    fn ctl_get(&mut self, op: &'static str, request: i32) -> Result<i32, CodecError> {
        let inst = guard::require(&mut self.instance, Direction::Encoder, op, self.logger.as_ref())?;
        let mut value: i32 = 0;
        let ret = unsafe { ffi::opus_encoder_ctl(inst.as_ptr(), request, &mut value as *mut i32) };
        if ret != ffi::OPUS_OK {
            let err = CodecError::control(request, ret);
            log_error!(self.logger, "[{}] {}", op, err);
            return Err(err);
        }
        Ok(value)
    }

    /// Encodes one frame of interleaved PCM samples.
    ///
    /// # Parameters
    /// - `pcm`: Input PCM samples (at least frame_size * channels)
    /// - `frame_size`: Number of samples per channel
    pub fn encode(&mut self, pcm: &[i16], frame_size: i32) -> Result<Packet, CodecError> {
        let inst = guard::require(&mut self.instance, Direction::Encoder, "encode", self.logger.as_ref())?;
        pipeline::encode_frame(inst, pcm, frame_size).inspect_err(|err| {
            log_error!(self.logger, "[encode] {}", err);
        })
    }

    /// Encodes one frame of byte-packed PCM with the given byte order.
    pub fn encode_bytes(
        &mut self,
        pcm: &[u8],
        endian: Endian,
        frame_size: i32,
    ) -> Result<Packet, CodecError> {
        let inst = guard::require(
            &mut self.instance,
            Direction::Encoder,
            "encode_bytes",
            self.logger.as_ref(),
        )?;
        pcm::bytes_to_samples(pcm, endian)
            .and_then(|samples| pipeline::encode_frame(inst, &samples, frame_size))
            .inspect_err(|err| {
                log_error!(self.logger, "[encode_bytes] {}", err);
            })
    }

    /// Frees the instance. Calling it with no instance is a no-op.
    pub fn release(&mut self) {
        if self.instance.take().is_some() {
            log_debug!(self.logger, "[release] encoder released");
        }
    }
}
