//! Typed codec parameters.

use crate::error::CodecError;
use crate::ffi;

/// Channel layout. Opus handles mono and stereo only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Channels {
    /// Returns the number of interleaved channels.
    pub fn count(&self) -> i32 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

impl TryFrom<i32> for Channels {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mono),
            2 => Ok(Self::Stereo),
            n => Err(CodecError::InvalidChannels(n)),
        }
    }
}

/// Sample rates supported by libopus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    Hz8000,
    Hz12000,
    Hz16000,
    Hz24000,
    Hz48000,
}

impl SampleRate {
    pub const ALL: [SampleRate; 5] = [
        Self::Hz8000,
        Self::Hz12000,
        Self::Hz16000,
        Self::Hz24000,
        Self::Hz48000,
    ];

    /// Returns the rate in Hz.
    pub fn hz(&self) -> i32 {
        match self {
            Self::Hz8000 => 8000,
            Self::Hz12000 => 12000,
            Self::Hz16000 => 16000,
            Self::Hz24000 => 24000,
            Self::Hz48000 => 48000,
        }
    }
}

impl TryFrom<i32> for SampleRate {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|rate| rate.hz() == value)
            .ok_or_else(|| CodecError::InvalidArgument(format!("unsupported sample rate {value}")))
    }
}

/// Opus application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// Best quality for voice signals.
    VoIP,
    /// Best quality for non-voice signals.
    Audio,
    /// Minimum possible coding delay.
    RestrictedLowdelay,
}

impl Application {
    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::VoIP => ffi::OPUS_APPLICATION_VOIP,
            Self::Audio => ffi::OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }
}

impl TryFrom<i32> for Application {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            ffi::OPUS_APPLICATION_VOIP => Ok(Self::VoIP),
            ffi::OPUS_APPLICATION_AUDIO => Ok(Self::Audio),
            ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY => Ok(Self::RestrictedLowdelay),
            n => Err(CodecError::InvalidArgument(format!("unknown application {n}"))),
        }
    }
}

impl From<Application> for i32 {
    fn from(app: Application) -> i32 {
        app.to_ffi()
    }
}

/// Target bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitrate {
    /// Let the encoder pick from the sample rate and channel count.
    Auto,
    /// Spend as many bits as the packet allows.
    Max,
    /// Explicit bits per second.
    Bits(i32),
}

impl Bitrate {
    pub(crate) fn to_ffi(self) -> i32 {
        match self {
            Self::Auto => ffi::OPUS_AUTO,
            Self::Max => ffi::OPUS_BITRATE_MAX,
            Self::Bits(bps) => bps,
        }
    }

    pub(crate) fn from_ffi(value: i32) -> Self {
        match value {
            ffi::OPUS_AUTO => Self::Auto,
            ffi::OPUS_BITRATE_MAX => Self::Max,
            bps => Self::Bits(bps),
        }
    }
}

impl From<i32> for Bitrate {
    fn from(value: i32) -> Self {
        Self::from_ffi(value)
    }
}

/// Encoder computational complexity, 0 (fastest) to 10 (best).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Complexity(u8);

impl Complexity {
    pub const MIN: Complexity = Complexity(0);
    pub const MAX: Complexity = Complexity(10);

    pub fn new(level: i32) -> Result<Self, CodecError> {
        if !(0..=10).contains(&level) {
            return Err(CodecError::InvalidArgument(format!(
                "complexity {level} out of range 0..=10"
            )));
        }
        Ok(Self(level as u8))
    }

    pub fn level(&self) -> i32 {
        self.0 as i32
    }
}

impl TryFrom<i32> for Complexity {
    type Error = CodecError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Frame durations accepted by `opus_encode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
    Duration80ms,
    Duration100ms,
    Duration120ms,
}

impl FrameDuration {
    /// Returns the duration in microseconds.
    pub fn micros(&self) -> i64 {
        match self {
            Self::Duration2500us => 2500,
            Self::Duration5ms => 5_000,
            Self::Duration10ms => 10_000,
            Self::Duration20ms => 20_000,
            Self::Duration40ms => 40_000,
            Self::Duration60ms => 60_000,
            Self::Duration80ms => 80_000,
            Self::Duration100ms => 100_000,
            Self::Duration120ms => 120_000,
        }
    }

    /// Returns the samples per channel in one frame at `sample_rate`.
    pub fn frame_size(&self, sample_rate: i32) -> i32 {
        (sample_rate as i64 * self.micros() / 1_000_000) as i32
    }

    /// Parses a duration in milliseconds; `2.5` is the only fractional one.
    pub fn from_millis(ms: f32) -> Option<Self> {
        let us = (ms * 1000.0).round() as i64;
        [
            Self::Duration2500us,
            Self::Duration5ms,
            Self::Duration10ms,
            Self::Duration20ms,
            Self::Duration40ms,
            Self::Duration60ms,
            Self::Duration80ms,
            Self::Duration100ms,
            Self::Duration120ms,
        ]
        .into_iter()
        .find(|fd| fd.micros() == us)
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            other => write!(f, "{}ms", other.micros() / 1000),
        }
    }
}
