//! Lifecycle wrapper around the Opus codec.
//!
//! This crate owns libopus encoder and decoder state and exposes frame-based
//! encode and decode over 16-bit samples and byte-packed PCM:
//!
//! - [`Encoder`]: init, bitrate and complexity tuning, encode, release
//! - [`Decoder`]: init, decode, release
//! - [`CodecOpus`]: both controllers behind flat status-code entry points
//!
//! Operations that need a live instance fail with
//! [`CodecError::NotInitialized`] when called before `init`. Releasing is
//! idempotent, and dropping a controller releases its instance.
//!
//! # Example
//!
//! ```no_run
//! use easyopus::{Application, Channels, Decoder, Encoder};
//!
//! let mut encoder = Encoder::new();
//! encoder.init(16000, Channels::Mono, Application::VoIP)?;
//!
//! let pcm = vec![0i16; 320]; // 20ms at 16kHz
//! let packet = encoder.encode(&pcm, 320)?;
//!
//! let mut decoder = Decoder::new();
//! decoder.init(16000, Channels::Mono)?;
//! let decoded = decoder.decode(packet.as_bytes(), 320)?;
//! assert_eq!(decoded.len(), 320);
//! # Ok::<(), easyopus::CodecError>(())
//! ```
//!
//! # Linking
//!
//! libopus is linked from the system. Set `OPUS_LIB_DIR` to add a search
//! path.

mod constants;
mod decoder;
mod encoder;
mod error;
mod ffi;
mod flat;
mod guard;
mod instance;
mod logger;
mod packet;
pub mod pcm;
pub mod pipeline;

pub use constants::{Application, Bitrate, Channels, Complexity, FrameDuration, SampleRate};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodecError, STATUS_FAILURE};
pub use flat::CodecOpus;
pub use guard::Direction;
pub use instance::{DecoderConfig, EncoderConfig};
pub use logger::{Logger, NopLogger, default_logger};
pub use packet::Packet;
pub use pcm::Endian;
