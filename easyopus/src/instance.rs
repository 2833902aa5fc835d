//! Owned native codec state.
//!
//! An instance is either a block this crate allocated and libopus
//! initialized in place, or state libopus allocated itself through
//! `opus_*_create`. Either way it is freed exactly once, on drop.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use crate::constants::{Application, Channels};
use crate::error::CodecError;
use crate::ffi;

const BLOCK_ALIGN: usize = 16;

/// Zeroed heap block sized by an `opus_*_get_size` query.
pub(crate) struct NativeBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl NativeBlock {
    fn alloc(size: usize) -> Result<Self, CodecError> {
        let layout = Layout::from_size_align(size, BLOCK_ALIGN)
            .map_err(|e| CodecError::InvalidArgument(e.to_string()))?;
        // Size comes from a positive native query, so the layout is non-zero.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::handle_alloc_error(layout);
        };
        Ok(Self { ptr, layout })
    }

    fn size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for NativeBlock {
    fn drop(&mut self) {
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

enum Ownership {
    Block(NativeBlock),
    Library,
}

impl Ownership {
    fn block_size(&self) -> Option<usize> {
        match self {
            Ownership::Block(block) => Some(block.size()),
            Ownership::Library => None,
        }
    }

    fn describe(&self) -> String {
        match self.block_size() {
            Some(size) => format!("{size} bytes in place"),
            None => "library-owned".to_string(),
        }
    }
}

/// Configuration an encoder instance was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub sample_rate: i32,
    pub channels: Channels,
    pub application: Application,
}

/// Configuration a decoder instance was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub sample_rate: i32,
    pub channels: Channels,
}

/// Allocated and configured encoder state.
pub(crate) struct EncoderInstance {
    ptr: NonNull<ffi::OpusEncoder>,
    ownership: Ownership,
    config: EncoderConfig,
}

// Safety: the state is exclusively owned and only touched through &mut.
unsafe impl Send for EncoderInstance {}

impl EncoderInstance {
    /// Queries the state size, allocates it and runs `opus_encoder_init`.
    pub(crate) fn init_in_place(config: EncoderConfig) -> Result<Self, CodecError> {
        let size = unsafe { ffi::opus_encoder_get_size(config.channels.count()) };
        if size <= 0 {
            return Err(CodecError::SizeQuery(size));
        }

        let block = NativeBlock::alloc(size as usize)?;
        let ptr = block.ptr.cast::<ffi::OpusEncoder>();
        let ret = unsafe {
            ffi::opus_encoder_init(
                ptr.as_ptr(),
                config.sample_rate,
                config.channels.count(),
                config.application.to_ffi(),
            )
        };
        if ret != ffi::OPUS_OK {
            // block is freed on return
            return Err(CodecError::native_init(ret));
        }

        Ok(Self {
            ptr,
            ownership: Ownership::Block(block),
            config,
        })
    }

    /// Lets libopus allocate the state with `opus_encoder_create`.
    pub(crate) fn create(config: EncoderConfig) -> Result<Self, CodecError> {
        let mut error: i32 = 0;
        let raw = unsafe {
            ffi::opus_encoder_create(
                config.sample_rate,
                config.channels.count(),
                config.application.to_ffi(),
                &mut error,
            )
        };

        match NonNull::new(raw) {
            Some(ptr) if error == ffi::OPUS_OK => Ok(Self {
                ptr,
                ownership: Ownership::Library,
                config,
            }),
            Some(ptr) => {
                unsafe { ffi::opus_encoder_destroy(ptr.as_ptr()) };
                Err(CodecError::native_init(error))
            }
            None => Err(CodecError::native_init(error)),
        }
    }

    pub(crate) fn as_ptr(&mut self) -> *mut ffi::OpusEncoder {
        self.ptr.as_ptr()
    }

    pub(crate) fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Bytes held by a crate-allocated block; `None` for library-owned state.
    #[cfg(test)]
    pub(crate) fn block_size(&self) -> Option<usize> {
        self.ownership.block_size()
    }

    /// Who owns the state, for lifecycle logs.
    pub(crate) fn describe(&self) -> String {
        self.ownership.describe()
    }
}

impl Drop for EncoderInstance {
    fn drop(&mut self) {
        if let Ownership::Library = self.ownership {
            unsafe { ffi::opus_encoder_destroy(self.ptr.as_ptr()) };
        }
    }
}

/// Allocated and configured decoder state.
pub(crate) struct DecoderInstance {
    ptr: NonNull<ffi::OpusDecoder>,
    ownership: Ownership,
    config: DecoderConfig,
}

// Safety: the state is exclusively owned and only touched through &mut.
unsafe impl Send for DecoderInstance {}

impl DecoderInstance {
    /// Queries the state size, allocates it and runs `opus_decoder_init`.
    pub(crate) fn init_in_place(config: DecoderConfig) -> Result<Self, CodecError> {
        let size = unsafe { ffi::opus_decoder_get_size(config.channels.count()) };
        if size <= 0 {
            return Err(CodecError::SizeQuery(size));
        }

        let block = NativeBlock::alloc(size as usize)?;
        let ptr = block.ptr.cast::<ffi::OpusDecoder>();
        let ret = unsafe {
            ffi::opus_decoder_init(ptr.as_ptr(), config.sample_rate, config.channels.count())
        };
        if ret != ffi::OPUS_OK {
            return Err(CodecError::native_init(ret));
        }

        Ok(Self {
            ptr,
            ownership: Ownership::Block(block),
            config,
        })
    }

    /// Lets libopus allocate the state with `opus_decoder_create`.
    pub(crate) fn create(config: DecoderConfig) -> Result<Self, CodecError> {
        let mut error: i32 = 0;
        let raw = unsafe {
            ffi::opus_decoder_create(config.sample_rate, config.channels.count(), &mut error)
        };

        match NonNull::new(raw) {
            Some(ptr) if error == ffi::OPUS_OK => Ok(Self {
                ptr,
                ownership: Ownership::Library,
                config,
            }),
            Some(ptr) => {
                unsafe { ffi::opus_decoder_destroy(ptr.as_ptr()) };
                Err(CodecError::native_init(error))
            }
            None => Err(CodecError::native_init(error)),
        }
    }

    pub(crate) fn as_ptr(&mut self) -> *mut ffi::OpusDecoder {
        self.ptr.as_ptr()
    }

    pub(crate) fn config(&self) -> &DecoderConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn block_size(&self) -> Option<usize> {
        self.ownership.block_size()
    }

    pub(crate) fn describe(&self) -> String {
        self.ownership.describe()
    }
}

impl Drop for DecoderInstance {
    fn drop(&mut self) {
        if let Ownership::Library = self.ownership {
            unsafe { ffi::opus_decoder_destroy(self.ptr.as_ptr()) };
        }
    }
}
