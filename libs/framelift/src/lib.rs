// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Asynchronous framebuffer readback over a rotation of GPU staging buffers.
//!
//! [`FramebufferReader`] copies rendered color-buffer pixels into host memory
//! without stalling the render pipeline. The non-blocking path starts a
//! transfer into one staging buffer while returning the pixels a previous
//! call captured into another, trading one frame of staleness for never
//! waiting on the GPU. The blocking path reads and returns the current frame
//! from a fixed staging slot.
//!
//! The GPU read always spans the texture's allocated width, which usually
//! exceeds the caller's crop; the host-side row copy strips that stride
//! padding so callers always receive tightly packed rows.
//!
//! The GPU itself stays behind the [`gpu::TransferDevice`] trait. Render
//! backends implement it, [`gpu::DeferredQueue`] preserves call order across
//! thread-marshalled dispatch, and [`gpu::SoftwareDevice`] runs the whole
//! engine in host memory for headless use and tests.

pub mod config;
pub mod error;
pub mod format;
pub mod gpu;
pub mod pool;
pub mod reader;
pub mod ring;
pub mod texture;

pub use config::ReadbackConfig;
pub use error::{ReadbackError, Result};
pub use format::{
    FormatProvider, FramebufferFormats, MONOCHROME_CUTOFF_BITS, PixelLayout, StaticFormats,
};
pub use reader::FramebufferReader;
pub use texture::TextureInfo;
