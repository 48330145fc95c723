// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Allocated texture geometry.

/// Geometry of the GPU texture backing a framebuffer.
///
/// Describes what the GPU actually allocated, which may be wider than any
/// region a caller asks to read back. The texture is owned by the embedding
/// renderer's texture cache and outlives the engine; the engine only holds
/// a shared reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureInfo {
    /// Allocated width in pixels. Readback rows span this width regardless
    /// of the requested crop.
    pub real_width: u32,
    /// Allocated height in pixels.
    pub real_height: u32,
    /// Total allocation size in bytes at the texture's native format. Upper
    /// bound for any readback of any selectable layout.
    pub texture_bytes: usize,
}

impl TextureInfo {
    pub fn new(real_width: u32, real_height: u32, texture_bytes: usize) -> Self {
        Self {
            real_width,
            real_height,
            texture_bytes,
        }
    }
}
