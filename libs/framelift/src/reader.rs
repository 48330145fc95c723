// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Framebuffer readback orchestration.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::config::ReadbackConfig;
use crate::format::FormatProvider;
use crate::gpu::{BindCache, BindingPoint, ReadRegion, TransferDevice};
use crate::pool::StagingPool;
use crate::texture::TextureInfo;
use crate::{ReadbackError, Result};

/// Reads rendered color-buffer pixels back into host memory.
///
/// Two paths per call, selected by the `sync` flag and never persisted. The
/// blocking path reads into a fixed staging slot and returns this call's
/// pixels. The non-blocking path starts a transfer into the rotation's
/// fresh slot and returns the pixels captured one call earlier. It never
/// stalls the render timeline, at the price of one frame of staleness, and
/// its first call in a session yields the zero-initialized buffer contents.
///
/// Call sequence per frame: [`read_pixels`](Self::read_pixels), consume the
/// returned rows, then [`clean_up`](Self::clean_up) before the next read.
pub struct FramebufferReader<D: TransferDevice> {
    device: D,
    binds: BindCache,
    texture: Arc<TextureInfo>,
    formats: Arc<dyn FormatProvider>,
    pool: StagingPool,
    scratch: Vec<u8>,
    mapped: bool,
}

impl<D: TransferDevice> FramebufferReader<D> {
    /// Engine with the default two-buffer rotation.
    pub fn new(
        device: D,
        texture: Arc<TextureInfo>,
        formats: Arc<dyn FormatProvider>,
    ) -> Result<Self> {
        Self::with_config(device, texture, formats, ReadbackConfig::default())
    }

    /// Engine with an explicit configuration.
    ///
    /// Allocates every staging buffer up front, sized from `texture`. An
    /// allocation failure leaves no usable engine behind and is fatal for
    /// the owning context.
    pub fn with_config(
        mut device: D,
        texture: Arc<TextureInfo>,
        formats: Arc<dyn FormatProvider>,
        config: ReadbackConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut binds = BindCache::new();
        let mut pool = StagingPool::new(config.staging_buffers, &texture);
        pool.initialize(&mut device, &mut binds)?;
        let scratch = vec![0; texture.texture_bytes];
        Ok(Self {
            device,
            binds,
            texture,
            formats,
            pool,
            scratch,
            mapped: false,
        })
    }

    /// Copy a `width` x `height` crop of the framebuffer, anchored at
    /// (`x0`, `y0`), into host memory.
    ///
    /// `pixel_size_bits` picks between the provider's monochrome layout (at
    /// or below 8 bits) and its full-color layout. With `sync` the returned
    /// rows are this call's capture; without it they are the capture the
    /// previous call started.
    ///
    /// Rows come back tightly packed, `width * bytes_per_pixel` bytes each,
    /// with the stride padding of the texture's allocated width stripped.
    /// The slice borrows from the engine and stays valid until the next
    /// call; [`clean_up`](Self::clean_up) must run after each successful
    /// read before the next one.
    pub fn read_pixels(
        &mut self,
        x0: i32,
        y0: i32,
        width: u32,
        height: u32,
        pixel_size_bits: u32,
        sync: bool,
    ) -> Result<&[u8]> {
        if self.mapped {
            warn!("read_pixels issued while a mapping is still live; clean_up was skipped");
        }
        let layout = self.formats.framebuffer_formats().select(pixel_size_bits);
        let real_width = self.texture.real_width;
        if width == 0 || width > real_width {
            return Err(ReadbackError::Region(format!(
                "crop width {width} outside 1..={real_width}"
            )));
        }
        let bpp = layout.bytes_per_pixel as usize;
        let stride_bytes = real_width as usize * bpp;
        let mapped_len = stride_bytes * height as usize;
        if mapped_len > self.pool.capacity_bytes() {
            return Err(ReadbackError::Region(format!(
                "{height} rows of {stride_bytes} bytes exceed the {}-byte staging capacity",
                self.pool.capacity_bytes()
            )));
        }

        // The GPU read always spans the allocated width; the crop is
        // applied on the host side during the row copy.
        let region = ReadRegion {
            x: x0,
            y: y0,
            width: real_width,
            height,
        };

        if sync {
            // Blocking reads always target the fixed final slot; the
            // rotation index does not move.
            self.binds
                .bind(&mut self.device, BindingPoint::PixelPack, Some(self.pool.last()));
            self.device.read_pixels(region, layout);
        } else {
            self.pool.advance();
            let write_slot = self.pool.current();
            let read_slot = self.pool.previous();
            self.binds
                .bind(&mut self.device, BindingPoint::PixelPack, Some(write_slot));
            self.device.read_pixels_async(region, layout);
            self.binds
                .bind(&mut self.device, BindingPoint::PixelPack, Some(read_slot));
        }
        trace!(
            x0,
            y0,
            width,
            height,
            sync,
            bytes_per_pixel = layout.bytes_per_pixel,
            "framebuffer read issued"
        );

        let Some(rows) = self.device.map_buffer(BindingPoint::PixelPack, mapped_len) else {
            return Err(ReadbackError::MapFailed);
        };
        self.mapped = true;

        let width_bytes = width as usize * bpp;
        for row in 0..height as usize {
            let src = row * stride_bytes;
            let dst = row * width_bytes;
            self.scratch[dst..dst + width_bytes]
                .copy_from_slice(&rows[src..src + width_bytes]);
        }
        Ok(&self.scratch[..height as usize * width_bytes])
    }

    /// Release the host mapping and clear the pack binding.
    ///
    /// Must run exactly once after each successful read, before the next
    /// one; a still-mapped buffer cannot be the target of a new GPU read.
    pub fn clean_up(&mut self) {
        self.device.unmap_buffer(BindingPoint::PixelPack);
        self.binds
            .bind(&mut self.device, BindingPoint::PixelPack, None);
        self.mapped = false;
    }

    /// Delete the staging buffers. Idempotent; also runs on drop.
    pub fn destroy(&mut self) {
        self.pool.destroy(&mut self.device);
    }

    /// Staging pool state, mainly for diagnostics and tests.
    pub fn pool(&self) -> &StagingPool {
        &self.pool
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn texture(&self) -> &TextureInfo {
        &self.texture
    }
}

impl<D: TransferDevice> Drop for FramebufferReader<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
