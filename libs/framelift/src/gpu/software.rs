// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! In-memory reference device.

use std::collections::HashMap;

use crate::Result;
use crate::format::PixelLayout;

use super::{BindingPoint, BufferHandle, ReadRegion, TransferDevice};

/// [`TransferDevice`] that runs entirely in host memory.
///
/// Stands in for a real GPU in headless runs and tests: staging buffers are
/// plain byte vectors and the "framebuffer" is an image injected with
/// [`set_framebuffer`](SoftwareDevice::set_framebuffer). Every executed call
/// is journaled so callers can assert on ordering, and mapping failure is
/// injectable with [`fail_next_map`](SoftwareDevice::fail_next_map).
///
/// Reads copy rows straight out of the injected image, so the image must
/// cover the requested region at the requested layout. Only one buffer may
/// be mapped at a time; mapping while mapped returns `None`, the same
/// refusal a driver gives for a busy buffer.
#[derive(Debug, Default)]
pub struct SoftwareDevice {
    buffers: HashMap<BufferHandle, Vec<u8>>,
    next_handle: u64,
    pack_bound: Option<BufferHandle>,
    unpack_bound: Option<BufferHandle>,
    mapped: Option<BufferHandle>,
    fail_next_map: bool,
    framebuffer: Vec<u8>,
    fb_row_pixels: u32,
    journal: Vec<String>,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the image reads capture from. `row_pixels` is the image's
    /// own row stride in pixels.
    pub fn set_framebuffer(&mut self, row_pixels: u32, bytes: Vec<u8>) {
        self.fb_row_pixels = row_pixels;
        self.framebuffer = bytes;
    }

    /// Make the next `map_buffer` call return no pointer.
    pub fn fail_next_map(&mut self) {
        self.fail_next_map = true;
    }

    /// Executed calls, oldest first.
    pub fn journal(&self) -> &[String] {
        &self.journal
    }

    /// Drain the journal.
    pub fn take_journal(&mut self) -> Vec<String> {
        std::mem::take(&mut self.journal)
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    fn bound(&self, point: BindingPoint) -> Option<BufferHandle> {
        match point {
            BindingPoint::PixelPack => self.pack_bound,
            BindingPoint::PixelUnpack => self.unpack_bound,
        }
    }

    fn capture(&mut self, region: ReadRegion, layout: PixelLayout) {
        let Some(handle) = self.pack_bound else {
            return;
        };
        let Some(buffer) = self.buffers.get_mut(&handle) else {
            return;
        };
        let bpp = layout.bytes_per_pixel as usize;
        let row_bytes = region.width as usize * bpp;
        let fb_stride = self.fb_row_pixels as usize * bpp;
        for row in 0..region.height as usize {
            let src = (region.y as usize + row) * fb_stride + region.x as usize * bpp;
            let dst = row * row_bytes;
            buffer[dst..dst + row_bytes].copy_from_slice(&self.framebuffer[src..src + row_bytes]);
        }
    }
}

impl TransferDevice for SoftwareDevice {
    fn create_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>> {
        let mut handles = Vec::with_capacity(count);
        for _ in 0..count {
            self.next_handle += 1;
            let handle = BufferHandle(self.next_handle);
            self.buffers.insert(handle, Vec::new());
            handles.push(handle);
        }
        self.journal.push(format!("create_buffers({count})"));
        Ok(handles)
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) {
        for handle in handles {
            self.buffers.remove(handle);
        }
        self.journal.push(format!("delete_buffers({})", handles.len()));
    }

    fn bind_buffer(&mut self, point: BindingPoint, handle: Option<BufferHandle>) {
        match point {
            BindingPoint::PixelPack => self.pack_bound = handle,
            BindingPoint::PixelUnpack => self.unpack_bound = handle,
        }
        self.journal.push(format!("bind_buffer({point:?}, {handle:?})"));
    }

    fn allocate_storage(&mut self, point: BindingPoint, bytes: usize) {
        if let Some(handle) = self.bound(point) {
            if let Some(buffer) = self.buffers.get_mut(&handle) {
                *buffer = vec![0; bytes];
            }
        }
        self.journal
            .push(format!("allocate_storage({point:?}, {bytes})"));
    }

    fn read_pixels(&mut self, region: ReadRegion, layout: PixelLayout) {
        self.capture(region, layout);
        self.journal.push(format!(
            "read_pixels({}x{}+{}+{})",
            region.width, region.height, region.x, region.y
        ));
    }

    fn read_pixels_async(&mut self, region: ReadRegion, layout: PixelLayout) {
        // The copy itself is instantaneous here; the one-frame skew the
        // engine guarantees comes from which buffer it maps, not from when
        // the transfer lands.
        self.capture(region, layout);
        self.journal.push(format!(
            "read_pixels_async({}x{}+{}+{})",
            region.width, region.height, region.x, region.y
        ));
    }

    fn map_buffer(&mut self, point: BindingPoint, len: usize) -> Option<&[u8]> {
        self.journal.push(format!("map_buffer({point:?}, {len})"));
        if self.fail_next_map {
            self.fail_next_map = false;
            return None;
        }
        if self.mapped.is_some() {
            return None;
        }
        let handle = self.bound(point)?;
        if !self.buffers.get(&handle).is_some_and(|b| b.len() >= len) {
            return None;
        }
        self.mapped = Some(handle);
        self.buffers.get(&handle).map(|buffer| &buffer[..len])
    }

    fn unmap_buffer(&mut self, point: BindingPoint) {
        self.mapped = None;
        self.journal.push(format!("unmap_buffer({point:?})"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAY: PixelLayout = PixelLayout::new(0, 0, 1);

    #[test]
    fn capture_lands_in_the_pack_bound_buffer() {
        let mut device = SoftwareDevice::new();
        device.set_framebuffer(4, vec![9; 16]);
        let handles = device.create_buffers(1).unwrap();
        device.bind_buffer(BindingPoint::PixelPack, Some(handles[0]));
        device.allocate_storage(BindingPoint::PixelPack, 16);

        device.read_pixels(
            ReadRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 2,
            },
            GRAY,
        );

        let mapped = device.map_buffer(BindingPoint::PixelPack, 8).unwrap();
        assert_eq!(mapped, &[9; 8]);
    }

    #[test]
    fn mapping_twice_without_unmap_is_refused() {
        let mut device = SoftwareDevice::new();
        let handles = device.create_buffers(1).unwrap();
        device.bind_buffer(BindingPoint::PixelPack, Some(handles[0]));
        device.allocate_storage(BindingPoint::PixelPack, 4);

        assert!(device.map_buffer(BindingPoint::PixelPack, 4).is_some());
        assert!(device.map_buffer(BindingPoint::PixelPack, 4).is_none());
        device.unmap_buffer(BindingPoint::PixelPack);
        assert!(device.map_buffer(BindingPoint::PixelPack, 4).is_some());
    }
}
