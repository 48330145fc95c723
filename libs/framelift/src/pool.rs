// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Staging-buffer ownership and rotation.

use tracing::debug;

use crate::gpu::{BindCache, BindingPoint, BufferHandle, TransferDevice};
use crate::ring::StagingRing;
use crate::texture::TextureInfo;
use crate::{ReadbackError, Result};

/// Owns the rotation of GPU staging buffers behind one readback engine.
///
/// Every buffer is sized to hold one full texture at its native format, so
/// any crop of any selectable layout fits. Initialization and destruction
/// bind and unbind buffers on the pack binding point; callers must not
/// assume binding state survives either.
pub struct StagingPool {
    ring: StagingRing,
    capacity_bytes: usize,
}

impl StagingPool {
    /// Pool with `depth` unallocated slots sized for `texture`.
    pub fn new(depth: usize, texture: &TextureInfo) -> Self {
        Self {
            ring: StagingRing::new(depth),
            capacity_bytes: texture.texture_bytes,
        }
    }

    /// Allocate and zero-initialize every staging buffer.
    ///
    /// Runs once per engine lifetime, before any read. Failure means the
    /// device is out of buffer memory or gone; the engine is unusable and
    /// the owner must treat it as fatal.
    pub fn initialize<D: TransferDevice>(
        &mut self,
        device: &mut D,
        binds: &mut BindCache,
    ) -> Result<()> {
        let handles = device.create_buffers(self.ring.depth())?;
        if handles.len() != self.ring.depth() {
            return Err(ReadbackError::Allocation(format!(
                "device produced {} buffers, wanted {}",
                handles.len(),
                self.ring.depth()
            )));
        }
        self.ring.install(&handles);
        for handle in handles {
            binds.bind(device, BindingPoint::PixelPack, Some(handle));
            device.allocate_storage(BindingPoint::PixelPack, self.capacity_bytes);
        }
        binds.bind(device, BindingPoint::PixelPack, None);
        debug!(
            buffers = self.ring.depth(),
            bytes = self.capacity_bytes,
            "staging pool initialized"
        );
        Ok(())
    }

    /// Delete every live buffer and reset all slots to the null sentinel.
    ///
    /// Idempotent: safe to call repeatedly and before `initialize`.
    pub fn destroy<D: TransferDevice>(&mut self, device: &mut D) {
        let live: Vec<BufferHandle> = self
            .ring
            .handles()
            .iter()
            .copied()
            .filter(|handle| !handle.is_null())
            .collect();
        if !live.is_empty() {
            device.delete_buffers(&live);
            debug!(buffers = live.len(), "staging pool destroyed");
        }
        self.ring.clear();
    }

    pub fn is_initialized(&self) -> bool {
        self.ring.handles().iter().any(|handle| !handle.is_null())
    }

    /// Per-buffer capacity in bytes.
    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// Every slot in rotation order; destroyed slots read as null.
    pub fn handles(&self) -> &[BufferHandle] {
        self.ring.handles()
    }

    /// Rotate the write slot forward one step.
    pub fn advance(&mut self) {
        self.ring.advance();
    }

    /// Slot the next asynchronous read writes into.
    pub fn current(&self) -> BufferHandle {
        self.ring.current()
    }

    /// Slot written one generation earlier; its transfer is complete.
    pub fn previous(&self) -> BufferHandle {
        self.ring.previous()
    }

    /// Fixed slot blocking reads target, outside the rotation's bookkeeping.
    pub fn last(&self) -> BufferHandle {
        self.ring.last()
    }
}
