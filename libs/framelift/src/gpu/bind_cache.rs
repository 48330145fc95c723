// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Buffer-bind deduplication.

use tracing::trace;

use super::{BindingPoint, BufferHandle, TransferDevice};

/// Tracks the buffer bound to each transfer binding point and drops
/// redundant re-binds before they reach the device.
///
/// Binding state is plain mutable GPU state with the engine as its only
/// writer, so one slot per binding point is enough to elide every repeat
/// bind.
#[derive(Debug, Default)]
pub struct BindCache {
    pack: Option<BufferHandle>,
    unpack: Option<BufferHandle>,
}

impl BindCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handle` to `point` unless it is already bound there.
    pub fn bind<D>(&mut self, device: &mut D, point: BindingPoint, handle: Option<BufferHandle>)
    where
        D: TransferDevice + ?Sized,
    {
        let slot = match point {
            BindingPoint::PixelPack => &mut self.pack,
            BindingPoint::PixelUnpack => &mut self.unpack,
        };
        if *slot == handle {
            trace!(?point, ?handle, "bind elided");
            return;
        }
        *slot = handle;
        device.bind_buffer(point, handle);
    }

    /// Handle currently bound to `point`, if any.
    pub fn bound(&self, point: BindingPoint) -> Option<BufferHandle> {
        match point {
            BindingPoint::PixelPack => self.pack,
            BindingPoint::PixelUnpack => self.unpack,
        }
    }
}
