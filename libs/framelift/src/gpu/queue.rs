// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Ordered deferral of GPU transfer calls.

use std::collections::VecDeque;

use tracing::trace;

use crate::Result;
use crate::format::PixelLayout;

use super::{BindingPoint, BufferHandle, ReadRegion, TransferDevice};

/// A deferred GPU call, recorded in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferCommand {
    DeleteBuffers(Vec<BufferHandle>),
    BindBuffer {
        point: BindingPoint,
        handle: Option<BufferHandle>,
    },
    AllocateStorage {
        point: BindingPoint,
        bytes: usize,
    },
    ReadPixelsAsync {
        region: ReadRegion,
        layout: PixelLayout,
    },
    UnmapBuffer {
        point: BindingPoint,
    },
}

/// Single-producer command queue in front of a [`TransferDevice`].
///
/// Fire-and-forget calls are held here and replayed strictly in issue
/// order. A synchronization point (`create_buffers`, the blocking
/// `read_pixels`, `map_buffer`) drains the queue first, so the inner
/// device observes exactly the sequence it would have seen without the
/// queue. Submission returning says nothing about execution.
pub struct DeferredQueue<D> {
    inner: D,
    pending: VecDeque<TransferCommand>,
}

impl<D: TransferDevice> DeferredQueue<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            pending: VecDeque::new(),
        }
    }

    /// Enqueue a command without executing it.
    pub fn submit(&mut self, command: TransferCommand) {
        self.pending.push_back(command);
    }

    /// Commands submitted but not yet executed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Execute every pending command, in submission order.
    pub fn flush(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            trace!(?command, "executing deferred transfer command");
            match command {
                TransferCommand::DeleteBuffers(handles) => self.inner.delete_buffers(&handles),
                TransferCommand::BindBuffer { point, handle } => {
                    self.inner.bind_buffer(point, handle)
                }
                TransferCommand::AllocateStorage { point, bytes } => {
                    self.inner.allocate_storage(point, bytes)
                }
                TransferCommand::ReadPixelsAsync { region, layout } => {
                    self.inner.read_pixels_async(region, layout)
                }
                TransferCommand::UnmapBuffer { point } => self.inner.unmap_buffer(point),
            }
        }
    }

    /// The wrapped device. Pending commands are NOT flushed; state observed
    /// here may lag what has been submitted.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Mutable access to the wrapped device, without flushing.
    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    /// Flush and unwrap.
    pub fn into_inner(mut self) -> D {
        self.flush();
        self.inner
    }
}

impl<D: TransferDevice> TransferDevice for DeferredQueue<D> {
    fn create_buffers(&mut self, count: usize) -> Result<Vec<BufferHandle>> {
        self.flush();
        self.inner.create_buffers(count)
    }

    fn delete_buffers(&mut self, handles: &[BufferHandle]) {
        self.submit(TransferCommand::DeleteBuffers(handles.to_vec()));
    }

    fn bind_buffer(&mut self, point: BindingPoint, handle: Option<BufferHandle>) {
        self.submit(TransferCommand::BindBuffer { point, handle });
    }

    fn allocate_storage(&mut self, point: BindingPoint, bytes: usize) {
        self.submit(TransferCommand::AllocateStorage { point, bytes });
    }

    fn read_pixels(&mut self, region: ReadRegion, layout: PixelLayout) {
        self.flush();
        self.inner.read_pixels(region, layout);
    }

    fn read_pixels_async(&mut self, region: ReadRegion, layout: PixelLayout) {
        self.submit(TransferCommand::ReadPixelsAsync { region, layout });
    }

    fn map_buffer(&mut self, point: BindingPoint, len: usize) -> Option<&[u8]> {
        self.flush();
        self.inner.map_buffer(point, len)
    }

    fn unmap_buffer(&mut self, point: BindingPoint) {
        self.submit(TransferCommand::UnmapBuffer { point });
    }
}
