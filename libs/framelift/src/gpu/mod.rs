// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! GPU dispatch surface: device trait, ordered deferral, bind-state cache.

mod bind_cache;
mod device;
mod queue;
mod software;

pub use bind_cache::BindCache;
pub use device::{BindingPoint, BufferHandle, ReadRegion, TransferDevice};
pub use queue::{DeferredQueue, TransferCommand};
pub use software::SoftwareDevice;
