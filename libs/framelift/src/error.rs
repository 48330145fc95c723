// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

#[derive(Debug, thiserror::Error)]
pub enum ReadbackError {
    /// The device could not produce the staging buffers. Fatal for the
    /// owning context; the engine is unusable after this.
    #[error("staging buffer allocation failed: {0}")]
    Allocation(String),

    /// The device returned no host pointer for a mapped staging buffer.
    /// Per-call condition: skip this frame's capture and retry on the next.
    #[error("pack buffer mapping returned no host pointer")]
    MapFailed,

    #[error("invalid read region: {0}")]
    Region(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ReadbackError>;
