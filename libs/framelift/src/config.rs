// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{ReadbackError, Result};

/// Tuning knobs for a readback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadbackConfig {
    /// Number of staging buffers in the rotation. Two hides one frame of
    /// transfer latency; more adds pipeline depth at the cost of staler
    /// asynchronous results.
    pub staging_buffers: usize,
}

impl Default for ReadbackConfig {
    fn default() -> Self {
        Self { staging_buffers: 2 }
    }
}

impl ReadbackConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.staging_buffers < 2 {
            return Err(ReadbackError::Configuration(format!(
                "staging_buffers must be at least 2, got {}",
                self.staging_buffers
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_double_buffered() {
        let config = ReadbackConfig::default();
        assert_eq!(config.staging_buffers, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn single_buffer_is_rejected() {
        let config = ReadbackConfig { staging_buffers: 1 };
        assert!(matches!(
            config.validate(),
            Err(ReadbackError::Configuration(_))
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: ReadbackConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ReadbackConfig::default());

        let config: ReadbackConfig = serde_json::from_str(r#"{"staging_buffers":3}"#).unwrap();
        assert_eq!(config.staging_buffers, 3);
    }
}
