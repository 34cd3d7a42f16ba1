// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GS core configuration
//!
//! Configuration is read from a TOML file. Every field has a default, so an
//! empty file (or no file) gives the standard behavior.
//!
//! # Example
//!
//! ```
//! use gsrx::core::config::GsConfig;
//!
//! let config = GsConfig::from_toml_str("strict_registers = false").unwrap();
//! assert!(!config.strict_registers);
//! assert!(!config.log_register_writes);
//! ```

use crate::core::error::{EmulatorError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Runtime options for the GS core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GsConfig {
    /// Report writes to unknown internal register ids as errors
    ///
    /// When false they are logged and dropped, which lets a replay continue
    /// past registers this core does not model.
    pub strict_registers: bool,

    /// Trace every internal register write
    pub log_register_writes: bool,
}

impl Default for GsConfig {
    fn default() -> Self {
        Self {
            strict_registers: true,
            log_register_writes: false,
        }
    }
}

impl GsConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| EmulatorError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render configuration as TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| EmulatorError::Config(e.to_string()))
    }
}
