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

//! Save state serialization for the GS core
//!
//! A save state captures everything needed to resume a GS at the same point:
//! the internal and privileged registers, GIF decoder progress, vertices
//! queued by the primitive assembler, the transfer engine, and the full
//! 4 MiB of local memory. Draw commands not yet drained are not saved.
//!
//! # Save State Format
//!
//! Save states are serialized using bincode for efficient binary encoding.
//! Register values are stored as `(id, value)` pairs so that the format does
//! not depend on the in-memory layout of the register file.
//!
//! # Version Compatibility
//!
//! Save states include a version number to ensure compatibility.
//! Loading a save state with a different version will fail with an error.
//!
//! # Example
//!
//! ```no_run
//! use gsrx::core::gs::GS;
//! use gsrx::core::save_state::GsSnapshot;
//!
//! let mut gs = GS::new();
//! // ... feed packets ...
//!
//! gs.snapshot().save_to_file("frame.gss").unwrap();
//!
//! let snapshot = GsSnapshot::load_from_file("frame.gss").unwrap();
//! gs.restore(&snapshot).unwrap();
//! ```

use crate::core::error::{EmulatorError, GifPath, Result};
use crate::core::gs::{GifCursor, TransferState, Vertex};
use bincode::{config, Decode, Encode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Save state version for compatibility checking
///
/// This version number should be incremented whenever the save state format changes
/// in a way that breaks backward compatibility.
pub const SAVE_STATE_VERSION: u32 = 2;

/// Complete GS save state
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
pub struct GsSnapshot {
    /// Version number for compatibility checking
    pub version: u32,

    pub metadata: SnapshotMetadata,

    /// Internal registers with their own state, as `(id, value)`
    pub registers: Vec<(u8, u64)>,

    /// Q latched by the last PACKED ST write
    pub packed_q: f32,

    /// Privileged registers other than CSR, as `(address, value)`
    pub privileged: Vec<(u32, u64)>,

    /// Pending CSR events
    pub csr_events: u64,

    /// CSR FIELD bit
    pub odd_field: bool,

    /// GIF cursors for PATH1-3
    #[bincode(with_serde)]
    pub gif_paths: [GifCursor; 3],

    #[bincode(with_serde)]
    pub bus_owner: Option<GifPath>,

    /// Vertices committed towards the next primitive
    #[bincode(with_serde)]
    pub vertex_queue: Vec<Vertex>,

    #[bincode(with_serde)]
    pub transfer: TransferState,

    /// Local memory words (4 MiB)
    pub local_memory: Vec<u32>,
}

/// Save state metadata
#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode)]
#[bincode(encode_bounds = "", decode_bounds = "")]
pub struct SnapshotMetadata {
    /// Timestamp when the save state was created
    #[bincode(with_serde)]
    pub timestamp: DateTime<Utc>,

    /// Free-form description (e.g. the dump it was taken from)
    pub label: String,

    /// Frame counter of the caller's timeline, if it keeps one
    pub frame_count: u64,
}

impl Default for SnapshotMetadata {
    fn default() -> Self {
        Self {
            timestamp: Utc::now(),
            label: String::new(),
            frame_count: 0,
        }
    }
}

impl GsSnapshot {
    /// Save state to file
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let encoded = self.to_bytes()?;
        let mut file = File::create(path)?;
        file.write_all(&encoded)?;
        Ok(())
    }

    /// Load state from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, decoding fails, or the
    /// version doesn't match.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    /// Encode to bincode bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self, config::standard())
            .map_err(|e| EmulatorError::SaveState(e.to_string()))
    }

    /// Decode from bincode bytes, checking the version
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (state, _): (GsSnapshot, usize) =
            bincode::decode_from_slice(bytes, config::standard())
                .map_err(|e| EmulatorError::SaveState(e.to_string()))?;

        // Version check
        if state.version != SAVE_STATE_VERSION {
            return Err(EmulatorError::SaveState(format!(
                "Incompatible save state version: expected {}, got {}",
                SAVE_STATE_VERSION, state.version
            )));
        }

        Ok(state)
    }
}
