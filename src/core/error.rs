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

//! Emulator error types
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Main error type for the emulator
#[derive(Error, Debug)]
pub enum EmulatorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Save state error: {0}")]
    SaveState(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GIF dump: {0}")]
    InvalidDump(String),

    #[error("GS error: {0}")]
    Gs(#[from] GsError),
}

/// GIF path an access arrived on
///
/// Kept here rather than in the GS module so that errors can name the path
/// without a dependency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GifPath {
    /// VU1 XGKICK output
    Path1,
    /// VIF1 DIRECT/DIRECTHL output
    Path2,
    /// GIF DMA channel
    Path3,
}

impl GifPath {
    /// Every path, in priority order
    pub const ALL: [GifPath; 3] = [GifPath::Path1, GifPath::Path2, GifPath::Path3];

    /// Array index of this path (0-2)
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            GifPath::Path1 => 0,
            GifPath::Path2 => 1,
            GifPath::Path3 => 2,
        }
    }
}

impl std::fmt::Display for GifPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GifPath::Path1 => write!(f, "PATH1"),
            GifPath::Path2 => write!(f, "PATH2"),
            GifPath::Path3 => write!(f, "PATH3"),
        }
    }
}

/// GS-specific error types
///
/// Protocol violations and unknown registers are reported to the caller and
/// leave the chip in a resumable state. Bounds violations reject the access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GsError {
    #[error("Unmapped privileged register at 0x{address:08X}")]
    UnmappedRegister { address: u32 },

    #[error("Unknown GS register id 0x{id:02X}")]
    UnknownRegister { id: u8 },

    #[error("HWREG access with no active transfer")]
    NoActiveTransfer,

    #[error("HWREG {access} does not match active transfer direction")]
    TransferDirectionMismatch { access: &'static str },

    #[error("{path} packet truncated: {data_left} payload units still expected")]
    TruncatedPacket { path: GifPath, data_left: u32 },

    #[error("{requested} cannot start a packet while {owner} owns the GS bus")]
    PathBusy { requested: GifPath, owner: GifPath },

    #[error("Local memory access out of bounds at word 0x{address:08X}")]
    LocalMemoryOutOfBounds { address: u32 },
}
