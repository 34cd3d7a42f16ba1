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

//! GIF packet decoding
//!
//! A GIF packet is a sequence of tags, each followed by its payload. Every
//! word on a path is a 128-bit quadword.
//!
//! # GIFtag Layout
//!
//! ```text
//!   Bits 0-14:    NLOOP  repeat count
//!   Bit 15:       EOP    last tag of the packet
//!   Bit 46:       PRE    write PRIM before the payload
//!   Bits 47-57:   PRIM   value for PRE
//!   Bits 58-59:   FLG    0 PACKED, 1 REGLIST, 2 IMAGE, 3 disabled (IMAGE)
//!   Bits 60-63:   NREG   descriptors per loop, 0 means 16
//!   Bits 64-127:  REGS   sixteen 4-bit descriptors, first in the low nibble
//! ```
//!
//! # Payload Units
//!
//! - PACKED: NLOOP x NREG quadwords, one descriptor each
//! - REGLIST: NLOOP x NREG 64-bit values, two per quadword; an odd total
//!   leaves the high half of the last quadword as padding
//! - IMAGE: NLOOP quadwords, each written to HWREG as two 64-bit halves
//!
//! A path that has read a tag owns the GS bus until the payload of a tag
//! with EOP set is exhausted. Words from other paths are refused meanwhile.

use super::{GsRegister, GS};
use crate::core::error::{GifPath, GsError};
use serde::{Deserialize, Serialize};

/// GIF payload encoding (FLG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GifFormat {
    #[default]
    Packed,
    Reglist,
    Image,
    /// Reserved encoding, processed as IMAGE
    Disabled,
}

impl GifFormat {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => GifFormat::Packed,
            1 => GifFormat::Reglist,
            2 => GifFormat::Image,
            _ => GifFormat::Disabled,
        }
    }
}

/// Decoded GIF tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GifTag {
    /// NLOOP: loop count
    pub nloop: u16,
    /// EOP: last tag of the packet
    pub end_of_packet: bool,
    /// PRE: write `prim` to PRIM before the payload
    pub output_prim: bool,
    /// PRIM value for PRE (11 bits)
    pub prim: u16,
    pub format: GifFormat,
    /// NREG with 0 already expanded to 16
    pub reg_count: u8,
    /// REGS: sixteen 4-bit descriptors
    pub regs: u64,
}

impl GifTag {
    /// Decode a tag quadword
    ///
    /// # Examples
    ///
    /// ```
    /// use gsrx::core::gs::{GifFormat, GifTag};
    ///
    /// // NLOOP=1, EOP, PACKED, NREG=0, REGS: descriptor 0 = A+D
    /// let tag = GifTag::decode((0xEu128 << 64) | (1u128 << 15) | 1);
    /// assert_eq!(tag.nloop, 1);
    /// assert!(tag.end_of_packet);
    /// assert_eq!(tag.format, GifFormat::Packed);
    /// assert_eq!(tag.reg_count, 16);
    /// assert_eq!(tag.descriptor(0), 0xE);
    /// ```
    pub fn decode(data: u128) -> Self {
        let lo = data as u64;
        let nreg = ((lo >> 60) & 0xF) as u8;

        Self {
            nloop: (lo & 0x7FFF) as u16,
            end_of_packet: (lo >> 15) & 1 != 0,
            output_prim: (lo >> 46) & 1 != 0,
            prim: ((lo >> 47) & 0x7FF) as u16,
            format: GifFormat::from_bits(((lo >> 58) & 0x3) as u8),
            reg_count: if nreg == 0 { 16 } else { nreg },
            regs: (data >> 64) as u64,
        }
    }

    /// Register descriptor `index` (0-15)
    #[inline(always)]
    pub fn descriptor(&self, index: u8) -> u8 {
        ((self.regs >> ((index as u32 & 0xF) * 4)) & 0xF) as u8
    }

    /// Payload units this tag carries
    ///
    /// Quadwords for PACKED and IMAGE, 64-bit values for REGLIST.
    pub fn payload_units(&self) -> u32 {
        match self.format {
            GifFormat::Packed | GifFormat::Reglist => {
                self.nloop as u32 * self.reg_count as u32
            }
            GifFormat::Image | GifFormat::Disabled => self.nloop as u32,
        }
    }
}

/// Decoder state of one path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GifState {
    /// Next word is a tag
    #[default]
    AwaitingTag,
    /// Next word is payload of `GifCursor::tag`
    Processing,
}

/// Per-path decoder progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GifCursor {
    pub state: GifState,
    /// Tag currently being processed
    pub tag: GifTag,
    /// Descriptors left in the current loop iteration
    pub regs_left: u8,
    /// Payload units left in the current tag
    pub data_left: u32,
}

impl GifCursor {
    /// Index of the descriptor the next payload unit uses
    fn descriptor_index(&self) -> u8 {
        self.tag.reg_count - self.regs_left
    }

    /// Consume one payload unit
    fn advance(&mut self) {
        self.regs_left -= 1;
        if self.regs_left == 0 {
            self.regs_left = self.tag.reg_count;
        }
        self.data_left = self.data_left.saturating_sub(1);
    }
}

impl GS {
    /// Feed one quadword on PATH2
    pub fn feed_gif(&mut self, data: u128) -> Result<(), GsError> {
        self.feed_path(GifPath::Path2, data)
    }

    /// Feed one quadword on PATH3 (GIF DMA)
    pub fn send_path3(&mut self, data: u128) -> Result<(), GsError> {
        self.feed_path(GifPath::Path3, data)
    }

    /// Feed one quadword on a path
    ///
    /// The word is a tag if the path is awaiting one, payload otherwise.
    /// Primitives it completes wait in the draw queue until
    /// [`GS::take_draw_commands`] drains them.
    ///
    /// # Errors
    ///
    /// - [`GsError::PathBusy`] if another path is mid-packet; the word is
    ///   dropped and no state changes
    /// - Any error a payload register write produces. The decoder has
    ///   already consumed the word, so feeding can continue with the next
    ///   one.
    pub fn feed_path(&mut self, path: GifPath, data: u128) -> Result<(), GsError> {
        if let Some(owner) = self.bus_owner {
            if owner != path {
                return Err(GsError::PathBusy {
                    requested: path,
                    owner,
                });
            }
        }

        match self.paths[path.index()].state {
            GifState::AwaitingTag => {
                self.process_tag(path, data);
                Ok(())
            }
            GifState::Processing => self.process_payload(path, data),
        }
    }

    /// Feed a whole packet on a path
    ///
    /// # Errors
    ///
    /// Stops at the first failing word and returns its error. If every word
    /// was accepted but the packet's EOP tag is not exhausted, returns
    /// [`GsError::TruncatedPacket`]; the cursor is kept, so feeding the rest
    /// of the packet later completes it.
    pub fn feed_packet(&mut self, path: GifPath, words: &[u128]) -> Result<(), GsError> {
        for &word in words {
            self.feed_path(path, word)?;
        }

        if self.bus_owner == Some(path) {
            return Err(GsError::TruncatedPacket {
                path,
                data_left: self.paths[path.index()].data_left,
            });
        }
        Ok(())
    }

    /// Decoder progress of a path
    pub fn gif_cursor(&self, path: GifPath) -> &GifCursor {
        &self.paths[path.index()]
    }

    /// Decoder state of a path
    pub fn gif_state(&self, path: GifPath) -> GifState {
        self.paths[path.index()].state
    }

    /// Path currently holding the GS bus
    pub fn bus_owner(&self) -> Option<GifPath> {
        self.bus_owner
    }

    fn process_tag(&mut self, path: GifPath, data: u128) {
        let tag = GifTag::decode(data);
        self.stats.tags_decoded += 1;

        log::debug!(
            "{} GIFtag: NLOOP={} EOP={} PRE={} PRIM=0x{:03X} FLG={:?} NREG={} REGS=0x{:016X}",
            path,
            tag.nloop,
            tag.end_of_packet,
            tag.output_prim,
            tag.prim,
            tag.format,
            tag.reg_count,
            tag.regs
        );

        self.bus_owner = Some(path);
        self.paths[path.index()] = GifCursor {
            state: GifState::Processing,
            tag,
            regs_left: tag.reg_count,
            data_left: tag.payload_units(),
        };

        if tag.output_prim {
            self.regs.store(GsRegister::Prim, tag.prim as u64);
            self.vertex_queue.clear();
        }

        if tag.payload_units() == 0 {
            self.finish_tag(path);
        }
    }

    fn process_payload(&mut self, path: GifPath, data: u128) -> Result<(), GsError> {
        let index = path.index();
        let format = self.paths[index].tag.format;

        let result = match format {
            GifFormat::Packed => {
                let cursor = &mut self.paths[index];
                let descriptor = cursor.tag.descriptor(cursor.descriptor_index());
                cursor.advance();
                self.write_packed(descriptor, data)
            }
            GifFormat::Reglist => {
                let mut result = Ok(());
                for half in [data as u64, (data >> 64) as u64] {
                    let cursor = &mut self.paths[index];
                    // Odd totals pad the high half of the last quadword
                    if cursor.data_left == 0 {
                        break;
                    }
                    let descriptor = cursor.tag.descriptor(cursor.descriptor_index());
                    cursor.advance();
                    let written = self.write_reglist(descriptor, half);
                    if result.is_ok() {
                        result = written;
                    }
                }
                result
            }
            GifFormat::Image | GifFormat::Disabled => {
                self.paths[index].data_left -= 1;
                let low = self.write_hwreg(data as u64);
                let high = self.write_hwreg((data >> 64) as u64);
                low.and(high)
            }
        };

        if self.paths[index].data_left == 0 {
            self.finish_tag(path);
        }
        result
    }

    /// The current tag's payload is exhausted
    fn finish_tag(&mut self, path: GifPath) {
        let cursor = &mut self.paths[path.index()];
        cursor.state = GifState::AwaitingTag;
        cursor.regs_left = 0;

        if cursor.tag.end_of_packet {
            log::trace!("{} packet complete", path);
            self.bus_owner = None;
        }
    }
}
