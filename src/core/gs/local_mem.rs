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

//! GS local memory
//!
//! The GS owns 4 MiB of embedded DRAM used for frame buffers, depth buffers,
//! textures and CLUTs. Storage is a flat array of 32-bit words; every pixel
//! format is interpreted at access time through the swizzle functions in
//! [`super::swizzle`].
//!
//! Pixel coordinates wrap at 2048 (the width of the TRXPOS/DISPFB coordinate
//! fields) and computed word addresses wrap inside the 4 MiB buffer, so no
//! access can land outside local memory.

use super::swizzle;
use crate::core::error::GsError;
use serde::{Deserialize, Serialize};

/// Pixel storage formats (PSM field values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 32-bit RGBA
    #[default]
    Psmct32,
    /// 24-bit RGB, upper byte of the word untouched
    Psmct24,
    /// 16-bit RGBA 5-5-5-1
    Psmct16,
    /// 16-bit RGBA 5-5-5-1, alternate block arrangement
    Psmct16s,
    /// 8-bit indexed
    Psmt8,
    /// 4-bit indexed
    Psmt4,
    /// 8-bit indexed, stored in bits 24-31 of a 32-bit pixel
    Psmt8h,
    /// 4-bit indexed, stored in bits 24-27 of a 32-bit pixel
    Psmt4hl,
    /// 4-bit indexed, stored in bits 28-31 of a 32-bit pixel
    Psmt4hh,
    /// 32-bit depth
    Psmz32,
    /// 24-bit depth
    Psmz24,
    /// 16-bit depth
    Psmz16,
    /// 16-bit depth, alternate block arrangement
    Psmz16s,
}

impl PixelFormat {
    /// Decode a PSM field value
    ///
    /// Returns `None` for reserved encodings.
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits {
            0x00 => PixelFormat::Psmct32,
            0x01 => PixelFormat::Psmct24,
            0x02 => PixelFormat::Psmct16,
            0x0A => PixelFormat::Psmct16s,
            0x13 => PixelFormat::Psmt8,
            0x14 => PixelFormat::Psmt4,
            0x1B => PixelFormat::Psmt8h,
            0x24 => PixelFormat::Psmt4hl,
            0x2C => PixelFormat::Psmt4hh,
            0x30 => PixelFormat::Psmz32,
            0x31 => PixelFormat::Psmz24,
            0x32 => PixelFormat::Psmz16,
            0x3A => PixelFormat::Psmz16s,
            _ => return None,
        })
    }

    /// Decode a PSM field value, falling back to PSMCT32 for reserved values
    pub fn from_bits_lossy(bits: u8) -> Self {
        Self::from_bits(bits).unwrap_or_else(|| {
            log::warn!("Reserved pixel format 0x{:02X}, treating as PSMCT32", bits);
            PixelFormat::Psmct32
        })
    }

    /// PSM field value
    pub fn bits(self) -> u8 {
        match self {
            PixelFormat::Psmct32 => 0x00,
            PixelFormat::Psmct24 => 0x01,
            PixelFormat::Psmct16 => 0x02,
            PixelFormat::Psmct16s => 0x0A,
            PixelFormat::Psmt8 => 0x13,
            PixelFormat::Psmt4 => 0x14,
            PixelFormat::Psmt8h => 0x1B,
            PixelFormat::Psmt4hl => 0x24,
            PixelFormat::Psmt4hh => 0x2C,
            PixelFormat::Psmz32 => 0x30,
            PixelFormat::Psmz24 => 0x31,
            PixelFormat::Psmz16 => 0x32,
            PixelFormat::Psmz16s => 0x3A,
        }
    }

    /// Number of bits one pixel occupies in a transfer stream
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Psmct32 | PixelFormat::Psmz32 => 32,
            PixelFormat::Psmct24 | PixelFormat::Psmz24 => 24,
            PixelFormat::Psmct16
            | PixelFormat::Psmct16s
            | PixelFormat::Psmz16
            | PixelFormat::Psmz16s => 16,
            PixelFormat::Psmt8 | PixelFormat::Psmt8h => 8,
            PixelFormat::Psmt4 | PixelFormat::Psmt4hl | PixelFormat::Psmt4hh => 4,
        }
    }
}

/// Where a pixel lives inside a word: word index, bit shift, and value mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSlot {
    word: u32,
    shift: u32,
    mask: u32,
}

/// GS local memory (4 MiB)
pub struct LocalMemory {
    words: Vec<u32>,
}

impl LocalMemory {
    /// Local memory size in bytes
    pub const SIZE_BYTES: usize = 4 * 1024 * 1024;

    /// Local memory size in 32-bit words
    pub const SIZE_WORDS: usize = Self::SIZE_BYTES / 4;

    const COORD_MASK: u32 = 0x7FF;

    /// Create zero-filled local memory
    pub fn new() -> Self {
        Self {
            words: vec![0; Self::SIZE_WORDS],
        }
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Raw view of local memory
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Replace the whole buffer (used when restoring snapshots)
    ///
    /// Returns `false` without touching memory if `words` has the wrong size.
    pub(crate) fn load_words(&mut self, words: &[u32]) -> bool {
        if words.len() != Self::SIZE_WORDS {
            return false;
        }
        self.words.copy_from_slice(words);
        true
    }

    /// Read one word by linear word address
    ///
    /// # Errors
    ///
    /// Returns [`GsError::LocalMemoryOutOfBounds`] if `address` is past the
    /// end of local memory.
    pub fn read_word(&self, address: u32) -> Result<u32, GsError> {
        self.words
            .get(address as usize)
            .copied()
            .ok_or(GsError::LocalMemoryOutOfBounds { address })
    }

    /// Write one word by linear word address
    ///
    /// # Errors
    ///
    /// Returns [`GsError::LocalMemoryOutOfBounds`] if `address` is past the
    /// end of local memory; memory is left unchanged.
    pub fn write_word(&mut self, address: u32, value: u32) -> Result<(), GsError> {
        match self.words.get_mut(address as usize) {
            Some(word) => {
                *word = value;
                Ok(())
            }
            None => Err(GsError::LocalMemoryOutOfBounds { address }),
        }
    }

    /// Word address a pixel access touches
    ///
    /// Used by the transfer engine to report progress.
    pub fn pixel_word_address(
        &self,
        format: PixelFormat,
        base: u32,
        width: u32,
        x: u32,
        y: u32,
    ) -> u32 {
        Self::slot(format, base, width, x, y).word
    }

    /// Read a pixel in the given format
    ///
    /// # Arguments
    ///
    /// * `format` - Pixel storage format
    /// * `base` - Buffer base pointer in blocks (64 words)
    /// * `width` - Buffer width in units of 64 pixels
    /// * `x`, `y` - Pixel coordinates (wrap at 2048)
    ///
    /// # Returns
    ///
    /// The pixel value right-aligned (e.g. 0-15 for 4-bit formats)
    pub fn read_pixel(&self, format: PixelFormat, base: u32, width: u32, x: u32, y: u32) -> u32 {
        let slot = Self::slot(format, base, width, x, y);
        (self.words[slot.word as usize] >> slot.shift) & slot.mask
    }

    /// Write a pixel in the given format
    ///
    /// Bits of `value` above the format's depth are ignored, and bits of the
    /// containing word outside the pixel are preserved.
    pub fn write_pixel(
        &mut self,
        format: PixelFormat,
        base: u32,
        width: u32,
        x: u32,
        y: u32,
        value: u32,
    ) {
        let slot = Self::slot(format, base, width, x, y);
        let word = &mut self.words[slot.word as usize];
        *word = (*word & !(slot.mask << slot.shift)) | ((value & slot.mask) << slot.shift);
    }

    fn slot(format: PixelFormat, base: u32, width: u32, x: u32, y: u32) -> PixelSlot {
        let x = x & Self::COORD_MASK;
        let y = y & Self::COORD_MASK;
        let wrap = (Self::SIZE_WORDS - 1) as u32;

        let sub_word = |address: u32, per_word_log2: u32, bits: u32| {
            let lane = address & ((1 << per_word_log2) - 1);
            PixelSlot {
                word: (address >> per_word_log2) & wrap,
                shift: lane * bits,
                mask: (1 << bits) - 1,
            }
        };
        let whole_word = |address: u32, shift: u32, mask: u32| PixelSlot {
            word: address & wrap,
            shift,
            mask,
        };

        match format {
            PixelFormat::Psmct32 => whole_word(swizzle::address_32(base, width, x, y), 0, !0),
            PixelFormat::Psmct24 => {
                whole_word(swizzle::address_32(base, width, x, y), 0, 0x00FF_FFFF)
            }
            PixelFormat::Psmt8h => whole_word(swizzle::address_32(base, width, x, y), 24, 0xFF),
            PixelFormat::Psmt4hl => whole_word(swizzle::address_32(base, width, x, y), 24, 0xF),
            PixelFormat::Psmt4hh => whole_word(swizzle::address_32(base, width, x, y), 28, 0xF),
            PixelFormat::Psmz32 => whole_word(swizzle::address_32z(base, width, x, y), 0, !0),
            PixelFormat::Psmz24 => {
                whole_word(swizzle::address_32z(base, width, x, y), 0, 0x00FF_FFFF)
            }
            PixelFormat::Psmct16 => sub_word(swizzle::address_16(base, width, x, y), 1, 16),
            PixelFormat::Psmct16s => sub_word(swizzle::address_16s(base, width, x, y), 1, 16),
            PixelFormat::Psmz16 => sub_word(swizzle::address_16z(base, width, x, y), 1, 16),
            PixelFormat::Psmz16s => sub_word(swizzle::address_16sz(base, width, x, y), 1, 16),
            PixelFormat::Psmt8 => sub_word(swizzle::address_8(base, width, x, y), 2, 8),
            PixelFormat::Psmt4 => sub_word(swizzle::address_4(base, width, x, y), 3, 4),
        }
    }
}

impl Default for LocalMemory {
    fn default() -> Self {
        Self::new()
    }
}
