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

//! BITBLT transfer engine
//!
//! Moves rectangles of pixels between local memory and the host through the
//! HWREG port, or within local memory. A transfer is set up with BITBLTBUF,
//! TRXPOS and TRXREG and armed by writing TRXDIR.
//!
//! Host-bound data is a bit stream: each 64-bit HWREG word holds
//! `64 / bpp` pixels, least significant first. 24-bit pixels straddle word
//! boundaries.

use super::{GsRegister, TransferDirection, GS};
use crate::core::error::GsError;
use serde::{Deserialize, Serialize};

/// Transfer progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransferState {
    /// A host transfer is waiting for HWREG accesses
    pub active: bool,
    pub direction: TransferDirection,
    /// Transfer rectangle width in pixels
    pub width: u32,
    /// Next pixel column within the rectangle
    pub x: u32,
    /// Next pixel row within the rectangle
    pub y: u32,
    /// Word address of the last pixel accessed
    pub transfer_addr: u32,
    /// Bits per pixel on the HWREG stream
    pub transfer_bit_depth: u32,
    pub pixels_transferred: u32,
    pub total_pixels: u32,
    /// Bits received but not yet forming a whole pixel (or packed but not
    /// yet read), least significant first
    pub(crate) bit_buffer: u128,
    pub(crate) bit_count: u32,
}

impl TransferState {
    /// Pixels still to move
    pub fn pixels_remaining(&self) -> u32 {
        self.total_pixels - self.pixels_transferred
    }
}

impl GS {
    /// TRXDIR was written: start a transfer in the direction it names
    ///
    /// Progress is reset. Zero-size transfers and local-to-local copies
    /// complete before this returns.
    pub(in crate::core::gs) fn arm_transfer(&mut self) {
        let direction = self.regs.trxdir;
        let buf = self.regs.bitbltbuf;
        let pos = self.regs.trxpos;
        let size = self.regs.trxreg;

        self.transfer = TransferState {
            direction,
            width: size.width as u32,
            total_pixels: size.pixel_count(),
            ..TransferState::default()
        };

        let (format, base, width, x, y) = match direction {
            TransferDirection::Deactivated => {
                log::debug!("GS transfer deactivated");
                return;
            }
            TransferDirection::HostToLocal | TransferDirection::LocalToLocal => (
                buf.dest_format,
                buf.dest_base,
                buf.dest_width,
                pos.dest_x,
                pos.dest_y,
            ),
            TransferDirection::LocalToHost => (
                buf.source_format,
                buf.source_base,
                buf.source_width,
                pos.source_x,
                pos.source_y,
            ),
        };

        self.transfer.transfer_bit_depth = format.bits_per_pixel();
        self.transfer.transfer_addr =
            self.local_mem
                .pixel_word_address(format, base, width, x as u32, y as u32);

        log::debug!(
            "GS transfer {:?}: {}x{} {:?} (SBP=0x{:04X} SBW={} DBP=0x{:04X} DBW={}) src=({}, {}) dst=({}, {})",
            direction,
            size.width,
            size.height,
            format,
            buf.source_base,
            buf.source_width,
            buf.dest_base,
            buf.dest_width,
            pos.source_x,
            pos.source_y,
            pos.dest_x,
            pos.dest_y
        );

        if self.transfer.total_pixels == 0 {
            self.finish_transfer();
            return;
        }

        if direction == TransferDirection::LocalToLocal {
            self.local_to_local();
            self.finish_transfer();
            return;
        }

        self.transfer.active = true;
    }

    /// Write 64 bits of image data to HWREG (host to local memory)
    ///
    /// # Errors
    ///
    /// - [`GsError::NoActiveTransfer`] if no transfer is armed
    /// - [`GsError::TransferDirectionMismatch`] if the armed transfer is
    ///   local-to-host
    pub fn write_hwreg(&mut self, value: u64) -> Result<(), GsError> {
        self.check_transfer(TransferDirection::HostToLocal, "write")?;

        let depth = self.transfer.transfer_bit_depth;
        let mask = (1u128 << depth) - 1;

        self.transfer.bit_buffer |= (value as u128) << self.transfer.bit_count;
        self.transfer.bit_count += 64;

        while self.transfer.active && self.transfer.bit_count >= depth {
            let pixel = (self.transfer.bit_buffer & mask) as u32;
            self.transfer.bit_buffer >>= depth;
            self.transfer.bit_count -= depth;
            self.store_transfer_pixel(pixel);
        }

        if !self.transfer.active {
            self.transfer.bit_buffer = 0;
            self.transfer.bit_count = 0;
        }
        Ok(())
    }

    /// Read 64 bits of image data from HWREG (local memory to host)
    ///
    /// The final word of a transfer is zero-padded. Pixels already packed
    /// when the last one is loaded stay readable until drained.
    ///
    /// # Errors
    ///
    /// - [`GsError::NoActiveTransfer`] if no transfer is armed and nothing is
    ///   left to drain
    /// - [`GsError::TransferDirectionMismatch`] if the armed transfer is
    ///   host-to-local
    pub fn read_hwreg(&mut self) -> Result<u64, GsError> {
        let draining = !self.transfer.active
            && self.transfer.bit_count > 0
            && self.transfer.direction == TransferDirection::LocalToHost;
        if !draining {
            self.check_transfer(TransferDirection::LocalToHost, "read")?;
        }

        let depth = self.transfer.transfer_bit_depth;
        while self.transfer.active && self.transfer.bit_count < 64 {
            let pixel = self.load_transfer_pixel();
            self.transfer.bit_buffer |= (pixel as u128) << self.transfer.bit_count;
            self.transfer.bit_count += depth;
        }

        let value = self.transfer.bit_buffer as u64;
        self.transfer.bit_buffer >>= 64;
        self.transfer.bit_count = self.transfer.bit_count.saturating_sub(64);
        Ok(value)
    }

    fn check_transfer(
        &self,
        expected: TransferDirection,
        access: &'static str,
    ) -> Result<(), GsError> {
        if !self.transfer.active {
            return Err(GsError::NoActiveTransfer);
        }
        if self.transfer.direction != expected {
            return Err(GsError::TransferDirectionMismatch { access });
        }
        Ok(())
    }

    fn store_transfer_pixel(&mut self, pixel: u32) {
        let buf = self.regs.bitbltbuf;
        let pos = self.regs.trxpos;
        let x = pos.dest_x as u32 + self.transfer.x;
        let y = pos.dest_y as u32 + self.transfer.y;

        self.local_mem
            .write_pixel(buf.dest_format, buf.dest_base, buf.dest_width, x, y, pixel);
        self.transfer.transfer_addr =
            self.local_mem
                .pixel_word_address(buf.dest_format, buf.dest_base, buf.dest_width, x, y);
        self.advance_transfer();
    }

    fn load_transfer_pixel(&mut self) -> u32 {
        let buf = self.regs.bitbltbuf;
        let pos = self.regs.trxpos;
        let x = pos.source_x as u32 + self.transfer.x;
        let y = pos.source_y as u32 + self.transfer.y;

        let pixel =
            self.local_mem
                .read_pixel(buf.source_format, buf.source_base, buf.source_width, x, y);
        self.transfer.transfer_addr = self.local_mem.pixel_word_address(
            buf.source_format,
            buf.source_base,
            buf.source_width,
            x,
            y,
        );
        self.advance_transfer();
        pixel
    }

    /// Step to the next pixel in raster order
    fn advance_transfer(&mut self) {
        let transfer = &mut self.transfer;
        transfer.pixels_transferred += 1;
        transfer.x += 1;
        if transfer.x == transfer.width {
            transfer.x = 0;
            transfer.y += 1;
        }

        if transfer.pixels_transferred == transfer.total_pixels {
            self.finish_transfer();
        }
    }

    /// Copy a rectangle within local memory in TRXPOS transmission order
    fn local_to_local(&mut self) {
        let buf = self.regs.bitbltbuf;
        let pos = self.regs.trxpos;
        let width = self.regs.trxreg.width as u32;
        let height = self.regs.trxreg.height as u32;

        for row in 0..height {
            for column in 0..width {
                let (dx, dy) = pos.trans_order.offset(column, row, width, height);
                let pixel = self.local_mem.read_pixel(
                    buf.source_format,
                    buf.source_base,
                    buf.source_width,
                    pos.source_x as u32 + dx,
                    pos.source_y as u32 + dy,
                );
                let dest_x = pos.dest_x as u32 + dx;
                let dest_y = pos.dest_y as u32 + dy;
                self.local_mem.write_pixel(
                    buf.dest_format,
                    buf.dest_base,
                    buf.dest_width,
                    dest_x,
                    dest_y,
                    pixel,
                );
                self.transfer.transfer_addr = self.local_mem.pixel_word_address(
                    buf.dest_format,
                    buf.dest_base,
                    buf.dest_width,
                    dest_x,
                    dest_y,
                );
            }
        }

        self.transfer.pixels_transferred = width * height;
    }

    /// All pixels moved: deactivate and report TRXDIR as off
    fn finish_transfer(&mut self) {
        self.stats.pixels_transferred += self.transfer.pixels_transferred as u64;
        self.transfer.active = false;
        self.regs
            .store(GsRegister::TrxDir, TransferDirection::Deactivated.to_bits());

        log::debug!(
            "GS transfer complete: {} pixels",
            self.transfer.pixels_transferred
        );
    }
}
