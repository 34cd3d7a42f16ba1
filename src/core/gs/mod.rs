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

//! GS (Graphics Synthesizer) implementation
//!
//! This module models the rasterizer front end of the console's graphics chip
//! at register level. The GS is responsible for:
//! - Decoding GIF packets arriving on three paths (PATH1/2/3)
//! - Maintaining the internal register file, including two rendering contexts
//! - Assembling vertices into primitives for an external rasterizer
//! - Owning 4 MiB of local memory with swizzled pixel formats
//! - Moving image data between local memory and the host (BITBLT)
//! - The CPU-mapped privileged register block (display, CSR, IMR)
//!
//! # Data Flow
//!
//! ```text
//! feed_gif / send_path3 ──► GIF tag decoder ──► PACKED / REGLIST / A+D ──► register file
//!                                   │                                        │
//!                                   └──► IMAGE ──► HWREG ──► transfer engine ─┤
//!                                                                            ▼
//!                         vertex kicks ──► draw queue          local memory (4 MiB)
//! ```
//!
//! Register writes never draw. Only vertex kicks (XYZ2/XYZF2) emit
//! [`DrawCommand`]s, which the caller drains with [`GS::take_draw_commands`].
//!
//! # Address Spaces
//!
//! - Privileged registers: `0x1200_0000 + offset`, reached with
//!   [`GS::write64`], [`GS::write32`] and [`GS::read32`]
//! - Internal registers: ids `0x00-0x63`, reached with [`GS::write_register`]
//!   or through A+D descriptors in GIF packets (`write64` also accepts a bare id)
//!
//! # References
//!
//! - [PS2 GS User's Manual (GS register reference)](https://psi-rockin.github.io/ps2tek/#gs)

use std::collections::VecDeque;

use crate::core::config::GsConfig;
use crate::core::error::{GifPath, GsError};

// Module declarations
mod address;
mod display;
mod gif;
mod local_mem;
mod packed;
mod privileged;
mod register_file;
mod registers;
mod snapshot;
pub mod swizzle;
#[cfg(test)]
mod tests;
mod transfer;
mod vertex;

// Public re-exports
pub use address::{Circuit, ContextRegister, GsRegister, PrivilegedRegister};
pub use gif::{GifCursor, GifFormat, GifState, GifTag};
pub use local_mem::{LocalMemory, PixelFormat};
pub use privileged::{Dispfb, Display, GsEvents, Pmode, PrivilegedRegisters, Smode2};
pub use register_file::{ContextRegisters, RegisterFile};
pub use registers::*;
pub use transfer::TransferState;
pub use vertex::{DrawCommand, Vertex, DRAW_QUEUE_CAPACITY};

/// Running counters, mainly for the replay tool and benchmarks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GsStats {
    /// GIF tags decoded on any path
    pub tags_decoded: u64,
    /// Vertices committed to the vertex queue
    pub vertices_committed: u64,
    /// Primitives pushed to the draw queue
    pub primitives_drawn: u64,
    /// Primitives discarded because the draw queue was full
    pub draws_dropped: u64,
    /// Pixels moved by the transfer engine
    pub pixels_transferred: u64,
}

/// GS state representing the Graphics Synthesizer
///
/// Owns the register file, local memory, the GIF path cursors and the
/// transfer engine. All operations are synchronous: nothing happens between
/// calls.
///
/// # Examples
///
/// ```
/// use gsrx::core::gs::{Context, GS};
///
/// let mut gs = GS::new();
///
/// // FRAME_2 (id 0x4D): base page 4, width 640 pixels
/// gs.write_register(0x4D, 4 | (10 << 16)).unwrap();
/// assert_eq!(gs.registers().context(Context::Two).frame.base_pointer, 4);
/// assert_eq!(gs.registers().context(Context::One).frame.base_pointer, 0);
/// ```
pub struct GS {
    /// Local memory (4 MiB)
    pub(in crate::core::gs) local_mem: LocalMemory,

    /// Internal registers written through the GIF or `write_register`
    pub(in crate::core::gs) regs: RegisterFile,

    /// CPU-mapped register block
    pub(in crate::core::gs) privileged: PrivilegedRegisters,

    /// Per-path GIF decoder cursors, indexed by [`GifPath::index`]
    pub(in crate::core::gs) paths: [GifCursor; 3],

    /// Path holding the bus between its first tag and its exhausted EOP tag
    pub(in crate::core::gs) bus_owner: Option<GifPath>,

    /// Vertices committed since the last PRIM write or draw
    pub(in crate::core::gs) vertex_queue: VecDeque<Vertex>,

    /// Primitives waiting for the external rasterizer
    pub(in crate::core::gs) draw_queue: VecDeque<DrawCommand>,

    /// BITBLT progress
    pub(in crate::core::gs) transfer: TransferState,

    pub(in crate::core::gs) stats: GsStats,

    pub(in crate::core::gs) config: GsConfig,

    /// Set between `vblank_start` and `vblank_end`
    in_vblank: bool,
}

impl GS {
    /// Create a GS in its power-on state with the default configuration
    ///
    /// # Returns
    ///
    /// A GS with zeroed local memory, every register at its reset value and
    /// all GIF paths awaiting a tag
    pub fn new() -> Self {
        Self::with_config(GsConfig::default())
    }

    /// Create a GS with an explicit configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Runtime options (strict register decoding, write tracing)
    pub fn with_config(config: GsConfig) -> Self {
        Self {
            local_mem: LocalMemory::new(),
            regs: RegisterFile::new(),
            privileged: PrivilegedRegisters::default(),
            paths: [GifCursor::default(); 3],
            bus_owner: None,
            vertex_queue: VecDeque::with_capacity(4),
            draw_queue: VecDeque::new(),
            transfer: TransferState::default(),
            stats: GsStats::default(),
            config,
            in_vblank: false,
        }
    }

    /// Reset the GS to its power-on state
    ///
    /// Clears local memory, every register, every decoder cursor and all
    /// transfer progress. Pending draw commands are discarded. Calling it
    /// twice has the same effect as calling it once.
    pub fn reset(&mut self) {
        self.reset_state_preserving_memory();
        self.local_mem.clear();
        self.stats = GsStats::default();
        log::info!("GS reset");
    }

    /// Reset the GS while preserving local memory contents
    ///
    /// This is what CSR.RESET does: the chip's state machines and registers
    /// return to their defaults but the DRAM is not cleared.
    pub fn reset_state_preserving_memory(&mut self) {
        self.regs.reset();
        self.privileged = PrivilegedRegisters::default();
        self.paths = [GifCursor::default(); 3];
        self.bus_owner = None;
        self.vertex_queue.clear();
        self.draw_queue.clear();
        self.transfer = TransferState::default();
        self.in_vblank = false;
        log::debug!("GS state reset (local memory preserved)");
    }

    /// Internal register file
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Privileged register block
    pub fn privileged(&self) -> &PrivilegedRegisters {
        &self.privileged
    }

    /// Raw local memory, read-only
    pub fn local_memory(&self) -> &LocalMemory {
        &self.local_mem
    }

    /// Active configuration
    pub fn config(&self) -> &GsConfig {
        &self.config
    }

    /// Running counters
    pub fn stats(&self) -> GsStats {
        self.stats
    }

    /// BITBLT progress
    pub fn transfer_state(&self) -> &TransferState {
        &self.transfer
    }

    /// Vertices currently buffered by the primitive assembler
    pub fn pending_vertices(&self) -> usize {
        self.vertex_queue.len()
    }

    /// Drain every assembled primitive, oldest first
    ///
    /// At most [`DRAW_QUEUE_CAPACITY`] primitives wait here; past that the
    /// oldest are dropped and counted in [`GsStats::draws_dropped`].
    pub fn take_draw_commands(&mut self) -> Vec<DrawCommand> {
        self.draw_queue.drain(..).collect()
    }

    /// Write an internal register by id (A+D address space)
    ///
    /// # Arguments
    ///
    /// * `id` - Register id (0x00-0x63)
    /// * `value` - 64-bit register value
    ///
    /// # Errors
    ///
    /// - [`GsError::UnknownRegister`] if `id` names no register and the
    ///   configuration is strict (otherwise the write is logged and dropped)
    /// - Transfer errors for HWREG writes (see [`GS::write_hwreg`])
    pub fn write_register(&mut self, id: u8, value: u64) -> Result<(), GsError> {
        match GsRegister::from_id(id) {
            Some(reg) => self.write_internal(reg, value),
            None if self.config.strict_registers => Err(GsError::UnknownRegister { id }),
            None => {
                log::warn!("Write to unknown GS register 0x{:02X} = 0x{:016X}", id, value);
                Ok(())
            }
        }
    }

    /// Write a per-context register into the copy selected right now
    ///
    /// The context is taken from PRIM (or PRMODE when PRMODECONT.AC is clear)
    /// at the time of the call. Later context switches do not move the value.
    ///
    /// # Returns
    ///
    /// The context that received the value
    pub fn write_context_register(&mut self, reg: ContextRegister, value: u64) -> Context {
        let context = self.regs.write_active_context(reg, value);
        if self.config.log_register_writes {
            log::trace!("GS {:?} (context {:?}) = 0x{:016X}", reg, context, value);
        }
        context
    }

    /// Apply a decoded internal register write, including its side effects
    pub(in crate::core::gs) fn write_internal(
        &mut self,
        reg: GsRegister,
        value: u64,
    ) -> Result<(), GsError> {
        if self.config.log_register_writes {
            log::trace!("GS {:?} (0x{:02X}) = 0x{:016X}", reg, reg.id(), value);
        }

        match reg {
            GsRegister::Prim => {
                self.regs.store(reg, value);
                self.vertex_queue.clear();
            }
            GsRegister::Xyz2 | GsRegister::Xyzf2 => {
                self.regs.store(reg, value);
                self.vertex_kick(true);
            }
            GsRegister::Xyz3 | GsRegister::Xyzf3 => {
                self.regs.store(reg, value);
                self.vertex_kick(false);
            }
            GsRegister::TrxDir => {
                self.regs.store(reg, value);
                self.arm_transfer();
            }
            GsRegister::HwReg => return self.write_hwreg(value),
            GsRegister::Signal => {
                let mask = (value >> 32) as u32;
                let id = value as u32;
                let privileged = &mut self.privileged;
                privileged.signal_id = (privileged.signal_id & !mask) | (id & mask);
                privileged.events.insert(GsEvents::SIGNAL);
                log::debug!("GS SIGNAL id=0x{:08X}", privileged.signal_id);
            }
            GsRegister::Finish => {
                self.privileged.events.insert(GsEvents::FINISH);
                log::debug!("GS FINISH");
            }
            GsRegister::Label => {
                let mask = (value >> 32) as u32;
                let id = value as u32;
                let privileged = &mut self.privileged;
                privileged.label_id = (privileged.label_id & !mask) | (id & mask);
            }
            GsRegister::TexFlush => log::trace!("GS TEXFLUSH"),
            _ => self.regs.store(reg, value),
        }
        Ok(())
    }

    /// 64-bit write from the CPU side
    ///
    /// Addresses inside the privileged window (`0x1200_xxxx`) are
    /// privileged registers. Values up to `0xFF` are taken as internal
    /// register ids, the way an A+D descriptor addresses them.
    ///
    /// # Errors
    ///
    /// [`GsError::UnmappedRegister`] for any other address, plus everything
    /// [`GS::write_register`] can return.
    pub fn write64(&mut self, addr: u32, value: u64) -> Result<(), GsError> {
        if PrivilegedRegister::in_window(addr) {
            let reg = PrivilegedRegister::from_addr(addr)
                .ok_or(GsError::UnmappedRegister { address: addr })?;
            self.write_privileged(reg, value);
            Ok(())
        } else if addr <= 0xFF {
            self.write_register(addr as u8, value)
        } else {
            Err(GsError::UnmappedRegister { address: addr })
        }
    }

    /// 32-bit write to one half of a privileged register
    ///
    /// `addr` selects the low half when 8-byte aligned and the high half at
    /// `+4`. The other half keeps its current value.
    pub fn write32(&mut self, addr: u32, value: u32) -> Result<(), GsError> {
        let reg = PrivilegedRegister::from_addr(addr & !0x7)
            .ok_or(GsError::UnmappedRegister { address: addr })?;

        let (shift, keep_mask) = if addr & 0x4 != 0 {
            (32, 0x0000_0000_FFFF_FFFF)
        } else {
            (0, 0xFFFF_FFFF_0000_0000)
        };

        // CSR reads back events, so merging with the read value would
        // acknowledge them; the other half of a CSR write is always zero.
        let current = match reg {
            PrivilegedRegister::Csr => 0,
            _ => self.privileged.read(reg),
        };
        let merged = (current & keep_mask) | ((value as u64) << shift);
        self.write_privileged(reg, merged);
        Ok(())
    }

    /// 32-bit read of one half of a privileged register
    ///
    /// # Errors
    ///
    /// [`GsError::UnmappedRegister`] if `addr` is not a privileged register.
    pub fn read32(&self, addr: u32) -> Result<u32, GsError> {
        let value = self.read64(addr & !0x7)?;
        Ok(if addr & 0x4 != 0 {
            (value >> 32) as u32
        } else {
            value as u32
        })
    }

    /// 64-bit read of a privileged register
    pub fn read64(&self, addr: u32) -> Result<u64, GsError> {
        let reg =
            PrivilegedRegister::from_addr(addr).ok_or(GsError::UnmappedRegister { address: addr })?;
        Ok(self.privileged.read(reg))
    }

    fn write_privileged(&mut self, reg: PrivilegedRegister, value: u64) {
        log::trace!("GS {:?} (0x{:08X}) = 0x{:016X}", reg, reg.addr(), value);

        if self.privileged.write(reg, value) {
            log::info!("GS reset requested through CSR");
            self.reset_state_preserving_memory();
        }
    }

    /// Whether any unmasked CSR event is pending
    pub fn interrupt_pending(&self) -> bool {
        !self.privileged.unmasked_events().is_empty()
    }

    /// Start of vertical blank
    ///
    /// Raises VSINT and toggles the CSR FIELD bit.
    pub fn vblank_start(&mut self) {
        self.in_vblank = true;
        self.privileged.events.insert(GsEvents::VSINT);
        self.privileged.flip_field();
    }

    /// End of vertical blank
    pub fn vblank_end(&mut self) {
        self.in_vblank = false;
    }

    /// Check if the external timeline is inside vertical blank
    pub fn in_vblank(&self) -> bool {
        self.in_vblank
    }
}

impl Default for GS {
    fn default() -> Self {
        Self::new()
    }
}
