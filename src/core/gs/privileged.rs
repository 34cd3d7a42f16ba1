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

//! Privileged GS registers
//!
//! The CPU-mapped block controlling the display circuits, interrupts and
//! chip status. Only the fields the core interprets are decoded; every
//! register keeps its raw 64-bit value so read-back is exact.

use super::address::{Circuit, PrivilegedRegister};
use super::local_mem::PixelFormat;
use bitflags::bitflags;

bitflags! {
    /// CSR/IMR event bits
    ///
    /// In CSR these are pending events (write 1 to clear). In IMR the same
    /// events sit 8 bits higher and a set bit masks the interrupt.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GsEvents: u64 {
        const SIGNAL = 1 << 0;
        const FINISH = 1 << 1;
        const HSINT = 1 << 2;
        const VSINT = 1 << 3;
        const EDWINT = 1 << 4;
    }
}

/// CSR bits outside the event field
mod csr {
    pub const FLUSH: u64 = 1 << 8;
    pub const RESET: u64 = 1 << 9;
    pub const FIELD: u64 = 1 << 13;
    /// FIFO status "empty"
    pub const FIFO_EMPTY: u64 = 0b01 << 14;
    /// Revision and id reported by retail hardware
    pub const REV_ID: u64 = (0x1B << 16) | (0x55 << 24);
}

/// PMODE: read circuit enables and merge control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pmode {
    pub circuit1_enabled: bool,
    pub circuit2_enabled: bool,
    pub use_alpha_register: bool,
    pub alpha_output: bool,
    pub blend_with_background: bool,
    pub alpha: u8,
}

impl Pmode {
    pub fn from_bits(value: u64) -> Self {
        Self {
            circuit1_enabled: value & 1 != 0,
            circuit2_enabled: value & (1 << 1) != 0,
            use_alpha_register: value & (1 << 5) != 0,
            alpha_output: value & (1 << 6) != 0,
            blend_with_background: value & (1 << 7) != 0,
            alpha: ((value >> 8) & 0xFF) as u8,
        }
    }
}

/// SMODE2: interlace control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Smode2 {
    pub interlaced: bool,
    /// FFMD: field mode (each field read from every other line)
    pub frame_mode: bool,
}

impl Smode2 {
    pub fn from_bits(value: u64) -> Self {
        Self {
            interlaced: value & 1 != 0,
            frame_mode: value & (1 << 1) != 0,
        }
    }
}

/// DISPFB1/2: display frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispfb {
    /// FBP, in pages
    pub base_pointer: u32,
    /// FBW, in units of 64 pixels
    pub width: u32,
    pub format: PixelFormat,
    pub x: u32,
    pub y: u32,
}

impl Dispfb {
    pub fn from_bits(value: u64) -> Self {
        Self {
            base_pointer: (value & 0x1FF) as u32,
            width: ((value >> 9) & 0x3F) as u32,
            format: PixelFormat::from_bits_lossy(((value >> 15) & 0x1F) as u8),
            x: ((value >> 32) & 0x7FF) as u32,
            y: ((value >> 43) & 0x7FF) as u32,
        }
    }
}

/// DISPLAY1/2: display position and size in video clock units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Display {
    pub x: u32,
    pub y: u32,
    pub magnify_h: u32,
    pub magnify_v: u32,
    pub width: u32,
    pub height: u32,
}

impl Display {
    pub fn from_bits(value: u64) -> Self {
        Self {
            x: (value & 0xFFF) as u32,
            y: ((value >> 12) & 0x7FF) as u32,
            magnify_h: ((value >> 23) & 0xF) as u32,
            magnify_v: ((value >> 27) & 0x3) as u32,
            width: ((value >> 32) & 0xFFF) as u32,
            height: ((value >> 44) & 0x7FF) as u32,
        }
    }

    /// Whether the register has been programmed at all
    pub fn is_configured(&self) -> bool {
        self.width != 0 || self.height != 0
    }
}

/// Privileged register block state
#[derive(Debug, Clone)]
pub struct PrivilegedRegisters {
    raw: [u64; PrivilegedRegister::ALL.len()],
    pub pmode: Pmode,
    pub smode2: Smode2,
    pub dispfb: [Dispfb; 2],
    pub display: [Display; 2],
    /// Pending CSR events
    pub events: GsEvents,
    /// CSR FIELD bit (odd field being displayed)
    pub odd_field: bool,
    /// IMR event mask (already shifted down to event positions)
    pub interrupt_mask: GsEvents,
    pub signal_id: u32,
    pub label_id: u32,
}

impl Default for PrivilegedRegisters {
    fn default() -> Self {
        Self {
            raw: [0; PrivilegedRegister::ALL.len()],
            pmode: Pmode::default(),
            smode2: Smode2::default(),
            dispfb: [Dispfb::default(); 2],
            display: [Display::default(); 2],
            events: GsEvents::empty(),
            odd_field: false,
            interrupt_mask: GsEvents::all(),
            signal_id: 0,
            label_id: 0,
        }
    }
}

impl PrivilegedRegisters {
    /// Index of `reg` in `raw`, matching [`PrivilegedRegister::ALL`]
    fn slot(reg: PrivilegedRegister) -> usize {
        match reg {
            PrivilegedRegister::Pmode => 0,
            PrivilegedRegister::Smode1 => 1,
            PrivilegedRegister::Smode2 => 2,
            PrivilegedRegister::Srfsh => 3,
            PrivilegedRegister::Synch1 => 4,
            PrivilegedRegister::Synch2 => 5,
            PrivilegedRegister::Syncv => 6,
            PrivilegedRegister::Dispfb(Circuit::One) => 7,
            PrivilegedRegister::Display(Circuit::One) => 8,
            PrivilegedRegister::Dispfb(Circuit::Two) => 9,
            PrivilegedRegister::Display(Circuit::Two) => 10,
            PrivilegedRegister::Extbuf => 11,
            PrivilegedRegister::Extdata => 12,
            PrivilegedRegister::Extwrite => 13,
            PrivilegedRegister::Bgcolor => 14,
            PrivilegedRegister::Csr => 15,
            PrivilegedRegister::Imr => 16,
            PrivilegedRegister::Busdir => 17,
            PrivilegedRegister::Siglblid => 18,
        }
    }

    /// Current 64-bit value of a register as the CPU would read it
    pub fn read(&self, reg: PrivilegedRegister) -> u64 {
        match reg {
            PrivilegedRegister::Csr => {
                let field = if self.odd_field { csr::FIELD } else { 0 };
                self.events.bits() | field | csr::FIFO_EMPTY | csr::REV_ID
            }
            PrivilegedRegister::Imr => self.interrupt_mask.bits() << 8,
            PrivilegedRegister::Siglblid => (self.signal_id as u64) | (self.label_id as u64) << 32,
            _ => self.raw[Self::slot(reg)],
        }
    }

    /// Store a register value and refresh its decoded view
    ///
    /// CSR side effects other than event acknowledgement (RESET) are the
    /// caller's responsibility; this returns `true` if a reset was requested.
    pub fn write(&mut self, reg: PrivilegedRegister, value: u64) -> bool {
        self.raw[Self::slot(reg)] = value;

        match reg {
            PrivilegedRegister::Pmode => self.pmode = Pmode::from_bits(value),
            PrivilegedRegister::Smode2 => self.smode2 = Smode2::from_bits(value),
            PrivilegedRegister::Dispfb(circuit) => {
                self.dispfb[circuit.index()] = Dispfb::from_bits(value)
            }
            PrivilegedRegister::Display(circuit) => {
                self.display[circuit.index()] = Display::from_bits(value)
            }
            PrivilegedRegister::Csr => {
                self.events.remove(GsEvents::from_bits_truncate(value));
                if value & csr::FLUSH != 0 {
                    log::trace!("CSR FLUSH requested");
                }
                return value & csr::RESET != 0;
            }
            PrivilegedRegister::Imr => {
                self.interrupt_mask = GsEvents::from_bits_truncate(value >> 8);
            }
            PrivilegedRegister::Siglblid => {
                self.signal_id = value as u32;
                self.label_id = (value >> 32) as u32;
            }
            _ => {}
        }
        false
    }

    /// Events that are pending and not masked
    pub fn unmasked_events(&self) -> GsEvents {
        self.events & !self.interrupt_mask
    }

    /// The circuit whose output is displayed, if any is enabled
    ///
    /// Circuit 1 wins when both are enabled.
    pub fn displayed_circuit(&self) -> Option<Circuit> {
        if self.pmode.circuit1_enabled {
            Some(Circuit::One)
        } else if self.pmode.circuit2_enabled {
            Some(Circuit::Two)
        } else {
            None
        }
    }

    /// Toggle the CSR FIELD bit at vertical blank
    pub(crate) fn flip_field(&mut self) {
        self.odd_field = !self.odd_field;
    }
}
