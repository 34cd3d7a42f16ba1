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

//! PACKED and REGLIST payload handlers
//!
//! PACKED quadwords carry one register each, laid out per descriptor:
//!
//! ```text
//!   0x0 PRIM    bits 0-10
//!   0x1 RGBAQ   R 0-7, G 32-39, B 64-71, A 96-103 (Q from the last ST)
//!   0x2 ST      S 0-31, T 32-63, Q 64-95
//!   0x3 UV      U 0-13, V 32-45
//!   0x4 XYZF2   X 0-15, Y 32-47, Z 68-91, F 100-107, ADC 111
//!   0x5 XYZ2    X 0-15, Y 32-47, Z 64-95, ADC 111
//!   0x6-0x9     TEX0_1, TEX0_2, CLAMP_1, CLAMP_2 (low 64 bits)
//!   0xA FOG     F 100-107
//!   0xC XYZF3   as XYZF2, no kick
//!   0xD XYZ3    as XYZ2, no kick
//!   0xE A+D     value 0-63, register id 64-71
//!   0xF NOP
//! ```
//!
//! ADC set on XYZ2/XYZF2 turns the write into XYZ3/XYZF3.
//!
//! REGLIST values are raw 64-bit register values addressed by the
//! descriptor as a register id; descriptors 0xE and 0xF are ignored there.

use super::{GsRegister, Rgbaq, St, Uv, GS};
use crate::core::error::GsError;

/// Descriptor ids with a PACKED-specific layout
mod desc {
    pub const PRIM: u8 = 0x0;
    pub const RGBAQ: u8 = 0x1;
    pub const ST: u8 = 0x2;
    pub const UV: u8 = 0x3;
    pub const XYZF2: u8 = 0x4;
    pub const XYZ2: u8 = 0x5;
    pub const FOG: u8 = 0xA;
    pub const XYZF3: u8 = 0xC;
    pub const XYZ3: u8 = 0xD;
    pub const A_D: u8 = 0xE;
    pub const NOP: u8 = 0xF;
}

impl GS {
    /// Apply one PACKED quadword
    pub(in crate::core::gs) fn write_packed(
        &mut self,
        descriptor: u8,
        data: u128,
    ) -> Result<(), GsError> {
        let lo = data as u64;
        let hi = (data >> 64) as u64;

        match descriptor {
            desc::PRIM => self.write_internal(GsRegister::Prim, lo & 0x7FF),
            desc::RGBAQ => {
                let rgbaq = Rgbaq {
                    r: lo as u8,
                    g: (lo >> 32) as u8,
                    b: hi as u8,
                    a: (hi >> 32) as u8,
                    q: self.regs.packed_q,
                };
                self.write_internal(GsRegister::Rgbaq, rgbaq.to_bits())
            }
            desc::ST => {
                self.regs.packed_q = f32::from_bits(hi as u32);
                self.write_internal(GsRegister::St, St::from_bits(lo).to_bits())
            }
            desc::UV => {
                let uv = Uv {
                    u: (lo & 0x3FFF) as u16,
                    v: ((lo >> 32) & 0x3FFF) as u16,
                };
                self.write_internal(GsRegister::Uv, uv.to_bits())
            }
            desc::XYZF2 | desc::XYZF3 => {
                let z = (hi >> 4) & 0xFF_FFFF;
                let f = (hi >> 36) & 0xFF;
                let value = packed_xy(lo) | z << 32 | f << 56;
                let reg = if descriptor == desc::XYZF3 || adc(hi) {
                    GsRegister::Xyzf3
                } else {
                    GsRegister::Xyzf2
                };
                self.write_internal(reg, value)
            }
            desc::XYZ2 | desc::XYZ3 => {
                let z = hi & 0xFFFF_FFFF;
                let value = packed_xy(lo) | z << 32;
                let reg = if descriptor == desc::XYZ3 || adc(hi) {
                    GsRegister::Xyz3
                } else {
                    GsRegister::Xyz2
                };
                self.write_internal(reg, value)
            }
            desc::FOG => {
                let f = (hi >> 36) & 0xFF;
                self.write_internal(GsRegister::Fog, f << 56)
            }
            desc::A_D => self.write_register((hi & 0xFF) as u8, lo),
            desc::NOP => Ok(()),
            // TEX0_1/2, CLAMP_1/2 and the unassigned 0xB use their register id
            id => self.write_register(id, lo),
        }
    }

    /// Apply one REGLIST value
    pub(in crate::core::gs) fn write_reglist(
        &mut self,
        descriptor: u8,
        value: u64,
    ) -> Result<(), GsError> {
        match descriptor {
            desc::A_D | desc::NOP => Ok(()),
            id => self.write_register(id, value),
        }
    }
}

/// X and Y of a PACKED vertex in XYZ register layout
#[inline(always)]
fn packed_xy(lo: u64) -> u64 {
    (lo & 0xFFFF) | ((lo >> 32) & 0xFFFF) << 16
}

/// ADC: the vertex is added without a drawing kick
#[inline(always)]
fn adc(hi: u64) -> bool {
    (hi >> 47) & 1 != 0
}
