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

//! GS register address maps
//!
//! Two disjoint address spaces:
//! - Internal registers, addressed by an 8-bit id. These are what GIF
//!   packets (A+D, REGLIST) and `write64` with a small address target.
//! - Privileged registers, memory mapped for the CPU at `0x1200_0000`.
//!
//! Both maps are explicit lookups; ids/addresses without an entry return
//! `None` so callers can report them.

use super::registers::Context;

/// Registers that exist once per rendering context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextRegister {
    Tex0,
    Clamp,
    Tex1,
    Tex2,
    XyOffset,
    MipTbp1,
    MipTbp2,
    Scissor,
    Alpha,
    Test,
    Fba,
    Frame,
    Zbuf,
}

impl ContextRegister {
    /// Register id of the context-1 copy
    fn base_id(self) -> u8 {
        match self {
            ContextRegister::Tex0 => 0x06,
            ContextRegister::Clamp => 0x08,
            ContextRegister::Tex1 => 0x14,
            ContextRegister::Tex2 => 0x16,
            ContextRegister::XyOffset => 0x18,
            ContextRegister::MipTbp1 => 0x34,
            ContextRegister::MipTbp2 => 0x36,
            ContextRegister::Scissor => 0x40,
            ContextRegister::Alpha => 0x42,
            ContextRegister::Test => 0x47,
            ContextRegister::Fba => 0x4A,
            ContextRegister::Frame => 0x4C,
            ContextRegister::Zbuf => 0x4E,
        }
    }

    /// Register id of the copy belonging to `context`
    pub fn id(self, context: Context) -> u8 {
        self.base_id() + context.index() as u8
    }
}

/// Internal GS registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GsRegister {
    Prim,
    Rgbaq,
    St,
    Uv,
    Xyzf2,
    Xyz2,
    Fog,
    Xyzf3,
    Xyz3,
    PrModeCont,
    PrMode,
    TexClut,
    ScanMsk,
    Texa,
    FogCol,
    TexFlush,
    Dimx,
    Dthe,
    ColClamp,
    Pabe,
    BitBltBuf,
    TrxPos,
    TrxReg,
    TrxDir,
    HwReg,
    Signal,
    Finish,
    Label,
    /// A per-context register and the copy it names
    Contextual(ContextRegister, Context),
}

impl GsRegister {
    /// Look up an internal register by id
    pub fn from_id(id: u8) -> Option<Self> {
        use ContextRegister as C;

        let contextual = |reg: ContextRegister, id: u8| {
            GsRegister::Contextual(reg, Context::from_bit(id != reg.base_id()))
        };

        Some(match id {
            0x00 => GsRegister::Prim,
            0x01 => GsRegister::Rgbaq,
            0x02 => GsRegister::St,
            0x03 => GsRegister::Uv,
            0x04 => GsRegister::Xyzf2,
            0x05 => GsRegister::Xyz2,
            0x06 | 0x07 => contextual(C::Tex0, id),
            0x08 | 0x09 => contextual(C::Clamp, id),
            0x0A => GsRegister::Fog,
            0x0C => GsRegister::Xyzf3,
            0x0D => GsRegister::Xyz3,
            0x14 | 0x15 => contextual(C::Tex1, id),
            0x16 | 0x17 => contextual(C::Tex2, id),
            0x18 | 0x19 => contextual(C::XyOffset, id),
            0x1A => GsRegister::PrModeCont,
            0x1B => GsRegister::PrMode,
            0x1C => GsRegister::TexClut,
            0x22 => GsRegister::ScanMsk,
            0x34 | 0x35 => contextual(C::MipTbp1, id),
            0x36 | 0x37 => contextual(C::MipTbp2, id),
            0x3B => GsRegister::Texa,
            0x3D => GsRegister::FogCol,
            0x3F => GsRegister::TexFlush,
            0x40 | 0x41 => contextual(C::Scissor, id),
            0x42 | 0x43 => contextual(C::Alpha, id),
            0x44 => GsRegister::Dimx,
            0x45 => GsRegister::Dthe,
            0x46 => GsRegister::ColClamp,
            0x47 | 0x48 => contextual(C::Test, id),
            0x49 => GsRegister::Pabe,
            0x4A | 0x4B => contextual(C::Fba, id),
            0x4C | 0x4D => contextual(C::Frame, id),
            0x4E | 0x4F => contextual(C::Zbuf, id),
            0x50 => GsRegister::BitBltBuf,
            0x51 => GsRegister::TrxPos,
            0x52 => GsRegister::TrxReg,
            0x53 => GsRegister::TrxDir,
            0x54 => GsRegister::HwReg,
            0x60 => GsRegister::Signal,
            0x61 => GsRegister::Finish,
            0x62 => GsRegister::Label,
            _ => return None,
        })
    }

    /// Register id
    pub fn id(self) -> u8 {
        match self {
            GsRegister::Prim => 0x00,
            GsRegister::Rgbaq => 0x01,
            GsRegister::St => 0x02,
            GsRegister::Uv => 0x03,
            GsRegister::Xyzf2 => 0x04,
            GsRegister::Xyz2 => 0x05,
            GsRegister::Fog => 0x0A,
            GsRegister::Xyzf3 => 0x0C,
            GsRegister::Xyz3 => 0x0D,
            GsRegister::PrModeCont => 0x1A,
            GsRegister::PrMode => 0x1B,
            GsRegister::TexClut => 0x1C,
            GsRegister::ScanMsk => 0x22,
            GsRegister::Texa => 0x3B,
            GsRegister::FogCol => 0x3D,
            GsRegister::TexFlush => 0x3F,
            GsRegister::Dimx => 0x44,
            GsRegister::Dthe => 0x45,
            GsRegister::ColClamp => 0x46,
            GsRegister::Pabe => 0x49,
            GsRegister::BitBltBuf => 0x50,
            GsRegister::TrxPos => 0x51,
            GsRegister::TrxReg => 0x52,
            GsRegister::TrxDir => 0x53,
            GsRegister::HwReg => 0x54,
            GsRegister::Signal => 0x60,
            GsRegister::Finish => 0x61,
            GsRegister::Label => 0x62,
            GsRegister::Contextual(reg, context) => reg.id(context),
        }
    }
}

/// Display read circuit selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Circuit {
    One,
    Two,
}

impl Circuit {
    pub fn index(self) -> usize {
        match self {
            Circuit::One => 0,
            Circuit::Two => 1,
        }
    }
}

/// Privileged (CPU-mapped) GS registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegedRegister {
    Pmode,
    Smode1,
    Smode2,
    Srfsh,
    Synch1,
    Synch2,
    Syncv,
    Dispfb(Circuit),
    Display(Circuit),
    Extbuf,
    Extdata,
    Extwrite,
    Bgcolor,
    Csr,
    Imr,
    Busdir,
    Siglblid,
}

impl PrivilegedRegister {
    /// Base of the privileged register block
    pub const BASE: u32 = 0x1200_0000;

    /// Every register, for snapshots
    pub const ALL: [PrivilegedRegister; 19] = [
        PrivilegedRegister::Pmode,
        PrivilegedRegister::Smode1,
        PrivilegedRegister::Smode2,
        PrivilegedRegister::Srfsh,
        PrivilegedRegister::Synch1,
        PrivilegedRegister::Synch2,
        PrivilegedRegister::Syncv,
        PrivilegedRegister::Dispfb(Circuit::One),
        PrivilegedRegister::Display(Circuit::One),
        PrivilegedRegister::Dispfb(Circuit::Two),
        PrivilegedRegister::Display(Circuit::Two),
        PrivilegedRegister::Extbuf,
        PrivilegedRegister::Extdata,
        PrivilegedRegister::Extwrite,
        PrivilegedRegister::Bgcolor,
        PrivilegedRegister::Csr,
        PrivilegedRegister::Imr,
        PrivilegedRegister::Busdir,
        PrivilegedRegister::Siglblid,
    ];

    /// Whether `addr` falls inside the privileged register window
    pub fn in_window(addr: u32) -> bool {
        (addr & 0xFFFF_0000) == Self::BASE
    }

    /// Look up a register by its 64-bit aligned address
    pub fn from_addr(addr: u32) -> Option<Self> {
        if !Self::in_window(addr) || addr & 0x7 != 0 {
            return None;
        }

        Some(match addr & 0xFFFF {
            0x0000 => PrivilegedRegister::Pmode,
            0x0010 => PrivilegedRegister::Smode1,
            0x0020 => PrivilegedRegister::Smode2,
            0x0030 => PrivilegedRegister::Srfsh,
            0x0040 => PrivilegedRegister::Synch1,
            0x0050 => PrivilegedRegister::Synch2,
            0x0060 => PrivilegedRegister::Syncv,
            0x0070 => PrivilegedRegister::Dispfb(Circuit::One),
            0x0080 => PrivilegedRegister::Display(Circuit::One),
            0x0090 => PrivilegedRegister::Dispfb(Circuit::Two),
            0x00A0 => PrivilegedRegister::Display(Circuit::Two),
            0x00B0 => PrivilegedRegister::Extbuf,
            0x00C0 => PrivilegedRegister::Extdata,
            0x00D0 => PrivilegedRegister::Extwrite,
            0x00E0 => PrivilegedRegister::Bgcolor,
            0x1000 => PrivilegedRegister::Csr,
            0x1010 => PrivilegedRegister::Imr,
            0x1040 => PrivilegedRegister::Busdir,
            0x1080 => PrivilegedRegister::Siglblid,
            _ => return None,
        })
    }

    /// Address of the register
    pub fn addr(self) -> u32 {
        let offset = match self {
            PrivilegedRegister::Pmode => 0x0000,
            PrivilegedRegister::Smode1 => 0x0010,
            PrivilegedRegister::Smode2 => 0x0020,
            PrivilegedRegister::Srfsh => 0x0030,
            PrivilegedRegister::Synch1 => 0x0040,
            PrivilegedRegister::Synch2 => 0x0050,
            PrivilegedRegister::Syncv => 0x0060,
            PrivilegedRegister::Dispfb(Circuit::One) => 0x0070,
            PrivilegedRegister::Display(Circuit::One) => 0x0080,
            PrivilegedRegister::Dispfb(Circuit::Two) => 0x0090,
            PrivilegedRegister::Display(Circuit::Two) => 0x00A0,
            PrivilegedRegister::Extbuf => 0x00B0,
            PrivilegedRegister::Extdata => 0x00C0,
            PrivilegedRegister::Extwrite => 0x00D0,
            PrivilegedRegister::Bgcolor => 0x00E0,
            PrivilegedRegister::Csr => 0x1000,
            PrivilegedRegister::Imr => 0x1010,
            PrivilegedRegister::Busdir => 0x1040,
            PrivilegedRegister::Siglblid => 0x1080,
        };
        Self::BASE + offset
    }
}
