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

//! GS internal register file
//!
//! Holds every internal register the GIF can write. Per-context registers
//! live in a two-element array indexed by [`Context`]; a write always
//! resolves the copy it targets at the time of the write.
//!
//! [`RegisterFile::store`] only updates state. Side effects of register
//! writes (vertex kicks, transfer activation, events) belong to the GS, which
//! calls `store` and then acts.

use super::address::{ContextRegister, GsRegister};
use super::registers::{
    Alpha, BitBltBuf, Context, Frame, Prim, Rgbaq, Scissor, St, Tex0, Test, TransferDirection,
    TrxPos, TrxReg, Uv, XyOffset, Xyz, Zbuf,
};

/// Registers duplicated per rendering context
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContextRegisters {
    pub tex0: Tex0,
    pub clamp: u64,
    pub tex1: u64,
    pub xyoffset: XyOffset,
    pub miptbp1: u64,
    pub miptbp2: u64,
    pub scissor: Scissor,
    pub alpha: Alpha,
    pub test: Test,
    /// FBA: force alpha MSB on write
    pub fba: bool,
    pub frame: Frame,
    pub zbuf: Zbuf,
}

/// GS internal register state
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterFile {
    pub prim: Prim,
    pub rgbaq: Rgbaq,
    pub st: St,
    pub uv: Uv,
    /// Last written vertex position
    pub xyz: Xyz,
    pub fog: u8,
    /// Q latched by the last PACKED ST write, applied by the next RGBAQ
    pub(crate) packed_q: f32,
    /// PRMODECONT AC: attributes come from PRIM (true) or PRMODE (false)
    pub prmodecont: bool,
    pub prmode: Prim,
    contexts: [ContextRegisters; 2],
    pub texclut: u64,
    pub scanmsk: u8,
    pub texa: u64,
    pub fogcol: u64,
    pub dimx: u64,
    pub dthe: bool,
    pub colclamp: bool,
    pub pabe: bool,
    pub bitbltbuf: BitBltBuf,
    pub trxpos: TrxPos,
    pub trxreg: TrxReg,
    pub trxdir: TransferDirection,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self {
            prim: Prim::default(),
            rgbaq: Rgbaq::default(),
            st: St::default(),
            uv: Uv::default(),
            xyz: Xyz::default(),
            fog: 0,
            packed_q: 1.0,
            prmodecont: true,
            prmode: Prim::default(),
            contexts: [ContextRegisters::default(); 2],
            texclut: 0,
            scanmsk: 0,
            texa: 0,
            fogcol: 0,
            dimx: 0,
            dthe: false,
            colclamp: true,
            pabe: false,
            bitbltbuf: BitBltBuf::default(),
            trxpos: TrxPos::default(),
            trxreg: TrxReg::default(),
            trxdir: TransferDirection::Deactivated,
        }
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every register to its power-on value
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Attributes that apply to the next primitive
    ///
    /// The primitive type always comes from PRIM. The remaining attributes
    /// come from PRIM when PRMODECONT.AC is set, otherwise from PRMODE.
    pub fn drawing_attributes(&self) -> Prim {
        if self.prmodecont {
            self.prim
        } else {
            Prim {
                prim_type: self.prim.prim_type,
                ..self.prmode
            }
        }
    }

    /// Context the next primitive draws with
    pub fn active_context(&self) -> Context {
        self.drawing_attributes().context()
    }

    /// Registers of one context
    pub fn context(&self, context: Context) -> &ContextRegisters {
        &self.contexts[context.index()]
    }

    pub fn context_mut(&mut self, context: Context) -> &mut ContextRegisters {
        &mut self.contexts[context.index()]
    }

    /// Registers of the context currently selected by PRIM/PRMODE
    pub fn active(&self) -> &ContextRegisters {
        self.context(self.active_context())
    }

    /// Write a per-context register into the copy selected right now
    ///
    /// # Returns
    ///
    /// The context that received the value
    pub fn write_active_context(&mut self, reg: ContextRegister, value: u64) -> Context {
        let context = self.active_context();
        self.store(GsRegister::Contextual(reg, context), value);
        context
    }

    /// Store a register value without side effects
    ///
    /// Trigger registers (HWREG, SIGNAL, FINISH, LABEL, TEXFLUSH) hold no
    /// state here and are ignored.
    pub fn store(&mut self, reg: GsRegister, value: u64) {
        match reg {
            GsRegister::Prim => self.prim = Prim::from_bits(value),
            GsRegister::Rgbaq => self.rgbaq = Rgbaq::from_bits(value),
            GsRegister::St => self.st = St::from_bits(value),
            GsRegister::Uv => self.uv = Uv::from_bits(value),
            GsRegister::Xyz2 | GsRegister::Xyz3 => self.xyz = Xyz::from_xyz_bits(value),
            GsRegister::Xyzf2 | GsRegister::Xyzf3 => {
                let (xyz, fog) = Xyz::from_xyzf_bits(value);
                self.xyz = xyz;
                self.fog = fog;
            }
            GsRegister::Fog => self.fog = (value >> 56) as u8,
            GsRegister::PrModeCont => self.prmodecont = value & 1 != 0,
            GsRegister::PrMode => self.prmode = Prim::from_bits(value & !0x7),
            GsRegister::TexClut => self.texclut = value & 0x3F_FFFF,
            GsRegister::ScanMsk => self.scanmsk = (value & 0x3) as u8,
            GsRegister::Texa => self.texa = value,
            GsRegister::FogCol => self.fogcol = value & 0xFF_FFFF,
            GsRegister::Dimx => self.dimx = value,
            GsRegister::Dthe => self.dthe = value & 1 != 0,
            GsRegister::ColClamp => self.colclamp = value & 1 != 0,
            GsRegister::Pabe => self.pabe = value & 1 != 0,
            GsRegister::BitBltBuf => self.bitbltbuf = BitBltBuf::from_bits(value),
            GsRegister::TrxPos => self.trxpos = TrxPos::from_bits(value),
            GsRegister::TrxReg => self.trxreg = TrxReg::from_bits(value),
            GsRegister::TrxDir => self.trxdir = TransferDirection::from_bits(value),
            GsRegister::Contextual(reg, context) => self.store_contextual(reg, context, value),
            GsRegister::HwReg
            | GsRegister::Signal
            | GsRegister::Finish
            | GsRegister::Label
            | GsRegister::TexFlush => {}
        }
    }

    fn store_contextual(&mut self, reg: ContextRegister, context: Context, value: u64) {
        let regs = self.context_mut(context);
        match reg {
            ContextRegister::Tex0 => regs.tex0 = Tex0::from_bits(value),
            ContextRegister::Tex2 => {
                let merged = (regs.tex0.to_bits() & !Tex0::TEX2_MASK) | (value & Tex0::TEX2_MASK);
                regs.tex0 = Tex0::from_bits(merged);
            }
            ContextRegister::Clamp => regs.clamp = value,
            ContextRegister::Tex1 => regs.tex1 = value,
            ContextRegister::XyOffset => regs.xyoffset = XyOffset::from_bits(value),
            ContextRegister::MipTbp1 => regs.miptbp1 = value,
            ContextRegister::MipTbp2 => regs.miptbp2 = value,
            ContextRegister::Scissor => regs.scissor = Scissor::from_bits(value),
            ContextRegister::Alpha => regs.alpha = Alpha::from_bits(value),
            ContextRegister::Test => regs.test = Test::from_bits(value),
            ContextRegister::Fba => regs.fba = value & 1 != 0,
            ContextRegister::Frame => regs.frame = Frame::from_bits(value),
            ContextRegister::Zbuf => regs.zbuf = Zbuf::from_bits(value),
        }
    }

    /// Packed value of a register, for snapshots and diagnostics
    ///
    /// Returns `None` for registers without their own state (triggers, the
    /// XYZ aliases, and TEX2 which writes through to TEX0).
    pub fn load(&self, reg: GsRegister) -> Option<u64> {
        Some(match reg {
            GsRegister::Prim => self.prim.to_bits(),
            GsRegister::Rgbaq => self.rgbaq.to_bits(),
            GsRegister::St => self.st.to_bits(),
            GsRegister::Uv => self.uv.to_bits(),
            GsRegister::Xyz2 => self.xyz.to_bits(),
            GsRegister::Fog => (self.fog as u64) << 56,
            GsRegister::PrModeCont => self.prmodecont as u64,
            GsRegister::PrMode => self.prmode.to_bits(),
            GsRegister::TexClut => self.texclut,
            GsRegister::ScanMsk => self.scanmsk as u64,
            GsRegister::Texa => self.texa,
            GsRegister::FogCol => self.fogcol,
            GsRegister::Dimx => self.dimx,
            GsRegister::Dthe => self.dthe as u64,
            GsRegister::ColClamp => self.colclamp as u64,
            GsRegister::Pabe => self.pabe as u64,
            GsRegister::BitBltBuf => self.bitbltbuf.to_bits(),
            GsRegister::TrxPos => self.trxpos.to_bits(),
            GsRegister::TrxReg => self.trxreg.to_bits(),
            GsRegister::TrxDir => self.trxdir.to_bits(),
            GsRegister::Contextual(ContextRegister::Tex2, _) => return None,
            GsRegister::Contextual(reg, context) => {
                let regs = self.context(context);
                match reg {
                    ContextRegister::Tex0 => regs.tex0.to_bits(),
                    ContextRegister::Clamp => regs.clamp,
                    ContextRegister::Tex1 => regs.tex1,
                    ContextRegister::XyOffset => regs.xyoffset.to_bits(),
                    ContextRegister::MipTbp1 => regs.miptbp1,
                    ContextRegister::MipTbp2 => regs.miptbp2,
                    ContextRegister::Scissor => regs.scissor.to_bits(),
                    ContextRegister::Alpha => regs.alpha.to_bits(),
                    ContextRegister::Test => regs.test.to_bits(),
                    ContextRegister::Fba => regs.fba as u64,
                    ContextRegister::Frame => regs.frame.to_bits(),
                    ContextRegister::Zbuf => regs.zbuf.to_bits(),
                    ContextRegister::Tex2 => return None,
                }
            }
            GsRegister::Xyzf2
            | GsRegister::Xyzf3
            | GsRegister::Xyz3
            | GsRegister::HwReg
            | GsRegister::Signal
            | GsRegister::Finish
            | GsRegister::Label
            | GsRegister::TexFlush => return None,
        })
    }
}
