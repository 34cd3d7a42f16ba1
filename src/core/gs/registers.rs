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

//! GS register value types
//!
//! Each internal register is a 64-bit value. The types here unpack those bit
//! fields into named fields (`from_bits`) and pack them back (`to_bits`) for
//! snapshots and diagnostics.

use super::local_mem::PixelFormat;
use serde::{Deserialize, Serialize};

#[inline(always)]
fn field(value: u64, shift: u32, width: u32) -> u64 {
    (value >> shift) & ((1u64 << width) - 1)
}

#[inline(always)]
fn bit(value: u64, shift: u32) -> bool {
    (value >> shift) & 1 != 0
}

/// Rendering context selector
///
/// Several drawing registers exist in two copies; the PRIM (or PRMODE)
/// CTXT bit picks which copy a primitive uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Context {
    /// Context 1 (`*_1` registers)
    #[default]
    One,
    /// Context 2 (`*_2` registers)
    Two,
}

impl Context {
    /// Array index of this context (0 or 1)
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Context::One => 0,
            Context::Two => 1,
        }
    }

    /// Context selected by a CTXT bit
    #[inline(always)]
    pub fn from_bit(ctxt: bool) -> Self {
        if ctxt {
            Context::Two
        } else {
            Context::One
        }
    }
}

/// Primitive types (PRIM bits 0-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimitiveType {
    #[default]
    Point,
    Line,
    LineStrip,
    Triangle,
    TriangleStrip,
    TriangleFan,
    Sprite,
    /// Encoding 7 is prohibited; vertices are queued but nothing is drawn
    Reserved,
}

impl PrimitiveType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x7 {
            0 => PrimitiveType::Point,
            1 => PrimitiveType::Line,
            2 => PrimitiveType::LineStrip,
            3 => PrimitiveType::Triangle,
            4 => PrimitiveType::TriangleStrip,
            5 => PrimitiveType::TriangleFan,
            6 => PrimitiveType::Sprite,
            _ => PrimitiveType::Reserved,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            PrimitiveType::Point => 0,
            PrimitiveType::Line => 1,
            PrimitiveType::LineStrip => 2,
            PrimitiveType::Triangle => 3,
            PrimitiveType::TriangleStrip => 4,
            PrimitiveType::TriangleFan => 5,
            PrimitiveType::Sprite => 6,
            PrimitiveType::Reserved => 7,
        }
    }

    /// Vertices needed before a primitive of this type can be drawn
    pub fn vertex_count(self) -> usize {
        match self {
            PrimitiveType::Point => 1,
            PrimitiveType::Line | PrimitiveType::LineStrip | PrimitiveType::Sprite => 2,
            PrimitiveType::Triangle | PrimitiveType::TriangleStrip | PrimitiveType::TriangleFan => 3,
            PrimitiveType::Reserved => 1,
        }
    }
}

/// PRIM register (0x00)
///
/// ```text
///   Bit 0-2:  PRIM  primitive type
///   Bit 3:    IIP   gouraud shading
///   Bit 4:    TME   texture mapping
///   Bit 5:    FGE   fog
///   Bit 6:    ABE   alpha blending
///   Bit 7:    AA1   antialiasing
///   Bit 8:    FST   UV (1) or STQ (0) texture coordinates
///   Bit 9:    CTXT  context
///   Bit 10:   FIX   fragment value control
/// ```
///
/// PRMODE (0x1B) shares the layout of bits 3-10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prim {
    pub prim_type: PrimitiveType,
    pub gouraud_shading: bool,
    pub texture_mapping: bool,
    pub fog: bool,
    pub alpha_blend: bool,
    pub antialiasing: bool,
    pub use_uv: bool,
    pub use_context2: bool,
    pub fix_fragment_value: bool,
}

impl Prim {
    pub fn from_bits(value: u64) -> Self {
        Self {
            prim_type: PrimitiveType::from_bits(field(value, 0, 3) as u8),
            gouraud_shading: bit(value, 3),
            texture_mapping: bit(value, 4),
            fog: bit(value, 5),
            alpha_blend: bit(value, 6),
            antialiasing: bit(value, 7),
            use_uv: bit(value, 8),
            use_context2: bit(value, 9),
            fix_fragment_value: bit(value, 10),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.prim_type.bits() as u64)
            | (self.gouraud_shading as u64) << 3
            | (self.texture_mapping as u64) << 4
            | (self.fog as u64) << 5
            | (self.alpha_blend as u64) << 6
            | (self.antialiasing as u64) << 7
            | (self.use_uv as u64) << 8
            | (self.use_context2 as u64) << 9
            | (self.fix_fragment_value as u64) << 10
    }

    /// Context selected by the CTXT bit
    pub fn context(&self) -> Context {
        Context::from_bit(self.use_context2)
    }
}

/// RGBAQ register (0x01): vertex color and perspective Q
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgbaq {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    pub q: f32,
}

impl Default for Rgbaq {
    fn default() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0x80,
            q: 1.0,
        }
    }
}

impl Rgbaq {
    pub fn from_bits(value: u64) -> Self {
        Self {
            r: field(value, 0, 8) as u8,
            g: field(value, 8, 8) as u8,
            b: field(value, 16, 8) as u8,
            a: field(value, 24, 8) as u8,
            q: f32::from_bits((value >> 32) as u32),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.r as u64)
            | (self.g as u64) << 8
            | (self.b as u64) << 16
            | (self.a as u64) << 24
            | (self.q.to_bits() as u64) << 32
    }
}

/// ST register (0x02): perspective texture coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct St {
    pub s: f32,
    pub t: f32,
}

impl St {
    pub fn from_bits(value: u64) -> Self {
        Self {
            s: f32::from_bits(value as u32),
            t: f32::from_bits((value >> 32) as u32),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.s.to_bits() as u64) | (self.t.to_bits() as u64) << 32
    }
}

/// UV register (0x03): texel coordinates, 10.4 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Uv {
    pub u: u16,
    pub v: u16,
}

impl Uv {
    pub fn from_bits(value: u64) -> Self {
        Self {
            u: field(value, 0, 14) as u16,
            v: field(value, 16, 14) as u16,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.u as u64) | (self.v as u64) << 16
    }
}

/// XYZ2/XYZ3/XYZF2/XYZF3 vertex position (12.4 fixed point X/Y)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Xyz {
    pub x: u16,
    pub y: u16,
    pub z: u32,
}

impl Xyz {
    /// XYZ2/XYZ3 layout: X 0-15, Y 16-31, Z 32-63
    pub fn from_xyz_bits(value: u64) -> Self {
        Self {
            x: field(value, 0, 16) as u16,
            y: field(value, 16, 16) as u16,
            z: (value >> 32) as u32,
        }
    }

    /// XYZF2/XYZF3 layout: X 0-15, Y 16-31, Z 32-55, F 56-63
    pub fn from_xyzf_bits(value: u64) -> (Self, u8) {
        let xyz = Self {
            x: field(value, 0, 16) as u16,
            y: field(value, 16, 16) as u16,
            z: field(value, 32, 24) as u32,
        };
        (xyz, field(value, 56, 8) as u8)
    }

    pub fn to_bits(&self) -> u64 {
        (self.x as u64) | (self.y as u64) << 16 | (self.z as u64) << 32
    }
}

/// XYOFFSET_1/2 (0x18/0x19): primitive-to-window offset, 12.4 fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct XyOffset {
    pub x: u16,
    pub y: u16,
}

impl XyOffset {
    pub fn from_bits(value: u64) -> Self {
        Self {
            x: field(value, 0, 16) as u16,
            y: field(value, 32, 16) as u16,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.x as u64) | (self.y as u64) << 32
    }
}

/// SCISSOR_1/2 (0x40/0x41): drawable rectangle in window coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scissor {
    pub x1: u16,
    pub x2: u16,
    pub y1: u16,
    pub y2: u16,
}

impl Scissor {
    pub fn from_bits(value: u64) -> Self {
        Self {
            x1: field(value, 0, 11) as u16,
            x2: field(value, 16, 11) as u16,
            y1: field(value, 32, 11) as u16,
            y2: field(value, 48, 11) as u16,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.x1 as u64) | (self.x2 as u64) << 16 | (self.y1 as u64) << 32 | (self.y2 as u64) << 48
    }
}

/// TEST_1/2 (0x47/0x48): pixel test control
///
/// ```text
///   Bit 0:      ATE   alpha test enable
///   Bit 1-3:    ATST  alpha test method
///   Bit 4-11:   AREF  alpha reference
///   Bit 12-13:  AFAIL alpha fail processing
///   Bit 14:     DATE  destination alpha test enable
///   Bit 15:     DATM  destination alpha test mode
///   Bit 16:     ZTE   depth test enable
///   Bit 17-18:  ZTST  depth test method
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Test {
    pub alpha_test: bool,
    pub alpha_method: u8,
    pub alpha_ref: u8,
    pub alpha_fail_method: u8,
    pub dest_alpha_test: bool,
    pub dest_alpha_method: bool,
    pub depth_test: bool,
    pub depth_method: u8,
}

impl Test {
    pub fn from_bits(value: u64) -> Self {
        Self {
            alpha_test: bit(value, 0),
            alpha_method: field(value, 1, 3) as u8,
            alpha_ref: field(value, 4, 8) as u8,
            alpha_fail_method: field(value, 12, 2) as u8,
            dest_alpha_test: bit(value, 14),
            dest_alpha_method: bit(value, 15),
            depth_test: bit(value, 16),
            depth_method: field(value, 17, 2) as u8,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.alpha_test as u64)
            | (self.alpha_method as u64) << 1
            | (self.alpha_ref as u64) << 4
            | (self.alpha_fail_method as u64) << 12
            | (self.dest_alpha_test as u64) << 14
            | (self.dest_alpha_method as u64) << 15
            | (self.depth_test as u64) << 16
            | (self.depth_method as u64) << 17
    }
}

/// FRAME_1/2 (0x4C/0x4D): render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Frame {
    /// FBP, in pages (2048 words)
    pub base_pointer: u32,
    /// FBW, in units of 64 pixels
    pub width: u32,
    pub format: PixelFormat,
    /// FBMSK: bits set here are not written
    pub mask: u32,
}

impl Frame {
    pub fn from_bits(value: u64) -> Self {
        Self {
            base_pointer: field(value, 0, 9) as u32,
            width: field(value, 16, 6) as u32,
            format: PixelFormat::from_bits_lossy(field(value, 24, 6) as u8),
            mask: (value >> 32) as u32,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.base_pointer as u64)
            | (self.width as u64) << 16
            | (self.format.bits() as u64) << 24
            | (self.mask as u64) << 32
    }

    /// Base pointer in blocks, the unit local memory accessors take
    pub fn base_block(&self) -> u32 {
        self.base_pointer * 32
    }
}

/// ZBUF_1/2 (0x4E/0x4F): depth buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zbuf {
    /// ZBP, in pages
    pub base_pointer: u32,
    pub format: PixelFormat,
    /// ZMSK: depth writes disabled
    pub no_update: bool,
}

impl Default for Zbuf {
    fn default() -> Self {
        Self {
            base_pointer: 0,
            format: PixelFormat::Psmz32,
            no_update: false,
        }
    }
}

impl Zbuf {
    pub fn from_bits(value: u64) -> Self {
        // Only the low nibble of PSM is stored; the Z formats live at 0x30.
        Self {
            base_pointer: field(value, 0, 9) as u32,
            format: PixelFormat::from_bits_lossy(0x30 | field(value, 24, 4) as u8),
            no_update: bit(value, 32),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.base_pointer as u64)
            | ((self.format.bits() & 0xF) as u64) << 24
            | (self.no_update as u64) << 32
    }

    pub fn base_block(&self) -> u32 {
        self.base_pointer * 32
    }
}

/// TEX0_1/2 (0x06/0x07): texture buffer and CLUT setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tex0 {
    /// TBP0, in blocks
    pub base_pointer: u32,
    /// TBW, in units of 64 texels
    pub width: u32,
    pub format: PixelFormat,
    /// log2 of texture width
    pub tw: u8,
    /// log2 of texture height
    pub th: u8,
    pub use_alpha: bool,
    pub function: u8,
    pub clut_base: u32,
    pub clut_format: u8,
    pub clut_storage_mode: bool,
    pub clut_offset: u8,
    pub clut_load: u8,
}

impl Tex0 {
    /// Bits TEX2 is allowed to overwrite (PSM and all CLUT fields)
    pub const TEX2_MASK: u64 = (0x3F << 20) | (!0u64 << 37);

    pub fn from_bits(value: u64) -> Self {
        Self {
            base_pointer: field(value, 0, 14) as u32,
            width: field(value, 14, 6) as u32,
            format: PixelFormat::from_bits_lossy(field(value, 20, 6) as u8),
            tw: field(value, 26, 4) as u8,
            th: field(value, 30, 4) as u8,
            use_alpha: bit(value, 34),
            function: field(value, 35, 2) as u8,
            clut_base: field(value, 37, 14) as u32,
            clut_format: field(value, 51, 4) as u8,
            clut_storage_mode: bit(value, 55),
            clut_offset: field(value, 56, 5) as u8,
            clut_load: field(value, 61, 3) as u8,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.base_pointer as u64)
            | (self.width as u64) << 14
            | (self.format.bits() as u64) << 20
            | (self.tw as u64) << 26
            | (self.th as u64) << 30
            | (self.use_alpha as u64) << 34
            | (self.function as u64) << 35
            | (self.clut_base as u64) << 37
            | (self.clut_format as u64) << 51
            | (self.clut_storage_mode as u64) << 55
            | (self.clut_offset as u64) << 56
            | (self.clut_load as u64) << 61
    }
}

/// ALPHA_1/2 (0x42/0x43): blend equation `((A - B) * C >> 7) + D`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alpha {
    pub a: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub fix: u8,
}

impl Alpha {
    pub fn from_bits(value: u64) -> Self {
        Self {
            a: field(value, 0, 2) as u8,
            b: field(value, 2, 2) as u8,
            c: field(value, 4, 2) as u8,
            d: field(value, 6, 2) as u8,
            fix: field(value, 32, 8) as u8,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.a as u64)
            | (self.b as u64) << 2
            | (self.c as u64) << 4
            | (self.d as u64) << 6
            | (self.fix as u64) << 32
    }
}

/// BITBLTBUF (0x50): transfer buffer setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BitBltBuf {
    /// SBP, in blocks
    pub source_base: u32,
    /// SBW, in units of 64 pixels
    pub source_width: u32,
    pub source_format: PixelFormat,
    /// DBP, in blocks
    pub dest_base: u32,
    /// DBW, in units of 64 pixels
    pub dest_width: u32,
    pub dest_format: PixelFormat,
}

impl BitBltBuf {
    pub fn from_bits(value: u64) -> Self {
        Self {
            source_base: field(value, 0, 14) as u32,
            source_width: field(value, 16, 6) as u32,
            source_format: PixelFormat::from_bits_lossy(field(value, 24, 6) as u8),
            dest_base: field(value, 32, 14) as u32,
            dest_width: field(value, 48, 6) as u32,
            dest_format: PixelFormat::from_bits_lossy(field(value, 56, 6) as u8),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.source_base as u64)
            | (self.source_width as u64) << 16
            | (self.source_format.bits() as u64) << 24
            | (self.dest_base as u64) << 32
            | (self.dest_width as u64) << 48
            | (self.dest_format.bits() as u64) << 56
    }
}

/// Pixel transmission order for local-to-local transfers (TRXPOS DIR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransmissionOrder {
    #[default]
    UpperLeftToLowerRight,
    LowerLeftToUpperRight,
    UpperRightToLowerLeft,
    LowerRightToUpperLeft,
}

impl TransmissionOrder {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => TransmissionOrder::UpperLeftToLowerRight,
            1 => TransmissionOrder::LowerLeftToUpperRight,
            2 => TransmissionOrder::UpperRightToLowerLeft,
            _ => TransmissionOrder::LowerRightToUpperLeft,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            TransmissionOrder::UpperLeftToLowerRight => 0,
            TransmissionOrder::LowerLeftToUpperRight => 1,
            TransmissionOrder::UpperRightToLowerLeft => 2,
            TransmissionOrder::LowerRightToUpperLeft => 3,
        }
    }

    /// Map the n-th visited (column, row) to a rectangle offset
    pub fn offset(self, column: u32, row: u32, width: u32, height: u32) -> (u32, u32) {
        match self {
            TransmissionOrder::UpperLeftToLowerRight => (column, row),
            TransmissionOrder::LowerLeftToUpperRight => (column, height - 1 - row),
            TransmissionOrder::UpperRightToLowerLeft => (width - 1 - column, row),
            TransmissionOrder::LowerRightToUpperLeft => (width - 1 - column, height - 1 - row),
        }
    }
}

/// TRXPOS (0x51): transfer origins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrxPos {
    pub source_x: u16,
    pub source_y: u16,
    pub dest_x: u16,
    pub dest_y: u16,
    pub trans_order: TransmissionOrder,
}

impl TrxPos {
    pub fn from_bits(value: u64) -> Self {
        Self {
            source_x: field(value, 0, 11) as u16,
            source_y: field(value, 16, 11) as u16,
            dest_x: field(value, 32, 11) as u16,
            dest_y: field(value, 48, 11) as u16,
            trans_order: TransmissionOrder::from_bits(field(value, 59, 2) as u8),
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.source_x as u64)
            | (self.source_y as u64) << 16
            | (self.dest_x as u64) << 32
            | (self.dest_y as u64) << 48
            | (self.trans_order.bits() as u64) << 59
    }
}

/// TRXREG (0x52): transfer rectangle size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrxReg {
    pub width: u16,
    pub height: u16,
}

impl TrxReg {
    pub fn from_bits(value: u64) -> Self {
        Self {
            width: field(value, 0, 12) as u16,
            height: field(value, 32, 12) as u16,
        }
    }

    pub fn to_bits(&self) -> u64 {
        (self.width as u64) | (self.height as u64) << 32
    }

    /// Pixels in the transfer rectangle
    pub fn pixel_count(&self) -> u32 {
        self.width as u32 * self.height as u32
    }
}

/// TRXDIR (0x53): transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferDirection {
    /// Host to local memory, data arrives through HWREG writes
    HostToLocal,
    /// Local memory to host, data leaves through HWREG reads
    LocalToHost,
    /// Local memory to local memory, completes when TRXDIR is written
    LocalToLocal,
    #[default]
    Deactivated,
}

impl TransferDirection {
    pub fn from_bits(value: u64) -> Self {
        match value & 0x3 {
            0 => TransferDirection::HostToLocal,
            1 => TransferDirection::LocalToHost,
            2 => TransferDirection::LocalToLocal,
            _ => TransferDirection::Deactivated,
        }
    }

    pub fn to_bits(self) -> u64 {
        match self {
            TransferDirection::HostToLocal => 0,
            TransferDirection::LocalToHost => 1,
            TransferDirection::LocalToLocal => 2,
            TransferDirection::Deactivated => 3,
        }
    }
}
