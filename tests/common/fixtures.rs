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

//! Packet builders for common test scenarios

use gsrx::core::gs::PixelFormat;

pub const PACKED: u8 = 0;
pub const IMAGE: u8 = 2;

/// Descriptor for an A+D payload quadword
pub const AD: u8 = 0xE;

/// Build a GIF tag
#[allow(dead_code)]
pub fn gif_tag(nloop: u16, eop: bool, format: u8, regs: &[u8]) -> u128 {
    let lo = (nloop as u64 & 0x7FFF)
        | (eop as u64) << 15
        | (format as u64 & 0x3) << 58
        | (regs.len() as u64 & 0xF) << 60;
    let hi = regs
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &r)| acc | (r as u64 & 0xF) << (i * 4));
    lo as u128 | (hi as u128) << 64
}

/// Build a GIF tag that also writes PRIM
#[allow(dead_code)]
pub fn gif_tag_with_prim(nloop: u16, eop: bool, format: u8, regs: &[u8], prim: u16) -> u128 {
    gif_tag(nloop, eop, format, regs) | 1u128 << 46 | (prim as u128 & 0x7FF) << 47
}

/// One EOP PACKED packet of A+D writes
#[allow(dead_code)]
pub fn ad_packet(writes: &[(u8, u64)]) -> Vec<u128> {
    let mut packet = vec![gif_tag(writes.len() as u16, true, PACKED, &[AD])];
    packet.extend(
        writes
            .iter()
            .map(|&(id, value)| value as u128 | (id as u128) << 64),
    );
    packet
}

/// PACKED XYZ2 payload
#[allow(dead_code)]
pub fn packed_xyz2(x: u16, y: u16, z: u32) -> u128 {
    x as u128 | (y as u128) << 32 | (z as u128) << 64
}

/// PACKED RGBAQ payload
#[allow(dead_code)]
pub fn packed_rgbaq(r: u8, g: u8, b: u8, a: u8) -> u128 {
    r as u128 | (g as u128) << 32 | (b as u128) << 64 | (a as u128) << 96
}

/// A complete host-to-local upload: BITBLT setup through A+D followed by an
/// IMAGE tag carrying `pixels`
///
/// `pixels.len()` times the format depth must be a multiple of 128.
#[allow(dead_code)]
pub fn image_upload(
    format: PixelFormat,
    dbp: u32,
    dbw: u32,
    origin: (u16, u16),
    size: (u16, u16),
    pixels: &[u32],
) -> Vec<u128> {
    let bitbltbuf = (dbp as u64) << 32 | (dbw as u64) << 48 | (format.bits() as u64) << 56;
    let trxpos = (origin.0 as u64) << 32 | (origin.1 as u64) << 48;
    let trxreg = size.0 as u64 | (size.1 as u64) << 32;

    let mut packet = vec![gif_tag(4, false, PACKED, &[AD])];
    for (id, value) in [(0x50u8, bitbltbuf), (0x51, trxpos), (0x52, trxreg), (0x53, 0)] {
        packet.push(value as u128 | (id as u128) << 64);
    }

    let payload = pack_quadwords(pixels, format.bits_per_pixel());
    packet.push(gif_tag(payload.len() as u16, true, IMAGE, &[]));
    packet.extend(payload);
    packet
}

/// Pack pixels into quadwords, least significant first
#[allow(dead_code)]
pub fn pack_quadwords(pixels: &[u32], depth: u32) -> Vec<u128> {
    let mut words = Vec::new();
    let mut acc = 0u128;
    let mut bits = 0;
    for &pixel in pixels {
        let value = pixel as u128 & ((1u128 << depth) - 1);
        if bits + depth > 128 {
            let low = 128 - bits;
            acc |= value << bits;
            words.push(acc);
            acc = value >> low;
            bits = depth - low;
        } else {
            acc |= value << bits;
            bits += depth;
            if bits == 128 {
                words.push(acc);
                acc = 0;
                bits = 0;
            }
        }
    }
    if bits > 0 {
        words.push(acc);
    }
    words
}

/// Privileged register writes that show a PSMCT32 buffer on circuit 1
///
/// `width` and `height` are in pixels; the buffer starts at page `fbp`.
#[allow(dead_code)]
pub fn display_setup(fbp: u32, fbw: u32, width: u32, height: u32) -> [(u32, u64); 3] {
    let dispfb = fbp as u64 | (fbw as u64) << 9;
    let display = (3u64 << 23) | ((width * 4 - 1) as u64) << 32 | ((height - 1) as u64) << 44;
    [
        (0x1200_0000, 0x1),
        (0x1200_0070, dispfb),
        (0x1200_0080, display),
    ]
}
