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

//! GS module tests
//!
//! Tests are organized into the following modules:
//! - `basic`: Initialization, reset, register routing
//! - `gif`: GIF tag decoding, path cursors and bus ownership
//! - `packed`: PACKED, REGLIST and A+D payload decoding
//! - `assembler`: Vertex queue and draw command emission
//! - `registers`: Context registers and the privileged block
//! - `transfer`: BITBLT through HWREG and local-to-local copies
//! - `local_mem`: Pixel formats and swizzling
//! - `display`: Frame buffer read-out and resolutions
//! - `snapshot`: Save state capture, restore and files

mod assembler;
mod snapshot;

use super::GS;

pub(super) const PACKED: u8 = 0;
pub(super) const REGLIST: u8 = 1;
pub(super) const IMAGE: u8 = 2;

/// Build a GIF tag quadword
pub(super) fn tag(nloop: u16, eop: bool, format: u8, regs: &[u8]) -> u128 {
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

/// Build a GIF tag quadword with PRE set
pub(super) fn tag_with_prim(nloop: u16, eop: bool, format: u8, regs: &[u8], prim: u16) -> u128 {
    tag(nloop, eop, format, regs) | 1u128 << 46 | (prim as u128 & 0x7FF) << 47
}

/// A+D quadword
pub(super) fn ad(id: u8, value: u64) -> u128 {
    value as u128 | (id as u128) << 64
}

/// One EOP packet of A+D writes
pub(super) fn ad_packet(writes: &[(u8, u64)]) -> Vec<u128> {
    let mut packet = vec![tag(writes.len() as u16, true, PACKED, &[0xE])];
    packet.extend(writes.iter().map(|&(id, value)| ad(id, value)));
    packet
}

/// PACKED RGBAQ quadword
pub(super) fn packed_rgbaq(r: u8, g: u8, b: u8, a: u8) -> u128 {
    r as u128 | (g as u128) << 32 | (b as u128) << 64 | (a as u128) << 96
}

/// PACKED XYZ2 quadword
pub(super) fn packed_xyz2(x: u16, y: u16, z: u32) -> u128 {
    x as u128 | (y as u128) << 32 | (z as u128) << 64
}

/// BITBLTBUF value
pub(super) fn bitbltbuf(sbp: u32, sbw: u32, spsm: u8, dbp: u32, dbw: u32, dpsm: u8) -> u64 {
    sbp as u64
        | (sbw as u64) << 16
        | (spsm as u64) << 24
        | (dbp as u64) << 32
        | (dbw as u64) << 48
        | (dpsm as u64) << 56
}

/// TRXPOS value
pub(super) fn trxpos(ssax: u16, ssay: u16, dsax: u16, dsay: u16, dir: u8) -> u64 {
    ssax as u64 | (ssay as u64) << 16 | (dsax as u64) << 32 | (dsay as u64) << 48 | (dir as u64) << 59
}

/// Program and arm a transfer through register writes
pub(super) fn start_transfer(gs: &mut GS, buf: u64, pos: u64, width: u16, height: u16, dir: u64) {
    gs.write_register(0x50, buf).unwrap();
    gs.write_register(0x51, pos).unwrap();
    gs.write_register(0x52, width as u64 | (height as u64) << 32)
        .unwrap();
    gs.write_register(0x53, dir).unwrap();
}

/// Pack pixels into the HWREG bit stream, least significant first
pub(super) fn pack_pixels(pixels: &[u32], depth: u32) -> Vec<u64> {
    let mut words = Vec::new();
    let mut acc = 0u128;
    let mut bits = 0;
    for &pixel in pixels {
        acc |= (pixel as u128) << bits;
        bits += depth;
        while bits >= 64 {
            words.push(acc as u64);
            acc >>= 64;
            bits -= 64;
        }
    }
    if bits > 0 {
        words.push(acc as u64);
    }
    words
}

/// Compare everything a snapshot captures except its timestamp
pub(super) fn assert_same_state(a: &GS, b: &GS) {
    let (sa, sb) = (a.snapshot(), b.snapshot());
    assert_eq!(sa.registers, sb.registers);
    assert_eq!(sa.packed_q, sb.packed_q);
    assert_eq!(sa.privileged, sb.privileged);
    assert_eq!(sa.csr_events, sb.csr_events);
    assert_eq!(sa.odd_field, sb.odd_field);
    assert_eq!(sa.gif_paths, sb.gif_paths);
    assert_eq!(sa.bus_owner, sb.bus_owner);
    assert_eq!(sa.vertex_queue, sb.vertex_queue);
    assert_eq!(sa.transfer, sb.transfer);
    assert!(sa.local_memory == sb.local_memory);
    assert_eq!(a.pending_vertices(), b.pending_vertices());
}
