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

//! Snapshot and save state tests

use super::super::*;
use super::*;
use crate::core::error::{EmulatorError, GifPath};
use crate::core::save_state::{GsSnapshot, SAVE_STATE_VERSION};

/// A GS in the middle of everything: a packet half sent, an upload half
/// done, display configured and events pending
fn busy_gs() -> GS {
    let mut gs = GS::new();
    gs.write64(0x1200_0000, 0x1).unwrap();
    gs.write64(0x1200_0070, 0x20 | 10 << 9).unwrap();
    gs.write64(0x1200_1010, 0x1D << 8).unwrap();
    gs.write_register(0x61, 0).unwrap();
    gs.vblank_start();

    let buf = bitbltbuf(0, 0, 0, 0x100, 1, 0x00);
    start_transfer(&mut gs, buf, trxpos(0, 0, 0, 0, 0), 8, 1, 0);
    gs.write_hwreg(0x0000_0002_0000_0001).unwrap();

    let packet = [
        tag(1, true, PACKED, &[0x1, 0x2, 0x5]),
        packed_rgbaq(10, 20, 30, 40),
        (0x4000_0000u128 << 64) | 0x3F80_0000 | (0x3F80_0000u128 << 32),
    ];
    gs.feed_packet(GifPath::Path2, &packet).unwrap_err();
    gs
}

#[test]
fn test_snapshot_restore_round_trip() {
    let original = busy_gs();
    let snapshot = original.snapshot();

    let mut restored = GS::new();
    restored.restore(&snapshot).unwrap();

    assert_same_state(&original, &restored);
    assert_eq!(restored.bus_owner(), Some(GifPath::Path2));
    assert_eq!(restored.gif_cursor(GifPath::Path2).data_left, 1);
    assert!(restored.interrupt_pending());
    assert_eq!(restored.privileged().dispfb[0].base_pointer, 0x20);
}

#[test]
fn test_restored_gs_continues_identically() {
    let mut original = busy_gs();
    let mut restored = GS::new();
    restored.restore(&original.snapshot()).unwrap();

    // The Path2 packet still owns the bus and resumes on the XYZ2 slot
    for gs in [&mut original, &mut restored] {
        gs.feed_path(GifPath::Path2, packed_xyz2(0x100, 0x200, 5))
            .unwrap();
        for _ in 0..3 {
            gs.write_hwreg(0xAAAA_AAAA_5555_5555).unwrap();
        }
    }

    assert_same_state(&original, &restored);
    assert_eq!(restored.bus_owner(), None);
    assert!(!restored.transfer_state().active);
    assert_eq!(
        restored
            .local_memory()
            .read_pixel(PixelFormat::Psmct32, 0x100, 1, 7, 0),
        0xAAAA_AAAA
    );
}

#[test]
fn test_snapshot_skips_trigger_registers() {
    let snapshot = busy_gs().snapshot();

    let ids: Vec<u8> = snapshot.registers.iter().map(|&(id, _)| id).collect();
    for trigger in [0x54, 0x60, 0x61, 0x62, 0x3F] {
        assert!(!ids.contains(&trigger), "0x{:02X} captured", trigger);
    }
    assert!(ids.contains(&0x4C));
    assert!(ids.contains(&0x4D));
    assert!(!snapshot
        .privileged
        .iter()
        .any(|&(addr, _)| addr == 0x1200_1000));
}

#[test]
fn test_snapshot_bytes_round_trip() {
    let mut snapshot = busy_gs().snapshot();
    snapshot.metadata.label = "busy".to_string();
    snapshot.metadata.frame_count = 42;

    let decoded = GsSnapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();

    assert_eq!(decoded.version, SAVE_STATE_VERSION);
    assert_eq!(decoded.metadata.label, "busy");
    assert_eq!(decoded.metadata.frame_count, 42);
    assert_eq!(decoded.metadata.timestamp, snapshot.metadata.timestamp);
    assert_eq!(decoded.registers, snapshot.registers);
    assert_eq!(decoded.gif_paths, snapshot.gif_paths);
    assert_eq!(decoded.transfer, snapshot.transfer);
    assert!(decoded.local_memory == snapshot.local_memory);
}

#[test]
fn test_snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gs.state");

    let original = busy_gs();
    original.snapshot().save_to_file(&path).unwrap();

    let loaded = GsSnapshot::load_from_file(&path).unwrap();
    let mut restored = GS::new();
    restored.restore(&loaded).unwrap();

    assert_same_state(&original, &restored);
}

#[test]
fn test_version_mismatch_is_rejected() {
    let mut snapshot = GS::new().snapshot();
    snapshot.version = SAVE_STATE_VERSION + 1;
    let bytes = snapshot.to_bytes().unwrap();

    match GsSnapshot::from_bytes(&bytes) {
        Err(EmulatorError::SaveState(msg)) => assert!(msg.contains("version")),
        other => panic!("expected a version error, got {:?}", other.map(|s| s.version)),
    }
}

#[test]
fn test_garbage_bytes_are_rejected() {
    assert!(matches!(
        GsSnapshot::from_bytes(&[0xFF, 0x01]),
        Err(EmulatorError::SaveState(_))
    ));
}

#[test]
fn test_restore_rejects_bad_snapshot_without_changes() {
    let mut gs = busy_gs();
    let before = gs.snapshot();

    let mut short_memory = before.clone();
    short_memory.local_memory.truncate(16);
    assert!(matches!(
        gs.restore(&short_memory),
        Err(EmulatorError::SaveState(_))
    ));

    let mut unknown_register = before.clone();
    unknown_register.registers.push((0x0B, 0));
    assert!(gs.restore(&unknown_register).is_err());

    let mut unknown_privileged = before.clone();
    unknown_privileged.privileged.push((0x1200_0008, 0));
    assert!(gs.restore(&unknown_privileged).is_err());

    let after = gs.snapshot();
    assert_eq!(after.registers, before.registers);
    assert_eq!(after.gif_paths, before.gif_paths);
    assert_eq!(gs.bus_owner(), Some(GifPath::Path2));
}

#[test]
fn test_restored_gs_finishes_a_half_sent_triangle() {
    let mut original = GS::new();
    original.write_register(0x00, 0x3).unwrap(); // triangle
    original.write_register(0x05, 0x10).unwrap();
    original.write_register(0x05, 0x20).unwrap();

    let snapshot = original.snapshot();
    assert_eq!(snapshot.vertex_queue.len(), 2);

    let mut restored = GS::new();
    restored.restore(&snapshot).unwrap();
    assert_eq!(restored.pending_vertices(), 2);

    for gs in [&mut original, &mut restored] {
        gs.write_register(0x05, 0x30).unwrap();
    }

    let drawn = original.take_draw_commands();
    assert_eq!(drawn.len(), 1);
    assert_eq!(restored.take_draw_commands(), drawn);
    assert_same_state(&original, &restored);
}

#[test]
fn test_restored_strip_keeps_its_last_two_vertices() {
    let mut original = GS::new();
    original.write_register(0x00, 0x4).unwrap(); // triangle strip
    for x in [1u64, 2, 3] {
        original.write_register(0x05, x).unwrap();
    }
    original.take_draw_commands();

    let mut restored = GS::new();
    restored.restore(&original.snapshot()).unwrap();
    restored.write_register(0x05, 4).unwrap();

    let drawn = restored.take_draw_commands();
    assert_eq!(drawn.len(), 1);
    let xs: Vec<u16> = drawn[0].vertices.iter().map(|v| v.xyz.x).collect();
    assert_eq!(xs, vec![2, 3, 4]);
}

/// Restore `snapshot` into `gs`, expect a save-state error and no change
fn assert_rejected(gs: &mut GS, snapshot: &GsSnapshot) {
    let before = gs.snapshot();
    assert!(matches!(
        gs.restore(snapshot),
        Err(EmulatorError::SaveState(_))
    ));
    let mut unchanged = GS::new();
    unchanged.restore(&before).unwrap();
    assert_same_state(gs, &unchanged);
}

#[test]
fn test_restore_rejects_impossible_gif_cursors() {
    let mut gs = busy_gs();
    let good = gs.snapshot();

    let mut no_regs_left = good.clone();
    no_regs_left.gif_paths[GifPath::Path2.index()].regs_left = 0;
    assert_rejected(&mut gs, &no_regs_left);

    let mut no_registers = good.clone();
    no_registers.gif_paths[GifPath::Path2.index()].tag.reg_count = 0;
    assert_rejected(&mut gs, &no_registers);

    let mut no_payload = good.clone();
    no_payload.gif_paths[GifPath::Path2.index()].data_left = 0;
    assert_rejected(&mut gs, &no_payload);

    let mut orphaned = good.clone();
    orphaned.bus_owner = None;
    assert_rejected(&mut gs, &orphaned);

    let mut wrong_owner = good.clone();
    wrong_owner.bus_owner = Some(GifPath::Path3);
    assert_rejected(&mut gs, &wrong_owner);

    // Still resumes where it was
    gs.feed_path(GifPath::Path2, packed_xyz2(1, 2, 3)).unwrap();
    assert_eq!(gs.bus_owner(), None);
}

#[test]
fn test_restore_rejects_impossible_transfers() {
    let mut gs = busy_gs();
    let good = gs.snapshot();
    assert!(good.transfer.active);

    let mut wide_pixels = good.clone();
    wide_pixels.transfer.transfer_bit_depth = 128;
    assert_rejected(&mut gs, &wide_pixels);

    let mut no_pixels = good.clone();
    no_pixels.transfer.transfer_bit_depth = 0;
    assert_rejected(&mut gs, &no_pixels);

    let mut overrun = good.clone();
    overrun.transfer.pixels_transferred = overrun.transfer.total_pixels;
    assert_rejected(&mut gs, &overrun);

    let mut local_copy = good.clone();
    local_copy.transfer.direction = TransferDirection::LocalToLocal;
    assert_rejected(&mut gs, &local_copy);

    assert_eq!(gs.transfer_state().pixels_remaining(), 6);
}

#[test]
fn test_restore_rejects_overfull_vertex_queue() {
    let mut gs = GS::new();
    gs.write_register(0x00, 0x3).unwrap();
    gs.write_register(0x05, 1).unwrap();
    gs.write_register(0x05, 2).unwrap();

    let mut snapshot = gs.snapshot();
    snapshot.vertex_queue.push(snapshot.vertex_queue[0]);
    assert_rejected(&mut gs, &snapshot);
    assert_eq!(gs.pending_vertices(), 2);
}
