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

mod common;

use common::assertions::{assert_bus_idle, assert_csr_bit, assert_pixel};
use common::fixtures::{
    ad_packet, display_setup, gif_tag, gif_tag_with_prim, image_upload, packed_rgbaq,
    packed_xyz2, PACKED,
};
use gsrx::core::error::Result;
use gsrx::core::gs::{Context, GifState, PixelFormat, PrimitiveType};
use gsrx::core::{GifPath, GsConfig, GsError, GsSnapshot, GS};

#[test]
fn test_basic_initialization() -> Result<()> {
    let gs = GS::new();
    assert_eq!(gs.stats().tags_decoded, 0);
    for path in GifPath::ALL {
        assert_eq!(gs.gif_state(path), GifState::AwaitingTag);
    }
    assert_bus_idle(&gs);
    Ok(())
}

#[test]
fn test_gs_reset() {
    let mut gs = GS::new();
    gs.feed_packet(GifPath::Path3, &ad_packet(&[(0x4C, 0x0A_0004), (0x61, 0)]))
        .unwrap();
    gs.reset();

    assert_eq!(gs.registers().context(Context::One).frame.base_pointer, 0);
    assert_eq!(gs.read32(0x1200_1000).unwrap() & 0x2, 0);
}

#[test]
fn test_upload_and_display_frame() -> Result<()> {
    let mut gs = GS::new();
    let pixels: Vec<u32> = (0..64 * 32).map(|i| 0x0010_0000 | i).collect();

    let packet = image_upload(PixelFormat::Psmct32, 0, 1, (0, 0), (64, 32), &pixels);
    gs.feed_packet(GifPath::Path3, &packet)?;
    assert_bus_idle(&gs);
    assert_eq!(gs.stats().pixels_transferred, 64 * 32);
    assert_pixel(&gs, PixelFormat::Psmct32, 0, 1, 63, 31, 0x0010_07FF);

    for (addr, value) in display_setup(0, 1, 64, 32) {
        gs.write64(addr, value)?;
    }
    assert_eq!(gs.inner_resolution(), (64, 32));

    let frame = gs.framebuffer();
    for (i, &pixel) in frame.iter().enumerate() {
        assert_eq!(pixel, 0xFF00_0000 | pixels[i], "pixel {}", i);
    }
    Ok(())
}

#[test]
fn test_indexed_upload_through_image_packet() -> Result<()> {
    let mut gs = GS::new();
    let pixels: Vec<u32> = (0..32 * 8).map(|i| i % 16).collect();

    let packet = image_upload(PixelFormat::Psmt4, 0x200, 2, (32, 16), (32, 8), &pixels);
    gs.feed_packet(GifPath::Path2, &packet)?;

    for y in 0..8 {
        for x in 0..32 {
            assert_pixel(&gs, PixelFormat::Psmt4, 0x200, 2, 32 + x, 16 + y, (y * 32 + x) % 16);
        }
    }
    Ok(())
}

#[test]
fn test_triangle_strip_draws() -> Result<()> {
    let mut gs = GS::new();
    gs.feed_packet(GifPath::Path3, &ad_packet(&[(0x4C, 0x0A_0008)]))?;

    // PRE selects a Gouraud triangle strip; RGBAQ + XYZ2 per vertex
    let mut packet = vec![gif_tag_with_prim(
        4,
        true,
        PACKED,
        &[0x1, 0x5],
        PrimitiveType::TriangleStrip.bits() as u16 | 0x8,
    )];
    for i in 0..4u16 {
        packet.push(packed_rgbaq(i as u8 * 60, 0, 0, 0x80));
        packet.push(packed_xyz2(i * 16, (i % 2) * 16, 0));
    }
    gs.feed_packet(GifPath::Path3, &packet)?;

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 2);
    assert!(draws.iter().all(|d| d.prim.gouraud_shading));
    assert_eq!(draws[1].vertices[2].rgbaq.r, 180);
    assert_eq!(draws[1].environment.frame.base_pointer, 8);
    assert!(gs.take_draw_commands().is_empty());
    Ok(())
}

#[test]
fn test_paths_arbitrate_the_bus() {
    let mut gs = GS::new();
    let path1 = [
        gif_tag(1, false, PACKED, &[0xE]),
        0x0A_0001u128 | 0x4Cu128 << 64,
        gif_tag(1, true, PACKED, &[0xE]),
        0x0A_0002u128 | 0x4Cu128 << 64,
    ];

    gs.feed_path(GifPath::Path1, path1[0]).unwrap();
    gs.feed_path(GifPath::Path1, path1[1]).unwrap();

    // Path1 has not reached its EOP tag yet
    let packet = ad_packet(&[(0x4C, 0x0A_0003)]);
    assert_eq!(
        gs.feed_packet(GifPath::Path3, &packet),
        Err(GsError::PathBusy {
            requested: GifPath::Path3,
            owner: GifPath::Path1,
        })
    );

    gs.feed_packet(GifPath::Path1, &path1[2..]).unwrap();
    assert_bus_idle(&gs);
    gs.feed_packet(GifPath::Path3, &packet).unwrap();

    assert_eq!(
        gs.registers().context(Context::One).frame.base_pointer,
        3
    );
}

#[test]
fn test_finish_and_signal_events() {
    let mut gs = GS::new();
    gs.write64(0x1200_1010, 0).unwrap(); // unmask everything

    gs.feed_packet(
        GifPath::Path3,
        &ad_packet(&[(0x60, 0xFFFF_FFFF_0000_00A5), (0x61, 0)]),
    )
    .unwrap();

    assert_csr_bit(&gs, 0);
    assert_csr_bit(&gs, 1);
    assert!(gs.interrupt_pending());
    assert_eq!(gs.read32(0x1200_1080).unwrap(), 0xA5);

    gs.write32(0x1200_1000, 0x3).unwrap();
    assert!(!gs.interrupt_pending());
}

#[test]
fn test_download_through_hwreg() -> Result<()> {
    let mut gs = GS::new();
    let pixels: Vec<u32> = (0..16).map(|i| 0xA000 | i).collect();
    let packet = image_upload(PixelFormat::Psmct16, 0x40, 1, (0, 0), (16, 1), &pixels);
    gs.feed_packet(GifPath::Path3, &packet)?;

    let bitbltbuf = 0x40 | 1 << 16 | 0x02 << 24;
    gs.feed_packet(
        GifPath::Path3,
        &ad_packet(&[(0x50, bitbltbuf), (0x51, 0), (0x52, 16 | 1 << 32), (0x53, 1)]),
    )?;

    let mut words = Vec::new();
    for _ in 0..4 {
        words.push(gs.read_hwreg()?);
    }
    assert_eq!(words[0], 0xA003_A002_A001_A000);
    assert_eq!(words[3], 0xA00F_A00E_A00D_A00C);
    assert_eq!(gs.read_hwreg(), Err(GsError::NoActiveTransfer));
    Ok(())
}

#[test]
fn test_save_state_mid_packet() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mid_packet.state");

    let mut gs = GS::new();
    let packet = [
        gif_tag(3, true, PACKED, &[0x5]),
        packed_xyz2(1, 1, 0),
        packed_xyz2(2, 2, 0),
        packed_xyz2(3, 3, 0),
    ];
    assert!(gs.feed_packet(GifPath::Path2, &packet[..2]).is_err());
    gs.snapshot().save_to_file(&path)?;

    let mut restored = GS::new();
    restored.restore(&GsSnapshot::load_from_file(&path)?)?;
    assert_eq!(restored.bus_owner(), Some(GifPath::Path2));

    restored.feed_packet(GifPath::Path2, &packet[2..])?;
    assert_bus_idle(&restored);
    assert_eq!(restored.registers().xyz.x, 3);
    Ok(())
}

#[test]
fn test_lenient_config_drops_unknown_registers() -> Result<()> {
    let config = GsConfig::from_toml_str("strict_registers = false")?;
    let mut gs = GS::with_config(config);

    gs.feed_packet(GifPath::Path3, &ad_packet(&[(0x7F, 1), (0x4C, 0x0A_0005)]))?;
    assert_eq!(gs.registers().context(Context::One).frame.base_pointer, 5);

    let mut strict = GS::new();
    assert_eq!(
        strict.feed_packet(GifPath::Path3, &ad_packet(&[(0x7F, 1), (0x4C, 0x0A_0005)])),
        Err(GsError::UnknownRegister { id: 0x7F })
    );
    Ok(())
}
