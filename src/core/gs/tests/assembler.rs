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

//! Primitive assembler tests

use super::super::*;

/// Set PRIM and commit `count` kicking vertices with x = 0, 1, 2, ...
fn kick_vertices(gs: &mut GS, prim: u64, count: u16) {
    gs.write_register(0x00, prim).unwrap();
    for x in 0..count {
        gs.write_register(0x05, x as u64).unwrap();
    }
}

fn vertex_xs(draw: &DrawCommand) -> Vec<u16> {
    draw.vertices.iter().map(|v| v.xyz.x).collect()
}

#[test]
fn test_vertex_counts() {
    let cases = [
        (PrimitiveType::Point, 1),
        (PrimitiveType::Line, 2),
        (PrimitiveType::LineStrip, 2),
        (PrimitiveType::Triangle, 3),
        (PrimitiveType::TriangleStrip, 3),
        (PrimitiveType::TriangleFan, 3),
        (PrimitiveType::Sprite, 2),
    ];

    for (prim_type, needed) in cases {
        let mut gs = GS::new();
        kick_vertices(&mut gs, prim_type.bits() as u64, needed - 1);
        assert!(
            gs.take_draw_commands().is_empty(),
            "{:?} drew early",
            prim_type
        );

        gs.write_register(0x05, 0).unwrap();
        let draws = gs.take_draw_commands();
        assert_eq!(draws.len(), 1, "{:?}", prim_type);
        assert_eq!(draws[0].vertices.len(), needed as usize);
    }
}

#[test]
fn test_triangle_list_consumes_all_vertices() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x3, 6);

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 2);
    assert_eq!(vertex_xs(&draws[0]), vec![0, 1, 2]);
    assert_eq!(vertex_xs(&draws[1]), vec![3, 4, 5]);
    assert_eq!(gs.pending_vertices(), 0);
}

#[test]
fn test_triangle_strip_keeps_last_two() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x4, 5);

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 3);
    assert_eq!(vertex_xs(&draws[0]), vec![0, 1, 2]);
    assert_eq!(vertex_xs(&draws[1]), vec![1, 2, 3]);
    assert_eq!(vertex_xs(&draws[2]), vec![2, 3, 4]);
    assert_eq!(gs.pending_vertices(), 2);
}

#[test]
fn test_triangle_fan_keeps_first_and_last() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x5, 5);

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 3);
    assert_eq!(vertex_xs(&draws[0]), vec![0, 1, 2]);
    assert_eq!(vertex_xs(&draws[1]), vec![0, 2, 3]);
    assert_eq!(vertex_xs(&draws[2]), vec![0, 3, 4]);
}

#[test]
fn test_line_strip_keeps_last() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x2, 4);

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 3);
    assert_eq!(vertex_xs(&draws[2]), vec![2, 3]);
    assert_eq!(gs.pending_vertices(), 1);
}

#[test]
fn test_xyz3_advances_without_drawing() {
    let mut gs = GS::new();
    gs.write_register(0x00, 0x4).unwrap(); // triangle strip
    gs.write_register(0x0D, 0).unwrap();
    gs.write_register(0x0D, 1).unwrap();
    gs.write_register(0x0D, 2).unwrap();
    assert!(gs.take_draw_commands().is_empty());

    // The oldest vertex was dropped; the next kick draws 1, 2, 3
    gs.write_register(0x05, 3).unwrap();
    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), 1);
    assert_eq!(vertex_xs(&draws[0]), vec![1, 2, 3]);
}

#[test]
fn test_prim_write_clears_vertex_queue() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x3, 2);
    assert_eq!(gs.pending_vertices(), 2);

    gs.write_register(0x00, 0x3).unwrap();
    assert_eq!(gs.pending_vertices(), 0);

    gs.write_register(0x05, 0).unwrap();
    assert!(gs.take_draw_commands().is_empty());
}

#[test]
fn test_reserved_type_never_draws() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x7, 4);

    assert!(gs.take_draw_commands().is_empty());
    assert_eq!(gs.stats().vertices_committed, 4);
    assert_eq!(gs.pending_vertices(), 0);
}

#[test]
fn test_vertex_captures_current_attributes() {
    let mut gs = GS::new();
    gs.write_register(0x00, 0x0).unwrap();
    gs.write_register(0x01, 0x3F80_0000_8011_2233).unwrap(); // RGBAQ, Q=1.0
    gs.write_register(0x03, 0x0020_0010).unwrap(); // UV
    gs.write_register(0x04, 0x5500_0001_0002_0003).unwrap(); // XYZF2

    let draws = gs.take_draw_commands();
    let vertex = draws[0].vertices[0];
    assert_eq!(
        (vertex.rgbaq.r, vertex.rgbaq.g, vertex.rgbaq.b, vertex.rgbaq.a),
        (0x33, 0x22, 0x11, 0x80)
    );
    assert_eq!(vertex.rgbaq.q, 1.0);
    assert_eq!((vertex.uv.u, vertex.uv.v), (0x10, 0x20));
    assert_eq!((vertex.xyz.x, vertex.xyz.y, vertex.xyz.z), (3, 2, 1));
    assert_eq!(vertex.fog, 0x55);
}

#[test]
fn test_draw_carries_active_context_environment() {
    let mut gs = GS::new();
    gs.write_register(0x4C, 0x0A_0000).unwrap(); // FRAME_1
    gs.write_register(0x4D, 0x0A_0040).unwrap(); // FRAME_2
    gs.write_register(0x19, 0x8000_0000_8000).unwrap(); // XYOFFSET_2

    kick_vertices(&mut gs, 0x200 | 0x6, 2); // sprite, context 2

    let draws = gs.take_draw_commands();
    assert_eq!(draws[0].context, Context::Two);
    assert_eq!(draws[0].environment.frame.base_pointer, 0x40);
    assert_eq!(draws[0].environment.xyoffset.x, 0x8000);
}

#[test]
fn test_environment_is_snapshot_at_kick() {
    let mut gs = GS::new();
    kick_vertices(&mut gs, 0x0, 1);
    gs.write_register(0x4C, 0x20).unwrap();

    let draws = gs.take_draw_commands();
    assert_eq!(draws[0].environment.frame.base_pointer, 0);
}

#[test]
fn test_prmode_supplies_attributes_when_ac_clear() {
    let mut gs = GS::new();
    gs.write_register(0x1A, 0).unwrap(); // PRMODECONT.AC = 0
    gs.write_register(0x1B, 0x200 | 0x10).unwrap(); // PRMODE: context 2, TME
    gs.write_register(0x00, 0x0).unwrap(); // PRIM: point, context 1

    gs.write_register(0x05, 0).unwrap();
    let draws = gs.take_draw_commands();
    assert_eq!(draws[0].context, Context::Two);
    assert!(draws[0].prim.texture_mapping);
    assert_eq!(draws[0].prim.prim_type, PrimitiveType::Point);
}

#[test]
fn test_undrained_draw_queue_drops_oldest() {
    let mut gs = GS::new();
    gs.write_register(0x00, 0x0).unwrap(); // point
    for x in 0..DRAW_QUEUE_CAPACITY as u64 + 5 {
        gs.write_register(0x05, x & 0xFFFF).unwrap();
    }

    assert_eq!(gs.stats().draws_dropped, 5);
    assert_eq!(gs.stats().primitives_drawn, DRAW_QUEUE_CAPACITY as u64 + 5);

    let draws = gs.take_draw_commands();
    assert_eq!(draws.len(), DRAW_QUEUE_CAPACITY);
    assert_eq!(draws[0].vertices[0].xyz.x, 5);
    assert!(gs.take_draw_commands().is_empty());
}
