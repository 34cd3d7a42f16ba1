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

//! Primitive assembler
//!
//! Every XYZ write commits a vertex built from the current RGBAQ, ST, UV and
//! FOG values. Once enough vertices for the current primitive type are
//! queued, a kicking write (XYZ2/XYZF2) emits a [`DrawCommand`]; a
//! non-kicking write (XYZ3/XYZF3) only advances the queue.
//!
//! | Primitive      | Vertices | Kept after a kick   |
//! |----------------|----------|---------------------|
//! | Point          | 1        | none                |
//! | Line           | 2        | none                |
//! | Line strip     | 2        | last                |
//! | Triangle       | 3        | none                |
//! | Triangle strip | 3        | last two            |
//! | Triangle fan   | 3        | first and last      |
//! | Sprite         | 2        | none                |

use super::{
    Context, ContextRegisters, Prim, PrimitiveType, RegisterFile, Rgbaq, St, Uv, Xyz, GS,
};
use serde::{Deserialize, Serialize};

/// Primitives held for the rasterizer before the oldest are dropped
pub const DRAW_QUEUE_CAPACITY: usize = 1 << 16;

/// One committed vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub xyz: Xyz,
    pub rgbaq: Rgbaq,
    pub st: St,
    pub uv: Uv,
    pub fog: u8,
}

impl Vertex {
    /// Capture the current vertex attributes
    fn capture(regs: &RegisterFile) -> Self {
        Self {
            xyz: regs.xyz,
            rgbaq: regs.rgbaq,
            st: regs.st,
            uv: regs.uv,
            fog: regs.fog,
        }
    }
}

/// An assembled primitive for the external rasterizer
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Attributes in effect (PRIM or PRMODE, per PRMODECONT)
    pub prim: Prim,
    /// Context the primitive draws with
    pub context: Context,
    /// Vertices in commit order
    pub vertices: Vec<Vertex>,
    /// The context's registers when the primitive was kicked
    pub environment: ContextRegisters,
}

impl GS {
    /// Commit a vertex and emit a primitive if one is complete
    ///
    /// # Arguments
    ///
    /// * `drawing` - true for XYZ2/XYZF2, false for XYZ3/XYZF3
    pub(in crate::core::gs) fn vertex_kick(&mut self, drawing: bool) {
        self.vertex_queue.push_back(Vertex::capture(&self.regs));
        self.stats.vertices_committed += 1;

        let attributes = self.regs.drawing_attributes();
        let prim_type = attributes.prim_type;
        if self.vertex_queue.len() < prim_type.vertex_count() {
            return;
        }

        if drawing && prim_type != PrimitiveType::Reserved {
            let context = attributes.context();
            let command = DrawCommand {
                prim: attributes,
                context,
                vertices: self.vertex_queue.iter().copied().collect(),
                environment: *self.regs.context(context),
            };
            log::trace!(
                "GS draw {:?} (context {:?}, {} vertices)",
                prim_type,
                context,
                command.vertices.len()
            );
            if self.draw_queue.len() == DRAW_QUEUE_CAPACITY {
                self.draw_queue.pop_front();
                self.stats.draws_dropped += 1;
                if self.stats.draws_dropped == 1 {
                    log::warn!(
                        "GS draw queue full ({} primitives), dropping the oldest",
                        DRAW_QUEUE_CAPACITY
                    );
                }
            }
            self.draw_queue.push_back(command);
            self.stats.primitives_drawn += 1;
        }

        match prim_type {
            PrimitiveType::LineStrip | PrimitiveType::TriangleStrip => {
                self.vertex_queue.pop_front();
            }
            PrimitiveType::TriangleFan => {
                self.vertex_queue.remove(1);
            }
            PrimitiveType::Point
            | PrimitiveType::Line
            | PrimitiveType::Triangle
            | PrimitiveType::Sprite
            | PrimitiveType::Reserved => self.vertex_queue.clear(),
        }
    }
}
