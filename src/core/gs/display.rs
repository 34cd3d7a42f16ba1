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

//! Display read-out
//!
//! The two read circuits scan a rectangle of local memory described by
//! DISPFB1/2 and size it with DISPLAY1/2. PMODE enables them; when both are
//! enabled circuit 1 is shown. Merging and background blending are left to
//! the presentation layer.

use super::{Circuit, PixelFormat, GS};

/// Resolution reported before DISPLAY is programmed
const DEFAULT_RESOLUTION: (u32, u32) = (640, 448);

/// Opaque black in RGBA8888
const BLACK: u32 = 0xFF00_0000;

impl GS {
    /// Displayed image as RGBA8888 words (R in the low byte)
    ///
    /// Reads the enabled circuit's frame buffer at its DISPFB offset. The
    /// image has [`GS::inner_resolution`] pixels in row-major order; if no
    /// circuit is enabled it is all black. Alpha is always opaque.
    pub fn framebuffer(&self) -> Vec<u32> {
        let (width, height) = self.inner_resolution();
        let Some(circuit) = self.privileged.displayed_circuit() else {
            return vec![BLACK; (width * height) as usize];
        };

        let dispfb = self.privileged.dispfb[circuit.index()];
        let base = dispfb.base_pointer * 32;
        let mut pixels = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let raw = self.local_mem.read_pixel(
                    dispfb.format,
                    base,
                    dispfb.width,
                    dispfb.x + x,
                    dispfb.y + y,
                );
                pixels.push(to_rgba8888(dispfb.format, raw));
            }
        }
        pixels
    }

    /// Frame buffer pixels the displayed circuit reads per frame
    ///
    /// DISPLAY width and height divided by the magnification factors, with
    /// the height halved in interlaced field mode (FFMD).
    pub fn inner_resolution(&self) -> (u32, u32) {
        let display = self.privileged.display[self.resolution_circuit().index()];
        if !display.is_configured() {
            return DEFAULT_RESOLUTION;
        }

        let width = (display.width + 1) / (display.magnify_h + 1);
        let mut height = (display.height + 1) / (display.magnify_v + 1);

        let smode2 = self.privileged.smode2;
        if smode2.interlaced && smode2.frame_mode {
            height /= 2;
        }
        (width.max(1), height.max(1))
    }

    /// Output resolution of the displayed circuit
    ///
    /// DISPLAY width is in video clock units (four per pixel).
    pub fn display_resolution(&self) -> (u32, u32) {
        let display = self.privileged.display[self.resolution_circuit().index()];
        if !display.is_configured() {
            return DEFAULT_RESOLUTION;
        }

        (((display.width + 1) / 4).max(1), display.height + 1)
    }

    fn resolution_circuit(&self) -> Circuit {
        self.privileged.displayed_circuit().unwrap_or(Circuit::One)
    }
}

/// Expand a stored pixel to RGBA8888 with opaque alpha
fn to_rgba8888(format: PixelFormat, raw: u32) -> u32 {
    match format {
        PixelFormat::Psmct32
        | PixelFormat::Psmct24
        | PixelFormat::Psmz32
        | PixelFormat::Psmz24 => (raw & 0x00FF_FFFF) | BLACK,
        PixelFormat::Psmct16
        | PixelFormat::Psmct16s
        | PixelFormat::Psmz16
        | PixelFormat::Psmz16s => {
            let r = (raw & 0x1F) << 3;
            let g = ((raw >> 5) & 0x1F) << 3;
            let b = ((raw >> 10) & 0x1F) << 3;
            r | g << 8 | b << 16 | BLACK
        }
        // Indexed formats show the index as a gray level
        PixelFormat::Psmt8 | PixelFormat::Psmt8h => {
            let level = raw & 0xFF;
            level * 0x0001_0101 | BLACK
        }
        PixelFormat::Psmt4 | PixelFormat::Psmt4hl | PixelFormat::Psmt4hh => {
            let level = (raw & 0xF) * 0x11;
            level * 0x0001_0101 | BLACK
        }
    }
}
