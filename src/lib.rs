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

//! PlayStation 2 Graphics Synthesizer core library
//!
//! This library models the GS at register level: it decodes GIF packets,
//! maintains both rendering contexts, assembles primitives for an external
//! rasterizer and owns the chip's 4 MiB local memory with its swizzled pixel
//! formats and BITBLT transfer engine.
//!
//! # Example
//!
//! ```
//! use gsrx::core::{GifPath, GS};
//!
//! let mut gs = GS::new();
//!
//! // One EOP tag, PACKED, NLOOP=1, one A+D descriptor: FINISH
//! let tag: u128 = (0xEu128 << 64) | (1u128 << 60) | (1 << 15) | 1;
//! let finish: u128 = 0x61u128 << 64;
//! gs.feed_packet(GifPath::Path3, &[tag, finish]).unwrap();
//!
//! // CSR.FINISH is set
//! assert_eq!(gs.read32(0x1200_1000).unwrap() & 0x2, 0x2);
//! ```

pub mod core;
