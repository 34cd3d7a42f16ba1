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

//! Custom assertions for GS testing

use gsrx::core::gs::PixelFormat;
use gsrx::core::GS;

/// Assert a pixel in local memory has the expected value
#[allow(dead_code)]
pub fn assert_pixel(
    gs: &GS,
    format: PixelFormat,
    base: u32,
    width: u32,
    x: u32,
    y: u32,
    expected: u32,
) {
    let actual = gs.local_memory().read_pixel(format, base, width, x, y);
    assert_eq!(
        actual, expected,
        "{:?} pixel ({}, {}) mismatch: expected 0x{:08X}, got 0x{:08X}",
        format, x, y, expected, actual
    );
}

/// Assert a CSR bit is set
#[allow(dead_code)]
pub fn assert_csr_bit(gs: &GS, bit: u32) {
    let csr = gs.read32(0x1200_1000).expect("CSR is mapped");
    assert_ne!(csr & (1 << bit), 0, "CSR bit {} clear (CSR=0x{:08X})", bit, csr);
}

/// Assert no GIF path owns the bus
#[allow(dead_code)]
pub fn assert_bus_idle(gs: &GS) {
    assert_eq!(gs.bus_owner(), None, "GS bus still owned");
}
