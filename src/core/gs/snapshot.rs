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

//! Capturing and restoring GS save states

use super::{
    GifCursor, GifState, GsEvents, GsRegister, PrivilegedRegister, TransferDirection,
    TransferState, GS,
};
use crate::core::error::{EmulatorError, GifPath, Result};
use crate::core::save_state::{GsSnapshot, SnapshotMetadata, SAVE_STATE_VERSION};

/// Most vertices the assembler holds between writes
const MAX_QUEUED_VERTICES: usize = 2;

impl GS {
    /// Capture the complete GS state
    ///
    /// Undrained draw commands are not part of a snapshot.
    pub fn snapshot(&self) -> GsSnapshot {
        let registers = (0..=u8::MAX)
            .filter_map(GsRegister::from_id)
            .filter_map(|reg| self.regs.load(reg).map(|value| (reg.id(), value)))
            .collect();

        let privileged = PrivilegedRegister::ALL
            .iter()
            .filter(|&&reg| reg != PrivilegedRegister::Csr)
            .map(|&reg| (reg.addr(), self.privileged.read(reg)))
            .collect();

        GsSnapshot {
            version: SAVE_STATE_VERSION,
            metadata: SnapshotMetadata::default(),
            registers,
            packed_q: self.regs.packed_q,
            privileged,
            csr_events: self.privileged.events.bits(),
            odd_field: self.privileged.odd_field,
            gif_paths: self.paths,
            bus_owner: self.bus_owner,
            vertex_queue: self.vertex_queue.iter().copied().collect(),
            transfer: self.transfer,
            local_memory: self.local_mem.words().to_vec(),
        }
    }

    /// Restore a state captured by [`GS::snapshot`]
    ///
    /// The draw queue is emptied. Configuration and statistics are kept.
    ///
    /// # Errors
    ///
    /// Returns [`EmulatorError::SaveState`] if the snapshot names unknown
    /// registers, has the wrong amount of local memory, or holds decoder,
    /// assembler or transfer progress the GS could never reach. The GS is
    /// left unchanged in that case.
    pub fn restore(&mut self, snapshot: &GsSnapshot) -> Result<()> {
        let mut registers = Vec::with_capacity(snapshot.registers.len());
        for &(id, value) in &snapshot.registers {
            let reg = GsRegister::from_id(id).ok_or_else(|| {
                EmulatorError::SaveState(format!("Unknown GS register 0x{:02X}", id))
            })?;
            registers.push((reg, value));
        }

        let mut privileged = Vec::with_capacity(snapshot.privileged.len());
        for &(addr, value) in &snapshot.privileged {
            let reg = PrivilegedRegister::from_addr(addr).ok_or_else(|| {
                EmulatorError::SaveState(format!("Unknown privileged register 0x{:08X}", addr))
            })?;
            privileged.push((reg, value));
        }

        if snapshot.local_memory.len() != self.local_mem.words().len() {
            return Err(EmulatorError::SaveState(format!(
                "Local memory size mismatch: expected {} words, got {}",
                self.local_mem.words().len(),
                snapshot.local_memory.len()
            )));
        }

        check_gif_paths(&snapshot.gif_paths, snapshot.bus_owner)?;
        check_transfer(&snapshot.transfer)?;
        if snapshot.vertex_queue.len() > MAX_QUEUED_VERTICES {
            return Err(EmulatorError::SaveState(format!(
                "{} queued vertices (at most {} expected)",
                snapshot.vertex_queue.len(),
                MAX_QUEUED_VERTICES
            )));
        }

        self.reset_state_preserving_memory();
        self.local_mem.load_words(&snapshot.local_memory);

        for (reg, value) in registers {
            self.regs.store(reg, value);
        }
        self.regs.packed_q = snapshot.packed_q;

        for (reg, value) in privileged {
            // CSR is excluded when capturing, so no write here can reset
            self.privileged.write(reg, value);
        }
        self.privileged.events = GsEvents::from_bits_truncate(snapshot.csr_events);
        self.privileged.odd_field = snapshot.odd_field;

        self.paths = snapshot.gif_paths;
        self.bus_owner = snapshot.bus_owner;
        self.vertex_queue.extend(snapshot.vertex_queue.iter().copied());
        self.transfer = snapshot.transfer;

        log::info!(
            "GS state restored (saved {})",
            snapshot.metadata.timestamp.to_rfc3339()
        );
        Ok(())
    }
}

/// Every path mid-tag must own the bus, and its cursor must point inside
/// its tag
fn check_gif_paths(paths: &[GifCursor; 3], bus_owner: Option<GifPath>) -> Result<()> {
    for path in GifPath::ALL {
        let cursor = &paths[path.index()];
        if cursor.state != GifState::Processing {
            continue;
        }

        if bus_owner != Some(path) {
            return Err(EmulatorError::SaveState(format!(
                "{} is mid-tag but does not own the bus",
                path
            )));
        }

        let reg_count = cursor.tag.reg_count;
        if !(1..=16).contains(&reg_count)
            || !(1..=reg_count).contains(&cursor.regs_left)
            || cursor.data_left == 0
            || cursor.data_left > cursor.tag.payload_units()
        {
            return Err(EmulatorError::SaveState(format!(
                "{} cursor out of range: NREG={} regs_left={} data_left={}",
                path, reg_count, cursor.regs_left, cursor.data_left
            )));
        }
    }
    Ok(())
}

fn check_transfer(transfer: &TransferState) -> Result<()> {
    if !transfer.active {
        // Only a finished download may still hold bits to drain
        if transfer.bit_count >= 64 {
            return Err(EmulatorError::SaveState(format!(
                "Inactive transfer holds {} buffered bits",
                transfer.bit_count
            )));
        }
        return Ok(());
    }

    let host_transfer = matches!(
        transfer.direction,
        TransferDirection::HostToLocal | TransferDirection::LocalToHost
    );
    let valid = host_transfer
        && matches!(transfer.transfer_bit_depth, 4 | 8 | 16 | 24 | 32)
        && transfer.pixels_transferred < transfer.total_pixels
        && transfer.x < transfer.width
        && transfer.bit_count < transfer.transfer_bit_depth;

    if !valid {
        return Err(EmulatorError::SaveState(format!(
            "Inconsistent {:?} transfer: depth={} pixels={}/{} x={} width={} buffered={}",
            transfer.direction,
            transfer.transfer_bit_depth,
            transfer.pixels_transferred,
            transfer.total_pixels,
            transfer.x,
            transfer.width,
            transfer.bit_count
        )));
    }
    Ok(())
}
