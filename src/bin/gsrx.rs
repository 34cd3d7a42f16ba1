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

use clap::{Parser, ValueEnum};
use gsrx::core::error::{EmulatorError, Result};
use gsrx::core::gs::GsStats;
use gsrx::core::save_state::GsSnapshot;
use gsrx::core::{GifPath, GsConfig, GS};
use log::{error, info, warn};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// GIF path selector for the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PathArg {
    #[value(name = "1")]
    Path1,
    #[value(name = "2")]
    Path2,
    #[value(name = "3")]
    Path3,
}

impl From<PathArg> for GifPath {
    fn from(arg: PathArg) -> Self {
        match arg {
            PathArg::Path1 => GifPath::Path1,
            PathArg::Path2 => GifPath::Path2,
            PathArg::Path3 => GifPath::Path3,
        }
    }
}

/// PlayStation 2 GS packet replayer
#[derive(Parser)]
#[command(name = "gsrx")]
#[command(about = "Replay GIF packet dumps through the GS core", long_about = None)]
struct Args {
    /// GIF dump: little-endian 128-bit quadwords
    dump: PathBuf,

    /// GIF path the dump was captured on
    #[arg(short = 'p', long, value_enum, default_value = "3")]
    path: PathArg,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Restore this save state before replaying
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Write a save state after replaying
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Write the displayed frame as raw RGBA8888
    #[arg(short = 'o', long)]
    frame_out: Option<PathBuf>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    json: bool,
}

/// Replay results printed with `--json`
#[derive(Serialize)]
struct Summary {
    quadwords: usize,
    errors: usize,
    draw_commands: usize,
    stats: GsStats,
    inner_resolution: (u32, u32),
    display_resolution: (u32, u32),
    csr: u32,
}

/// Split a dump into quadwords
fn parse_dump(bytes: &[u8]) -> Result<Vec<u128>> {
    if bytes.len() % 16 != 0 {
        return Err(EmulatorError::InvalidDump(format!(
            "length {} is not a multiple of 16 bytes",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(16)
        .map(|chunk| {
            let mut word = [0u8; 16];
            word.copy_from_slice(chunk);
            u128::from_le_bytes(word)
        })
        .collect())
}

fn main() -> Result<()> {
    // Load .env if present
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("gsrx v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            GsConfig::load(path)?
        }
        None => GsConfig::default(),
    };

    let mut gs = GS::with_config(config);

    if let Some(path) = &args.load_state {
        info!("Restoring save state from: {}", path.display());
        let snapshot = GsSnapshot::load_from_file(path)?;
        gs.restore(&snapshot)?;
    }

    info!("Loading GIF dump from: {}", args.dump.display());
    let words = parse_dump(&fs::read(&args.dump)?)?;
    let path = GifPath::from(args.path);
    info!("Replaying {} quadwords on {}", words.len(), path);

    let mut errors = 0;
    let mut draw_commands = 0;
    for (index, &word) in words.iter().enumerate() {
        if let Err(e) = gs.feed_path(path, word) {
            error!("Quadword {}: {}", index, e);
            errors += 1;
        }
        draw_commands += gs.take_draw_commands().len();
    }

    if gs.bus_owner() == Some(path) {
        warn!(
            "Dump ends mid-packet ({} payload units left)",
            gs.gif_cursor(path).data_left
        );
    }

    let stats = gs.stats();
    info!(
        "Replay finished: {} tags, {} vertices, {} primitives ({} dropped), {} pixels transferred, {} errors",
        stats.tags_decoded,
        stats.vertices_committed,
        stats.primitives_drawn,
        stats.draws_dropped,
        stats.pixels_transferred,
        errors
    );

    if let Some(out) = &args.frame_out {
        let (width, height) = gs.inner_resolution();
        let bytes: Vec<u8> = gs
            .framebuffer()
            .iter()
            .flat_map(|pixel| pixel.to_le_bytes())
            .collect();
        fs::write(out, bytes)?;
        info!("Frame ({}x{}) written to: {}", width, height, out.display());
    }

    if let Some(out) = &args.save_state {
        gs.snapshot().save_to_file(out)?;
        info!("Save state written to: {}", out.display());
    }

    if args.json {
        let summary = Summary {
            quadwords: words.len(),
            errors,
            draw_commands,
            stats,
            inner_resolution: gs.inner_resolution(),
            display_resolution: gs.display_resolution(),
            csr: gs.read32(0x1200_1000)?,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
