#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that carves a maze and prints it to the terminal.

mod session;
mod terminal;

use std::{io, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use log::info;
use maze_carver_core::CellCoord;
use maze_carver_system_auto_lock::DEFAULT_LOCK_THRESHOLD;
use maze_carver_system_pacing::DEFAULT_MAX_STEPS_PER_TICK;

use crate::terminal::TerminalBackend;

/// Carves a perfect maze around locked cells and prints the result.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub(crate) struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 16)]
    pub(crate) columns: u32,

    /// Number of grid rows.
    #[arg(long, default_value_t = 8)]
    pub(crate) rows: u32,

    /// Random seed; omit to seed from the operating system.
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Cell to lock before carving. Repeatable.
    #[arg(long = "lock", value_name = "COLUMN,ROW", value_parser = parse_cell)]
    pub(crate) locks: Vec<CellCoord>,

    /// Locks the whole unlocked island containing the cell. Repeatable.
    #[arg(long = "lock-region", value_name = "COLUMN,ROW", value_parser = parse_cell)]
    pub(crate) lock_regions: Vec<CellCoord>,

    /// Raw 8-bit grayscale picture whose dark areas are locked.
    #[arg(long, value_name = "PATH", requires = "picture_size")]
    pub(crate) picture: Option<PathBuf>,

    /// Pixel dimensions of the raw picture.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub(crate) picture_size: Option<(u32, u32)>,

    /// Average brightness below which picture cells are locked.
    #[arg(long, default_value_t = DEFAULT_LOCK_THRESHOLD)]
    pub(crate) lock_threshold: u8,

    /// Milliseconds between carving steps; zero carves as fast as allowed.
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub(crate) step_ms: u64,

    /// Simulated milliseconds per frame.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    pub(crate) frame_ms: u64,

    /// Upper bound on carving steps per frame.
    #[arg(long, value_name = "STEPS", default_value_t = DEFAULT_MAX_STEPS_PER_TICK)]
    pub(crate) max_steps_per_frame: u32,

    /// Prints an intermediate picture every N frames.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) progress_every: Option<u64>,

    /// Gives up when carving has not finished after this many frames.
    #[arg(long, value_name = "FRAMES", default_value_t = 1_000_000)]
    pub(crate) max_frames: u64,

    /// Sleeps for the frame duration between frames.
    #[arg(long)]
    pub(crate) realtime: bool,
}

fn parse_pair(value: &str, separator: char) -> Result<(u32, u32), String> {
    let (first, second) = value
        .split_once(separator)
        .ok_or_else(|| format!("expected two numbers separated by '{separator}'"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid number {part:?}: {error}"))
    };
    Ok((parse(first)?, parse(second)?))
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    parse_pair(value, ',').map(|(column, row)| CellCoord::new(column, row))
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    parse_pair(value, 'x')
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut backend = TerminalBackend::new(io::stdout().lock());
    let summary = session::run(&args, &mut backend)?;
    info!(
        "carved {} passages across {} components in {} frames",
        summary.passages, summary.components, summary.frames
    );
    Ok(())
}
