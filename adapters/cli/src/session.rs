//! Frame loop that wires the maze engine, the pure systems and a backend.

use std::{fs, path::Path, thread, time::Duration};

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use maze_carver_core::{Command, Event, GenerationMode};
use maze_carver_rendering::{RenderingBackend, Scene};
use maze_carver_system_auto_lock::{AutoLock, BrightnessMap, LuminanceImage};
use maze_carver_system_pacing::{Pacer, PacingConfig};
use maze_carver_world::{self as world, query, Maze};

use crate::Args;

/// Totals gathered while carving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    /// Frames simulated until carving finished.
    pub(crate) frames: u64,
    /// Passages knocked through walls.
    pub(crate) passages: usize,
    /// Disconnected components carved, counting the first one.
    pub(crate) components: usize,
}

impl RunSummary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::PassageCarved { .. } => self.passages += 1,
                Event::ComponentStarted { .. } => self.components += 1,
                Event::CommandRejected { command, reason } => {
                    warn!("{command:?} rejected: {reason}");
                }
                _ => {}
            }
        }
    }
}

/// Carves a maze configured by `args`, presenting frames through `backend`.
///
/// Lock edits are applied in input mode, then frames are simulated until the
/// maze finishes. The finished picture is always presented.
pub(crate) fn run<B: RenderingBackend>(args: &Args, backend: &mut B) -> Result<RunSummary> {
    if args.frame_ms == 0 && args.step_ms > 0 {
        bail!(
            "--frame-ms 0 never advances time, so steps every {} ms would never run",
            args.step_ms
        );
    }

    let mut maze = Maze::new(args.columns, args.rows, args.seed);
    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut summary = RunSummary::default();

    if let Some(path) = &args.picture {
        let (width, height) = args
            .picture_size
            .context("a picture needs --picture-size")?;
        let brightness = load_brightness(path, width, height, args.columns, args.rows)?;
        AutoLock::new(args.lock_threshold).handle(&brightness, &mut commands);
    }
    commands.extend(args.locks.iter().map(|&cell| Command::Lock { cell }));
    commands.extend(
        args.lock_regions
            .iter()
            .map(|&origin| Command::LockRegion { origin }),
    );
    commands.push(Command::Begin);
    submit(&mut maze, &mut commands, &mut events);
    summary.record(&events);
    if maze.active_cell().is_some() {
        summary.components += 1;
    }

    let frame = Duration::from_millis(args.frame_ms);
    let mut pacer = Pacer::new(PacingConfig::new(
        Duration::from_millis(args.step_ms),
        args.max_steps_per_frame,
    ));

    while query::mode(&maze) != GenerationMode::Finished {
        if summary.frames == args.max_frames {
            bail!(
                "carving did not finish within {} frames",
                args.max_frames
            );
        }

        pacer.handle(&events, frame, &mut commands);
        events.clear();
        submit(&mut maze, &mut commands, &mut events);
        summary.record(&events);
        summary.frames += 1;

        if args
            .progress_every
            .is_some_and(|every| summary.frames % every == 0)
        {
            backend.present(&scene(&maze)?)?;
        }
        if args.realtime {
            thread::sleep(frame);
        }
    }

    debug!("carving finished after {} frames", summary.frames);
    backend.present(&scene(&maze)?)?;
    Ok(summary)
}

fn submit(maze: &mut Maze, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
    for command in commands.drain(..) {
        world::apply(maze, command, events);
    }
}

fn scene(maze: &Maze) -> Result<Scene> {
    let (columns, rows) = query::dimensions(maze);
    let scene = Scene::new(columns, rows, query::mode(maze), query::cells(maze))?;
    Ok(scene)
}

fn load_brightness(
    path: &Path,
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
) -> Result<BrightnessMap> {
    let pixels =
        fs::read(path).with_context(|| format!("failed to read picture {}", path.display()))?;
    let image = LuminanceImage::new(width, height, pixels)
        .with_context(|| format!("{} is not a {width}x{height} picture", path.display()))?;
    image
        .cell_brightness(columns, rows)
        .context("picture cannot be split into grid cells")
}
