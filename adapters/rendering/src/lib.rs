#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for maze carver adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use maze_carver_core::{CellCoord, CellSnapshot, Direction, GenerationMode};
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha replaced by a byte value.
    #[must_use]
    pub const fn with_alpha_u8(self, alpha: u8) -> Self {
        Self {
            alpha: alpha as f32 / 255.0,
            ..self
        }
    }
}

/// Visual state of a cell, resolved from its flags and the generation mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellStatus {
    /// Locked cell shown with the translucent lock overlay.
    Locked,
    /// Unlocked cell in input mode; nothing is filled.
    Hidden,
    /// Head of the backtrack stack.
    Active,
    /// Cell on the backtrack path below the head.
    OnStack,
    /// Visited cell that has left the stack.
    Carved,
    /// Cell carving has not reached yet.
    Untouched,
}

impl CellStatus {
    /// Classifies a snapshot for drawing.
    ///
    /// Locks are shown until the maze finishes; during input every other cell
    /// is hidden, afterwards the carving flags decide.
    #[must_use]
    pub fn classify(snapshot: &CellSnapshot, mode: GenerationMode) -> Self {
        if snapshot.locked && mode != GenerationMode::Finished {
            Self::Locked
        } else if mode == GenerationMode::Input {
            Self::Hidden
        } else if snapshot.active {
            Self::Active
        } else if snapshot.on_stack {
            Self::OnStack
        } else if snapshot.visited {
            Self::Carved
        } else {
            Self::Untouched
        }
    }
}

/// Colors used by graphical adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Color of wall segments.
    pub wall: Color,
    /// Fill of cells on the backtrack path.
    pub stack: Color,
    /// Fill of the active cell.
    pub active: Color,
    /// Translucent overlay drawn over locked cells.
    pub locked: Color,
    /// Clear color behind the grid.
    pub background: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wall: Color::from_rgb_u8(0x00, 0x64, 0x00),
            stack: Color::from_rgb_u8(0x00, 0x00, 0xff),
            active: Color::from_rgb_u8(0x80, 0x00, 0x80),
            locked: Color::from_rgb_u8(0xff, 0x00, 0x00).with_alpha_u8(75),
            background: Color::from_rgb_u8(0x00, 0x00, 0x00),
        }
    }
}

impl Palette {
    /// Fill color for a cell status, or `None` when the cell stays unfilled.
    #[must_use]
    pub const fn fill(&self, status: CellStatus) -> Option<Color> {
        match status {
            CellStatus::Locked => Some(self.locked),
            CellStatus::Active => Some(self.active),
            CellStatus::OnStack => Some(self.stack),
            CellStatus::Hidden | CellStatus::Carved | CellStatus::Untouched => None,
        }
    }
}

/// Wall sides that should be drawn for a cell.
///
/// Locked cells draw nothing once the maze is finished so only the carved
/// islands remain visible.
#[must_use]
pub fn wall_segments(snapshot: &CellSnapshot, mode: GenerationMode) -> Vec<Direction> {
    if snapshot.locked && mode == GenerationMode::Finished {
        return Vec::new();
    }

    Direction::ALL
        .into_iter()
        .filter(|direction| snapshot.walls.contains(*direction))
        .collect()
}

/// Status line shown for each generation mode.
#[must_use]
pub const fn mode_caption(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Input => "Input (toggle locks, then begin carving)",
        GenerationMode::Running => "Running",
        GenerationMode::Paused => "Paused",
        GenerationMode::Finished => "Finished",
    }
}

/// Pixel layout of the grid inside a drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    tile_size: Vec2,
}

impl GridLayout {
    /// Fits the grid into `resolution` using whole-pixel tiles.
    ///
    /// Pixels left over by the integer division stay outside the grid.
    #[must_use]
    pub fn fit(columns: u32, rows: u32, resolution: Vec2) -> Self {
        let tile_axis = |extent: f32, count: u32| {
            if count == 0 {
                0.0
            } else {
                ((extent.max(0.0) as u32) / count) as f32
            }
        };

        Self {
            columns,
            rows,
            tile_size: Vec2::new(
                tile_axis(resolution.x, columns),
                tile_axis(resolution.y, rows),
            ),
        }
    }

    /// Size of a single tile in pixels.
    #[must_use]
    pub const fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    /// Projects a pointer position onto the cell beneath it.
    ///
    /// Returns `None` when the pointer lies outside the grid or the tiles
    /// have no area.
    #[must_use]
    pub fn cell_at(&self, pointer: Vec2) -> Option<CellCoord> {
        if self.tile_size.x <= 0.0 || self.tile_size.y <= 0.0 {
            return None;
        }
        if pointer.x < 0.0 || pointer.y < 0.0 {
            return None;
        }

        let column = (pointer.x / self.tile_size.x).floor();
        let row = (pointer.y / self.tile_size.y).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// Top-left pixel of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.tile_size
    }
}

/// Snapshot of the maze handed to rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of columns in the grid.
    pub columns: u32,
    /// Number of rows in the grid.
    pub rows: u32,
    /// Generation mode at the time of capture.
    pub mode: GenerationMode,
    /// Row-major cell snapshots.
    pub cells: Vec<CellSnapshot>,
}

impl Scene {
    /// Creates a scene, validating that `cells` covers the grid exactly.
    pub fn new(
        columns: u32,
        rows: u32,
        mode: GenerationMode,
        cells: Vec<CellSnapshot>,
    ) -> Result<Self, RenderingError> {
        let expected = columns as usize * rows as usize;
        if cells.len() != expected {
            return Err(RenderingError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            mode,
            cells,
        })
    }

    /// Snapshot stored for `cell`, if it lies within the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&CellSnapshot> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        self.cells
            .get(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }

    fn draws_wall(&self, column: u32, row: u32, direction: Direction) -> bool {
        self.cell(CellCoord::new(column, row))
            .is_some_and(|snapshot| wall_segments(snapshot, self.mode).contains(&direction))
    }
}

/// Renders the scene as a text picture.
///
/// Walls are drawn with `+`, `---` and `|`. Locked cells are marked `#`, the
/// active cell `@` and the rest of the backtrack path `.`.
#[must_use]
pub fn render_text(scene: &Scene) -> String {
    let mut text = String::new();
    if scene.columns == 0 || scene.rows == 0 {
        return text;
    }

    for row in 0..scene.rows {
        for column in 0..scene.columns {
            let closed = scene.draws_wall(column, row, Direction::North)
                || row
                    .checked_sub(1)
                    .is_some_and(|above| scene.draws_wall(column, above, Direction::South));
            text.push('+');
            text.push_str(if closed { "---" } else { "   " });
        }
        text.push_str("+\n");

        for column in 0..scene.columns {
            let closed = scene.draws_wall(column, row, Direction::West)
                || column
                    .checked_sub(1)
                    .is_some_and(|left| scene.draws_wall(left, row, Direction::East));
            text.push(if closed { '|' } else { ' ' });
            let glyph = scene
                .cell(CellCoord::new(column, row))
                .map_or(' ', |snapshot| {
                    match CellStatus::classify(snapshot, scene.mode) {
                        CellStatus::Locked => '#',
                        CellStatus::Active => '@',
                        CellStatus::OnStack => '.',
                        CellStatus::Hidden | CellStatus::Carved | CellStatus::Untouched => ' ',
                    }
                });
            text.push(' ');
            text.push(glyph);
            text.push(' ');
        }
        let last = scene.columns - 1;
        text.push(if scene.draws_wall(last, row, Direction::East) {
            '|'
        } else {
            ' '
        });
        text.push('\n');
    }

    let last = scene.rows - 1;
    for column in 0..scene.columns {
        text.push('+');
        text.push_str(if scene.draws_wall(column, last, Direction::South) {
            "---"
        } else {
            "   "
        });
    }
    text.push_str("+\n");
    text
}

/// Rendering backend capable of presenting maze scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The snapshot list does not cover the declared grid.
    CellCountMismatch {
        /// Cell count implied by the grid size.
        expected: usize,
        /// Cell count actually supplied.
        actual: usize,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellCountMismatch { expected, actual } => {
                write!(f, "scene expects {expected} cells (received {actual})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_carver_core::Walls;

    fn snapshot(column: u32, row: u32, walls: u8) -> CellSnapshot {
        CellSnapshot {
            cell: CellCoord::new(column, row),
            walls: Walls::from_bits(walls),
            visited: true,
            on_stack: false,
            active: false,
            locked: false,
        }
    }

    #[test]
    fn locked_cells_outrank_everything_until_finished() {
        let locked = CellSnapshot {
            locked: true,
            ..snapshot(0, 0, 15)
        };

        assert_eq!(
            CellStatus::classify(&locked, GenerationMode::Input),
            CellStatus::Locked
        );
        assert_eq!(
            CellStatus::classify(&locked, GenerationMode::Paused),
            CellStatus::Locked
        );
        assert_ne!(
            CellStatus::classify(&locked, GenerationMode::Finished),
            CellStatus::Locked
        );
    }

    #[test]
    fn carving_flags_decide_outside_input() {
        let active = CellSnapshot {
            active: true,
            on_stack: true,
            ..snapshot(0, 0, 15)
        };
        let stacked = CellSnapshot {
            on_stack: true,
            ..snapshot(0, 0, 15)
        };
        let untouched = CellSnapshot {
            visited: false,
            ..snapshot(0, 0, 15)
        };

        assert_eq!(
            CellStatus::classify(&active, GenerationMode::Input),
            CellStatus::Hidden
        );
        assert_eq!(
            CellStatus::classify(&active, GenerationMode::Running),
            CellStatus::Active
        );
        assert_eq!(
            CellStatus::classify(&stacked, GenerationMode::Running),
            CellStatus::OnStack
        );
        assert_eq!(
            CellStatus::classify(&snapshot(0, 0, 15), GenerationMode::Running),
            CellStatus::Carved
        );
        assert_eq!(
            CellStatus::classify(&untouched, GenerationMode::Paused),
            CellStatus::Untouched
        );
    }

    #[test]
    fn palette_fills_only_highlighted_cells() {
        let palette = Palette::default();

        assert_eq!(palette.fill(CellStatus::Active), Some(palette.active));
        assert_eq!(palette.fill(CellStatus::Carved), None);
        let locked = palette.fill(CellStatus::Locked).expect("locked overlay");
        assert!(locked.alpha < 0.5);
        assert_eq!(locked.red, 1.0);
    }

    #[test]
    fn locked_cells_hide_walls_once_finished() {
        let locked = CellSnapshot {
            locked: true,
            ..snapshot(0, 0, 15)
        };

        assert_eq!(
            wall_segments(&locked, GenerationMode::Running),
            Direction::ALL.to_vec()
        );
        assert!(wall_segments(&locked, GenerationMode::Finished).is_empty());
        assert_eq!(
            wall_segments(&snapshot(0, 0, 11), GenerationMode::Finished),
            vec![Direction::North, Direction::South, Direction::West]
        );
    }

    #[test]
    fn layout_projects_pointer_onto_cells() {
        let layout = GridLayout::fit(4, 3, Vec2::new(130.0, 95.0));

        assert_eq!(layout.tile_size(), Vec2::new(32.0, 31.0));
        assert_eq!(
            layout.cell_at(Vec2::new(40.0, 70.0)),
            Some(CellCoord::new(1, 2))
        );
        assert_eq!(layout.cell_at(Vec2::new(129.0, 10.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(
            layout.cell_origin(CellCoord::new(3, 2)),
            Vec2::new(96.0, 62.0)
        );
    }

    #[test]
    fn empty_layout_has_no_cells() {
        let layout = GridLayout::fit(0, 3, Vec2::new(100.0, 100.0));

        assert_eq!(layout.cell_at(Vec2::new(1.0, 1.0)), None);
    }

    #[test]
    fn scene_rejects_incomplete_snapshots() {
        let error = Scene::new(2, 2, GenerationMode::Input, vec![snapshot(0, 0, 15)])
            .expect_err("three cells are missing");

        assert_eq!(
            error,
            RenderingError::CellCountMismatch {
                expected: 4,
                actual: 1,
            }
        );
        assert_eq!(error.to_string(), "scene expects 4 cells (received 1)");
    }

    #[test]
    fn text_picture_shows_passages_and_markers() {
        let cells = vec![
            snapshot(0, 0, 11),
            CellSnapshot {
                active: true,
                on_stack: true,
                ..snapshot(1, 0, 7)
            },
        ];
        let scene = Scene::new(2, 1, GenerationMode::Running, cells).expect("complete scene");

        assert_eq!(render_text(&scene), "+---+---+\n|     @ |\n+---+---+\n");
    }

    #[test]
    fn finished_picture_drops_locked_walls() {
        let cells = vec![
            snapshot(0, 0, 15),
            CellSnapshot {
                locked: true,
                visited: false,
                ..snapshot(1, 0, 15)
            },
        ];
        let running = Scene::new(2, 1, GenerationMode::Running, cells.clone()).expect("scene");
        let finished = Scene::new(2, 1, GenerationMode::Finished, cells).expect("scene");

        assert_eq!(render_text(&running), "+---+---+\n|   | # |\n+---+---+\n");
        assert_eq!(render_text(&finished), "+---+   +\n|   |    \n+---+   +\n");
    }
}
