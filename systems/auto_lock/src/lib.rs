#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure auto-lock system that turns per-cell brightness into lock commands.
//!
//! Dark areas of a background picture are treated as "busy" and excluded from
//! carving, so the finished maze only threads through the light parts of the
//! image. Decoding image files is left to adapters: this crate starts from
//! already decoded pixel intensities.

use maze_carver_core::{CellCoord, Command};
use thiserror::Error;

/// Average brightness below which a cell is locked.
pub const DEFAULT_LOCK_THRESHOLD: u8 = 210;

/// Decoded 8-bit grayscale picture stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuminanceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl LuminanceImage {
    /// Wraps grayscale pixels, validating the buffer length against the size.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AutoLockError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(AutoLockError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Converts RGB pixels to grayscale using the plain channel mean.
    pub fn from_rgb(width: u32, height: u32, rgb: &[[u8; 3]]) -> Result<Self, AutoLockError> {
        let pixels = rgb
            .iter()
            .map(|&[red, green, blue]| {
                let sum = u16::from(red) + u16::from(green) + u16::from(blue);
                u8::try_from(sum / 3).unwrap_or(u8::MAX)
            })
            .collect();
        Self::new(width, height, pixels)
    }

    /// Width of the picture in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the picture in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Averages the pixels covered by each cell of a `columns` x `rows` grid.
    ///
    /// Every cell spans `width / columns` by `height / rows` pixels; pixels
    /// left over by the integer division along the right and bottom edges do
    /// not contribute to any cell.
    pub fn cell_brightness(&self, columns: u32, rows: u32) -> Result<BrightnessMap, AutoLockError> {
        if columns == 0 || rows == 0 {
            return Err(AutoLockError::EmptyGrid);
        }

        let tile_width = self.width / columns;
        let tile_height = self.height / rows;
        if tile_width == 0 || tile_height == 0 {
            return Err(AutoLockError::ImageTooSmall {
                width: self.width,
                height: self.height,
                columns,
                rows,
            });
        }

        let tile_area = u64::from(tile_width) * u64::from(tile_height);
        let stride = self.width as usize;
        let span = tile_width as usize;
        let mut averages = Vec::with_capacity(columns as usize * rows as usize);

        for row in 0..rows {
            for column in 0..columns {
                let left = (column * tile_width) as usize;
                let top = row * tile_height;
                let mut total = 0_u64;
                for y in top..top + tile_height {
                    let start = y as usize * stride + left;
                    total += self.pixels[start..start + span]
                        .iter()
                        .map(|&pixel| u64::from(pixel))
                        .sum::<u64>();
                }
                averages.push(u8::try_from(total / tile_area).unwrap_or(u8::MAX));
            }
        }

        Ok(BrightnessMap {
            columns,
            rows,
            averages,
        })
    }
}

/// Average brightness of every cell in a grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrightnessMap {
    columns: u32,
    rows: u32,
    averages: Vec<u8>,
}

impl BrightnessMap {
    /// Wraps brightness values produced by an external source.
    pub fn new(columns: u32, rows: u32, averages: Vec<u8>) -> Result<Self, AutoLockError> {
        let expected = columns as usize * rows as usize;
        if averages.len() != expected {
            return Err(AutoLockError::CellCountMismatch {
                expected,
                actual: averages.len(),
            });
        }

        Ok(Self {
            columns,
            rows,
            averages,
        })
    }

    /// Number of columns covered by the map.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows covered by the map.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Brightness recorded for `cell`, if it lies within the map.
    #[must_use]
    pub fn brightness(&self, cell: CellCoord) -> Option<u8> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.averages.get(index).copied()
    }

    /// Iterator over every cell and its brightness in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, u8)> + '_ {
        let columns = self.columns.max(1);
        self.averages.iter().enumerate().map(move |(index, &value)| {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            (CellCoord::new(index % columns, index / columns), value)
        })
    }
}

/// Pure system that converts a brightness map into lock commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoLock {
    threshold: u8,
}

impl Default for AutoLock {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_THRESHOLD)
    }
}

impl AutoLock {
    /// Creates a system that locks cells darker than `threshold`.
    #[must_use]
    pub const fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Brightness below which cells are locked.
    #[must_use]
    pub const fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Reports whether a cell with the provided brightness should be locked.
    #[must_use]
    pub const fn should_lock(&self, brightness: u8) -> bool {
        brightness < self.threshold
    }

    /// Emits commands that reset every lock and then lock the dark cells.
    pub fn handle(&self, brightness: &BrightnessMap, out: &mut Vec<Command>) {
        out.push(Command::UnlockAll);
        out.extend(
            brightness
                .iter()
                .filter(|&(_, value)| self.should_lock(value))
                .map(|(cell, _)| Command::Lock { cell }),
        );
    }
}

/// Errors raised while deriving brightness values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AutoLockError {
    /// The pixel buffer does not match the declared picture size.
    #[error("expected {expected} pixels but received {actual}")]
    PixelCountMismatch {
        /// Pixel count implied by the picture size.
        expected: usize,
        /// Pixel count actually supplied.
        actual: usize,
    },
    /// The brightness values do not match the declared grid size.
    #[error("expected {expected} cell brightness values but received {actual}")]
    CellCountMismatch {
        /// Cell count implied by the grid size.
        expected: usize,
        /// Cell count actually supplied.
        actual: usize,
    },
    /// The grid has no columns or no rows.
    #[error("brightness grid must have at least one column and one row")]
    EmptyGrid,
    /// The picture has fewer pixels than the grid has cells along an axis.
    #[error("a {width}x{height} picture cannot cover a {columns}x{rows} grid")]
    ImageTooSmall {
        /// Picture width in pixels.
        width: u32,
        /// Picture height in pixels.
        height: u32,
        /// Requested grid columns.
        columns: u32,
        /// Requested grid rows.
        rows: u32,
    },
}
