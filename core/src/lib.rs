#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the maze carver.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative maze engine, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the engine executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! [`CellSnapshot`] values, and respond exclusively with new command batches.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Direction leading from this cell to `other`.
    ///
    /// Only cardinal neighbours produce a direction: exactly one axis may
    /// differ, and it must differ by exactly one. Diagonal, distant, or
    /// identical cells yield `None`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        if self.manhattan_distance(other) != 1 {
            return None;
        }

        if other.row() < self.row() {
            Some(Direction::North)
        } else if other.column() > self.column() {
            Some(Direction::East)
        } else if other.row() > self.row() {
            Some(Direction::South)
        } else {
            Some(Direction::West)
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Cardinal directions separating neighbouring cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbour scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing back the way this one came.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Wall bit guarding the side of a cell that faces this direction.
    #[must_use]
    pub const fn wall(self) -> Walls {
        match self {
            Self::North => Walls::NORTH,
            Self::South => Walls::SOUTH,
            Self::East => Walls::EAST,
            Self::West => Walls::WEST,
        }
    }
}

/// Four-bit wall mask; a set bit means the wall on that side is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Walls(u8);

impl Walls {
    /// No walls at all.
    pub const NONE: Walls = Walls(0);
    /// Wall on the north side.
    pub const NORTH: Walls = Walls(1);
    /// Wall on the south side.
    pub const SOUTH: Walls = Walls(2);
    /// Wall on the east side.
    pub const EAST: Walls = Walls(4);
    /// Wall on the west side.
    pub const WEST: Walls = Walls(8);
    /// Every wall present. Freshly created cells start here.
    pub const ALL: Walls = Walls(15);

    /// Builds a mask from raw bits, discarding anything above the west bit.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Raw bitmask value in the range `0..=15`.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Reports whether the wall facing `direction` is still standing.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.wall().0 != 0
    }

    /// Knocks down the wall facing `direction`.
    pub fn remove(&mut self, direction: Direction) {
        self.0 &= !direction.wall().0;
    }

    /// Reports whether all four walls are still standing.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl Default for Walls {
    fn default() -> Self {
        Self::ALL
    }
}

/// Lifecycle of a carving run.
///
/// `Input` accepts lock edits, `Running` and `Paused` toggle between each
/// other while carving, and `Finished` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationMode {
    /// Lock edits are accepted and carving has not begun.
    #[default]
    Input,
    /// Carving advances whenever a step is requested.
    Running,
    /// Carving is suspended until resumed.
    Paused,
    /// Every reachable unlocked cell has been carved.
    Finished,
}

/// Immutable representation of a single cell used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Grid position of the cell.
    pub cell: CellCoord,
    /// Walls still standing around the cell.
    pub walls: Walls,
    /// Indicates whether carving ever entered the cell.
    pub visited: bool,
    /// Indicates whether the cell lies on the current backtrack path.
    pub on_stack: bool,
    /// Indicates whether the cell is the current carving head.
    pub active: bool,
    /// Indicates whether the cell is excluded from carving.
    pub locked: bool,
}

/// Commands that express all permissible maze mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Excludes a single cell from carving.
    Lock {
        /// Cell to lock.
        cell: CellCoord,
    },
    /// Returns a single cell to the carvable pool.
    Unlock {
        /// Cell to unlock.
        cell: CellCoord,
    },
    /// Locks every cell of the grid.
    LockAll,
    /// Unlocks every cell of the grid.
    UnlockAll,
    /// Locks the connected unlocked region containing the origin.
    LockRegion {
        /// Cell the region flood fill starts from.
        origin: CellCoord,
    },
    /// Leaves input mode and starts carving.
    Begin,
    /// Suspends carving.
    Pause,
    /// Resumes suspended carving.
    Resume,
    /// Performs a single carving step.
    Step,
}

/// Events broadcast by the engine after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// Confirms that a cell was locked.
    CellLocked {
        /// Cell that became locked.
        cell: CellCoord,
    },
    /// Confirms that a cell was unlocked.
    CellUnlocked {
        /// Cell that became unlocked.
        cell: CellCoord,
    },
    /// Confirms that every cell was locked.
    AllCellsLocked,
    /// Confirms that every cell was unlocked.
    AllCellsUnlocked,
    /// Confirms that a connected region was locked in bulk.
    RegionLocked {
        /// Cell the flood fill started from.
        origin: CellCoord,
        /// Cells locked by the operation in discovery order.
        cells: Vec<CellCoord>,
    },
    /// Announces that the engine entered a new generation mode.
    ModeChanged {
        /// Mode that became active after processing the command.
        mode: GenerationMode,
    },
    /// Confirms that the wall pair between two cells was removed.
    PassageCarved {
        /// Cell the carving head left.
        from: CellCoord,
        /// Cell the carving head entered.
        to: CellCoord,
        /// Direction of travel from `from` to `to`.
        direction: Direction,
    },
    /// Reports that the carving head retreated from a dead end.
    Backtracked {
        /// Dead-end cell popped from the backtrack stack.
        from: CellCoord,
        /// Cell that became the carving head.
        to: CellCoord,
    },
    /// Reports that carving restarted inside a disconnected component.
    ComponentStarted {
        /// Cell seeding the new component.
        cell: CellCoord,
    },
    /// Reports that a command was rejected without mutating the maze.
    CommandRejected {
        /// Command that failed validation.
        command: Command,
        /// Specific reason the command failed.
        reason: MazeError,
    },
}

/// Result of a single carving step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The engine was not running, so nothing happened.
    Idle,
    /// The head advanced into an unvisited neighbour.
    Carved {
        /// Cell the head left.
        from: CellCoord,
        /// Cell the head entered.
        to: CellCoord,
        /// Direction of travel.
        direction: Direction,
    },
    /// The head retreated one cell along the backtrack path.
    Backtracked {
        /// Dead-end cell that was popped.
        from: CellCoord,
        /// New carving head.
        to: CellCoord,
    },
    /// The backtrack path emptied and carving reseeded an untouched component.
    Restarted {
        /// Cell seeding the new component.
        cell: CellCoord,
    },
    /// No unvisited unlocked cell remains; carving is complete.
    Finished,
}

/// Reasons an engine operation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum MazeError {
    /// The position lies outside the grid bounds.
    #[error("cell {cell} lies outside the {columns}x{rows} grid")]
    OutOfRange {
        /// Position that failed validation.
        cell: CellCoord,
        /// Number of columns in the grid.
        columns: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// The requested mode cannot be entered from the current one.
    #[error("cannot switch generation mode from {from:?} to {to:?}")]
    InvalidModeTransition {
        /// Mode active when the request arrived.
        from: GenerationMode,
        /// Mode the caller asked for.
        to: GenerationMode,
    },
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellSnapshot, Direction, MazeError, Walls};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn direction_to_accepts_only_cardinal_neighbours() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(origin.direction_to(CellCoord::new(2, 1)), Some(Direction::North));
        assert_eq!(origin.direction_to(CellCoord::new(3, 2)), Some(Direction::East));
        assert_eq!(origin.direction_to(CellCoord::new(2, 3)), Some(Direction::South));
        assert_eq!(origin.direction_to(CellCoord::new(1, 2)), Some(Direction::West));
        assert_eq!(origin.direction_to(CellCoord::new(3, 3)), None);
        assert_eq!(origin.direction_to(CellCoord::new(2, 4)), None);
        assert_eq!(origin.direction_to(origin), None);
    }

    #[test]
    fn wall_bits_match_cardinal_encoding() {
        assert_eq!(Direction::North.wall().bits(), 1);
        assert_eq!(Direction::South.wall().bits(), 2);
        assert_eq!(Direction::East.wall().bits(), 4);
        assert_eq!(Direction::West.wall().bits(), 8);
        assert_eq!(Walls::default().bits(), 15);
    }

    #[test]
    fn removing_a_wall_clears_only_that_bit() {
        let mut walls = Walls::ALL;
        walls.remove(Direction::East);
        assert_eq!(walls.bits(), 11);
        assert!(!walls.contains(Direction::East));
        assert!(walls.contains(Direction::North));
        assert!(!walls.is_closed());

        walls.remove(Direction::East);
        assert_eq!(walls.bits(), 11, "removal must be idempotent");
    }

    #[test]
    fn opposite_directions_pair_up() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
        }
    }

    #[test]
    fn from_bits_discards_high_bits() {
        assert_eq!(Walls::from_bits(0xf5).bits(), 5);
    }

    #[test]
    fn out_of_range_error_names_the_cell() {
        let error = MazeError::OutOfRange {
            cell: CellCoord::new(7, 2),
            columns: 4,
            rows: 4,
        };
        assert_eq!(error.to_string(), "cell (7, 2) lies outside the 4x4 grid");
    }

    #[test]
    fn cell_snapshot_round_trips_through_bincode() {
        let snapshot = CellSnapshot {
            cell: CellCoord::new(5, 7),
            walls: Walls::from_bits(9),
            visited: true,
            on_stack: false,
            active: false,
            locked: false,
        };
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: CellSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
