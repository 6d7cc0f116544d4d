//! Dense cell storage backing the maze engine.

use maze_carver_core::{CellCoord, CellSnapshot, Direction, Walls};

/// Single grid slot tracked by the engine.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    pub(crate) cell: CellCoord,
    pub(crate) walls: Walls,
    pub(crate) visited: bool,
    pub(crate) on_stack: bool,
    pub(crate) active: bool,
    pub(crate) locked: bool,
}

impl Cell {
    fn closed(cell: CellCoord) -> Self {
        Self {
            cell,
            walls: Walls::ALL,
            visited: false,
            on_stack: false,
            active: false,
            locked: false,
        }
    }

    pub(crate) fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            cell: self.cell,
            walls: self.walls,
            visited: self.visited,
            on_stack: self.on_stack,
            active: self.active,
            locked: self.locked,
        }
    }
}

/// Fixed-size row-major grid of cells.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for row in 0..rows {
            for column in 0..columns {
                cells.push(Cell::closed(CellCoord::new(column, row)));
            }
        }

        Self {
            columns,
            rows,
            cells,
        }
    }

    pub(crate) fn columns(&self) -> u32 {
        self.columns
    }

    pub(crate) fn rows(&self) -> u32 {
        self.rows
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Unlocked neighbours of `cell` that `is_claimed` has not already taken.
    ///
    /// This is the single neighbour predicate shared by carving and the region
    /// flood fill; the claim closure receives the neighbour's dense index so
    /// callers can keep their bookkeeping outside the grid.
    pub(crate) fn eligible_neighbors<F>(
        &self,
        cell: CellCoord,
        mut is_claimed: F,
    ) -> Vec<(Direction, CellCoord)>
    where
        F: FnMut(usize, &Cell) -> bool,
    {
        let mut eligible = Vec::with_capacity(Direction::ALL.len());
        for direction in Direction::ALL {
            let Some(neighbor) = neighbor(cell, direction, self.columns, self.rows) else {
                continue;
            };
            let Some(index) = self.index(neighbor) else {
                continue;
            };
            let slot = &self.cells[index];
            if slot.locked || is_claimed(index, slot) {
                continue;
            }
            eligible.push((direction, neighbor));
        }
        eligible
    }

    /// Knocks down the wall pair separating `from` and its neighbour in `direction`.
    pub(crate) fn carve(&mut self, from: CellCoord, direction: Direction) -> Option<CellCoord> {
        let to = neighbor(from, direction, self.columns, self.rows)?;
        let from_index = self.index(from)?;
        let to_index = self.index(to)?;
        self.cells[from_index].walls.remove(direction);
        self.cells[to_index].walls.remove(direction.opposite());
        Some(to)
    }
}

fn neighbor(cell: CellCoord, direction: Direction, columns: u32, rows: u32) -> Option<CellCoord> {
    let candidate = match direction {
        Direction::North => CellCoord::new(cell.column(), cell.row().checked_sub(1)?),
        Direction::East => CellCoord::new(cell.column().checked_add(1)?, cell.row()),
        Direction::South => CellCoord::new(cell.column(), cell.row().checked_add(1)?),
        Direction::West => CellCoord::new(cell.column().checked_sub(1)?, cell.row()),
    };

    (candidate.column() < columns && candidate.row() < rows).then_some(candidate)
}
