#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative maze carving engine.
//!
//! The [`Maze`] owns the cell grid, the backtrack stack, and the random source
//! that drives the recursive backtracker. Drivers either call its methods
//! directly or submit [`Command`] values through [`apply`], then read the
//! results back through the [`query`] module.

mod grid;
mod region;

use log::{debug, info, trace};
use maze_carver_core::{CellCoord, Command, Event, GenerationMode, MazeError, StepOutcome};
use rand::{seq::SliceRandom, Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;

/// Cell that seeds the first carving pass when it is unlocked.
const ENTRY_CELL: CellCoord = CellCoord::new(0, 0);

/// ChaCha stream reserved for region selection, apart from carving.
const REGION_STREAM: u64 = 1;

/// Stepwise recursive-backtracker maze generator.
///
/// Cells can be locked while the maze is in [`GenerationMode::Input`]; locked
/// cells are never carved into and keep all four walls. When locked cells split
/// the grid into disconnected components, each component is carved as its own
/// perfect maze.
#[derive(Debug)]
pub struct Maze<R = ChaCha8Rng> {
    grid: Grid,
    stack: Vec<CellCoord>,
    rng: R,
    region_rng: ChaCha8Rng,
    mode: GenerationMode,
}

impl Maze<ChaCha8Rng> {
    /// Creates a maze with every cell unlocked and fully walled.
    ///
    /// Supplying a seed makes the whole run reproducible; without one the
    /// random source is seeded from system entropy.
    #[must_use]
    pub fn new(columns: u32, rows: u32, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| ChaCha8Rng::from_entropy().next_u64());
        Self::assemble(columns, rows, ChaCha8Rng::seed_from_u64(seed), seed)
    }
}

impl<R: Rng> Maze<R> {
    /// Creates a maze that draws every carving choice from `rng`.
    ///
    /// Region selection keeps its own source, seeded with zero.
    #[must_use]
    pub fn with_rng(columns: u32, rows: u32, rng: R) -> Self {
        Self::assemble(columns, rows, rng, 0)
    }

    fn assemble(columns: u32, rows: u32, rng: R, region_seed: u64) -> Self {
        let mut region_rng = ChaCha8Rng::seed_from_u64(region_seed);
        region_rng.set_stream(REGION_STREAM);
        Self {
            grid: Grid::new(columns, rows),
            stack: Vec::new(),
            rng,
            region_rng,
            mode: GenerationMode::Input,
        }
    }

    /// Current generation mode.
    #[must_use]
    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Number of columns in the grid.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.grid.columns()
    }

    /// Number of rows in the grid.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.grid.rows()
    }

    /// Current carving head, if the backtrack stack is not empty.
    #[must_use]
    pub fn active_cell(&self) -> Option<CellCoord> {
        self.stack.last().copied()
    }

    /// Number of cells on the backtrack stack.
    #[must_use]
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of cells carving has entered so far.
    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.grid.cells().iter().filter(|cell| cell.visited).count()
    }

    /// Locks `cell`, excluding it from carving.
    ///
    /// Returns `Ok(false)` without touching the grid once the maze has left
    /// input mode.
    pub fn lock(&mut self, cell: CellCoord) -> Result<bool, MazeError> {
        self.set_locked(cell, true)
    }

    /// Unlocks `cell`, returning it to the carvable pool.
    ///
    /// Returns `Ok(false)` without touching the grid once the maze has left
    /// input mode.
    pub fn unlock(&mut self, cell: CellCoord) -> Result<bool, MazeError> {
        self.set_locked(cell, false)
    }

    /// Locks every cell. Returns `false` outside input mode.
    pub fn lock_all(&mut self) -> bool {
        self.set_all_locked(true)
    }

    /// Unlocks every cell. Returns `false` outside input mode.
    pub fn unlock_all(&mut self) -> bool {
        self.set_all_locked(false)
    }

    /// Finds the unlocked island containing `origin`.
    ///
    /// Two cells belong to the same island when they are cardinal neighbours
    /// and both unlocked; walls play no part. The cells are returned in
    /// discovery order starting with `origin`, and a locked origin yields an
    /// empty region. The walk draws from a source separate from carving, so
    /// selecting never changes the maze that carving produces.
    pub fn select_connected_region(
        &mut self,
        origin: CellCoord,
    ) -> Result<Vec<CellCoord>, MazeError> {
        let _ = self.checked_index(origin)?;
        Ok(region::connected_region(&self.grid, origin, &mut self.region_rng))
    }

    /// Locks the whole unlocked island containing `origin`.
    ///
    /// Returns the cells that were locked, which is empty for a locked origin
    /// or when the maze has left input mode.
    pub fn lock_region(&mut self, origin: CellCoord) -> Result<Vec<CellCoord>, MazeError> {
        let _ = self.checked_index(origin)?;
        if !self.accepts_edits() {
            debug!("ignoring region lock at {origin} in {:?} mode", self.mode);
            return Ok(Vec::new());
        }

        let region = region::connected_region(&self.grid, origin, &mut self.region_rng);
        for cell in &region {
            if let Some(slot) = self.grid.get_mut(*cell) {
                slot.locked = true;
            }
        }
        Ok(region)
    }

    /// Leaves input mode and starts carving from the top-left cell.
    ///
    /// A locked top-left cell leaves the backtrack stack empty so the first
    /// step seeds a random unlocked cell instead.
    pub fn begin(&mut self) -> Result<(), MazeError> {
        self.transition(GenerationMode::Input, GenerationMode::Running)?;
        if self.grid.get(ENTRY_CELL).is_some_and(|cell| !cell.locked) {
            self.enter(ENTRY_CELL);
        }
        Ok(())
    }

    /// Suspends carving.
    pub fn pause(&mut self) -> Result<(), MazeError> {
        self.transition(GenerationMode::Running, GenerationMode::Paused)
    }

    /// Resumes carving after a pause.
    pub fn resume(&mut self) -> Result<(), MazeError> {
        self.transition(GenerationMode::Paused, GenerationMode::Running)
    }

    /// Performs exactly one unit of carving.
    ///
    /// The head either advances into a random unvisited unlocked neighbour,
    /// retreats one cell, reseeds an untouched component once the stack runs
    /// dry, or finishes when nothing is left to carve. Outside
    /// [`GenerationMode::Running`] this is a no-op reporting
    /// [`StepOutcome::Idle`].
    pub fn step(&mut self) -> StepOutcome {
        if self.mode != GenerationMode::Running {
            return StepOutcome::Idle;
        }

        let Some(head) = self.stack.last().copied() else {
            return self.restart_or_finish();
        };

        let candidates = self.grid.eligible_neighbors(head, |_, cell| cell.visited);
        if let Some(&(direction, next)) = candidates.choose(&mut self.rng) {
            if self.grid.carve(head, direction).is_some() {
                if let Some(cell) = self.grid.get_mut(head) {
                    cell.active = false;
                }
                self.enter(next);
                trace!("carved {direction:?} from {head} to {next}");
                return StepOutcome::Carved {
                    from: head,
                    to: next,
                    direction,
                };
            }
        }

        let _ = self.stack.pop();
        if let Some(cell) = self.grid.get_mut(head) {
            cell.active = false;
            cell.on_stack = false;
        }

        match self.stack.last().copied() {
            Some(top) => {
                if let Some(cell) = self.grid.get_mut(top) {
                    cell.active = true;
                }
                trace!("backtracked from {head} to {top}");
                StepOutcome::Backtracked {
                    from: head,
                    to: top,
                }
            }
            None => self.restart_or_finish(),
        }
    }

    fn restart_or_finish(&mut self) -> StepOutcome {
        let untouched: Vec<CellCoord> = self
            .grid
            .cells()
            .iter()
            .filter(|cell| !cell.locked && !cell.visited)
            .map(|cell| cell.cell)
            .collect();

        match untouched.choose(&mut self.rng) {
            Some(&cell) => {
                debug!(
                    "restarting carving at {cell}; {} untouched cells remain",
                    untouched.len()
                );
                self.enter(cell);
                StepOutcome::Restarted { cell }
            }
            None => {
                self.mode = GenerationMode::Finished;
                info!(
                    "finished carving {} cells of a {}x{} grid",
                    self.visited_count(),
                    self.grid.columns(),
                    self.grid.rows()
                );
                StepOutcome::Finished
            }
        }
    }

    fn enter(&mut self, cell: CellCoord) {
        if let Some(slot) = self.grid.get_mut(cell) {
            slot.visited = true;
            slot.active = true;
            slot.on_stack = true;
            self.stack.push(cell);
        }
    }

    fn set_locked(&mut self, cell: CellCoord, locked: bool) -> Result<bool, MazeError> {
        let index = self.checked_index(cell)?;
        if !self.accepts_edits() {
            debug!("ignoring lock edit at {cell} in {:?} mode", self.mode);
            return Ok(false);
        }

        self.grid.cells_mut()[index].locked = locked;
        Ok(true)
    }

    fn set_all_locked(&mut self, locked: bool) -> bool {
        if !self.accepts_edits() {
            debug!("ignoring bulk lock edit in {:?} mode", self.mode);
            return false;
        }

        for cell in self.grid.cells_mut() {
            cell.locked = locked;
        }
        true
    }

    fn accepts_edits(&self) -> bool {
        self.mode == GenerationMode::Input
    }

    fn transition(
        &mut self,
        expected: GenerationMode,
        next: GenerationMode,
    ) -> Result<(), MazeError> {
        if self.mode != expected {
            return Err(MazeError::InvalidModeTransition {
                from: self.mode,
                to: next,
            });
        }

        debug!("generation mode {:?} -> {next:?}", self.mode);
        self.mode = next;
        Ok(())
    }

    fn checked_index(&self, cell: CellCoord) -> Result<usize, MazeError> {
        self.grid.index(cell).ok_or(MazeError::OutOfRange {
            cell,
            columns: self.grid.columns(),
            rows: self.grid.rows(),
        })
    }
}

/// Applies the provided command to the maze, mutating state deterministically.
///
/// Successful mutations are reported through `out_events`, rejected commands
/// produce a single [`Event::CommandRejected`], and no-ops emit nothing.
pub fn apply<R: Rng>(maze: &mut Maze<R>, command: Command, out_events: &mut Vec<Event>) {
    let result = match command {
        Command::Lock { cell } => maze.lock(cell).map(|applied| {
            if applied {
                out_events.push(Event::CellLocked { cell });
            }
        }),
        Command::Unlock { cell } => maze.unlock(cell).map(|applied| {
            if applied {
                out_events.push(Event::CellUnlocked { cell });
            }
        }),
        Command::LockAll => {
            if maze.lock_all() {
                out_events.push(Event::AllCellsLocked);
            }
            Ok(())
        }
        Command::UnlockAll => {
            if maze.unlock_all() {
                out_events.push(Event::AllCellsUnlocked);
            }
            Ok(())
        }
        Command::LockRegion { origin } => maze.lock_region(origin).map(|cells| {
            if !cells.is_empty() {
                out_events.push(Event::RegionLocked { origin, cells });
            }
        }),
        Command::Begin => maze.begin().map(|()| {
            out_events.push(Event::ModeChanged {
                mode: GenerationMode::Running,
            });
        }),
        Command::Pause => maze.pause().map(|()| {
            out_events.push(Event::ModeChanged {
                mode: GenerationMode::Paused,
            });
        }),
        Command::Resume => maze.resume().map(|()| {
            out_events.push(Event::ModeChanged {
                mode: GenerationMode::Running,
            });
        }),
        Command::Step => {
            match maze.step() {
                StepOutcome::Idle => {}
                StepOutcome::Carved {
                    from,
                    to,
                    direction,
                } => out_events.push(Event::PassageCarved {
                    from,
                    to,
                    direction,
                }),
                StepOutcome::Backtracked { from, to } => {
                    out_events.push(Event::Backtracked { from, to });
                }
                StepOutcome::Restarted { cell } => {
                    out_events.push(Event::ComponentStarted { cell });
                }
                StepOutcome::Finished => out_events.push(Event::ModeChanged {
                    mode: GenerationMode::Finished,
                }),
            }
            Ok(())
        }
    };

    if let Err(reason) = result {
        debug!("rejected {command:?}: {reason}");
        out_events.push(Event::CommandRejected { command, reason });
    }
}

/// Query functions that provide read-only access to the maze state.
pub mod query {
    use maze_carver_core::{CellCoord, CellSnapshot, GenerationMode, MazeError};

    use super::Maze;

    /// Captures the walls and flags of a single cell.
    pub fn cell<R>(maze: &Maze<R>, cell: CellCoord) -> Result<CellSnapshot, MazeError> {
        maze.grid
            .get(cell)
            .map(super::grid::Cell::snapshot)
            .ok_or(MazeError::OutOfRange {
                cell,
                columns: maze.grid.columns(),
                rows: maze.grid.rows(),
            })
    }

    /// Captures every cell in row-major order.
    #[must_use]
    pub fn cells<R>(maze: &Maze<R>) -> Vec<CellSnapshot> {
        maze.grid
            .cells()
            .iter()
            .map(super::grid::Cell::snapshot)
            .collect()
    }

    /// Reports the current generation mode.
    #[must_use]
    pub fn mode<R>(maze: &Maze<R>) -> GenerationMode {
        maze.mode
    }

    /// Provides the grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions<R>(maze: &Maze<R>) -> (u32, u32) {
        (maze.grid.columns(), maze.grid.rows())
    }

    /// Backtrack path from the most recent restart point up to the carving head.
    #[must_use]
    pub fn backtrack_path<R>(maze: &Maze<R>) -> &[CellCoord] {
        &maze.stack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_carver_core::{Direction, Walls};

    fn running_maze(columns: u32, rows: u32, seed: u64) -> Maze {
        let mut maze = Maze::new(columns, rows, Some(seed));
        maze.begin().expect("input mode allows begin");
        maze
    }

    #[test]
    fn new_maze_starts_in_input_mode_with_closed_cells() {
        let maze = Maze::new(5, 4, Some(1));

        assert_eq!(maze.mode(), GenerationMode::Input);
        assert_eq!(query::dimensions(&maze), (5, 4));
        assert_eq!(maze.stack_depth(), 0);
        let cells = query::cells(&maze);
        assert_eq!(cells.len(), 20);
        assert!(cells
            .iter()
            .all(|cell| cell.walls.is_closed() && !cell.locked && !cell.visited));
    }

    #[test]
    fn begin_seeds_the_top_left_cell() {
        let maze = running_maze(3, 3, 2);

        assert_eq!(maze.active_cell(), Some(CellCoord::new(0, 0)));
        let entry = query::cell(&maze, CellCoord::new(0, 0)).expect("in range");
        assert!(entry.visited && entry.active && entry.on_stack);
    }

    #[test]
    fn locked_entry_defers_seeding_to_first_step() {
        let mut maze = Maze::new(3, 1, Some(9));
        assert_eq!(maze.lock(CellCoord::new(0, 0)), Ok(true));
        maze.begin().expect("begin");

        assert_eq!(maze.stack_depth(), 0);
        let outcome = maze.step();
        let StepOutcome::Restarted { cell } = outcome else {
            panic!("expected a restart, got {outcome:?}");
        };
        assert_ne!(cell, CellCoord::new(0, 0));
        assert_eq!(maze.active_cell(), Some(cell));
    }

    #[test]
    fn single_cell_finishes_on_first_step() {
        let mut maze = running_maze(1, 1, 4);

        assert_eq!(maze.step(), StepOutcome::Finished);
        assert_eq!(maze.mode(), GenerationMode::Finished);
        assert_eq!(maze.stack_depth(), 0);
        let cell = query::cell(&maze, CellCoord::new(0, 0)).expect("in range");
        assert_eq!(cell.walls, Walls::ALL);
        assert!(cell.visited && !cell.active && !cell.on_stack);
        assert_eq!(maze.step(), StepOutcome::Idle);
    }

    #[test]
    fn empty_grid_finishes_immediately() {
        let mut maze = running_maze(0, 3, 4);

        assert_eq!(maze.step(), StepOutcome::Finished);
        assert!(query::cells(&maze).is_empty());
    }

    #[test]
    fn two_cells_carve_then_backtrack_then_finish() {
        let mut maze = running_maze(2, 1, 8);

        assert_eq!(
            maze.step(),
            StepOutcome::Carved {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 0),
                direction: Direction::East,
            }
        );
        assert_eq!(
            maze.step(),
            StepOutcome::Backtracked {
                from: CellCoord::new(1, 0),
                to: CellCoord::new(0, 0),
            }
        );
        assert_eq!(maze.step(), StepOutcome::Finished);

        let left = query::cell(&maze, CellCoord::new(0, 0)).expect("in range");
        let right = query::cell(&maze, CellCoord::new(1, 0)).expect("in range");
        assert_eq!(left.walls.bits(), 11);
        assert_eq!(right.walls.bits(), 7);
    }

    #[test]
    fn step_is_idle_outside_running_mode() {
        let mut maze = Maze::new(3, 3, Some(5));
        assert_eq!(maze.step(), StepOutcome::Idle);

        maze.begin().expect("begin");
        maze.pause().expect("pause");
        let before = query::cells(&maze);
        assert_eq!(maze.step(), StepOutcome::Idle);
        assert_eq!(query::cells(&maze), before);
    }

    #[test]
    fn mode_transitions_reject_incompatible_requests() {
        let mut maze = Maze::new(2, 2, Some(6));

        assert_eq!(
            maze.resume(),
            Err(MazeError::InvalidModeTransition {
                from: GenerationMode::Input,
                to: GenerationMode::Running,
            })
        );
        assert_eq!(
            maze.pause(),
            Err(MazeError::InvalidModeTransition {
                from: GenerationMode::Input,
                to: GenerationMode::Paused,
            })
        );
        maze.begin().expect("begin");
        assert!(maze.begin().is_err());
        maze.pause().expect("pause");
        assert!(maze.pause().is_err());
        maze.resume().expect("resume");
        assert_eq!(maze.mode(), GenerationMode::Running);
    }

    #[test]
    fn out_of_range_cells_are_rejected_without_mutation() {
        let mut maze = Maze::new(3, 2, Some(7));
        let outside = CellCoord::new(3, 0);
        let expected = MazeError::OutOfRange {
            cell: outside,
            columns: 3,
            rows: 2,
        };

        assert_eq!(maze.lock(outside), Err(expected));
        assert_eq!(maze.unlock(outside), Err(expected));
        assert_eq!(maze.select_connected_region(outside), Err(expected));
        assert_eq!(maze.lock_region(outside), Err(expected));
        assert_eq!(query::cell(&maze, outside), Err(expected));
        assert!(query::cells(&maze).iter().all(|cell| !cell.locked));
    }

    #[test]
    fn lock_edits_are_ignored_after_input_mode() {
        let mut maze = running_maze(3, 3, 10);
        let cell = CellCoord::new(2, 2);

        assert_eq!(maze.lock(cell), Ok(false));
        assert!(!maze.lock_all());
        assert_eq!(maze.lock_region(cell), Ok(Vec::new()));
        assert!(query::cells(&maze).iter().all(|snapshot| !snapshot.locked));
    }

    #[test]
    fn unlock_edits_are_ignored_while_paused() {
        let mut maze = Maze::new(3, 3, Some(14));
        let cell = CellCoord::new(1, 2);
        assert_eq!(maze.lock(cell), Ok(true));
        maze.begin().expect("begin");
        maze.pause().expect("pause");

        assert_eq!(maze.unlock(cell), Ok(false));
        assert!(!maze.unlock_all());
        assert!(query::cell(&maze, cell).expect("in range").locked);
        assert_eq!(query::cells(&maze).iter().filter(|c| c.locked).count(), 1);
    }

    #[test]
    fn finished_maze_rejects_pause_and_resume() {
        let mut maze = running_maze(1, 1, 15);
        assert_eq!(maze.step(), StepOutcome::Finished);

        assert_eq!(
            maze.pause(),
            Err(MazeError::InvalidModeTransition {
                from: GenerationMode::Finished,
                to: GenerationMode::Paused,
            })
        );
        assert_eq!(
            maze.resume(),
            Err(MazeError::InvalidModeTransition {
                from: GenerationMode::Finished,
                to: GenerationMode::Running,
            })
        );
        assert_eq!(maze.mode(), GenerationMode::Finished);
    }

    #[test]
    fn lock_all_and_unlock_all_toggle_every_cell() {
        let mut maze = Maze::new(3, 3, Some(12));

        assert!(maze.lock_all());
        assert!(query::cells(&maze).iter().all(|cell| cell.locked));
        assert!(maze.unlock_all());
        assert!(query::cells(&maze).iter().all(|cell| !cell.locked));
    }

    #[test]
    fn fully_locked_grid_finishes_without_visiting() {
        let mut maze = Maze::new(3, 3, Some(13));
        assert!(maze.lock_all());
        maze.begin().expect("begin");

        assert_eq!(maze.step(), StepOutcome::Finished);
        assert_eq!(maze.visited_count(), 0);
    }

    #[test]
    fn lock_region_locks_only_the_enclosed_island() {
        let mut maze = Maze::new(4, 4, Some(14));
        for row in 0..4 {
            assert_eq!(maze.lock(CellCoord::new(1, row)), Ok(true));
        }

        let locked = maze.lock_region(CellCoord::new(0, 2)).expect("in range");

        assert_eq!(locked.len(), 4);
        assert!(locked.iter().all(|cell| cell.column() == 0));
        let unlocked = query::cells(&maze)
            .into_iter()
            .filter(|cell| !cell.locked)
            .count();
        assert_eq!(unlocked, 8);
    }

    #[test]
    fn apply_reports_rejections_as_events() {
        let mut maze = Maze::new(2, 2, Some(15));
        let mut events = Vec::new();

        apply(&mut maze, Command::Pause, &mut events);
        apply(
            &mut maze,
            Command::Lock {
                cell: CellCoord::new(5, 5),
            },
            &mut events,
        );

        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::CommandRejected {
                command: Command::Pause,
                reason: MazeError::InvalidModeTransition { .. },
            }
        ));
        assert!(matches!(
            events[1],
            Event::CommandRejected {
                reason: MazeError::OutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn apply_emits_nothing_for_no_ops() {
        let mut maze = Maze::new(2, 2, Some(16));
        let mut events = Vec::new();

        apply(&mut maze, Command::Step, &mut events);
        apply(&mut maze, Command::Begin, &mut events);
        assert_eq!(
            events,
            vec![Event::ModeChanged {
                mode: GenerationMode::Running,
            }]
        );

        events.clear();
        apply(&mut maze, Command::UnlockAll, &mut events);
        apply(
            &mut maze,
            Command::Lock {
                cell: CellCoord::new(1, 1),
            },
            &mut events,
        );
        assert!(events.is_empty());
    }
}
