//! Flood fill that gathers the unlocked island surrounding a cell.

use maze_carver_core::CellCoord;
use rand::{seq::SliceRandom, Rng};

use crate::grid::Grid;

/// Collects every unlocked cell 4-connected to `origin`, ignoring walls.
///
/// The walk mirrors carving: it keeps a private trail, extends it into a
/// random unclaimed neighbour, and retreats when the frontier runs dry. Claims
/// live in a scratch bitmap so the persistent cell flags are never touched. A
/// locked or out-of-range origin yields an empty region.
pub(crate) fn connected_region<R>(grid: &Grid, origin: CellCoord, rng: &mut R) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    let Some(origin_index) = grid.index(origin) else {
        return Vec::new();
    };
    if grid.cells()[origin_index].locked {
        return Vec::new();
    }

    let mut in_region = vec![false; grid.cells().len()];
    in_region[origin_index] = true;
    let mut region = vec![origin];
    let mut trail = vec![origin];

    while let Some(&frontier) = trail.last() {
        let candidates = grid.eligible_neighbors(frontier, |index, _| in_region[index]);
        match candidates.choose(&mut *rng) {
            Some(&(_, next)) => {
                if let Some(index) = grid.index(next) {
                    in_region[index] = true;
                }
                region.push(next);
                trail.push(next);
            }
            None => {
                let _ = trail.pop();
            }
        }
    }

    region
}
