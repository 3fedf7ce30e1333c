//! Pure step selection toward a target cell.
//!
//! Movement is a greedy local walk, not pathfinding: each tick an agent
//! considers at most three neighbor cells biased toward its target and the
//! caller picks one of the walkable ones at random. An irregular walkable
//! mask therefore produces organic-looking drift instead of straight lines.

use crate::grid::CellPos;

/// Candidate next cells stepping toward `target` from `pos`: the horizontal
/// step, the vertical step, and the diagonal when both axes differ. Empty
/// when already at the target.
pub fn step_candidates(pos: CellPos, target: CellPos) -> Vec<CellPos> {
    let dx = (target.x - pos.x).signum();
    let dy = (target.y - pos.y).signum();
    let mut out = Vec::with_capacity(3);
    if dx != 0 {
        out.push(CellPos::new(pos.x + dx, pos.y));
    }
    if dy != 0 {
        out.push(CellPos::new(pos.x, pos.y + dy));
    }
    if dx != 0 && dy != 0 {
        out.push(CellPos::new(pos.x + dx, pos.y + dy));
    }
    out
}

/// Unit facing vector derived from the previous position. `(0, 0)` when the
/// agent has not moved.
pub fn facing(prev: CellPos, current: CellPos) -> (i32, i32) {
    ((current.x - prev.x).signum(), (current.y - prev.y).signum())
}
