//! Terrain grid and room data for the hotel floor.
//!
//! The grid is built once at generation time and read-only afterwards.
//! Cells tag terrain only; everything that moves lives in the engine crate.

use serde::{Deserialize, Serialize};

/// Terrain tag for a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Wall,
    LobbyFloor,
    ReceptionDesk,
    GardenPath,
    GardenPlant,
    GardenWater,
    RoomFloor,
    RoomWall,
    RoomDoor,
    RoomFurniture,
    ServiceHub,
}

impl Cell {
    /// Whether an agent may stand on this cell.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            Cell::LobbyFloor
                | Cell::RoomFloor
                | Cell::GardenPath
                | Cell::RoomDoor
                | Cell::ReceptionDesk
                | Cell::ServiceHub
        )
    }
}

/// Integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another cell.
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Row-major terrain grid with fixed dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid filled with [`Cell::Empty`].
    pub fn new(width: i32, height: i32) -> Self {
        let count = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            width: width.max(0),
            height: height.max(0),
            cells: vec![Cell::Empty; count],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Read a cell. Returns `None` outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if self.in_bounds(x, y) {
            Some(self.cells[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Write a cell. Out-of-bounds writes are silently clipped.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if self.in_bounds(x, y) {
            self.cells[(y * self.width + x) as usize] = cell;
        }
    }

    /// Fill an inclusive rectangle, clipping at the grid edges.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cell: Cell) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set(x, y, cell);
            }
        }
    }

    /// Walkability oracle: false outside bounds, otherwise per the
    /// cell's allow-set.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(false, Cell::is_walkable)
    }

    /// Count cells matching a predicate.
    pub fn count_cells(&self, pred: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|c| pred(**c)).count()
    }
}

/// Room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Suite,
    Lobby,
    Garden,
    Service,
}

/// A named rectangular region of the floor plan. Immutable after generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub name: String,
    pub kind: RoomKind,
    /// Inclusive top-left corner.
    pub min: CellPos,
    /// Inclusive bottom-right corner.
    pub max: CellPos,
}

impl Room {
    pub fn new(id: u32, name: impl Into<String>, kind: RoomKind, min: CellPos, max: CellPos) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            min,
            max,
        }
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    pub fn center(&self) -> CellPos {
        CellPos::new((self.min.x + self.max.x) / 2, (self.min.y + self.max.y) / 2)
    }

    pub fn area(&self) -> i64 {
        let w = (self.max.x - self.min.x + 1) as i64;
        let h = (self.max.y - self.min.y + 1) as i64;
        w * h
    }
}

/// The room containing `pos`, preferring the most specific (smallest) one
/// when regions nest — the reception desk and garden court sit inside the
/// atrium's bounds.
pub fn room_at(rooms: &[Room], pos: CellPos) -> Option<&Room> {
    rooms
        .iter()
        .filter(|r| r.contains(pos))
        .min_by_key(|r| r.area())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_get_is_none() {
        let grid = Grid::new(4, 3);
        assert_eq!(grid.get(-1, 0), None);
        assert_eq!(grid.get(4, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.get(0, 0), Some(Cell::Empty));
    }

    #[test]
    fn out_of_bounds_set_is_clipped() {
        let mut grid = Grid::new(4, 3);
        grid.set(-1, 0, Cell::Wall);
        grid.set(100, 100, Cell::Wall);
        assert_eq!(grid.count_cells(|c| c == Cell::Wall), 0);
        grid.set(2, 2, Cell::Wall);
        assert_eq!(grid.get(2, 2), Some(Cell::Wall));
    }

    #[test]
    fn fill_rect_clips_at_edges() {
        let mut grid = Grid::new(4, 4);
        grid.fill_rect(2, 2, 10, 10, Cell::LobbyFloor);
        assert_eq!(grid.count_cells(|c| c == Cell::LobbyFloor), 4);
    }

    #[test]
    fn walkable_allow_set() {
        for cell in [
            Cell::LobbyFloor,
            Cell::RoomFloor,
            Cell::GardenPath,
            Cell::RoomDoor,
            Cell::ReceptionDesk,
            Cell::ServiceHub,
        ] {
            assert!(cell.is_walkable(), "{cell:?} should be walkable");
        }
        for cell in [
            Cell::Empty,
            Cell::Wall,
            Cell::GardenPlant,
            Cell::GardenWater,
            Cell::RoomWall,
            Cell::RoomFurniture,
        ] {
            assert!(!cell.is_walkable(), "{cell:?} should not be walkable");
        }
    }

    #[test]
    fn walkability_false_outside_bounds() {
        let mut grid = Grid::new(2, 2);
        grid.fill_rect(0, 0, 1, 1, Cell::LobbyFloor);
        assert!(grid.is_walkable(0, 0));
        assert!(!grid.is_walkable(-1, 0));
        assert!(!grid.is_walkable(2, 0));
    }

    #[test]
    fn chebyshev_distance() {
        let a = CellPos::new(3, 4);
        assert_eq!(a.chebyshev(&CellPos::new(3, 4)), 0);
        assert_eq!(a.chebyshev(&CellPos::new(5, 4)), 2);
        assert_eq!(a.chebyshev(&CellPos::new(1, 9)), 5);
    }

    #[test]
    fn room_contains_and_center() {
        let room = Room::new(0, "Atrium", RoomKind::Lobby, CellPos::new(2, 2), CellPos::new(8, 6));
        assert!(room.contains(CellPos::new(2, 2)));
        assert!(room.contains(CellPos::new(8, 6)));
        assert!(!room.contains(CellPos::new(9, 6)));
        assert_eq!(room.center(), CellPos::new(5, 4));
    }

    #[test]
    fn room_at_prefers_smallest() {
        let atrium = Room::new(0, "Atrium", RoomKind::Lobby, CellPos::new(0, 0), CellPos::new(20, 20));
        let desk = Room::new(1, "Reception", RoomKind::Lobby, CellPos::new(4, 4), CellPos::new(7, 5));
        let rooms = vec![atrium, desk];
        assert_eq!(room_at(&rooms, CellPos::new(5, 4)).map(|r| r.id), Some(1));
        assert_eq!(room_at(&rooms, CellPos::new(15, 15)).map(|r| r.id), Some(0));
        assert_eq!(room_at(&rooms, CellPos::new(40, 40)).map(|r| r.id), None);
    }
}
