use crate::error::Result;
use crate::geometry::{Direction, Position};
use crate::grid::LayerKind;

use super::core::LayeredMap;

/// Floor value meaning "no tile".
pub const EMPTY: u8 = 0;
/// Floor or wall value meaning "solid".
pub const SOLID: u8 = 1;

/// Wall cell bounding `position` on its `direction` side.
///
/// Neighbouring tiles resolve their shared edge to the same cell: the south
/// wall of `(x, y)` and the north wall of `(x, y + 1)` are both `wallH(x, y + 1)`.
pub(crate) fn wall_cell(position: Position, direction: Direction) -> (LayerKind, u32, u32) {
    let Position { x, y } = position;
    match direction {
        Direction::North => (LayerKind::WallH, x, y),
        Direction::South => (LayerKind::WallH, x, y + 1),
        Direction::West => (LayerKind::WallV, x, y),
        Direction::East => (LayerKind::WallV, x + 1, y),
    }
}

/// Which part of a tile an edit targets. Classifying a pointer into a zone is
/// left to the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditZone {
    /// The edge band on one side: toggles that wall.
    Edge(Direction),
    /// Anywhere else: toggles the floor cell.
    Interior,
}

/// Read-only handle to one tile. Holds no data of its own; every accessor
/// reads through to the map's layers.
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    map: &'a LayeredMap,
    position: Position,
}

impl<'a> Tile<'a> {
    /// `position` must lie inside the map.
    pub(crate) fn new(map: &'a LayeredMap, position: Position) -> Self {
        Self { map, position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Floor value (tile kind).
    pub fn kind(&self) -> u8 {
        self.map
            .layout()
            .floor()
            .get_unchecked(self.map.as_bytes(), self.position.x, self.position.y)
    }

    pub fn wall(&self, direction: Direction) -> u8 {
        let (layer, x, y) = wall_cell(self.position, direction);
        self.map
            .layout()
            .view(layer)
            .get_unchecked(self.map.as_bytes(), x, y)
    }

    pub fn north(&self) -> u8 {
        self.wall(Direction::North)
    }

    pub fn east(&self) -> u8 {
        self.wall(Direction::East)
    }

    pub fn south(&self) -> u8 {
        self.wall(Direction::South)
    }

    pub fn west(&self) -> u8 {
        self.wall(Direction::West)
    }

    /// Walls in `N, E, S, W` order.
    pub fn walls(&self) -> [u8; 4] {
        Direction::ALL.map(|direction| self.wall(direction))
    }

    pub fn is_enclosed(&self) -> bool {
        self.walls().iter().all(|&wall| wall == SOLID)
    }
}

/// Mutable handle to one tile. Each write goes through the map and raises
/// its own change signal.
#[derive(Debug)]
pub struct TileMut<'a> {
    map: &'a mut LayeredMap,
    position: Position,
}

impl<'a> TileMut<'a> {
    pub(crate) fn new(map: &'a mut LayeredMap, position: Position) -> Self {
        Self { map, position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn as_tile(&self) -> Tile<'_> {
        Tile::new(&*self.map, self.position)
    }

    pub fn set_kind(&mut self, value: u8) -> Result<()> {
        self.map.set_type_at(self.position.x, self.position.y, value)
    }

    pub fn toggle_kind(&mut self) -> Result<u8> {
        self.map.toggle_type_at(self.position.x, self.position.y)
    }

    pub fn set_wall(&mut self, direction: Direction, value: u8) -> Result<()> {
        self.map.set_wall_at(self.position.x, self.position.y, direction, value)
    }

    pub fn toggle_wall(&mut self, direction: Direction) -> Result<u8> {
        self.map.toggle_wall_at(self.position.x, self.position.y, direction)
    }

    /// Set all four walls. This is four writes and four signals; neighbours
    /// see their facing walls change too.
    pub fn fill_walls(&mut self, value: u8) -> Result<()> {
        for direction in Direction::ALL {
            self.set_wall(direction, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    #[test]
    fn wall_cells_follow_the_sharing_rule() {
        let p = Position::new(2, 3);
        assert_eq!(wall_cell(p, Direction::North), (LayerKind::WallH, 2, 3));
        assert_eq!(wall_cell(p, Direction::South), (LayerKind::WallH, 2, 4));
        assert_eq!(wall_cell(p, Direction::West), (LayerKind::WallV, 2, 3));
        assert_eq!(wall_cell(p, Direction::East), (LayerKind::WallV, 3, 3));
        assert_eq!(
            wall_cell(p, Direction::South),
            wall_cell(Position::new(2, 4), Direction::North)
        );
        assert_eq!(
            wall_cell(p, Direction::East),
            wall_cell(Position::new(3, 3), Direction::West)
        );
    }

    #[test]
    fn tile_reads_through_to_the_map() {
        let mut map = LayeredMap::new(Size::new(3, 2)).unwrap();
        map.set_type_at(1, 1, 4).unwrap();
        map.set_wall_at(1, 1, Direction::East, 0).unwrap();

        let tile = map.tile(1, 1).unwrap();
        assert_eq!(tile.kind(), 4);
        assert_eq!(tile.walls(), [1, 0, 1, 1]);
        assert!(!tile.is_enclosed());
        assert_eq!(map.tile(2, 1).unwrap().west(), 0);
    }

    #[test]
    fn fill_walls_opens_the_neighbours_too() {
        let mut map = LayeredMap::new(Size::new(3, 3)).unwrap();
        let before = map.revision();
        map.tile_mut(1, 1).unwrap().fill_walls(EMPTY).unwrap();

        assert_eq!(map.revision() - before, 4);
        assert_eq!(map.tile(1, 0).unwrap().south(), EMPTY);
        assert_eq!(map.tile(1, 2).unwrap().north(), EMPTY);
        assert_eq!(map.tile(0, 1).unwrap().east(), EMPTY);
        assert_eq!(map.tile(2, 1).unwrap().west(), EMPTY);
        assert!(map.tile(0, 0).unwrap().is_enclosed());
    }

    #[test]
    fn tile_mut_toggles() {
        let mut map = LayeredMap::new(Size::new(2, 2)).unwrap();
        let mut tile = map.tile_mut(0, 0).unwrap();
        assert_eq!(tile.toggle_kind().unwrap(), SOLID);
        assert_eq!(tile.toggle_wall(Direction::North).unwrap(), EMPTY);
        assert_eq!(tile.as_tile().north(), EMPTY);
        tile.set_kind(9).unwrap();
        assert_eq!(tile.as_tile().kind(), 9);
        assert!(tile.set_wall(Direction::West, 3).is_err());
    }
}
