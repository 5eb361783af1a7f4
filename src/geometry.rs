use serde::{Deserialize, Serialize};

/// Map extent measured in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Extent after a quarter turn.
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    pub const fn is_square(self) -> bool {
        self.width == self.height
    }

    pub fn contains(self, position: Position) -> bool {
        position.x < self.width && position.y < self.height
    }
}

/// Tile coordinate, `x` grows east and `y` grows south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Position {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// Cardinal direction. Doubles as the map's rotation indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub const fn index(self) -> u8 {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub const fn from_index(index: u8) -> Self {
        match index % 4 {
            0 => Direction::North,
            1 => Direction::East,
            2 => Direction::South,
            _ => Direction::West,
        }
    }

    /// Advance one step (mod 4) in the sense of `turn`.
    pub const fn turned(self, turn: Turn) -> Self {
        let step = match turn {
            Turn::Clockwise => 1,
            Turn::CounterClockwise => 3,
        };
        Self::from_index(self.index() + step)
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }

    pub const fn short_name(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

/// Quarter-turn sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

impl Turn {
    pub const fn inverse(self) -> Self {
        match self {
            Turn::Clockwise => Turn::CounterClockwise,
            Turn::CounterClockwise => Turn::Clockwise,
        }
    }
}
