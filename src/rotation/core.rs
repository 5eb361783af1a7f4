//! Quarter-turn rotation of a packed layer set.
//!
//! All three layers turn about the floor's frame. For a `W x H` floor the
//! remap of a cell `(x, y)` is
//!
//! * clockwise: `(y, W - 1 - x)`, i.e. `new(x, y) = old(H' - 1 - y, x)`
//! * counter-clockwise: `(H - 1 - y, x)`, i.e. `new(x, y) = old(y, W' - 1 - x)`
//!
//! where `W' = H` and `H' = W` are the turned floor extents. Each layer is
//! remapped into its own scratch buffer and only written back once every
//! layer has been computed.
//!
//! A quarter turn exchanges "horizontal" and "vertical", so the wallH and
//! wallV descriptors swap roles afterwards. The byte regions stay where they
//! are; only the views that address them change.
//!
//! Wall layers are one cell longer than the floor across their own axis. The
//! floor frame maps that extra row or column to `-1`, so one of the turned
//! wall layers is off by one cell. Following the sharing rule
//! (`South(x, y) == North(x, y + 1)`) through the turn fixes the offset:
//!
//! * clockwise, the old wallV becomes wallH and shifts `+1` in `y`
//! * counter-clockwise, the old wallH becomes wallV and shifts `+1` in `x`
//!
//! Without the shift the walls drift one row or column per turn relative to
//! the floor.

use crate::error::Result;
use crate::geometry::{Position, Size, Turn};
use crate::grid::{GridError, GridView, LayerKind, LayerLayout, LayerRef};

/// One-cell translation applied to the layer now serving as `role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correction {
    pub role: LayerKind,
    pub dx: u32,
    pub dy: u32,
}

/// Stateless rotation routines for a [`LayerLayout`] and its buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RotationEngine;

impl RotationEngine {
    pub fn correction(turn: Turn) -> Correction {
        match turn {
            Turn::Clockwise => Correction {
                role: LayerKind::WallH,
                dx: 0,
                dy: 1,
            },
            Turn::CounterClockwise => Correction {
                role: LayerKind::WallV,
                dx: 1,
                dy: 0,
            },
        }
    }

    /// Where the tile at `position` of a `size` map lands after `turn`.
    pub fn rotated_position(
        position: Position,
        size: Size,
        turn: Turn,
    ) -> std::result::Result<Position, GridError> {
        if !size.contains(position) {
            return Err(GridError::OutOfBounds {
                layer: LayerKind::Floor,
                x: position.x,
                y: position.y,
                width: size.width,
                height: size.height,
            });
        }
        Ok(match turn {
            Turn::Clockwise => Position::new(position.y, size.width - 1 - position.x),
            Turn::CounterClockwise => Position::new(size.height - 1 - position.y, position.x),
        })
    }

    /// Rotate every layer of `bytes` in place and return the turned layout.
    ///
    /// The buffer is left untouched if any layer fails to remap.
    pub fn rotate(bytes: &mut [u8], layout: &LayerLayout, turn: Turn) -> Result<LayerLayout> {
        let frame = layout.size();
        let turned = LayerLayout::from_views(
            layout.floor().quarter_turned(LayerKind::Floor),
            layout.wall_v().quarter_turned(LayerKind::WallH),
            layout.wall_h().quarter_turned(LayerKind::WallV),
            layout.total_len(),
        )?;

        let correction = Self::correction(turn);
        let mut scratch = Vec::with_capacity(LayerKind::ALL.len());
        for (source, target) in [
            (layout.floor(), turned.floor()),
            (layout.wall_v(), turned.wall_h()),
            (layout.wall_h(), turned.wall_v()),
        ] {
            let shift = if target.kind() == correction.role {
                (correction.dx, correction.dy)
            } else {
                (0, 0)
            };
            scratch.push((target, remap(bytes, source, target, frame, turn, shift)?));
        }

        for (target, cells) in scratch {
            bytes[target.byte_range()].copy_from_slice(&cells);
        }
        Ok(turned)
    }
}

fn pivot(x: u32, y: u32, frame: Size, turn: Turn) -> (i64, i64) {
    let (x, y) = (i64::from(x), i64::from(y));
    match turn {
        Turn::Clockwise => (y, i64::from(frame.width) - 1 - x),
        Turn::CounterClockwise => (i64::from(frame.height) - 1 - y, x),
    }
}

fn remap(
    bytes: &[u8],
    source: GridView,
    target: GridView,
    frame: Size,
    turn: Turn,
    shift: (u32, u32),
) -> std::result::Result<Vec<u8>, GridError> {
    let mut cells = vec![0u8; target.len()];
    for (x, y, value) in LayerRef::new(source, bytes)?.cells() {
        let (px, py) = pivot(x, y, frame, turn);
        let tx = px + i64::from(shift.0);
        let ty = py + i64::from(shift.1);
        if tx < 0 || ty < 0 || tx >= i64::from(target.width()) || ty >= i64::from(target.height())
        {
            return Err(GridError::OutOfBounds {
                layer: target.kind(),
                x: u32::try_from(tx).unwrap_or(u32::MAX),
                y: u32::try_from(ty).unwrap_or(u32::MAX),
                width: target.width(),
                height: target.height(),
            });
        }
        cells[ty as usize * target.width() as usize + tx as usize] = value;
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;
    use crate::map::LayeredMap;

    /// Deterministic, asymmetric contents: distinct floor kinds and an
    /// irregular wall pattern.
    fn patterned(size: Size) -> LayeredMap {
        let mut map = LayeredMap::new(size).unwrap();
        for y in 0..size.height {
            for x in 0..size.width {
                map.set_type_at(x, y, (y * size.width + x + 2) as u8).unwrap();
            }
        }
        for (index, (x, y, _)) in map
            .layer(LayerKind::WallH)
            .cells()
            .collect::<Vec<_>>()
            .into_iter()
            .enumerate()
        {
            map.set_cell(LayerKind::WallH, x, y, (index % 3 == 0) as u8).unwrap();
        }
        for (index, (x, y, _)) in map
            .layer(LayerKind::WallV)
            .cells()
            .collect::<Vec<_>>()
            .into_iter()
            .enumerate()
        {
            map.set_cell(LayerKind::WallV, x, y, (index % 2 == 1) as u8).unwrap();
        }
        map
    }

    fn tile_snapshot(map: &LayeredMap) -> Vec<(Position, u8, [u8; 4])> {
        map.tiles()
            .map(|tile| (tile.position(), tile.kind(), tile.walls()))
            .collect()
    }

    #[test]
    fn corrections_follow_the_turn() {
        assert_eq!(
            RotationEngine::correction(Turn::Clockwise),
            Correction {
                role: LayerKind::WallH,
                dx: 0,
                dy: 1
            }
        );
        assert_eq!(
            RotationEngine::correction(Turn::CounterClockwise).role,
            LayerKind::WallV
        );
    }

    #[test]
    fn rotated_position_matches_the_floor_formula() {
        let size = Size::new(3, 2);
        let cw = |x, y| {
            RotationEngine::rotated_position(Position::new(x, y), size, Turn::Clockwise)
        };
        assert_eq!(cw(0, 0), Ok(Position::new(0, 2)));
        assert_eq!(cw(2, 1), Ok(Position::new(1, 0)));
        assert_eq!(
            RotationEngine::rotated_position(Position::new(0, 0), size, Turn::CounterClockwise),
            Ok(Position::new(1, 0))
        );
    }

    #[test]
    fn rotated_position_rejects_tiles_outside_the_map() {
        let size = Size::new(3, 2);
        for turn in [Turn::Clockwise, Turn::CounterClockwise] {
            assert_eq!(
                RotationEngine::rotated_position(Position::new(5, 0), size, turn),
                Err(GridError::OutOfBounds {
                    layer: LayerKind::Floor,
                    x: 5,
                    y: 0,
                    width: 3,
                    height: 2,
                })
            );
            assert!(RotationEngine::rotated_position(Position::new(0, 2), size, turn).is_err());
        }
    }

    #[test]
    fn uniform_two_by_two_is_value_invariant() {
        let mut map = LayeredMap::new(Size::new(2, 2)).unwrap();
        let wall_h_before = map.view(LayerKind::WallH);
        let wall_v_before = map.view(LayerKind::WallV);

        map.rotate_cw().unwrap();

        assert_eq!(map.direction(), Direction::East);
        assert_eq!(map.view(LayerKind::WallH).offset(), wall_v_before.offset());
        assert_eq!(map.view(LayerKind::WallV).offset(), wall_h_before.offset());
        assert!(map.layer(LayerKind::Floor).cells().all(|(_, _, v)| v == 0));
        assert!(map.layer(LayerKind::WallH).cells().all(|(_, _, v)| v == 1));
        assert!(map.layer(LayerKind::WallV).cells().all(|(_, _, v)| v == 1));
    }

    #[test]
    fn floor_follows_the_stated_formula() {
        // A B      B D
        // C D  ->  A C
        let mut map = LayeredMap::new(Size::new(2, 2)).unwrap();
        for (x, y, v) in [(0, 0, 10), (1, 0, 11), (0, 1, 12), (1, 1, 13)] {
            map.set_type_at(x, y, v).unwrap();
        }
        map.rotate_cw().unwrap();
        assert_eq!(
            map.layer(LayerKind::Floor).to_rows(),
            vec![vec![11, 13], vec![10, 12]]
        );
    }

    #[test]
    fn four_turns_restore_the_map() {
        for size in [Size::new(2, 2), Size::new(3, 2), Size::new(1, 5), Size::new(4, 7)] {
            for turn in [Turn::Clockwise, Turn::CounterClockwise] {
                let mut map = patterned(size);
                let bytes = map.as_bytes().to_vec();
                let layout = *map.layout();

                for step in 1..=4 {
                    map.rotate(turn).unwrap();
                    if step < 4 {
                        assert_ne!(map.direction(), Direction::North);
                    }
                }

                assert_eq!(map.direction(), Direction::North);
                assert_eq!(map.size(), size);
                assert_eq!(*map.layout(), layout);
                assert_eq!(map.as_bytes(), &bytes[..], "{size:?} {turn:?}");
            }
        }
    }

    #[test]
    fn turn_and_inverse_cancel() {
        let mut map = patterned(Size::new(5, 3));
        let bytes = map.as_bytes().to_vec();
        map.rotate_cw().unwrap();
        map.rotate_ccw().unwrap();
        assert_eq!(map.direction(), Direction::North);
        assert_eq!(map.as_bytes(), &bytes[..]);
    }

    #[test]
    fn rotation_keeps_walls_between_the_same_tiles() {
        for turn in [Turn::Clockwise, Turn::CounterClockwise] {
            let size = Size::new(4, 3);
            let mut map = patterned(size);
            let before = tile_snapshot(&map);

            map.rotate(turn).unwrap();
            assert_eq!(map.size(), size.transposed());

            for (position, kind, walls) in before {
                let moved = RotationEngine::rotated_position(position, size, turn).unwrap();
                let tile = map.tile(moved.x, moved.y).unwrap();
                assert_eq!(tile.kind(), kind);
                for direction in Direction::ALL {
                    // The compass turns with the view: what was north of the
                    // tile sits one step the other way after the turn.
                    let relabelled = direction.turned(turn.inverse());
                    assert_eq!(
                        tile.wall(relabelled),
                        walls[direction.index() as usize],
                        "{turn:?} {position:?} {direction:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn wall_sharing_survives_rotation() {
        let mut map = patterned(Size::new(3, 4));
        for _ in 0..3 {
            map.rotate_cw().unwrap();
            let Size { width, height } = map.size();
            for y in 0..height {
                for x in 0..width {
                    if y + 1 < height {
                        assert_eq!(
                            map.wall_at(x, y, Direction::South).unwrap(),
                            map.wall_at(x, y + 1, Direction::North).unwrap()
                        );
                    }
                    if x + 1 < width {
                        assert_eq!(
                            map.wall_at(x, y, Direction::East).unwrap(),
                            map.wall_at(x + 1, y, Direction::West).unwrap()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn rotation_raises_one_signal() {
        let mut map = patterned(Size::new(3, 2));
        let before = map.revision();
        map.rotate_ccw().unwrap();
        assert_eq!(map.revision(), before + 1);
        assert_eq!(map.metrics().rotations, 1);
        assert_eq!(map.direction(), Direction::West);
    }
}
