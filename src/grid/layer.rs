use std::fmt;

use crate::error::{MapError, Result};
use crate::geometry::Size;

use super::view::GridView;

/// The three layers packed into a map buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// One cell per tile.
    Floor,
    /// Walls running east-west; `wallH(x, y)` is the north edge of tile `(x, y)`.
    WallH,
    /// Walls running north-south; `wallV(x, y)` is the west edge of tile `(x, y)`.
    WallV,
}

impl LayerKind {
    /// Canonical buffer order.
    pub const ALL: [LayerKind; 3] = [LayerKind::Floor, LayerKind::WallH, LayerKind::WallV];

    pub const fn name(self) -> &'static str {
        match self {
            LayerKind::Floor => "floor",
            LayerKind::WallH => "wallH",
            LayerKind::WallV => "wallV",
        }
    }

    /// Walls are open (0) or solid (1); floor cells may carry any tile kind.
    pub const fn accepts(self, value: u8) -> bool {
        match self {
            LayerKind::Floor => true,
            LayerKind::WallH | LayerKind::WallV => value <= 1,
        }
    }

    pub const fn is_wall(self) -> bool {
        !matches!(self, LayerKind::Floor)
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placement of the floor and wall layers inside one buffer.
///
/// For a `W x H` map the layers are `floor = W x H`, `wallH = W x (H + 1)` and
/// `wallV = (W + 1) x H`, stored back to back in that order. Construction
/// asserts the partition invariant: the views are disjoint and their sizes
/// sum to the buffer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerLayout {
    floor: GridView,
    wall_h: GridView,
    wall_v: GridView,
    total: usize,
}

impl LayerLayout {
    pub fn for_size(size: Size) -> Result<Self> {
        let Size { width, height } = size;
        let invalid = || MapError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid());
        }

        let floor_len = width.checked_mul(height).ok_or_else(invalid)?;
        let wall_h_len = height
            .checked_add(1)
            .and_then(|rows| width.checked_mul(rows))
            .ok_or_else(invalid)?;
        let wall_v_len = width
            .checked_add(1)
            .and_then(|cols| cols.checked_mul(height))
            .ok_or_else(invalid)?;

        let wall_h_offset = floor_len;
        let wall_v_offset = wall_h_offset.checked_add(wall_h_len).ok_or_else(invalid)?;
        let total = wall_v_offset.checked_add(wall_v_len).ok_or_else(invalid)? as usize;

        let floor = GridView::packed(LayerKind::Floor, 0, width, height, total)?;
        let wall_h = GridView::packed(LayerKind::WallH, wall_h_offset, width, height + 1, total)?;
        let wall_v = GridView::packed(LayerKind::WallV, wall_v_offset, width + 1, height, total)?;

        Self::from_views(floor, wall_h, wall_v, total)
    }

    /// Assemble a layout from explicit views, checking the partition.
    pub fn from_views(
        floor: GridView,
        wall_h: GridView,
        wall_v: GridView,
        total: usize,
    ) -> Result<Self> {
        let layout = Self {
            floor,
            wall_h,
            wall_v,
            total,
        };
        layout.check_partition()?;
        Ok(layout)
    }

    pub fn floor(&self) -> GridView {
        self.floor
    }

    pub fn wall_h(&self) -> GridView {
        self.wall_h
    }

    pub fn wall_v(&self) -> GridView {
        self.wall_v
    }

    pub fn view(&self, kind: LayerKind) -> GridView {
        match kind {
            LayerKind::Floor => self.floor,
            LayerKind::WallH => self.wall_h,
            LayerKind::WallV => self.wall_v,
        }
    }

    /// Buffer length the layout partitions.
    pub fn total_len(&self) -> usize {
        self.total
    }

    /// Tile extent implied by the floor view.
    pub fn size(&self) -> Size {
        Size::new(self.floor.width(), self.floor.height())
    }

    fn check_partition(&self) -> Result<()> {
        let mut views = [self.floor, self.wall_h, self.wall_v];
        for (view, kind) in views.iter().zip(LayerKind::ALL) {
            if view.kind() != kind {
                return Err(MapError::Partition(format!(
                    "{} view is tagged as {}",
                    kind,
                    view.kind()
                )));
            }
        }

        let size = self.size();
        if (self.wall_h.width(), self.wall_h.height()) != (size.width, size.height + 1)
            || (self.wall_v.width(), self.wall_v.height()) != (size.width + 1, size.height)
        {
            return Err(MapError::Partition(format!(
                "wall layers do not match a {}x{} floor",
                size.width, size.height
            )));
        }

        views.sort_by_key(|view| view.offset());
        let mut cursor = 0usize;
        for view in views {
            if !view.is_packed() {
                return Err(MapError::Partition(format!(
                    "{} view is not packed",
                    view.kind()
                )));
            }
            let range = view.byte_range();
            if range.start != cursor {
                return Err(MapError::Partition(format!(
                    "{} starts at byte {} but the previous layer ends at {}",
                    view.kind(),
                    range.start,
                    cursor
                )));
            }
            cursor = range.end;
        }

        if cursor != self.total {
            return Err(MapError::Partition(format!(
                "layers cover {} bytes of a {}-byte buffer",
                cursor, self.total
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_offsets_for_ten_by_ten() {
        let layout = LayerLayout::for_size(Size::new(10, 10)).unwrap();
        assert_eq!(layout.floor().offset(), 0);
        assert_eq!(layout.wall_h().offset(), 100);
        assert_eq!(layout.wall_v().offset(), 210);
        assert_eq!(layout.total_len(), 320);
    }

    #[test]
    fn sizes_sum_to_buffer_length() {
        for (w, h) in [(1, 1), (2, 3), (7, 4), (16, 1)] {
            let layout = LayerLayout::for_size(Size::new(w, h)).unwrap();
            let sum: usize = LayerKind::ALL.iter().map(|k| layout.view(*k).len()).sum();
            assert_eq!(sum, layout.total_len());
            assert_eq!(layout.wall_h().len(), (w * (h + 1)) as usize);
            assert_eq!(layout.wall_v().len(), ((w + 1) * h) as usize);
        }
    }

    #[test]
    fn degenerate_and_overflowing_sizes_are_rejected() {
        assert!(matches!(
            LayerLayout::for_size(Size::new(0, 4)),
            Err(MapError::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            LayerLayout::for_size(Size::new(3, 0)),
            Err(MapError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            LayerLayout::for_size(Size::new(u32::MAX, 2)),
            Err(MapError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn overlapping_views_fail_the_partition_check() {
        let total = 4 + 6 + 6;
        let floor = GridView::packed(LayerKind::Floor, 0, 2, 2, total).unwrap();
        let wall_h = GridView::packed(LayerKind::WallH, 3, 2, 3, total).unwrap();
        let wall_v = GridView::packed(LayerKind::WallV, 10, 3, 2, total).unwrap();
        let err = LayerLayout::from_views(floor, wall_h, wall_v, total).unwrap_err();
        assert!(matches!(err, MapError::Partition(_)));
    }

    #[test]
    fn swapped_roles_fail_the_partition_check() {
        let layout = LayerLayout::for_size(Size::new(2, 2)).unwrap();
        let err = LayerLayout::from_views(
            layout.floor(),
            layout.wall_v(),
            layout.wall_h(),
            layout.total_len(),
        )
        .unwrap_err();
        assert!(matches!(err, MapError::Partition(_)));
    }

    #[test]
    fn wall_values_are_binary() {
        assert!(LayerKind::Floor.accepts(7));
        assert!(LayerKind::WallH.accepts(1));
        assert!(!LayerKind::WallV.accepts(2));
    }
}
