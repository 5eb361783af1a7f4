//! Bounds-checked 2-D views over the map's shared byte buffer.
//!
//! A [`GridView`] is a descriptor, not an owner: it records where a layer lives
//! inside the backing buffer (`offset`, `width`, `height`, row `stride`) and is
//! validated once against the buffer length when it is created. Every access
//! takes the backing bytes explicitly, so the buffer has a single owner
//! ([`LayeredMap`](crate::LayeredMap)) and the borrow checker rules out
//! aliasing writes.
//!
//! # Example
//! ```
//! use wall_grid::grid::{GridView, LayerKind};
//!
//! let mut bytes = vec![0u8; 6];
//! let view = GridView::packed(LayerKind::Floor, 0, 3, 2, bytes.len())?;
//! view.set(&mut bytes, 2, 1, 7)?;
//! assert_eq!(view.get(&bytes, 2, 1)?, 7);
//! assert!(view.get(&bytes, 3, 0).is_err());
//! # Ok::<(), wall_grid::grid::GridError>(())
//! ```

use std::ops::Range;

use thiserror::Error;

use super::layer::LayerKind;

/// Errors raised by cell access on a single layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} {layer} layer")]
    OutOfBounds {
        layer: LayerKind,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("value {value} is not valid for the {layer} layer")]
    InvalidValue { layer: LayerKind, value: u8 },
    #[error(
        "{layer} view {width}x{height} (stride {stride}) at offset {offset} does not fit a {len}-byte buffer"
    )]
    InvalidView {
        layer: LayerKind,
        offset: u32,
        width: u32,
        height: u32,
        stride: u32,
        len: usize,
    },
}

/// Validated placement of one layer inside the shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridView {
    kind: LayerKind,
    offset: u32,
    width: u32,
    height: u32,
    stride: u32,
}

impl GridView {
    /// Create a view, checking that every addressable cell lies inside a
    /// buffer of `backing_len` bytes.
    pub fn new(
        kind: LayerKind,
        offset: u32,
        width: u32,
        height: u32,
        stride: u32,
        backing_len: usize,
    ) -> Result<Self, GridError> {
        let invalid = || GridError::InvalidView {
            layer: kind,
            offset,
            width,
            height,
            stride,
            len: backing_len,
        };

        if width == 0 || height == 0 || stride < width {
            return Err(invalid());
        }

        let end = (stride as usize)
            .checked_mul(height as usize - 1)
            .and_then(|rows| rows.checked_add(width as usize))
            .and_then(|span| span.checked_add(offset as usize))
            .ok_or_else(invalid)?;
        if end > backing_len {
            return Err(invalid());
        }

        Ok(Self {
            kind,
            offset,
            width,
            height,
            stride,
        })
    }

    /// Create a view whose rows are stored back to back (`stride == width`).
    pub fn packed(
        kind: LayerKind,
        offset: u32,
        width: u32,
        height: u32,
        backing_len: usize,
    ) -> Result<Self, GridError> {
        Self::new(kind, offset, width, height, width, backing_len)
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Number of addressable cells.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_packed(&self) -> bool {
        self.stride == self.width
    }

    /// Byte range of the backing buffer spanned by this view.
    pub fn byte_range(&self) -> Range<usize> {
        let start = self.offset as usize;
        let span = self.stride as usize * (self.height as usize - 1) + self.width as usize;
        start..start + span
    }

    /// Absolute buffer index of `(x, y)`.
    pub fn index(&self, x: u32, y: u32) -> Result<usize, GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds {
                layer: self.kind,
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.offset as usize + y as usize * self.stride as usize + x as usize)
    }

    /// Fails with [`GridError::InvalidView`] if `bytes` is shorter than the
    /// region this view addresses.
    pub fn check_backing(&self, bytes: &[u8]) -> Result<(), GridError> {
        if bytes.len() < self.byte_range().end {
            return Err(GridError::InvalidView {
                layer: self.kind,
                offset: self.offset,
                width: self.width,
                height: self.height,
                stride: self.stride,
                len: bytes.len(),
            });
        }
        Ok(())
    }

    pub fn get(&self, bytes: &[u8], x: u32, y: u32) -> Result<u8, GridError> {
        self.check_backing(bytes)?;
        let index = self.index(x, y)?;
        Ok(bytes[index])
    }

    /// Write one cell. Nothing is written when the coordinates or the value
    /// are rejected.
    pub fn set(&self, bytes: &mut [u8], x: u32, y: u32, value: u8) -> Result<(), GridError> {
        self.check_value(value)?;
        self.check_backing(bytes)?;
        let index = self.index(x, y)?;
        bytes[index] = value;
        Ok(())
    }

    /// Overwrite every cell of the layer.
    pub fn fill(&self, bytes: &mut [u8], value: u8) -> Result<(), GridError> {
        self.check_value(value)?;
        self.check_backing(bytes)?;
        for y in 0..self.height {
            let start = self.offset as usize + y as usize * self.stride as usize;
            bytes[start..start + self.width as usize].fill(value);
        }
        Ok(())
    }

    /// Rows of the layer, north to south.
    pub fn rows<'a>(
        self,
        bytes: &'a [u8],
    ) -> Result<impl Iterator<Item = &'a [u8]> + 'a, GridError> {
        self.check_backing(bytes)?;
        Ok(self.rows_unchecked(bytes))
    }

    fn rows_unchecked<'a>(self, bytes: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
        (0..self.height).map(move |y| {
            let start = self.offset as usize + y as usize * self.stride as usize;
            &bytes[start..start + self.width as usize]
        })
    }

    /// Descriptor for the same packed region after a quarter turn, serving
    /// as `kind`. Width and height are exchanged; the byte count is unchanged.
    pub fn quarter_turned(&self, kind: LayerKind) -> Self {
        debug_assert!(self.is_packed(), "only packed views can be turned");
        Self {
            kind,
            offset: self.offset,
            width: self.height,
            height: self.width,
            stride: self.height,
        }
    }

    /// Read a cell whose coordinates the caller has already validated.
    pub(crate) fn get_unchecked(&self, bytes: &[u8], x: u32, y: u32) -> u8 {
        debug_assert!(
            x < self.width && y < self.height,
            "get_unchecked: ({}, {}) outside {}x{} {} layer",
            x,
            y,
            self.width,
            self.height,
            self.kind
        );
        bytes[self.offset as usize + y as usize * self.stride as usize + x as usize]
    }

    fn check_value(&self, value: u8) -> Result<(), GridError> {
        if self.kind.accepts(value) {
            Ok(())
        } else {
            Err(GridError::InvalidValue {
                layer: self.kind,
                value,
            })
        }
    }
}

/// Read-only borrow of one layer, handed to render consumers.
#[derive(Debug, Clone, Copy)]
pub struct LayerRef<'a> {
    view: GridView,
    bytes: &'a [u8],
}

impl<'a> LayerRef<'a> {
    pub fn new(view: GridView, bytes: &'a [u8]) -> Result<Self, GridError> {
        view.check_backing(bytes)?;
        Ok(Self { view, bytes })
    }

    /// For buffers already validated against `view`, such as a map's own.
    pub(crate) fn new_unchecked(view: GridView, bytes: &'a [u8]) -> Self {
        debug_assert!(bytes.len() >= view.byte_range().end);
        Self { view, bytes }
    }

    pub fn view(&self) -> GridView {
        self.view
    }

    pub fn kind(&self) -> LayerKind {
        self.view.kind()
    }

    pub fn width(&self) -> u32 {
        self.view.width()
    }

    pub fn height(&self) -> u32 {
        self.view.height()
    }

    pub fn get(&self, x: u32, y: u32) -> Result<u8, GridError> {
        self.view.get(self.bytes, x, y)
    }

    /// Every cell as `(x, y, value)` in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (u32, u32, u8)> + 'a {
        self.view.rows_unchecked(self.bytes).enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, value)| (x as u32, y as u32, *value))
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.view
            .rows_unchecked(self.bytes)
            .map(<[u8]>::to_vec)
            .collect()
    }
}
