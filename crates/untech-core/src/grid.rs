//! Dense, row-major 2D storage for tile maps and tileset layouts.
//!
//! Cells are stored left-to-right, top-to-bottom in a single `Vec`, so a
//! cell's flat index is `y * width + x`. The edit commands in
//! `untech-history` address cells by this flat index.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::error::GridError;
use crate::geometry::{UPoint, URect, USize};

/// A dense 2D grid of cells.
///
/// Invariant: `cells.len() == width * height`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid<T>")]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// Unvalidated serialized form of a [`Grid`].
#[derive(Deserialize)]
struct RawGrid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        Grid::from_vec(USize::new(raw.width, raw.height), raw.cells)
    }
}

fn checked_area(size: USize) -> Result<usize, GridError> {
    (size.width as usize)
        .checked_mul(size.height as usize)
        .ok_or(GridError::SizeOverflow {
            width: size.width,
            height: size.height,
        })
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        }
    }
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`
    pub fn filled(size: USize, value: T) -> Self {
        Self {
            width: size.width,
            height: size.height,
            cells: vec![value; size.area()],
        }
    }

    /// Copy out the rectangle at `origin` of the given size.
    ///
    /// Returns `None` if the rectangle does not lie entirely inside the grid.
    pub fn sub_grid(&self, origin: UPoint, size: USize) -> Option<Grid<T>> {
        if !URect::from_parts(origin, size).fits_within(self.size()) {
            return None;
        }

        let mut cells = Vec::with_capacity(size.area());
        for y in origin.y..origin.y + size.height {
            let start = self.flat_index(origin.x, y);
            cells.extend_from_slice(&self.cells[start..start + size.width as usize]);
        }

        Some(Grid {
            width: size.width,
            height: size.height,
            cells,
        })
    }

    /// Write `source` into this grid with its top-left corner at `origin`.
    pub fn paste(&mut self, origin: UPoint, source: &Grid<T>) -> Result<(), GridError> {
        let rect = URect::from_parts(origin, source.size());
        if !rect.fits_within(self.size()) {
            return Err(GridError::OutOfBounds {
                position: UPoint::new(
                    rect.x.saturating_add(rect.width.saturating_sub(1)),
                    rect.y.saturating_add(rect.height.saturating_sub(1)),
                ),
                size: self.size(),
            });
        }

        for (row_index, row) in source.rows().enumerate() {
            let start = self.flat_index(origin.x, origin.y + row_index as u32);
            self.cells[start..start + row.len()].clone_from_slice(row);
        }
        Ok(())
    }

    /// Return a copy of this grid at a new size.
    ///
    /// The overlapping top-left region is preserved and every new cell is
    /// set to `default`.
    pub fn resized(&self, size: USize, default: T) -> Grid<T> {
        let mut out = Grid::filled(size, default);
        let keep = self.size().min(size);

        for y in 0..keep.height {
            let src = self.flat_index(0, y);
            let dst = out.flat_index(0, y);
            out.cells[dst..dst + keep.width as usize]
                .clone_from_slice(&self.cells[src..src + keep.width as usize]);
        }
        out
    }

    /// Resize in place, see [`Grid::resized`]
    pub fn resize(&mut self, size: USize, default: T) {
        if size != self.size() {
            *self = self.resized(size, default);
        }
    }
}

impl<T: Clone + Default> Grid<T> {
    /// Create a grid with every cell set to `T::default()`
    pub fn new(size: USize) -> Self {
        Self::filled(size, T::default())
    }
}

impl<T> Grid<T> {
    /// Build a grid from row-major cells
    pub fn from_vec(size: USize, cells: Vec<T>) -> Result<Self, GridError> {
        let expected = checked_area(size)?;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> USize {
        USize::new(self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn flat_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Flat (row-major) index of a position, or `None` if out of bounds
    pub fn index_of(&self, p: UPoint) -> Option<usize> {
        self.size()
            .contains(p)
            .then(|| self.flat_index(p.x, p.y))
    }

    /// Inverse of [`Grid::index_of`]
    pub fn position_of(&self, index: usize) -> Option<UPoint> {
        if index >= self.cells.len() {
            return None;
        }
        let width = self.width as usize;
        Some(UPoint::new((index % width) as u32, (index / width) as u32))
    }

    pub fn get(&self, p: UPoint) -> Option<&T> {
        self.index_of(p).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, p: UPoint) -> Option<&mut T> {
        self.index_of(p).map(move |i| &mut self.cells[i])
    }

    /// Replace the cell at `p`, returning the previous value
    pub fn set(&mut self, p: UPoint, value: T) -> Result<T, GridError> {
        let size = self.size();
        let cell = self
            .get_mut(p)
            .ok_or(GridError::OutOfBounds { position: p, size })?;
        Ok(std::mem::replace(cell, value))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate over `(position, &cell)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (UPoint, &T)> {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| (UPoint::new((i % width) as u32, (i / width) as u32), c))
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub fn into_vec(self) -> Vec<T> {
        self.cells
    }
}

impl<T> Index<usize> for Grid<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.cells[index]
    }
}

impl<T> IndexMut<usize> for Grid<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.cells[index]
    }
}

impl<T> Index<UPoint> for Grid<T> {
    type Output = T;

    fn index(&self, p: UPoint) -> &T {
        assert!(
            self.size().contains(p),
            "position {} out of bounds for {} grid",
            p,
            self.size()
        );
        &self.cells[self.flat_index(p.x, p.y)]
    }
}

impl<T> IndexMut<UPoint> for Grid<T> {
    fn index_mut(&mut self, p: UPoint) -> &mut T {
        assert!(
            self.size().contains(p),
            "position {} out of bounds for {} grid",
            p,
            self.size()
        );
        let i = self.flat_index(p.x, p.y);
        &mut self.cells[i]
    }
}
