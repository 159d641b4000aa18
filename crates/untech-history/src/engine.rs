//! Builds undo commands for grid edits.
//!
//! Every builder inspects the live grid, decides whether the proposed edit
//! changes anything, and returns the command describing it. Nothing is
//! mutated here; the grid changes when the command is pushed onto an
//! [`UndoStack`](crate::UndoStack).
//!
//! A builder returns `None` whenever the edit cannot be performed: the grid is
//! unavailable, the edit would not change anything, or the geometry falls
//! outside the allowed bounds. Callers usually ignore this, as it mostly
//! happens while the mouse is outside the canvas.

use untech_core::{Grid, Point, UPoint, UPointVectorSet, USize};

use crate::command::{CellEdit, GridCommand, GridEdit};
use crate::source::{GridSource, GridTarget};

/// Builds [`GridCommand`]s against one grid of a [`GridSource`].
///
/// The helper only borrows the source for the duration of the builder call.
pub struct GridUndoHelper<'a, T> {
    source: &'a dyn GridSource<T>,
    target: GridTarget,
}

/// Intersection of a stamp placed at a signed origin with the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overlap {
    /// Top-left of the intersection, in grid coordinates
    grid_pos: UPoint,
    /// Top-left of the intersection, in stamp coordinates
    source_offset: UPoint,
    size: USize,
}

/// Crop a stamp of `source_size` at `origin` to a grid of `grid_size`.
///
/// Returns `None` if they do not overlap.
fn crop(origin: Point, source_size: USize, grid_size: USize) -> Option<Overlap> {
    if source_size.is_empty() || grid_size.is_empty() {
        return None;
    }

    let axis = |origin: i32, source_len: u32, grid_len: u32| -> Option<(u32, u32, u32)> {
        let (origin, source_len, grid_len) = (origin as i64, source_len as i64, grid_len as i64);
        if origin <= -source_len || origin >= grid_len {
            return None;
        }
        let grid_pos = origin.max(0);
        let source_offset = grid_pos - origin;
        let len = (source_len - source_offset).min(grid_len - grid_pos);
        Some((grid_pos as u32, source_offset as u32, len as u32))
    };

    let (gx, sx, width) = axis(origin.x, source_size.width, grid_size.width)?;
    let (gy, sy, height) = axis(origin.y, source_size.height, grid_size.height)?;

    Some(Overlap {
        grid_pos: UPoint::new(gx, gy),
        source_offset: UPoint::new(sx, sy),
        size: USize::new(width, height),
    })
}

impl<'a, T: Clone + PartialEq> GridUndoHelper<'a, T> {
    pub fn new<S: GridSource<T>>(source: &'a S, target: GridTarget) -> Self {
        Self { source, target }
    }

    pub fn from_dyn(source: &'a dyn GridSource<T>, target: GridTarget) -> Self {
        Self { source, target }
    }

    pub fn target(&self) -> &GridTarget {
        &self.target
    }

    fn current(&self) -> Option<&'a Grid<T>> {
        let grid = self.source.grid(&self.target);
        if grid.is_none() {
            tracing::trace!("Grid {} is unavailable", self.target);
        }
        grid
    }

    fn command(&self, text: impl Into<String>, edit: GridEdit<T>) -> GridCommand<T> {
        GridCommand::new(self.target.clone(), text, edit)
    }

    /// Replace the entire grid with `new_grid`
    pub fn build_whole_grid_replace(
        &self,
        new_grid: Grid<T>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;
        if *grid == new_grid {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::WholeGridReplace {
                old: grid.clone(),
                new: new_grid,
            },
        ))
    }

    /// Resize the grid, keeping the overlapping cells and filling new cells
    /// with `default_value`.
    ///
    /// Sizes larger than the source's `max_size` are refused, not clamped.
    pub fn build_resize(
        &self,
        new_size: USize,
        default_value: T,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;

        let max_size = self.source.max_size(&self.target);
        if !new_size.fits_within(max_size) {
            tracing::trace!("Resize of {} to {} exceeds {}", self.target, new_size, max_size);
            return None;
        }
        if new_size == grid.size() {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::WholeGridReplace {
                old: grid.clone(),
                new: grid.resized(new_size, default_value),
            },
        ))
    }

    /// Replace the rectangle at `origin` with `new_cells`.
    ///
    /// The far edge check is strict: the rectangle may not reach the last
    /// row or column of the grid. Edits there go through
    /// [`build_cropped_edit`](Self::build_cropped_edit) or
    /// [`build_masked_merge`](Self::build_masked_merge).
    pub fn build_rectangular_replace(
        &self,
        origin: UPoint,
        new_cells: Grid<T>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;

        if new_cells.is_empty() || !grid.size().contains(origin) {
            return None;
        }
        let right = origin.x as u64 + new_cells.width() as u64;
        let bottom = origin.y as u64 + new_cells.height() as u64;
        if right >= grid.width() as u64 || bottom >= grid.height() as u64 {
            tracing::trace!(
                "Rectangle at {} of {} is not inside {} grid {}",
                origin,
                new_cells.size(),
                grid.size(),
                self.target
            );
            return None;
        }

        let old = grid.sub_grid(origin, new_cells.size())?;
        if old == new_cells {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::RectangularCellsReplace {
                origin,
                old,
                new: new_cells,
            },
        ))
    }

    /// Stamp `cells` onto the grid at a possibly off-grid `origin`, cropped
    /// to the overlap.
    ///
    /// `accept` maps each overlapped stamp cell to the value to write, or
    /// `None` to leave the grid cell untouched. The result is a single
    /// rectangular edit covering the overlap.
    pub fn build_cropped_edit<S>(
        &self,
        origin: Point,
        cells: &Grid<S>,
        mut accept: impl FnMut(&S) -> Option<T>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;
        let overlap = crop(origin, cells.size(), grid.size())?;

        let old = grid.sub_grid(overlap.grid_pos, overlap.size)?;
        let mut new = old.clone();
        for y in 0..overlap.size.height {
            for x in 0..overlap.size.width {
                let src = UPoint::new(overlap.source_offset.x + x, overlap.source_offset.y + y);
                if let Some(value) = accept(&cells[src]) {
                    new[UPoint::new(x, y)] = value;
                }
            }
        }

        if new == old {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::RectangularCellsReplace {
                origin: overlap.grid_pos,
                old,
                new,
            },
        ))
    }

    /// Stamp `cells` onto the grid like [`build_cropped_edit`](Self::build_cropped_edit),
    /// recording only the cells that change.
    ///
    /// Accepted cells that already hold the stamped value are left out of
    /// the command. A later sample (`first_of_gesture == false`) with the same
    /// text merges into the previous one on the undo stack, so one drag
    /// produces one undo step.
    ///
    /// The first sample of a gesture always yields a command while the grid
    /// is available, even when it changes nothing or misses the grid. Such an
    /// empty anchor adds no undo step, but stops the rest of the gesture from
    /// merging into the previous gesture.
    pub fn build_masked_merge<S>(
        &self,
        origin: Point,
        cells: &Grid<S>,
        first_of_gesture: bool,
        mut accept: impl FnMut(&S) -> Option<T>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;

        let mut edits = Vec::new();
        let Some(overlap) = crop(origin, cells.size(), grid.size()) else {
            return self.stroke_command(grid, first_of_gesture, edits, text);
        };

        for y in 0..overlap.size.height {
            for x in 0..overlap.size.width {
                let src = UPoint::new(overlap.source_offset.x + x, overlap.source_offset.y + y);
                let Some(value) = accept(&cells[src]) else {
                    continue;
                };

                let dest = UPoint::new(overlap.grid_pos.x + x, overlap.grid_pos.y + y);
                let index = grid.index_of(dest)?;
                if grid[index] != value {
                    edits.push(CellEdit {
                        index,
                        old: grid[index].clone(),
                        new: value,
                    });
                }
            }
        }

        self.stroke_command(grid, first_of_gesture, edits, text)
    }

    fn stroke_command(
        &self,
        grid: &Grid<T>,
        first_of_gesture: bool,
        cells: Vec<CellEdit<T>>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        if cells.is_empty() && !first_of_gesture {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::SparseCellEdits {
                grid_size: grid.size(),
                mergeable: true,
                first_of_gesture,
                cells,
            },
        ))
    }

    /// Set a single cell
    pub fn build_cell_edit(
        &self,
        position: UPoint,
        value: T,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;
        let index = grid.index_of(position)?;
        if grid[index] == value {
            return None;
        }

        let edit = CellEdit {
            index,
            old: grid[index].clone(),
            new: value,
        };
        self.one_off_command(grid, vec![edit], text)
    }

    /// Apply `edit` to every selected cell, in selection order.
    ///
    /// Selected positions outside the grid are skipped.
    pub fn build_selection_edit(
        &self,
        selection: &UPointVectorSet,
        mut edit: impl FnMut(&T) -> T,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        let grid = self.current()?;

        let edits = selection
            .iter()
            .filter_map(|&p| grid.index_of(p))
            .filter_map(|index| {
                let old = &grid[index];
                let new = edit(old);
                (new != *old).then(|| CellEdit {
                    index,
                    old: old.clone(),
                    new,
                })
            })
            .collect();

        self.one_off_command(grid, edits, text)
    }

    fn one_off_command(
        &self,
        grid: &Grid<T>,
        cells: Vec<CellEdit<T>>,
        text: impl Into<String>,
    ) -> Option<GridCommand<T>> {
        if cells.is_empty() {
            return None;
        }

        Some(self.command(
            text,
            GridEdit::SparseCellEdits {
                grid_size: grid.size(),
                mergeable: false,
                first_of_gesture: true,
                cells,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SingleGrid;

    fn target() -> GridTarget {
        GridTarget::new("room.map")
    }

    fn source(grid: Grid<u8>) -> SingleGrid<u8> {
        SingleGrid::new(target(), grid, USize::new(16, 16))
    }

    fn counting_grid(width: u32, height: u32) -> Grid<u8> {
        Grid::from_vec(USize::new(width, height), (0..(width * height) as u8).collect()).unwrap()
    }

    #[test]
    fn test_crop() {
        let overlap = crop(Point::new(-1, -1), USize::new(3, 3), USize::new(5, 5)).unwrap();
        assert_eq!(overlap.grid_pos, UPoint::new(0, 0));
        assert_eq!(overlap.source_offset, UPoint::new(1, 1));
        assert_eq!(overlap.size, USize::new(2, 2));

        let overlap = crop(Point::new(3, 4), USize::new(3, 3), USize::new(5, 5)).unwrap();
        assert_eq!(overlap.grid_pos, UPoint::new(3, 4));
        assert_eq!(overlap.source_offset, UPoint::new(0, 0));
        assert_eq!(overlap.size, USize::new(2, 1));

        assert_eq!(crop(Point::new(-3, 0), USize::new(3, 3), USize::new(5, 5)), None);
        assert_eq!(crop(Point::new(5, 0), USize::new(3, 3), USize::new(5, 5)), None);
        assert_eq!(crop(Point::new(0, 0), USize::new(0, 3), USize::new(5, 5)), None);
        assert_eq!(crop(Point::new(0, 0), USize::new(3, 3), USize::new(0, 0)), None);
    }

    #[test]
    fn test_whole_grid_replace_equal_is_noop() {
        let grid = counting_grid(3, 3);
        let src = source(grid.clone());
        let helper = GridUndoHelper::new(&src, target());

        assert!(helper.build_whole_grid_replace(grid.clone(), "Edit").is_none());
    }

    #[test]
    fn test_whole_grid_replace_round_trip() {
        let original = counting_grid(3, 3);
        let replacement = Grid::filled(USize::new(3, 3), 42u8);
        let mut src = source(original.clone());

        let cmd = GridUndoHelper::new(&src, target())
            .build_whole_grid_replace(replacement.clone(), "Edit")
            .unwrap();
        assert_eq!(cmd.text(), "Edit");

        cmd.redo(&mut src);
        assert_eq!(src.current(), Some(&replacement));
        cmd.undo(&mut src);
        assert_eq!(src.current(), Some(&original));
    }

    #[test]
    fn test_unavailable_grid_builds_nothing() {
        let src: SingleGrid<u8> = SingleGrid::unavailable(target(), USize::new(16, 16));
        let helper = GridUndoHelper::new(&src, target());

        assert!(helper
            .build_whole_grid_replace(Grid::new(USize::new(1, 1)), "Edit")
            .is_none());
        assert!(helper.build_resize(USize::new(2, 2), 0, "Resize").is_none());
        assert!(helper.build_cell_edit(UPoint::new(0, 0), 1, "Edit").is_none());
    }

    #[test]
    fn test_resize_beyond_max_size_is_refused() {
        let src = source(counting_grid(4, 4));
        let helper = GridUndoHelper::new(&src, target());

        assert!(helper.build_resize(USize::new(17, 4), 0, "Resize").is_none());
        assert!(helper.build_resize(USize::new(4, 17), 0, "Resize").is_none());
        assert!(helper.build_resize(USize::new(4, 4), 0, "Resize").is_none());
        assert!(helper.build_resize(USize::new(16, 16), 0, "Resize").is_some());
    }

    #[test]
    fn test_shrink_then_undo_restores_all_cells() {
        let original = Grid::filled(USize::new(4, 4), 7u8);
        let mut src = source(original.clone());

        let cmd = GridUndoHelper::new(&src, target())
            .build_resize(USize::new(2, 2), 0, "Resize")
            .unwrap();

        cmd.redo(&mut src);
        assert_eq!(src.current().unwrap().size(), USize::new(2, 2));
        assert_eq!(src.current().unwrap().cell_count(), 4);

        cmd.undo(&mut src);
        assert_eq!(src.current(), Some(&original));
    }

    #[test]
    fn test_grow_then_undo() {
        let original = counting_grid(2, 2);
        let mut src = source(original.clone());

        let cmd = GridUndoHelper::new(&src, target())
            .build_resize(USize::new(3, 4), 9, "Resize")
            .unwrap();

        cmd.redo(&mut src);
        let grown = src.current().unwrap();
        assert_eq!(grown[UPoint::new(1, 1)], 3);
        assert_eq!(grown[UPoint::new(2, 3)], 9);

        cmd.undo(&mut src);
        assert_eq!(src.current(), Some(&original));
    }

    #[test]
    fn test_rectangular_replace_in_interior() {
        let mut src = source(Grid::new(USize::new(8, 8)));

        let cmd = GridUndoHelper::new(&src, target())
            .build_rectangular_replace(UPoint::new(2, 2), Grid::filled(USize::new(2, 2), 9), "Place")
            .unwrap();

        cmd.redo(&mut src);
        for (p, &cell) in src.current().unwrap().iter() {
            let inside = (2..4).contains(&p.x) && (2..4).contains(&p.y);
            assert_eq!(cell, if inside { 9 } else { 0 }, "cell {}", p);
        }

        cmd.undo(&mut src);
        assert!(src.current().unwrap().cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_rectangular_replace_touching_far_edge_is_refused() {
        // The far edge bound is strict, so the last row and column cannot be
        // reached through this builder even though the rectangle would fit.
        let src = source(Grid::new(USize::new(4, 4)));
        let helper = GridUndoHelper::new(&src, target());

        let stamp = Grid::filled(USize::new(2, 2), 1u8);
        assert!(helper
            .build_rectangular_replace(UPoint::new(3, 3), stamp.clone(), "Place")
            .is_none());
        assert!(helper
            .build_rectangular_replace(UPoint::new(2, 2), stamp.clone(), "Place")
            .is_none());
        assert!(helper
            .build_rectangular_replace(UPoint::new(1, 1), stamp, "Place")
            .is_some());
    }

    #[test]
    fn test_rectangular_replace_rejects_noop_and_empty() {
        let src = source(Grid::new(USize::new(8, 8)));
        let helper = GridUndoHelper::new(&src, target());

        assert!(helper
            .build_rectangular_replace(UPoint::new(1, 1), Grid::filled(USize::new(2, 2), 0), "Place")
            .is_none());
        assert!(helper
            .build_rectangular_replace(UPoint::new(1, 1), Grid::default(), "Place")
            .is_none());
        assert!(helper
            .build_rectangular_replace(UPoint::new(8, 0), Grid::filled(USize::new(1, 1), 3), "Place")
            .is_none());
    }

    #[test]
    fn test_masked_merge_crops_to_overlap() {
        let mut src = source(Grid::new(USize::new(5, 5)));
        let stamp = Grid::from_vec(USize::new(3, 3), (10..19).collect()).unwrap();

        let cmd = GridUndoHelper::new(&src, target())
            .build_masked_merge(Point::new(-1, -1), &stamp, true, |&c| Some(c), "Paint")
            .unwrap();

        let indices: Vec<usize> = cmd.cell_edits().unwrap().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 5, 6]);

        cmd.redo(&mut src);
        let grid = src.current().unwrap();
        assert_eq!(grid[UPoint::new(0, 0)], 14);
        assert_eq!(grid[UPoint::new(1, 0)], 15);
        assert_eq!(grid[UPoint::new(0, 1)], 17);
        assert_eq!(grid[UPoint::new(1, 1)], 18);
        assert_eq!(grid.cells().iter().filter(|&&c| c != 0).count(), 4);
    }

    #[test]
    fn test_masked_merge_accept_filter() {
        const THRESHOLD: u8 = 5;

        let original = Grid::filled(USize::new(3, 3), 200u8);
        let mut src = source(original.clone());
        let stamp = counting_grid(3, 3);

        let cmd = GridUndoHelper::new(&src, target())
            .build_masked_merge(
                Point::new(0, 0),
                &stamp,
                true,
                |&c| (c < THRESHOLD).then_some(c),
                "Paint",
            )
            .unwrap();

        let edits = cmd.cell_edits().unwrap();
        assert_eq!(edits.len(), THRESHOLD as usize);
        assert!(edits.iter().all(|e| stamp[e.index] < THRESHOLD));

        cmd.redo(&mut src);
        for (p, &cell) in src.current().unwrap().iter() {
            let expected = if stamp[p] < THRESHOLD { stamp[p] } else { 200 };
            assert_eq!(cell, expected, "cell {}", p);
        }
    }

    #[test]
    fn test_masked_merge_out_of_range_or_rejected_builds_nothing() {
        let src = source(Grid::new(USize::new(4, 4)));
        let helper = GridUndoHelper::new(&src, target());
        let stamp = Grid::filled(USize::new(2, 2), 1u8);

        assert!(helper
            .build_masked_merge(Point::new(-2, 0), &stamp, false, |&c| Some(c), "Paint")
            .is_none());
        assert!(helper
            .build_masked_merge(Point::new(0, 4), &stamp, false, |&c| Some(c), "Paint")
            .is_none());
        assert!(helper
            .build_masked_merge(Point::new(0, 0), &stamp, false, |_| None, "Paint")
            .is_none());
        assert!(helper
            .build_masked_merge(Point::new(3, 3), &stamp, false, |&c| Some(c), "Paint")
            .is_some());
    }

    #[test]
    fn test_first_sample_without_changes_builds_empty_anchor() {
        let src = source(Grid::filled(USize::new(4, 4), 1u8));
        let helper = GridUndoHelper::new(&src, target());
        let stamp = Grid::filled(USize::new(2, 2), 1u8);

        let unchanged = helper
            .build_masked_merge(Point::new(0, 0), &stamp, true, |&c| Some(c), "Paint")
            .unwrap();
        assert!(unchanged.is_empty());

        let outside = helper
            .build_masked_merge(Point::new(-2, 0), &stamp, true, |&c| Some(c), "Paint")
            .unwrap();
        assert!(outside.is_empty());

        let unavailable: SingleGrid<u8> = SingleGrid::unavailable(target(), USize::new(16, 16));
        let helper = GridUndoHelper::new(&unavailable, target());
        assert!(helper
            .build_masked_merge(Point::new(0, 0), &stamp, true, |&c| Some(c), "Paint")
            .is_none());
    }

    #[test]
    fn test_masked_merge_maps_source_type() {
        // palette indices above 3 are invalid and skipped
        let src = source(Grid::new(USize::new(2, 1)));
        let stamp = Grid::from_vec(USize::new(2, 1), vec![Some(2u16), Some(40)]).unwrap();

        let cmd = GridUndoHelper::new(&src, target())
            .build_masked_merge(
                Point::new(0, 0),
                &stamp,
                false,
                |c: &Option<u16>| c.filter(|&i| i <= 3).map(|i| i as u8),
                "Paint",
            )
            .unwrap();

        assert_eq!(
            cmd.cell_edits().unwrap(),
            &[CellEdit { index: 0, old: 0u8, new: 2 }]
        );
        assert!(!cmd.is_first_of_gesture());
    }

    #[test]
    fn test_cropped_edit_keeps_rejected_cells() {
        let mut src = source(counting_grid(4, 4));
        let stamp = Grid::from_vec(USize::new(2, 2), vec![100u8, 0, 0, 101]).unwrap();

        let cmd = GridUndoHelper::new(&src, target())
            .build_cropped_edit(
                Point::new(3, 3),
                &stamp,
                |&c| (c != 0).then_some(c),
                "Paint",
            )
            .unwrap();

        match cmd.edit() {
            GridEdit::RectangularCellsReplace { origin, old, new } => {
                assert_eq!(*origin, UPoint::new(3, 3));
                assert_eq!(old.size(), USize::new(1, 1));
                assert_eq!(new.cells(), &[100]);
            }
            other => panic!("unexpected edit {:?}", other),
        }

        cmd.redo(&mut src);
        assert_eq!(src.current().unwrap()[UPoint::new(3, 3)], 100);
        assert_eq!(src.current().unwrap()[UPoint::new(2, 3)], 14);
    }

    #[test]
    fn test_cell_edit() {
        let src = source(counting_grid(3, 3));
        let helper = GridUndoHelper::new(&src, target());

        assert!(helper.build_cell_edit(UPoint::new(1, 1), 4, "Set").is_none());
        assert!(helper.build_cell_edit(UPoint::new(3, 1), 9, "Set").is_none());

        let cmd = helper.build_cell_edit(UPoint::new(1, 1), 9, "Set").unwrap();
        assert_eq!(
            cmd.cell_edits().unwrap(),
            &[CellEdit { index: 4, old: 4u8, new: 9 }]
        );
        assert!(cmd.is_first_of_gesture());
    }

    #[test]
    fn test_selection_edit() {
        let mut src = source(counting_grid(3, 3));
        let selection: UPointVectorSet = [
            UPoint::new(2, 2),
            UPoint::new(0, 0),
            UPoint::new(5, 5),
            UPoint::new(1, 0),
        ]
        .into_iter()
        .collect();

        // doubling leaves cell 0 unchanged
        let cmd = GridUndoHelper::new(&src, target())
            .build_selection_edit(&selection, |&c| c * 2, "Double")
            .unwrap();

        let indices: Vec<usize> = cmd.cell_edits().unwrap().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![8, 1]);

        cmd.redo(&mut src);
        assert_eq!(src.current().unwrap()[8], 16);
        assert_eq!(src.current().unwrap()[1], 2);
        assert_eq!(src.current().unwrap()[4], 4);
    }
}
