use untech_core::{Grid, UPoint, URect, USize};

use crate::source::{GridSource, GridTarget};

/// Which way to replay a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Redo: install the new state
    Forward,
    /// Undo: restore the old state
    Reverse,
}

/// A single cell change, addressed by flat (row-major) index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellEdit<T> {
    pub index: usize,
    pub old: T,
    pub new: T,
}

/// The recorded change of a [`GridCommand`].
///
/// Every variant owns copies of the data it needs, never references into the
/// live grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEdit<T> {
    /// Replace the whole grid, possibly changing its size
    WholeGridReplace { old: Grid<T>, new: Grid<T> },

    /// Replace a rectangle of cells; `old` and `new` have the same size
    RectangularCellsReplace {
        origin: UPoint,
        old: Grid<T>,
        new: Grid<T>,
    },

    /// Replace scattered cells. The only variant that can be merged.
    SparseCellEdits {
        /// Size of the grid when the edit was built, flat indices depend on it
        grid_size: USize,
        /// Set for stroke samples; one-off cell and selection edits never merge
        mergeable: bool,
        first_of_gesture: bool,
        cells: Vec<CellEdit<T>>,
    },
}

/// An undoable edit to one grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridCommand<T> {
    target: GridTarget,
    text: String,
    edit: GridEdit<T>,
}

impl<T> GridCommand<T> {
    pub(crate) fn new(target: GridTarget, text: impl Into<String>, edit: GridEdit<T>) -> Self {
        Self {
            target,
            text: text.into(),
            edit,
        }
    }

    pub fn target(&self) -> &GridTarget {
        &self.target
    }

    /// Text shown in the undo/redo menu entries
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn edit(&self) -> &GridEdit<T> {
        &self.edit
    }

    /// True for commands that open a new gesture (never merged into a previous command)
    pub fn is_first_of_gesture(&self) -> bool {
        match &self.edit {
            GridEdit::SparseCellEdits {
                first_of_gesture, ..
            } => *first_of_gesture,
            _ => true,
        }
    }

    /// True for a sparse edit without cells, i.e. a gesture anchor that
    /// changed nothing
    pub fn is_empty(&self) -> bool {
        matches!(&self.edit, GridEdit::SparseCellEdits { cells, .. } if cells.is_empty())
    }

    /// The cell list of a sparse edit
    pub fn cell_edits(&self) -> Option<&[CellEdit<T>]> {
        match &self.edit {
            GridEdit::SparseCellEdits { cells, .. } => Some(cells),
            _ => None,
        }
    }
}

impl<T: Clone> GridCommand<T> {
    pub fn redo<S: GridSource<T> + ?Sized>(&self, source: &mut S) {
        self.apply(source, Direction::Forward);
    }

    pub fn undo<S: GridSource<T> + ?Sized>(&self, source: &mut S) {
        self.apply(source, Direction::Reverse);
    }

    /// Replay this command against the live grid.
    ///
    /// # Panics
    ///
    /// If the live grid no longer has room for the recorded cells. That means
    /// something resized the grid without going through the undo stack.
    pub fn apply<S: GridSource<T> + ?Sized>(&self, source: &mut S, direction: Direction) {
        let target = &self.target;

        if source.grid(target).is_none() {
            tracing::warn!("Cannot apply \"{}\": grid {} is unavailable", self.text, target);
            return;
        }

        match &self.edit {
            GridEdit::WholeGridReplace { old, new } => {
                let replacement = pick(direction, old, new);
                let resizing = old.size() != new.size();

                if resizing {
                    source.grid_about_to_resize(target);
                }
                if let Some(grid) = source.grid_mut(target) {
                    *grid = replacement.clone();
                }
                if resizing {
                    source.grid_resized(target);
                }
            }

            GridEdit::RectangularCellsReplace { origin, old, new } => {
                let cells = pick(direction, old, new);
                if let Some(grid) = source.grid_mut(target) {
                    assert!(
                        URect::from_parts(*origin, cells.size()).fits_within(grid.size()),
                        "rectangular edit at {} of {} does not fit {} grid {}",
                        origin,
                        cells.size(),
                        grid.size(),
                        target
                    );
                    if let Err(err) = grid.paste(*origin, cells) {
                        panic!("rectangular edit on {} failed: {}", target, err);
                    }
                }
            }

            GridEdit::SparseCellEdits {
                grid_size, cells, ..
            } => {
                if let Some(grid) = source.grid_mut(target) {
                    assert_eq!(
                        grid.size(),
                        *grid_size,
                        "sparse edit built for a {} grid applied to {} grid {}",
                        grid_size,
                        grid.size(),
                        target
                    );
                    let count = grid.cell_count();
                    let mut write = |edit: &CellEdit<T>| {
                        assert!(
                            edit.index < count,
                            "cell {} out of range for grid {} ({} cells)",
                            edit.index,
                            target,
                            count
                        );
                        grid[edit.index] = pick(direction, &edit.old, &edit.new).clone();
                    };
                    match direction {
                        Direction::Forward => cells.iter().for_each(&mut write),
                        Direction::Reverse => cells.iter().rev().for_each(&mut write),
                    }
                }
            }
        }

        source.grid_changed(target);
    }

    /// Fold `other` into this command.
    ///
    /// Both commands must be mergeable sparse edits with the same target,
    /// text and grid size, and `other` must continue a gesture
    /// (`first_of_gesture == false`). Where both commands touch a cell, this
    /// command's old value is kept and `other`'s new value wins.
    pub fn try_merge(&mut self, other: &GridCommand<T>) -> bool {
        if self.target != other.target || self.text != other.text {
            return false;
        }

        match (&mut self.edit, &other.edit) {
            (
                GridEdit::SparseCellEdits {
                    grid_size,
                    mergeable: true,
                    cells,
                    ..
                },
                GridEdit::SparseCellEdits {
                    grid_size: other_size,
                    mergeable: true,
                    first_of_gesture: false,
                    cells: other_cells,
                },
            ) if *grid_size == *other_size => {
                for edit in other_cells {
                    match cells.iter_mut().find(|c| c.index == edit.index) {
                        Some(existing) => existing.new = edit.new.clone(),
                        None => cells.push(edit.clone()),
                    }
                }
                true
            }
            _ => false,
        }
    }
}

fn pick<'a, V>(direction: Direction, old: &'a V, new: &'a V) -> &'a V {
    match direction {
        Direction::Forward => new,
        Direction::Reverse => old,
    }
}
