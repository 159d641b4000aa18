use std::fmt;

use untech_core::{Grid, USize};

/// Identifies one grid inside a resource: the accessor that exposes it plus
/// the selection arguments (layer index, frame index, ...) it was resolved with.
///
/// Two commands edit the same grid iff their targets are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridTarget {
    pub accessor: &'static str,
    pub args: Vec<u32>,
}

impl GridTarget {
    pub fn new(accessor: &'static str) -> Self {
        Self {
            accessor,
            args: Vec::new(),
        }
    }

    pub fn with_args(accessor: &'static str, args: impl Into<Vec<u32>>) -> Self {
        Self {
            accessor,
            args: args.into(),
        }
    }
}

impl fmt::Display for GridTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.accessor)?;
        if !self.args.is_empty() {
            write!(f, "{:?}", self.args)?;
        }
        Ok(())
    }
}

/// Live access to the grids of a resource document.
///
/// The notification hooks are called by the commands while they mutate a
/// grid, in the order `grid_about_to_resize`, mutation, `grid_resized`,
/// `grid_changed`. Editors holding references into a grid must drop them in
/// `grid_about_to_resize`.
pub trait GridSource<T> {
    /// The grid for `target`, or `None` if it is currently unavailable
    fn grid(&self, target: &GridTarget) -> Option<&Grid<T>>;

    fn grid_mut(&mut self, target: &GridTarget) -> Option<&mut Grid<T>>;

    /// Largest size `target` may be resized to
    fn max_size(&self, target: &GridTarget) -> USize;

    fn grid_about_to_resize(&mut self, _target: &GridTarget) {}

    fn grid_resized(&mut self, _target: &GridTarget) {}

    fn grid_changed(&mut self, _target: &GridTarget) {}
}

/// Notification emitted while a grid is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    AboutToResize,
    Resized,
    Changed,
}

/// A source exposing a single grid, which may be unloaded.
///
/// Notifications are queued and can be drained with [`SingleGrid::take_events`].
#[derive(Debug, Clone)]
pub struct SingleGrid<T> {
    target: GridTarget,
    grid: Option<Grid<T>>,
    max_size: USize,
    events: Vec<GridEvent>,
}

impl<T> SingleGrid<T> {
    pub fn new(target: GridTarget, grid: Grid<T>, max_size: USize) -> Self {
        Self {
            target,
            grid: Some(grid),
            max_size,
            events: Vec::new(),
        }
    }

    /// A source whose grid has not been loaded yet
    pub fn unavailable(target: GridTarget, max_size: USize) -> Self {
        Self {
            target,
            grid: None,
            max_size,
            events: Vec::new(),
        }
    }

    pub fn target(&self) -> &GridTarget {
        &self.target
    }

    pub fn current(&self) -> Option<&Grid<T>> {
        self.grid.as_ref()
    }

    /// Swap the grid out from under any editors, returning the old one
    pub fn replace(&mut self, grid: Option<Grid<T>>) -> Option<Grid<T>> {
        std::mem::replace(&mut self.grid, grid)
    }

    pub fn events(&self) -> &[GridEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }
}

impl<T> GridSource<T> for SingleGrid<T> {
    fn grid(&self, target: &GridTarget) -> Option<&Grid<T>> {
        if *target == self.target {
            self.grid.as_ref()
        } else {
            None
        }
    }

    fn grid_mut(&mut self, target: &GridTarget) -> Option<&mut Grid<T>> {
        if *target == self.target {
            self.grid.as_mut()
        } else {
            None
        }
    }

    fn max_size(&self, _target: &GridTarget) -> USize {
        self.max_size
    }

    fn grid_about_to_resize(&mut self, _target: &GridTarget) {
        self.events.push(GridEvent::AboutToResize);
    }

    fn grid_resized(&mut self, _target: &GridTarget) {
        self.events.push(GridEvent::Resized);
    }

    fn grid_changed(&mut self, _target: &GridTarget) {
        self.events.push(GridEvent::Changed);
    }
}
