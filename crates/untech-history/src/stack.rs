use crate::command::GridCommand;
use crate::config::HistoryConfig;
use crate::source::GridSource;

/// Undo/redo history for the grid edits of one document
pub struct UndoStack<T> {
    /// Commands that can be undone, oldest first
    undo_stack: Vec<GridCommand<T>>,
    /// Commands that can be redone, most recently undone last
    redo_stack: Vec<GridCommand<T>>,
    /// Maximum number of undo levels, 0 for unlimited
    undo_limit: usize,
    /// Whether gesture commands are merged into the top command
    enable_merging: bool,
    /// Length of `undo_stack` at the last save, `None` if that state is gone
    clean_index: Option<usize>,
    /// Set by an empty gesture anchor, undo and redo. The next command is
    /// pushed as a new step even if it could merge into the top.
    merge_sealed: bool,
}

impl<T> Default for UndoStack<T> {
    fn default() -> Self {
        Self::with_config(&HistoryConfig::default())
    }
}

impl<T> UndoStack<T> {
    /// Create a history keeping at most `undo_limit` steps (0 for unlimited)
    pub fn new(undo_limit: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            undo_limit,
            enable_merging: true,
            clean_index: Some(0),
            merge_sealed: false,
        }
    }

    pub fn with_config(config: &HistoryConfig) -> Self {
        let mut stack = Self::new(config.undo_limit);
        stack.enable_merging = config.merge_gestures;
        stack
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Text of the command that would be undone
    pub fn undo_text(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.text())
    }

    /// Text of the command that would be redone
    pub fn redo_text(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.text())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// The command on top of the undo stack
    pub fn top(&self) -> Option<&GridCommand<T>> {
        self.undo_stack.last()
    }

    /// Clear all history. The current state becomes the clean state.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.clean_index = Some(0);
        self.merge_sealed = false;
    }

    /// Enable or disable gesture merging
    pub fn set_merging_enabled(&mut self, enabled: bool) {
        self.enable_merging = enabled;
    }

    /// Mark the current state as saved
    pub fn set_clean(&mut self) {
        self.clean_index = Some(self.undo_stack.len());
    }

    /// True if the document is in the state it was last saved in
    pub fn is_clean(&self) -> bool {
        self.clean_index == Some(self.undo_stack.len())
    }

    fn trim(&mut self) {
        if self.undo_limit == 0 {
            return;
        }
        while self.undo_stack.len() > self.undo_limit {
            self.undo_stack.remove(0);
            self.clean_index = match self.clean_index {
                Some(i) if i > 0 => Some(i - 1),
                _ => None,
            };
        }
    }
}

impl<T: Clone> UndoStack<T> {
    /// Apply `command` and record it.
    ///
    /// The command is first applied to the grid, even when it ends up merged.
    /// If it continues the gesture of the top command it is then merged into
    /// it and discarded, otherwise it becomes the new top. Any redo history
    /// is dropped.
    ///
    /// An empty gesture anchor changes nothing and adds no step; it only
    /// keeps the rest of its gesture out of the current top.
    pub fn push<S: GridSource<T> + ?Sized>(&mut self, command: GridCommand<T>, source: &mut S) {
        if command.is_empty() {
            tracing::debug!("Sealed merging for \"{}\" on {}", command.text(), command.target());
            self.merge_sealed = true;
            return;
        }

        command.redo(source);

        // Clear redo stack on new action
        if !self.redo_stack.is_empty() {
            self.redo_stack.clear();
            if self.clean_index.is_some_and(|i| i > self.undo_stack.len()) {
                self.clean_index = None;
            }
        }

        if self.enable_merging && !self.merge_sealed {
            let top_index = self.undo_stack.len();
            if let Some(last) = self.undo_stack.last_mut() {
                if last.try_merge(&command) {
                    tracing::debug!("Merged \"{}\" on {}", command.text(), command.target());
                    if self.clean_index == Some(top_index) {
                        self.clean_index = None;
                    }
                    return;
                }
            }
        }

        tracing::debug!("Pushed \"{}\" on {}", command.text(), command.target());
        self.merge_sealed = false;
        self.undo_stack.push(command);
        self.trim();
    }

    /// Undo the last command. Returns false if there was nothing to undo.
    pub fn undo<S: GridSource<T> + ?Sized>(&mut self, source: &mut S) -> bool {
        let Some(command) = self.undo_stack.pop() else {
            return false;
        };
        tracing::debug!("Undo \"{}\" on {}", command.text(), command.target());
        command.undo(source);
        self.redo_stack.push(command);
        self.merge_sealed = true;
        true
    }

    /// Redo the last undone command. Returns false if there was nothing to redo.
    pub fn redo<S: GridSource<T> + ?Sized>(&mut self, source: &mut S) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!("Redo \"{}\" on {}", command.text(), command.target());
        command.redo(source);
        self.undo_stack.push(command);
        self.merge_sealed = true;
        true
    }
}

impl<T> std::fmt::Debug for UndoStack<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoStack")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("undo_limit", &self.undo_limit)
            .field("clean_index", &self.clean_index)
            .field("merge_sealed", &self.merge_sealed)
            .finish()
    }
}
