pub mod command;
pub mod config;
pub mod engine;
pub mod source;
pub mod stack;

pub use command::{CellEdit, Direction, GridCommand, GridEdit};
pub use config::{ConfigError, HistoryConfig, DEFAULT_UNDO_LIMIT};
pub use engine::GridUndoHelper;
pub use source::{GridEvent, GridSource, GridTarget, SingleGrid};
pub use stack::UndoStack;
