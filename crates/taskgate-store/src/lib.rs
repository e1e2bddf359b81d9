//! Taskgate file store.
//!
//! Boards live in directories: `rules.json` (or `rules.toml`) holds the
//! rule set and `board.json` holds a snapshot of the board's tasks.

pub mod board;
pub mod rules;

pub use board::{BoardSnapshot, FsBoardState, StoredTask};
pub use rules::FsRulesStore;
