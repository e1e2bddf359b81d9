//! Boards and board configuration events.

pub mod model;

pub use model::{BoardConfiguration, BoardConfigurationEvent};

/// Event type emitted when a board is created.
pub const BOARD_CREATE: &str = "board_create";
/// Event type emitted when a board's configuration changes.
pub const BOARD_UPDATE: &str = "board_update";
