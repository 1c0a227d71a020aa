// ABOUTME: Command module exports
// ABOUTME: Presentation-facing operations grouped by system and column

pub mod columns;
pub mod systems;

pub use columns::*;
pub use systems::*;
