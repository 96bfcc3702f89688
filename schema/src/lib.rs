// Party Battle Schema - Shared type definitions
// This crate holds the closed enums and data records that character data
// files are parsed into, so names from RON files resolve to real variants.

// Re-export the main types
pub use abilities::*;
pub use attributes::*;
pub use characters::*;
pub use display::*;

pub mod abilities;
pub mod attributes;
pub mod characters;
pub mod display;
