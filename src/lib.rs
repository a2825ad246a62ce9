//! Link-blog bit authoring library
//!
//! This library turns freeform text into a structured bit with the help of a
//! language model, lets the user review it in their editor, and prepends it
//! to a JSON store of bits.

mod bit;
mod cli;
mod config;
mod editor;
mod errors;
mod helper;
mod storage;
mod structurer;
mod types;

// Re-export key components
pub use bit::*;
pub use cli::*;
pub use config::*;
pub use editor::*;
pub use errors::*;
pub use helper::*;
pub use storage::*;
pub use structurer::*;
pub use types::*;
