//! Command-line argument parsing and handling.

pub mod context;
pub mod definition;
pub mod lookup;
pub mod render;
pub mod switch;
pub mod utils;

// Re-export commonly used items
pub use definition::{Args, process_args};
pub use utils::determine_log_level;
