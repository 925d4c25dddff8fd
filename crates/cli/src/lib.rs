//! Console front end: prompts, the interactive menu, and report rendering.

pub mod console;
pub mod menu;
pub mod report;

pub use console::Console;
