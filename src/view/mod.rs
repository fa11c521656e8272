//! Document rendering for the result list and the error panel (impure shell)
//!
//! The pagination row lives in [`crate::pagination`]; this module renders
//! the rows it pages through.

pub mod error_panel;
pub mod results;
pub mod virtual_window;

pub use error_panel::ErrorPanel;
pub use results::{ResultItem, ResultsView};
pub use virtual_window::{VirtualWindow, WindowSlice};
