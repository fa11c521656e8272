//! Pagination: state machine, element pool and renderer.

pub mod controller;
pub mod pool;
pub mod renderer;

pub use controller::{
    calculate_pagination, visible_window, PaginationConfig, PaginationController, PaginationState,
};
pub use pool::{ElementPool, ResetPolicy};
pub use renderer::{
    layout_items, ElementRole, NavKey, PaginationItem, PaginationRenderer, RenderError, RenderOptions,
};
