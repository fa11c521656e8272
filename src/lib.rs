//! Bookmark Browser (bmb)
//!
//! Loads a hierarchical bookmark tree from a JSON resource and lets a user
//! browse folders, search titles and URLs, and page through large result
//! sets. Layout services (responsive profiles, sidebar monitoring, element
//! centering) run against an in-memory document so the whole system is
//! host-independent.
//!
//! Pure Core / Impure Shell: `model`, `pagination::controller`,
//! `responsive` and the centering calculator are pure state logic; `dom`,
//! `worker`, `cache` and `app` carry the side effects.

pub mod app;
pub mod cache;
pub mod centering;
pub mod config;
pub mod dom;
pub mod events;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod query;
pub mod responsive;
pub mod sidebar;
pub mod source;
pub mod view;
pub mod worker;

pub use app::{page_skeleton, App, Mode};
