//! Bookshelf application library
//!
//! Book catalogue service: the books module (validation, ISBN uniqueness,
//! storage and HTTP handlers) and the wiring that assembles it.

pub mod app;
pub mod modules;
pub mod utils;

pub use app::Application;
/// Re-export commonly used types
pub use modules::*;
