//! Request handlers.

pub mod files;
pub mod health;
pub mod render;

pub use files::*;
pub use health::*;
pub use render::*;
