//! CLI commands

pub mod bundle;
pub mod clean;
pub mod fetch;
pub mod list;
pub mod render;
pub mod theme;
