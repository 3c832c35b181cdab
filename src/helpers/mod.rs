//! Markup helpers shared by the renderer and the viewer

mod html;

pub use html::*;
