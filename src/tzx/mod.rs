//! TZX tape format: block layout and the interpreter that renders a TZX tape
//! body onto a [`crate::pzx::Writer`].

pub mod blocks;
pub mod render;

pub use render::render;
