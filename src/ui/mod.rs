//! Line-oriented presentation: prints screen views to a writer and feeds
//! input lines to a screen.

mod render;
mod runtime;

pub use render::Renderer;
pub use runtime::{run_lines, submit_and_render};
