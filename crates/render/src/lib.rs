//! Rendering adapter: the backend side of the scene kernel.
//!
//! # Invariants
//! - The backend reads render state; it never writes it.
//! - Redraw requests made between two frames produce one frame.
//! - Pipeline variants are rebuilt only when the section-plane layout changes.

mod frame;
mod renderer;
mod uniforms;

pub use frame::{FrameLoop, section_planes_hash};
pub use renderer::{DebugTextRenderer, Renderer};
pub use uniforms::{SectionPlaneUniform, as_bytes, pack_section_planes};

pub fn crate_info() -> &'static str {
    "clipview-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
