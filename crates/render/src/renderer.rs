use crate::uniforms::pack_section_planes;
use clipview_kernel::Scene;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene render state and produces output. It never
/// mutates the scene; the kernel owns the truth.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene.
    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable dump of the packed section-plane state, the same
/// data a GPU backend would upload. Useful for CLI output, logging, and
/// testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Scene (components={}, section_planes={}) ===\n",
            scene.component_count(),
            scene.section_plane_count()
        ));

        let ids = scene.section_plane_states().map(|(id, _)| id);
        for (id, uniform) in ids.zip(pack_section_planes(scene)) {
            let [px, py, pz] = uniform.pos;
            let [dx, dy, dz] = uniform.dir;
            out.push_str(&format!(
                "  [{id}] {} pos=({px:.2}, {py:.2}, {pz:.2}) dir=({dx:.2}, {dy:.2}, {dz:.2}) dist={:.2}\n",
                if uniform.active != 0 { "on " } else { "off" },
                uniform.dist
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipview_kernel::{Owner, SectionPlane, SectionPlaneConfig};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("components=0"));
        assert!(output.contains("section_planes=0"));
    }

    #[test]
    fn debug_renderer_lists_planes() {
        let mut scene = Scene::new();
        SectionPlane::new(
            &mut scene,
            Owner::Scene,
            SectionPlaneConfig {
                id: Some("cut".into()),
                active: Some(false),
                pos: Some([1.0, 1.0, 1.0]),
                dir: Some([-1.0, -1.0, -1.0]),
            },
        )
        .unwrap();

        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("section_planes=1"));
        assert!(output.contains("[cut] off"));
        assert!(output.contains("dist=3.00"));
    }
}
