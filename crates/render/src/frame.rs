use crate::renderer::Renderer;
use clipview_kernel::Scene;

/// Shader-variant key for the current section-plane layout: one `cp` per
/// registered plane, then `;`. Programs compiled for one key are valid for
/// any scene with the same key.
pub fn section_planes_hash(scene: &Scene) -> String {
    let mut hash = "cp".repeat(scene.section_plane_count());
    hash.push(';');
    hash
}

/// Host frame loop. Polls the scene's redraw and recompile signals once per
/// tick.
#[derive(Debug, Default)]
pub struct FrameLoop {
    frames: u64,
    recompiles: u64,
    program_hash: Option<String>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Pipeline rebuilds so far.
    pub fn recompiles(&self) -> u64 {
        self.recompiles
    }

    /// Key of the currently built pipeline, if any.
    pub fn program_hash(&self) -> Option<&str> {
        self.program_hash.as_deref()
    }

    /// Run one tick. Rebuilds the pipeline if the scene asked for it and the
    /// variant key changed, then renders one frame if a redraw is pending.
    pub fn tick<R: Renderer>(&mut self, scene: &mut Scene, renderer: &R) -> Option<R::Output> {
        if scene.take_recompile() || self.program_hash.is_none() {
            let hash = section_planes_hash(scene);
            if self.program_hash.as_deref() != Some(hash.as_str()) {
                self.recompiles += 1;
                tracing::info!(%hash, recompiles = self.recompiles, "rebuilding pipeline");
                self.program_hash = Some(hash);
            }
        }

        if !scene.take_redraw() {
            return None;
        }
        self.frames += 1;
        tracing::trace!(frame = self.frames, "drawing frame");
        Some(renderer.render(scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DebugTextRenderer;
    use clipview_kernel::{Owner, SectionPlane, SectionPlaneConfig};
    use glam::Vec3;

    #[test]
    fn hash_counts_planes() {
        let mut scene = Scene::new();
        assert_eq!(section_planes_hash(&scene), ";");
        SectionPlane::new(&mut scene, Owner::Scene, SectionPlaneConfig::default()).unwrap();
        SectionPlane::new(&mut scene, Owner::Scene, SectionPlaneConfig::default()).unwrap();
        assert_eq!(section_planes_hash(&scene), "cpcp;");
    }

    #[test]
    fn idle_scene_draws_nothing() {
        let mut scene = Scene::new();
        let mut frames = FrameLoop::new();
        assert!(frames.tick(&mut scene, &DebugTextRenderer::new()).is_none());
        assert_eq!(frames.frames(), 0);
        assert_eq!(frames.program_hash(), Some(";"));
    }

    #[test]
    fn many_requests_one_frame() {
        let mut scene = Scene::new();
        let plane =
            SectionPlane::new(&mut scene, Owner::Scene, SectionPlaneConfig::default()).unwrap();
        plane.set_pos(&mut scene, Some(Vec3::X)).unwrap();
        plane.set_dir(&mut scene, Some(Vec3::Y)).unwrap();
        plane.set_active(&mut scene, false).unwrap();
        assert!(scene.redraw_requests() > 3);

        let renderer = DebugTextRenderer::new();
        let mut frames = FrameLoop::new();
        assert!(frames.tick(&mut scene, &renderer).is_some());
        assert!(frames.tick(&mut scene, &renderer).is_none());
        assert_eq!(frames.frames(), 1);
    }

    #[test]
    fn recompile_only_when_plane_count_changes() {
        let mut scene = Scene::new();
        let renderer = DebugTextRenderer::new();
        let mut frames = FrameLoop::new();

        let plane =
            SectionPlane::new(&mut scene, Owner::Scene, SectionPlaneConfig::default()).unwrap();
        frames.tick(&mut scene, &renderer);
        assert_eq!(frames.recompiles(), 1);
        assert_eq!(frames.program_hash(), Some("cp;"));

        plane.flip_dir(&mut scene).unwrap();
        frames.tick(&mut scene, &renderer);
        assert_eq!(frames.recompiles(), 1);

        plane.destroy(&mut scene).unwrap();
        let out = frames.tick(&mut scene, &renderer);
        assert_eq!(frames.recompiles(), 2);
        assert_eq!(frames.program_hash(), Some(";"));
        assert!(out.is_some());
    }
}
