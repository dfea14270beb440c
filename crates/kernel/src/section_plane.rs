//! Section planes: clipping half-spaces used for cross-section views.
//!
//! A section plane passes through `pos` with outward normal `dir`. Geometry on
//! the side the normal points toward is discarded while the plane is active.
//!
//! # Invariants
//! - `dist == -pos.dot(dir)` after every mutation; it is never set directly.
//! - Each setter runs, in order: render-state write, `dist` recompute, redraw
//!   request, component event, scene-wide `SectionPlaneUpdated`.

use crate::component::{Body, ComponentHandle, Owner};
use crate::error::SceneError;
use crate::events::{ComponentEvent, ComponentEventKind, SceneEvent, SubscriptionId};
use crate::render_state::RenderState;
use crate::scene::Scene;
use clipview_common::{ComponentId, plane_dist, vec3_from_slice};
use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_POS: Vec3 = Vec3::ZERO;
pub const DEFAULT_DIR: Vec3 = Vec3::NEG_Z;

const TYPE_NAME: &str = "SectionPlane";

/// Render state of one section plane, as read by the backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPlaneState {
    pub active: bool,
    pub pos: Vec3,
    pub dir: Vec3,
    pub dist: f32,
}

impl Default for SectionPlaneState {
    fn default() -> Self {
        Self {
            active: true,
            pos: DEFAULT_POS,
            dir: DEFAULT_DIR,
            dist: 0.0,
        }
    }
}

/// Copy of a plane's state, carried by scene events.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlaneSnapshot {
    pub id: ComponentId,
    pub state: SectionPlaneState,
}

/// Construction options. Absent fields take the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionPlaneConfig {
    pub id: Option<ComponentId>,
    pub active: Option<bool>,
    pub pos: Option<[f32; 3]>,
    pub dir: Option<[f32; 3]>,
}

/// Handle to a section plane living in a [`Scene`].
///
/// All state lives in the scene; the handle only names it. Every accessor
/// fails with [`SceneError::UseAfterDestroy`] once the plane is destroyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionPlane {
    handle: ComponentHandle,
}

impl SectionPlane {
    /// Create a section plane owned by `owner`.
    ///
    /// The config is applied through the regular setters, and the plane joins
    /// the scene's section-plane registry only once it is fully initialized.
    pub fn new(
        scene: &mut Scene,
        owner: impl Into<Owner>,
        config: SectionPlaneConfig,
    ) -> Result<Self, SceneError> {
        let handle = scene.register_component(
            owner.into(),
            TYPE_NAME,
            config.id,
            Body::SectionPlane(RenderState::new(SectionPlaneState::default())),
        )?;
        let plane = Self { handle };
        plane.set_active(scene, config.active.unwrap_or(true))?;
        plane.set_pos(scene, config.pos.map(Vec3::from_array))?;
        plane.set_dir(scene, config.dir.map(Vec3::from_array))?;
        scene.register_section_plane(&plane.handle);
        Ok(plane)
    }

    /// Recover a typed plane from a generic component handle.
    pub fn from_handle(scene: &Scene, handle: &ComponentHandle) -> Result<Self, SceneError> {
        scene.section_plane_state(handle)?;
        Ok(Self {
            handle: handle.clone(),
        })
    }

    pub(crate) fn from_registered(handle: ComponentHandle) -> Self {
        Self { handle }
    }

    pub fn id(&self) -> &ComponentId {
        &self.handle.id
    }

    pub fn handle(&self) -> &ComponentHandle {
        &self.handle
    }

    pub fn is_alive(&self, scene: &Scene) -> bool {
        scene.is_alive(&self.handle)
    }

    pub fn active(&self, scene: &Scene) -> Result<bool, SceneError> {
        Ok(scene.section_plane_state(&self.handle)?.active)
    }

    /// Enable or disable clipping. Requests a redraw even though no geometry
    /// moves, since shaders branch on the flag.
    pub fn set_active(&self, scene: &mut Scene, active: bool) -> Result<(), SceneError> {
        scene.section_plane_state_mut(&self.handle)?.active = active;
        tracing::trace!(id = %self.id(), active, "section plane active");
        scene.request_redraw();
        self.notify(scene, ComponentEvent::Active(active))
    }

    pub fn pos(&self, scene: &Scene) -> Result<Vec3, SceneError> {
        Ok(scene.section_plane_state(&self.handle)?.pos)
    }

    /// Move the plane. `None` resets to the origin.
    pub fn set_pos(&self, scene: &mut Scene, pos: Option<Vec3>) -> Result<(), SceneError> {
        let pos = pos.unwrap_or(DEFAULT_POS);
        let state = scene.section_plane_state_mut(&self.handle)?;
        state.pos = pos;
        state.dist = plane_dist(state.pos, state.dir);
        tracing::trace!(id = %self.id(), ?pos, dist = state.dist, "section plane pos");
        scene.request_redraw();
        self.notify(scene, ComponentEvent::Pos(pos))
    }

    /// [`set_pos`](Self::set_pos) from untyped input. Anything but three
    /// components is rejected before the plane is touched.
    pub fn set_pos_slice(&self, scene: &mut Scene, pos: &[f32]) -> Result<(), SceneError> {
        let pos = vec3_from_slice(pos)?;
        self.set_pos(scene, Some(pos))
    }

    pub fn dir(&self, scene: &Scene) -> Result<Vec3, SceneError> {
        Ok(scene.section_plane_state(&self.handle)?.dir)
    }

    /// Reorient the plane. `None` resets to `-Z`.
    pub fn set_dir(&self, scene: &mut Scene, dir: Option<Vec3>) -> Result<(), SceneError> {
        let dir = dir.unwrap_or(DEFAULT_DIR);
        let state = scene.section_plane_state_mut(&self.handle)?;
        state.dir = dir;
        state.dist = plane_dist(state.pos, state.dir);
        tracing::trace!(id = %self.id(), ?dir, dist = state.dist, "section plane dir");
        scene.request_redraw();
        self.notify(scene, ComponentEvent::Dir(dir))
    }

    pub fn set_dir_slice(&self, scene: &mut Scene, dir: &[f32]) -> Result<(), SceneError> {
        let dir = vec3_from_slice(dir)?;
        self.set_dir(scene, Some(dir))
    }

    /// Derived plane constant, `-pos.dot(dir)`.
    pub fn dist(&self, scene: &Scene) -> Result<f32, SceneError> {
        Ok(scene.section_plane_state(&self.handle)?.dist)
    }

    /// Reverse the normal, going through [`set_dir`](Self::set_dir) so the
    /// full change notification runs.
    pub fn flip_dir(&self, scene: &mut Scene) -> Result<(), SceneError> {
        let dir = self.dir(scene)?;
        self.set_dir(scene, Some(-dir))
    }

    pub fn snapshot(&self, scene: &Scene) -> Result<SectionPlaneSnapshot, SceneError> {
        Ok(SectionPlaneSnapshot {
            id: self.id().clone(),
            state: *scene.section_plane_state(&self.handle)?,
        })
    }

    pub fn on(
        &self,
        scene: &Scene,
        kind: ComponentEventKind,
        listener: impl Fn(&ComponentEvent) + 'static,
    ) -> Result<SubscriptionId, SceneError> {
        scene.on(&self.handle, kind, listener)
    }

    /// Deregister from the scene, release the render state, then destroy
    /// everything the plane owns.
    pub fn destroy(&self, scene: &mut Scene) -> Result<(), SceneError> {
        scene.destroy(&self.handle)
    }

    fn notify(&self, scene: &Scene, event: ComponentEvent) -> Result<(), SceneError> {
        let snapshot = self.snapshot(scene)?;
        scene.fire(&self.handle, &event)?;
        scene
            .events()
            .fire(&SceneEvent::SectionPlaneUpdated(snapshot));
        Ok(())
    }
}
