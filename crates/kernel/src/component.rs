use crate::events::{ComponentEvent, EventBus};
use crate::render_state::RenderState;
use crate::section_plane::SectionPlaneState;
use clipview_common::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Reference to a component created in a [`Scene`](crate::Scene).
///
/// The serial is unique per creation, so a handle to a destroyed component
/// stays dead even if a later component reuses its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHandle {
    pub(crate) id: ComponentId,
    pub(crate) serial: u64,
}

impl ComponentHandle {
    pub fn id(&self) -> &ComponentId {
        &self.id
    }
}

/// Who owns a newly created or adopted component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The scene's root scope.
    Scene,
    Component(ComponentHandle),
}

impl From<&ComponentHandle> for Owner {
    fn from(handle: &ComponentHandle) -> Self {
        Self::Component(handle.clone())
    }
}

impl From<ComponentHandle> for Owner {
    fn from(handle: ComponentHandle) -> Self {
        Self::Component(handle)
    }
}

/// Construction options shared by every component type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// Explicit id. Generated when absent.
    pub id: Option<ComponentId>,
}

/// Arena entry for one live component.
#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) serial: u64,
    pub(crate) type_name: &'static str,
    /// `None` when owned by the scene root.
    pub(crate) owner: Option<ComponentId>,
    pub(crate) owned: BTreeSet<ComponentId>,
    pub(crate) events: Rc<EventBus<ComponentEvent>>,
    pub(crate) body: Body,
}

/// Type-specific data carried by a component.
#[derive(Debug)]
pub(crate) enum Body {
    Plain,
    SectionPlane(RenderState<SectionPlaneState>),
}
