//! Scene kernel: component ownership, typed events, and section-plane render
//! state.
//!
//! # Invariants
//! - Every component has exactly one owner; destroying an owner destroys
//!   everything it owns, depth first.
//! - A destroyed component is unusable: accessors fail with
//!   [`SceneError::UseAfterDestroy`], a second destroy with
//!   [`SceneError::AlreadyDestroyed`].
//! - Property mutations notify synchronously, after the state they describe is
//!   fully updated.

mod component;
mod error;
mod events;
mod render_state;
mod scene;
mod section_plane;

pub use component::{ComponentConfig, ComponentHandle, Owner};
pub use error::SceneError;
pub use events::{
    ComponentEvent, ComponentEventKind, Event, EventBus, SceneEvent, SceneEventKind,
    SubscriptionId,
};
pub use render_state::RenderState;
pub use scene::Scene;
pub use section_plane::{
    DEFAULT_DIR, DEFAULT_POS, SectionPlane, SectionPlaneConfig, SectionPlaneSnapshot,
    SectionPlaneState,
};
pub use clipview_common::ComponentId;
