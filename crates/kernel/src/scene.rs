use crate::component::{Body, ComponentConfig, ComponentHandle, Node, Owner};
use crate::error::SceneError;
use crate::events::{ComponentEvent, ComponentEventKind, EventBus, SceneEvent, SubscriptionId};
use crate::section_plane::{SectionPlane, SectionPlaneSnapshot, SectionPlaneState};
use clipview_common::ComponentId;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Root owning scope and component registry.
///
/// Every component lives in the scene's arena, keyed by id. Ownership is a
/// tree: each component has exactly one owner (another component or the scene
/// root), and destroying a component destroys everything it owns first.
///
/// The scene also carries the two signals the rendering backend polls: a
/// pending redraw and a pending pipeline recompile.
#[derive(Debug)]
pub struct Scene {
    components: BTreeMap<ComponentId, Node>,
    /// Components owned directly by the root scope.
    roots: BTreeSet<ComponentId>,
    /// Live section planes, in id order.
    section_planes: BTreeMap<ComponentId, ComponentHandle>,
    next_serial: u64,
    events: Rc<EventBus<SceneEvent>>,
    redraw_pending: bool,
    redraw_requests: u64,
    recompile_pending: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
            roots: BTreeSet::new(),
            section_planes: BTreeMap::new(),
            next_serial: 0,
            events: Rc::new(EventBus::new()),
            redraw_pending: false,
            redraw_requests: 0,
            recompile_pending: false,
        }
    }

    /// Scene-wide event channel.
    pub fn events(&self) -> &Rc<EventBus<SceneEvent>> {
        &self.events
    }

    /// Number of live components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Ids of all live components, in id order.
    pub fn component_ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    pub fn contains(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Handle for the live component with this id.
    pub fn handle(&self, id: &ComponentId) -> Option<ComponentHandle> {
        self.components.get(id).map(|node| ComponentHandle {
            id: id.clone(),
            serial: node.serial,
        })
    }

    pub fn is_alive(&self, handle: &ComponentHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Create a plain component of the given type under `owner`.
    pub fn create_component(
        &mut self,
        owner: impl Into<Owner>,
        type_name: &'static str,
        config: ComponentConfig,
    ) -> Result<ComponentHandle, SceneError> {
        self.register_component(owner.into(), type_name, config.id, Body::Plain)
    }

    pub(crate) fn register_component(
        &mut self,
        owner: Owner,
        type_name: &'static str,
        id: Option<ComponentId>,
        body: Body,
    ) -> Result<ComponentHandle, SceneError> {
        let owner_id = match &owner {
            Owner::Scene => None,
            Owner::Component(handle) => {
                self.node(handle)?;
                Some(handle.id.clone())
            }
        };
        let id = match id {
            Some(id) if self.components.contains_key(&id) => {
                return Err(SceneError::DuplicateId(id));
            }
            Some(id) => id,
            None => self.generate_id(),
        };

        let serial = self.next_serial;
        self.next_serial += 1;
        match &owner_id {
            Some(owner) => {
                if let Some(node) = self.components.get_mut(owner) {
                    node.owned.insert(id.clone());
                }
            }
            None => {
                self.roots.insert(id.clone());
            }
        }
        self.components.insert(
            id.clone(),
            Node {
                serial,
                type_name,
                owner: owner_id,
                owned: BTreeSet::new(),
                events: Rc::new(EventBus::new()),
                body,
            },
        );

        tracing::debug!(%id, type_name, "component created");
        self.events.fire(&SceneEvent::ComponentCreated(id.clone()));
        Ok(ComponentHandle { id, serial })
    }

    fn generate_id(&self) -> ComponentId {
        loop {
            let id = ComponentId::generate();
            if !self.components.contains_key(&id) {
                return id;
            }
        }
    }

    fn resolve(&self, handle: &ComponentHandle) -> Option<&Node> {
        self.components
            .get(&handle.id)
            .filter(|node| node.serial == handle.serial)
    }

    fn node(&self, handle: &ComponentHandle) -> Result<&Node, SceneError> {
        self.resolve(handle)
            .ok_or_else(|| SceneError::UseAfterDestroy(handle.id.clone()))
    }

    fn node_mut(&mut self, handle: &ComponentHandle) -> Result<&mut Node, SceneError> {
        self.components
            .get_mut(&handle.id)
            .filter(|node| node.serial == handle.serial)
            .ok_or_else(|| SceneError::UseAfterDestroy(handle.id.clone()))
    }

    pub fn type_name(&self, handle: &ComponentHandle) -> Result<&'static str, SceneError> {
        Ok(self.node(handle)?.type_name)
    }

    /// The owning component, or `None` when owned by the scene root.
    pub fn owner_of(&self, handle: &ComponentHandle) -> Result<Option<&ComponentId>, SceneError> {
        Ok(self.node(handle)?.owner.as_ref())
    }

    /// Ids of the components directly owned by `handle`.
    pub fn owned(&self, handle: &ComponentHandle) -> Result<Vec<ComponentId>, SceneError> {
        Ok(self.node(handle)?.owned.iter().cloned().collect())
    }

    /// Move `child` under a new owner. Ownership stays exclusive: the child
    /// leaves its previous owner's set.
    pub fn adopt(
        &mut self,
        owner: impl Into<Owner>,
        child: &ComponentHandle,
    ) -> Result<(), SceneError> {
        let owner = owner.into();
        self.node(child)?;
        let new_owner = match &owner {
            Owner::Scene => None,
            Owner::Component(handle) => {
                self.node(handle)?;
                let mut cursor = Some(handle.id.clone());
                while let Some(current) = cursor {
                    if current == child.id {
                        return Err(SceneError::OwnershipCycle {
                            owner: handle.id.clone(),
                            child: child.id.clone(),
                        });
                    }
                    cursor = self.components.get(&current).and_then(|n| n.owner.clone());
                }
                Some(handle.id.clone())
            }
        };

        self.detach(&child.id);
        match &new_owner {
            Some(owner) => {
                if let Some(node) = self.components.get_mut(owner) {
                    node.owned.insert(child.id.clone());
                }
            }
            None => {
                self.roots.insert(child.id.clone());
            }
        }
        if let Some(node) = self.components.get_mut(&child.id) {
            node.owner = new_owner;
        }
        tracing::debug!(child = %child.id, ?owner, "component adopted");
        Ok(())
    }

    /// Remove `id` from its owner's set (or the root set).
    fn detach(&mut self, id: &ComponentId) {
        let owner = self.components.get(id).and_then(|n| n.owner.clone());
        match owner {
            Some(owner) => {
                if let Some(node) = self.components.get_mut(&owner) {
                    node.owned.remove(id);
                }
            }
            None => {
                self.roots.remove(id);
            }
        }
    }

    /// The component's local event channel. Listeners that keep the returned
    /// `Rc` may fire or subscribe from inside a dispatch.
    pub fn component_events(
        &self,
        handle: &ComponentHandle,
    ) -> Result<Rc<EventBus<ComponentEvent>>, SceneError> {
        Ok(Rc::clone(&self.node(handle)?.events))
    }

    pub fn on(
        &self,
        handle: &ComponentHandle,
        kind: ComponentEventKind,
        listener: impl Fn(&ComponentEvent) + 'static,
    ) -> Result<SubscriptionId, SceneError> {
        Ok(self.node(handle)?.events.on(kind, listener))
    }

    /// Fire `event` on the component's local channel.
    pub fn fire(
        &self,
        handle: &ComponentHandle,
        event: &ComponentEvent,
    ) -> Result<usize, SceneError> {
        Ok(self.node(handle)?.events.fire(event))
    }

    /// Ask the host frame loop to redraw on its next tick. Requests made
    /// before that tick collapse into one frame.
    pub fn request_redraw(&mut self) {
        self.redraw_pending = true;
        self.redraw_requests += 1;
        tracing::trace!(requests = self.redraw_requests, "redraw requested");
    }

    /// Redraw request made on behalf of a live component.
    pub fn redraw(&mut self, handle: &ComponentHandle) -> Result<(), SceneError> {
        self.node(handle)?;
        self.request_redraw();
        Ok(())
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    /// Total redraw requests made over the scene's lifetime.
    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    /// Consume the pending redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw_pending)
    }

    pub fn recompile_pending(&self) -> bool {
        self.recompile_pending
    }

    /// Consume the pending recompile flag.
    pub fn take_recompile(&mut self) -> bool {
        std::mem::take(&mut self.recompile_pending)
    }

    /// Destroy a component and, depth first, everything it owns.
    ///
    /// Destroying twice is an error.
    pub fn destroy(&mut self, handle: &ComponentHandle) -> Result<(), SceneError> {
        if self.resolve(handle).is_none() {
            return Err(SceneError::AlreadyDestroyed(handle.id.clone()));
        }
        self.destroy_subtree(&handle.id);
        Ok(())
    }

    /// Destroy every component owned by the root scope.
    pub fn clear(&mut self) {
        let roots: Vec<ComponentId> = self.roots.iter().cloned().collect();
        for id in &roots {
            self.destroy_subtree(id);
        }
    }

    fn destroy_subtree(&mut self, id: &ComponentId) {
        self.deregister_section_plane(id);
        let Some(node) = self.components.get_mut(id) else {
            return;
        };
        if let Body::SectionPlane(state) = &mut node.body {
            state.destroy();
        }
        let children: Vec<ComponentId> = node.owned.iter().cloned().collect();
        for child in &children {
            self.destroy_subtree(child);
        }

        self.detach(id);
        if let Some(events) = self.components.get(id).map(|n| Rc::clone(&n.events)) {
            events.fire(&ComponentEvent::Destroyed(id.clone()));
        }
        if let Some(node) = self.components.remove(id) {
            tracing::debug!(%id, type_name = node.type_name, "component destroyed");
        }
        self.events.fire(&SceneEvent::ComponentDestroyed(id.clone()));
    }

    // --- Section planes ---

    /// Number of registered section planes.
    pub fn section_plane_count(&self) -> usize {
        self.section_planes.len()
    }

    /// Registered section planes, in id order.
    pub fn section_planes(&self) -> impl Iterator<Item = SectionPlane> + '_ {
        self.section_planes
            .values()
            .map(|handle| SectionPlane::from_registered(handle.clone()))
    }

    /// Render state of every registered section plane, in id order. This is
    /// the read-only view the rendering backend consumes.
    pub fn section_plane_states(
        &self,
    ) -> impl Iterator<Item = (&ComponentId, &SectionPlaneState)> + '_ {
        self.section_planes.keys().filter_map(|id| {
            match &self.components.get(id)?.body {
                Body::SectionPlane(state) => Some((id, state.get())),
                Body::Plain => None,
            }
        })
    }

    pub(crate) fn section_plane_state(
        &self,
        handle: &ComponentHandle,
    ) -> Result<&SectionPlaneState, SceneError> {
        match &self.node(handle)?.body {
            Body::SectionPlane(state) => Ok(state.get()),
            Body::Plain => Err(SceneError::NotASectionPlane(handle.id.clone())),
        }
    }

    pub(crate) fn section_plane_state_mut(
        &mut self,
        handle: &ComponentHandle,
    ) -> Result<&mut SectionPlaneState, SceneError> {
        match &mut self.node_mut(handle)?.body {
            Body::SectionPlane(state) => Ok(state.get_mut()),
            Body::Plain => Err(SceneError::NotASectionPlane(handle.id.clone())),
        }
    }

    /// Called once, after a section plane is fully initialized.
    pub(crate) fn register_section_plane(&mut self, handle: &ComponentHandle) {
        let Ok(state) = self.section_plane_state(handle).copied() else {
            return;
        };
        self.section_planes.insert(handle.id.clone(), handle.clone());
        self.recompile_pending = true;
        self.request_redraw();
        tracing::debug!(id = %handle.id, count = self.section_planes.len(), "section plane registered");
        self.events.fire(&SceneEvent::SectionPlaneCreated(SectionPlaneSnapshot {
            id: handle.id.clone(),
            state,
        }));
    }

    /// Called once, at the start of a section plane's destruction.
    fn deregister_section_plane(&mut self, id: &ComponentId) {
        if self.section_planes.remove(id).is_none() {
            return;
        }
        self.recompile_pending = true;
        self.request_redraw();
        tracing::debug!(%id, count = self.section_planes.len(), "section plane deregistered");
        self.events.fire(&SceneEvent::SectionPlaneDestroyed(id.clone()));
    }
}
