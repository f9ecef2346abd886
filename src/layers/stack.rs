use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    foundation::config::LayersConfig,
    foundation::core::{Size, Vec2, Viewport},
    foundation::error::{LayersError, LayersResult},
    host::{
        Host,
        events::{EventKind, HostEvent, Subscription},
    },
    layers::{
        kind::{LayerKind, LayerOptions},
        layer::{Layer, LayerId},
    },
    platform::dom::Element,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertPosition {
    Before,
    After,
}

/// Where [`LayerStack::move_layer`] puts a layer. Indices clamp at both ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveTarget {
    /// Relative step; positive moves toward the front.
    By(isize),
    Back,
    Front,
}

struct StackState {
    layers: Vec<Layer>,
    viewport: Viewport,
    subscriptions: Vec<Subscription>,
    destroyed: bool,
    next_layer_id: u64,
}

pub(crate) struct StackShared {
    host: Rc<dyn Host>,
    container: Element,
    config: LayersConfig,
    state: RefCell<StackState>,
}

/// Ordered set of layers attached to one host, in paint order (back to front).
///
/// The stack always contains the host's node, drag and select-box layers in that relative
/// order. Custom layers may sit before, between or after them. Viewport and resize
/// notifications from the host are pushed to every layer; render ticks drive
/// `update_on_render` layers and pending one-shot updates.
#[derive(Clone)]
pub struct LayerStack(Rc<StackShared>);

impl PartialEq for LayerStack {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.state.borrow();
        f.debug_struct("LayerStack")
            .field("host", &self.0.host.id())
            .field(
                "layers",
                &state.layers.iter().map(Layer::kind).collect::<Vec<_>>(),
            )
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

impl LayerStack {
    /// Attach a stack to `host`, with configuration from the environment.
    pub fn new(host: Rc<dyn Host>) -> LayersResult<Self> {
        Self::with_config(host, LayersConfig::from_env())
    }

    pub fn with_config(host: Rc<dyn Host>, config: LayersConfig) -> LayersResult<Self> {
        config.validate()?;
        let surface = host.surface().ok_or_else(|| {
            LayersError::configuration("host has no attachable surface (headless)")
        })?;
        let viewport = host.viewport();

        let shared = Rc::new_cyclic(|weak| {
            let host_layer = |id: u64, kind: LayerKind, el: &Element| {
                Layer::new_host(LayerId(id), kind, el.clone(), weak.clone())
            };
            StackShared {
                container: surface.container.clone(),
                config,
                state: RefCell::new(StackState {
                    layers: vec![
                        host_layer(1, LayerKind::Node, &surface.node),
                        host_layer(2, LayerKind::Drag, &surface.drag),
                        host_layer(3, LayerKind::SelectBox, &surface.select_box),
                    ],
                    viewport,
                    subscriptions: Vec::new(),
                    destroyed: false,
                    next_layer_id: 4,
                }),
                host: host.clone(),
            }
        });
        let stack = Self(shared);
        stack.sync_dom_order();
        stack.subscribe_host();
        tracing::debug!(host = host.id().0, "layer stack attached");
        Ok(stack)
    }

    pub(crate) fn from_shared(shared: Rc<StackShared>) -> Self {
        Self(shared)
    }

    fn subscribe_host(&self) {
        let host = self.0.host.clone();
        let weak = Rc::downgrade(&self.0);
        let on = |kind: EventKind, f: fn(&LayerStack, &HostEvent)| {
            let weak = weak.clone();
            host.subscribe(
                kind,
                Rc::new(move |ev: &HostEvent| {
                    if let Some(shared) = weak.upgrade() {
                        f(&LayerStack(shared), ev);
                    }
                }),
            )
        };
        let subs = vec![
            on(EventKind::Viewport, |s, ev| {
                if let HostEvent::Viewport { pan, zoom } = ev {
                    s.on_viewport(*pan, *zoom);
                }
            }),
            on(EventKind::Resize, |s, ev| {
                if let HostEvent::Resize { width, height } = ev {
                    s.resize(*width, *height);
                }
            }),
            on(EventKind::Render, |s, _| s.on_render()),
            on(EventKind::Destroy, |s, _| s.destroy()),
        ];
        self.0.state.borrow_mut().subscriptions = subs;
    }

    pub fn host(&self) -> Rc<dyn Host> {
        self.0.host.clone()
    }

    pub fn config(&self) -> &LayersConfig {
        &self.0.config
    }

    /// Container element the layer roots are attached to.
    pub fn container(&self) -> &Element {
        &self.0.container
    }

    /// Last viewport reported by the host.
    pub fn viewport(&self) -> Viewport {
        self.0.state.borrow().viewport
    }

    pub fn is_destroyed(&self) -> bool {
        self.0.state.borrow().destroyed
    }

    /// Snapshot of all layers in paint order, host layers included.
    pub fn layers(&self) -> Vec<Layer> {
        self.0.state.borrow().layers.clone()
    }

    pub fn custom_layers(&self) -> Vec<Layer> {
        self.layers()
            .into_iter()
            .filter(|l| !l.kind().is_host())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.state.borrow().layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index_of(&self, layer: &Layer) -> Option<usize> {
        self.0.state.borrow().layers.iter().position(|l| l == layer)
    }

    fn host_layer(&self, kind: LayerKind) -> Option<Layer> {
        self.0
            .state
            .borrow()
            .layers
            .iter()
            .find(|l| l.kind() == kind)
            .cloned()
    }

    pub fn node_layer(&self) -> Option<Layer> {
        self.host_layer(LayerKind::Node)
    }

    pub fn drag_layer(&self) -> Option<Layer> {
        self.host_layer(LayerKind::Drag)
    }

    pub fn select_box_layer(&self) -> Option<Layer> {
        self.host_layer(LayerKind::SelectBox)
    }

    fn ensure_alive(&self) -> LayersResult<()> {
        if self.is_destroyed() {
            return Err(LayersError::configuration("layer stack has been destroyed"));
        }
        Ok(())
    }

    fn create(&self, kind: LayerKind, opts: &LayerOptions) -> LayersResult<Layer> {
        self.ensure_alive()?;
        if kind.is_host() {
            return Err(LayersError::validation(format!(
                "'{kind}' is a host layer and cannot be added"
            )));
        }
        let id = {
            let mut state = self.0.state.borrow_mut();
            let id = LayerId(state.next_layer_id);
            state.next_layer_id += 1;
            id
        };
        let layer = Layer::new_custom(
            id,
            kind,
            opts,
            self.0.config.pixel_ratio,
            Rc::downgrade(&self.0),
        )?;
        let vp = self.viewport();
        layer.apply_viewport(vp.transform(), false);
        layer.resize(Size::new(vp.width, vp.height));
        Ok(layer)
    }

    /// Add a layer at the front of the paint order.
    #[tracing::instrument(skip(self, opts))]
    pub fn append(&self, kind: LayerKind, opts: LayerOptions) -> LayersResult<Layer> {
        let layer = self.create(kind, &opts)?;
        self.0.state.borrow_mut().layers.push(layer.clone());
        self.sync_dom_order();
        Ok(layer)
    }

    /// Add a layer next to `reference`. Falls back to [`LayerStack::append`] when
    /// `reference` is not part of this stack.
    #[tracing::instrument(skip(self, reference, opts))]
    pub fn insert(
        &self,
        position: InsertPosition,
        reference: &Layer,
        kind: LayerKind,
        opts: LayerOptions,
    ) -> LayersResult<Layer> {
        let Some(idx) = self.index_of(reference) else {
            tracing::debug!("insert reference not in stack, appending");
            return self.append(kind, opts);
        };
        let layer = self.create(kind, &opts)?;
        {
            let mut state = self.0.state.borrow_mut();
            // re-resolve: creating the layer may have run callbacks that reordered the stack
            let idx = state
                .layers
                .iter()
                .position(|l| l == reference)
                .unwrap_or(idx.min(state.layers.len()));
            let at = match position {
                InsertPosition::Before => idx,
                InsertPosition::After => idx + 1,
            };
            let len = state.layers.len();
            state.layers.insert(at.min(len), layer.clone());
        }
        self.sync_dom_order();
        Ok(layer)
    }

    /// Detach a layer. Idempotent; host layers are never removed.
    pub fn remove(&self, layer: &Layer) -> bool {
        if layer.kind().is_host() {
            tracing::debug!("host layers cannot be removed");
            return false;
        }
        let removed = {
            let mut state = self.0.state.borrow_mut();
            match state.layers.iter().position(|l| l == layer) {
                Some(idx) => {
                    state.layers.remove(idx);
                    true
                }
                None => false,
            }
        };
        if !removed {
            tracing::debug!(layer = layer.id().0, "layer already removed");
        }
        layer.detach();
        removed
    }

    /// Reposition a custom layer in paint order. Host layers keep their place.
    pub fn move_layer(&self, layer: &Layer, target: MoveTarget) {
        if layer.kind().is_host() {
            tracing::debug!("host layers cannot be moved");
            return;
        }
        let moved = {
            let mut state = self.0.state.borrow_mut();
            let Some(from) = state.layers.iter().position(|l| l == layer) else {
                return;
            };
            let last = state.layers.len() - 1;
            let to = match target {
                MoveTarget::Back => 0,
                MoveTarget::Front => last,
                MoveTarget::By(step) => from.saturating_add_signed(step).min(last),
            };
            if to == from {
                false
            } else {
                let l = state.layers.remove(from);
                state.layers.insert(to, l);
                true
            }
        };
        if moved {
            self.sync_dom_order();
        } else {
            tracing::debug!(?target, "move clamped at stack boundary");
        }
    }

    pub fn move_up(&self, layer: &Layer) {
        self.move_layer(layer, MoveTarget::By(1));
    }

    pub fn move_down(&self, layer: &Layer) {
        self.move_layer(layer, MoveTarget::By(-1));
    }

    pub fn move_back(&self, layer: &Layer) {
        self.move_layer(layer, MoveTarget::Back);
    }

    pub fn move_front(&self, layer: &Layer) {
        self.move_layer(layer, MoveTarget::Front);
    }

    /// Re-apply the current viewport to every layer, then redraw every layer now.
    #[tracing::instrument(skip(self))]
    pub fn update(&self) {
        let transform = self.viewport().transform();
        let layers = self.layers();
        for l in &layers {
            l.apply_viewport(transform, false);
        }
        for l in &layers {
            l.update();
        }
    }

    /// Propagate a new container size (CSS pixels); raster layers reallocate and redraw.
    #[tracing::instrument(skip(self))]
    pub fn resize(&self, width: f64, height: f64) {
        {
            let mut state = self.0.state.borrow_mut();
            state.viewport.width = width;
            state.viewport.height = height;
        }
        let size = Size::new(width, height);
        for l in self.layers() {
            l.resize(size);
        }
    }

    fn on_viewport(&self, pan: Vec2, zoom: f64) {
        let transform = {
            let mut state = self.0.state.borrow_mut();
            state.viewport.pan = pan;
            state.viewport.zoom = zoom;
            state.viewport.transform()
        };
        for l in self.layers() {
            l.apply_viewport(transform, true);
        }
    }

    fn on_render(&self) {
        for l in self.layers() {
            if l.take_render_due() {
                l.update();
            }
        }
    }

    /// Remove every custom layer and unsubscribe from the host. Safe to call repeatedly.
    pub fn destroy(&self) {
        let (layers, subs) = {
            let mut state = self.0.state.borrow_mut();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            (
                std::mem::take(&mut state.layers),
                std::mem::take(&mut state.subscriptions),
            )
        };
        for l in &layers {
            l.detach();
        }
        for s in subs {
            s.unsubscribe();
        }
        tracing::debug!(host = self.0.host.id().0, "layer stack destroyed");
    }

    /// Reattach layer roots so that DOM order equals paint order.
    fn sync_dom_order(&self) {
        for l in self.layers() {
            self.0.container.append_child(&l.root());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/stack.rs"]
mod tests;
