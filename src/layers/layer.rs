use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
};

use crate::{
    export::{
        composite::{BlendOp, blend_in_place},
        hint::RenderHint,
    },
    foundation::core::{Affine, Point, Rect, Size, ViewTransform, Viewport},
    foundation::error::{LayersError, LayersResult},
    host::events::Subscription,
    layers::{
        callbacks::CallbackId,
        canvas::{CanvasSurface, RenderFn},
        dom::{DomSurface, DomUpdateFn},
        kind::{LayerKind, LayerOptions},
        stack::{InsertPosition, LayerStack, MoveTarget, StackShared},
        surface::{HostCanvas, LayerBody, Surface, apply_layer_style, stop_clicks},
    },
    platform::{
        bitmap::Bitmap,
        dom::Element,
        draw::{Canvas2d, DrawContext, checked_dims},
    },
};

/// Stack-unique layer identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

pub(crate) struct LayerInner {
    id: LayerId,
    kind: LayerKind,
    body: LayerBody,
    update_on_render: bool,
    render_once: bool,
    removed: bool,
    stack: Weak<StackShared>,
    /// Host subscriptions of per-element helpers, keyed by the helper's callback.
    helper_subscriptions: Vec<(CallbackId, Subscription)>,
}

/// Handle to one layer of a [`LayerStack`].
///
/// Cloning clones the handle. The platform element behind a layer keeps its identity until
/// the layer is removed.
#[derive(Clone)]
pub struct Layer(Rc<RefCell<LayerInner>>);

/// Non-owning [`Layer`] handle for host event handlers.
#[derive(Clone)]
pub(crate) struct WeakLayer(Weak<RefCell<LayerInner>>);

impl WeakLayer {
    pub(crate) fn upgrade(&self) -> Option<Layer> {
        self.0.upgrade().map(Layer)
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Layer {}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Layer")
            .field("id", &inner.id)
            .field("kind", &inner.kind)
            .field("removed", &inner.removed)
            .finish()
    }
}

impl Layer {
    pub(crate) fn new_custom(
        id: LayerId,
        kind: LayerKind,
        opts: &LayerOptions,
        default_pixel_ratio: f64,
        stack: Weak<StackShared>,
    ) -> LayersResult<Self> {
        let body = if kind.is_canvas() {
            let ratio = opts.pixel_ratio.unwrap_or(default_pixel_ratio);
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(LayersError::configuration(format!(
                    "pixel_ratio must be finite and > 0, got {ratio}"
                )));
            }
            LayerBody::Canvas(CanvasSurface::new(!kind.is_static(), ratio))
        } else if kind.is_dom() {
            let mut dom = DomSurface::new(kind);
            dom.update_on_transform = opts.update_on_transform;
            LayerBody::Dom(dom)
        } else {
            return Err(LayersError::validation(format!(
                "host layer kind '{kind}' cannot be created"
            )));
        };

        let root = body.surface().root().clone();
        apply_layer_style(&root);
        root.set_data("layer", kind.as_str());
        if opts.stop_clicks {
            stop_clicks(&root);
        }

        Ok(Self(Rc::new(RefCell::new(LayerInner {
            id,
            kind,
            body,
            update_on_render: opts.update_on_render,
            render_once: false,
            removed: false,
            stack,
            helper_subscriptions: Vec::new(),
        }))))
    }

    pub(crate) fn new_host(
        id: LayerId,
        kind: LayerKind,
        element: Element,
        stack: Weak<StackShared>,
    ) -> Self {
        Self(Rc::new(RefCell::new(LayerInner {
            id,
            kind,
            body: LayerBody::Host(HostCanvas::new(element)),
            update_on_render: false,
            render_once: false,
            removed: false,
            stack,
            helper_subscriptions: Vec::new(),
        })))
    }

    pub(crate) fn downgrade(&self) -> WeakLayer {
        WeakLayer(Rc::downgrade(&self.0))
    }

    pub fn id(&self) -> LayerId {
        self.0.borrow().id
    }

    pub fn kind(&self) -> LayerKind {
        self.0.borrow().kind
    }

    /// Element attached to the stack container.
    pub fn root(&self) -> Element {
        self.0.borrow().body.surface().root().clone()
    }

    /// Element callbacks draw into or mutate: the canvas, the SVG group, or the HTML container.
    pub fn node(&self) -> Element {
        self.0.borrow().body.surface().node().clone()
    }

    /// Register a draw callback on a canvas layer and redraw.
    pub fn on_draw(
        &self,
        f: impl FnMut(&mut DrawContext<'_>) + 'static,
    ) -> LayersResult<CallbackId> {
        let id = {
            let mut inner = self.0.borrow_mut();
            let kind = inner.kind;
            match &mut inner.body {
                LayerBody::Canvas(c) => c.callbacks.push(Box::new(f) as RenderFn),
                _ => {
                    return Err(LayersError::validation(format!(
                        "draw callbacks need a canvas layer, not '{kind}'"
                    )));
                }
            }
        };
        self.update();
        Ok(id)
    }

    /// Register an update callback on an SVG or HTML layer and run the update.
    pub fn on_update(&self, f: impl FnMut(&Element) + 'static) -> LayersResult<CallbackId> {
        let id = {
            let mut inner = self.0.borrow_mut();
            let kind = inner.kind;
            match &mut inner.body {
                LayerBody::Dom(d) => d.callbacks.push(Box::new(f) as DomUpdateFn),
                _ => {
                    return Err(LayersError::validation(format!(
                        "update callbacks need an svg or html layer, not '{kind}'"
                    )));
                }
            }
        };
        self.update();
        Ok(id)
    }

    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut inner = self.0.borrow_mut();
        match &mut inner.body {
            LayerBody::Canvas(c) => c.callbacks.remove(id),
            LayerBody::Dom(d) => d.callbacks.remove(id),
            LayerBody::Host(_) => false,
        }
    }

    pub fn callback_count(&self) -> usize {
        let inner = self.0.borrow();
        match &inner.body {
            LayerBody::Canvas(c) => c.callbacks.len(),
            LayerBody::Dom(d) => d.callbacks.len(),
            LayerBody::Host(_) => 0,
        }
    }

    /// Redraw now: canvas layers clear and rerun their draw callbacks, DOM layers rerun their
    /// update callbacks against the content node. Host layers are drawn by the host.
    pub fn update(&self) {
        if self.is_removed() {
            tracing::debug!(layer = self.id().0, "update on removed layer ignored");
            return;
        }
        let kind = self.kind();
        if kind.is_canvas() {
            self.redraw();
        } else if kind.is_dom() {
            self.run_dom_callbacks();
        }
    }

    fn redraw(&self) {
        let (mut canvas, base, visible) = {
            let mut inner = self.0.borrow_mut();
            let LayerBody::Canvas(c) = &mut inner.body else {
                return;
            };
            let base = c.device_transform();
            let visible = c.visible_bounds();
            match c.take_backing() {
                Some(canvas) => (canvas, base, visible),
                None => {
                    tracing::debug!("nested redraw skipped");
                    return;
                }
            }
        };
        self.paint_with_callbacks(&mut canvas, base, visible);
        let restored = match &mut self.0.borrow_mut().body {
            LayerBody::Canvas(c) => c.restore_backing(canvas),
            _ => true,
        };
        if !restored {
            tracing::debug!(layer = self.id().0, "backing replaced during redraw");
            self.request_update();
        }
    }

    fn paint_with_callbacks(
        &self,
        canvas: &mut Canvas2d,
        base: Affine,
        visible: Rect,
    ) {
        let taken = match &mut self.0.borrow_mut().body {
            LayerBody::Canvas(c) if !c.callbacks.is_running() => Some(c.callbacks.take_for_run()),
            _ => None,
        };
        let Some(mut taken) = taken else {
            return;
        };
        canvas.paint(base, visible, |ctx| {
            for (id, f) in taken.iter_mut() {
                if self.is_cancelled(*id) {
                    continue;
                }
                ctx.save();
                f(ctx);
                ctx.restore();
            }
        });
        if let LayerBody::Canvas(c) = &mut self.0.borrow_mut().body {
            c.callbacks.finish_run(taken);
        }
    }

    fn run_dom_callbacks(&self) {
        let (node, taken) = {
            let mut inner = self.0.borrow_mut();
            let LayerBody::Dom(d) = &mut inner.body else {
                return;
            };
            if d.callbacks.is_running() {
                tracing::debug!("nested update skipped");
                return;
            }
            (d.node().clone(), d.callbacks.take_for_run())
        };
        let mut taken = taken;
        for (id, f) in taken.iter_mut() {
            if self.is_cancelled(*id) {
                continue;
            }
            f(&node);
        }
        if let LayerBody::Dom(d) = &mut self.0.borrow_mut().body {
            d.callbacks.finish_run(taken);
        }
    }

    fn is_cancelled(&self, id: CallbackId) -> bool {
        match &self.0.borrow().body {
            LayerBody::Canvas(c) => c.callbacks.is_cancelled(id),
            LayerBody::Dom(d) => d.callbacks.is_cancelled(id),
            LayerBody::Host(_) => true,
        }
    }

    /// Schedule exactly one update on the next host render tick. Repeated requests before
    /// that tick collapse into one.
    pub fn request_update(&self) {
        self.0.borrow_mut().render_once = true;
    }

    pub fn has_pending_update(&self) -> bool {
        self.0.borrow().render_once
    }

    pub fn update_on_render(&self) -> bool {
        self.0.borrow().update_on_render
    }

    pub fn set_update_on_render(&self, enabled: bool) {
        self.0.borrow_mut().update_on_render = enabled;
    }

    /// DOM layers only; canvas layers always redraw when the viewport changes.
    pub fn update_on_transform(&self) -> bool {
        match &self.0.borrow().body {
            LayerBody::Dom(d) => d.update_on_transform,
            _ => false,
        }
    }

    pub fn set_update_on_transform(&self, enabled: bool) {
        if let LayerBody::Dom(d) = &mut self.0.borrow_mut().body {
            d.update_on_transform = enabled;
        }
    }

    /// Whether an update is due on a render tick. Clears a pending one-shot request.
    pub(crate) fn take_render_due(&self) -> bool {
        let mut inner = self.0.borrow_mut();
        let once = std::mem::take(&mut inner.render_once);
        once || inner.update_on_render
    }

    pub fn is_visible(&self) -> bool {
        self.root().style("display").as_deref() != Some("none")
    }

    pub fn set_visible(&self, visible: bool) {
        self.root().set_style("display", if visible { "" } else { "none" });
    }

    pub fn show(&self) {
        self.set_visible(true);
    }

    pub fn hide(&self) {
        self.set_visible(false);
    }

    fn viewport(&self) -> Viewport {
        self.stack()
            .map(|s| s.viewport())
            .unwrap_or_default()
    }

    /// Whether a model-space point lies inside the host's visible region.
    pub fn in_visible_bounds(&self, p: Point) -> bool {
        self.viewport().contains_point(p)
    }

    /// Whether a model-space box overlaps the host's visible region.
    pub fn bounds_visible(&self, r: Rect) -> bool {
        self.viewport().intersects(r)
    }

    fn stack(&self) -> Option<LayerStack> {
        self.0.borrow().stack.upgrade().map(LayerStack::from_shared)
    }

    pub(crate) fn attached_stack(&self) -> LayersResult<LayerStack> {
        self.stack()
            .ok_or_else(|| LayersError::configuration("layer stack no longer exists"))
    }

    /// One step toward the front (painted later).
    pub fn move_up(&self) {
        if let Some(s) = self.stack() {
            s.move_layer(self, MoveTarget::By(1));
        }
    }

    /// One step toward the back (painted earlier).
    pub fn move_down(&self) {
        if let Some(s) = self.stack() {
            s.move_layer(self, MoveTarget::By(-1));
        }
    }

    pub fn move_back(&self) {
        if let Some(s) = self.stack() {
            s.move_layer(self, MoveTarget::Back);
        }
    }

    pub fn move_front(&self) {
        if let Some(s) = self.stack() {
            s.move_layer(self, MoveTarget::Front);
        }
    }

    pub fn insert_before(&self, kind: LayerKind, opts: LayerOptions) -> LayersResult<Layer> {
        self.attached_stack()?
            .insert(InsertPosition::Before, self, kind, opts)
    }

    pub fn insert_after(&self, kind: LayerKind, opts: LayerOptions) -> LayersResult<Layer> {
        self.attached_stack()?
            .insert(InsertPosition::After, self, kind, opts)
    }

    /// Remove from the stack. Idempotent; host layers stay.
    pub fn remove(&self) {
        match self.stack() {
            Some(s) => {
                s.remove(self);
            }
            None => self.detach(),
        }
    }

    pub fn is_removed(&self) -> bool {
        self.0.borrow().removed
    }

    pub(crate) fn detach(&self) {
        let subs = {
            let mut inner = self.0.borrow_mut();
            if inner.removed {
                return;
            }
            inner.removed = true;
            inner.render_once = false;
            inner.update_on_render = false;
            inner.body.surface_mut().remove();
            match &mut inner.body {
                LayerBody::Canvas(c) => c.callbacks.clear(),
                LayerBody::Dom(d) => d.callbacks.clear(),
                LayerBody::Host(_) => {}
            }
            std::mem::take(&mut inner.helper_subscriptions)
        };
        for (_, sub) in subs {
            sub.unsubscribe();
        }
    }

    /// Keep a helper's host subscriptions alive for as long as the layer is attached.
    /// On a removed layer they are released immediately.
    pub(crate) fn hold_subscriptions(&self, owner: CallbackId, subs: Vec<Subscription>) {
        let rejected = {
            let mut inner = self.0.borrow_mut();
            if inner.removed {
                subs
            } else {
                inner
                    .helper_subscriptions
                    .extend(subs.into_iter().map(|s| (owner, s)));
                Vec::new()
            }
        };
        for sub in rejected {
            sub.unsubscribe();
        }
    }

    pub(crate) fn release_subscriptions(&self, owner: CallbackId) {
        let released: Vec<Subscription> = {
            let mut inner = self.0.borrow_mut();
            let (mine, rest) = std::mem::take(&mut inner.helper_subscriptions)
                .into_iter()
                .partition(|(id, _)| *id == owner);
            inner.helper_subscriptions = rest;
            mine.into_iter().map(|(_, s)| s).collect()
        };
        for sub in released {
            sub.unsubscribe();
        }
    }

    pub(crate) fn helper_subscription_count(&self) -> usize {
        self.0.borrow().helper_subscriptions.len()
    }

    pub fn supports_render(&self) -> bool {
        self.0.borrow().body.surface().supports_render()
    }

    /// Snapshot of a canvas layer's backing store in device pixels.
    pub fn pixels(&self) -> Option<Bitmap> {
        match &self.0.borrow().body {
            LayerBody::Canvas(c) => c.pixels(),
            _ => None,
        }
    }

    pub fn pixel_ratio(&self) -> Option<f64> {
        match &self.0.borrow().body {
            LayerBody::Canvas(c) => Some(c.pixel_ratio()),
            _ => None,
        }
    }

    /// Last viewport transform applied to a tracking layer. `None` for static and host layers.
    pub fn applied_transform(&self) -> Option<ViewTransform> {
        match &self.0.borrow().body {
            LayerBody::Canvas(c) => c.applied_transform(),
            LayerBody::Dom(d) => d.applied_transform(),
            LayerBody::Host(_) => None,
        }
    }

    pub(crate) fn apply_viewport(&self, transform: ViewTransform, redraw: bool) {
        let due = self
            .0
            .borrow_mut()
            .body
            .surface_mut()
            .set_viewport(transform);
        if due && redraw {
            self.update();
        }
    }

    pub(crate) fn resize(&self, size: Size) {
        let is_canvas = {
            let mut inner = self.0.borrow_mut();
            inner.body.surface_mut().resize(size);
            matches!(inner.body, LayerBody::Canvas(_))
        };
        if is_canvas {
            self.redraw();
        }
    }

    /// Rasterize this layer for export and blend it into `target`.
    ///
    /// Only canvas layers rasterize themselves; host content is rendered by the host.
    pub fn render_into(&self, target: &mut Bitmap, hint: &RenderHint, op: BlendOp) -> LayersResult<()> {
        let (base, visible) = {
            let inner = self.0.borrow();
            match &inner.body {
                LayerBody::Canvas(c) => (c.export_transform(hint), c.export_visible_bounds(hint)),
                _ => {
                    return Err(LayersError::unsupported_layer(format!(
                        "layer '{}' cannot rasterize itself",
                        inner.kind
                    )));
                }
            }
        };
        let (w, h) = checked_dims(target.width, target.height)?;
        let mut scratch = Canvas2d::new(w, h);
        self.paint_with_callbacks(&mut scratch, base, visible);
        blend_in_place(target, &scratch.to_bitmap(), op)
    }
}
