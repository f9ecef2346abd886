use crate::{
    export::hint::RenderHint,
    foundation::core::{Affine, Rect, Size, ViewTransform, Viewport},
    layers::{callbacks::CallbackList, surface::Surface},
    platform::{bitmap::Bitmap, dom::Element, draw::Canvas2d, draw::DrawContext},
};

/// Draw callback of a raster layer. Receives a context in model coordinates.
pub type RenderFn = Box<dyn FnMut(&mut DrawContext<'_>)>;

/// Raster backing store of a canvas layer.
pub(crate) struct CanvasSurface {
    element: Element,
    pixel_ratio: f64,
    /// `None` while a draw pass holds the backing store.
    backing: Option<Canvas2d>,
    size: Size,
    transform: ViewTransform,
    tracking: bool,
    pub(crate) callbacks: CallbackList<RenderFn>,
}

impl CanvasSurface {
    pub(crate) fn new(tracking: bool, pixel_ratio: f64) -> Self {
        Self {
            element: Element::html("canvas"),
            pixel_ratio,
            backing: Some(Canvas2d::new(0, 0)),
            size: Size::ZERO,
            transform: ViewTransform::IDENTITY,
            tracking,
            callbacks: CallbackList::default(),
        }
    }

    pub(crate) fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Pixel-ratio scale, then pan translate, then zoom scale. Static layers skip pan and zoom.
    pub(crate) fn device_transform(&self) -> Affine {
        let ratio = Affine::scale(self.pixel_ratio);
        if self.tracking {
            ratio * self.transform.to_affine()
        } else {
            ratio
        }
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.size.width,
            height: self.size.height,
            pan: (self.transform.tx, self.transform.ty).into(),
            zoom: self.transform.zoom,
        }
    }

    /// Region callbacks can see, in their own coordinates.
    pub(crate) fn visible_bounds(&self) -> Rect {
        if self.tracking {
            self.viewport().visible_bounds()
        } else {
            self.size.to_rect()
        }
    }

    pub(crate) fn export_transform(&self, hint: &RenderHint) -> Affine {
        if self.tracking {
            hint.model_transform(self.viewport())
        } else {
            hint.frame_transform()
        }
    }

    pub(crate) fn export_visible_bounds(&self, hint: &RenderHint) -> Rect {
        if self.tracking {
            hint.visible_bounds(self.viewport())
        } else {
            self.size.to_rect()
        }
    }

    pub(crate) fn take_backing(&mut self) -> Option<Canvas2d> {
        self.backing.take()
    }

    /// Hand the backing store back. A store reallocated by a resize during the pass wins,
    /// in which case this returns false and the painted store is dropped.
    pub(crate) fn restore_backing(&mut self, canvas: Canvas2d) -> bool {
        if self.backing.is_some() {
            return false;
        }
        self.backing = Some(canvas);
        true
    }

    pub(crate) fn pixels(&self) -> Option<Bitmap> {
        self.backing.as_ref().map(Canvas2d::to_bitmap)
    }

    pub(crate) fn applied_transform(&self) -> Option<ViewTransform> {
        self.tracking.then_some(self.transform)
    }

    fn backing_dims(&self, size: Size) -> (u16, u16) {
        let clamp = |v: f64, axis: &str| -> u16 {
            let px = (v * self.pixel_ratio).ceil().max(0.0);
            if px > f64::from(u16::MAX) {
                tracing::warn!(axis, px, "canvas backing store clamped");
                u16::MAX
            } else {
                px as u16
            }
        };
        (clamp(size.width, "width"), clamp(size.height, "height"))
    }
}

impl Surface for CanvasSurface {
    fn root(&self) -> &Element {
        &self.element
    }

    fn node(&self) -> &Element {
        &self.element
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
        let (w, h) = self.backing_dims(size);
        self.element.set_attribute("width", w.to_string());
        self.element.set_attribute("height", h.to_string());
        self.backing = Some(Canvas2d::new(w, h));
    }

    fn set_viewport(&mut self, transform: ViewTransform) -> bool {
        if !self.tracking {
            return false;
        }
        self.transform = transform;
        true
    }

    fn supports_render(&self) -> bool {
        true
    }
}
