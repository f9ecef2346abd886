//! Layer-aware raster export.
//!
//! The host renders its own three layers as one block. Custom layers painted before that
//! block are blended behind it, nearest first; layers painted after it are blended over it
//! in paint order. The background goes in last, behind everything.

use std::future::Future;

use crate::{
    export::{
        composite::{BlendOp, apply_background},
        encode::{ExportOutput, encode_blob_async, encode_output},
        hint::RenderHint,
        options::{ExportFormat, ExportOptions},
    },
    foundation::error::{LayersError, LayersResult},
    layers::{kind::LayerKind, layer::Layer, stack::LayerStack},
    platform::bitmap::Bitmap,
};

/// Custom layers split around the host block, both in paint order.
#[derive(Debug, Default)]
pub(crate) struct Partition {
    pub(crate) before: Vec<Layer>,
    pub(crate) after: Vec<Layer>,
}

/// Check that the host layers form one contiguous block in canonical order.
pub(crate) fn check_host_order(layers: &[Layer]) -> LayersResult<()> {
    let host: Vec<(usize, LayerKind)> = layers
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind().is_host())
        .map(|(i, l)| (i, l.kind()))
        .collect();
    let kinds: Vec<LayerKind> = host.iter().map(|(_, k)| *k).collect();
    if kinds != LayerKind::HOST {
        return Err(LayersError::unsupported_order(format!(
            "host layers are {kinds:?}, expected {:?}",
            LayerKind::HOST
        )));
    }
    let contiguous = host.windows(2).all(|w| w[1].0 == w[0].0 + 1);
    if !contiguous {
        let split: Vec<String> = layers[host[0].0..=host[host.len() - 1].0]
            .iter()
            .filter(|l| !l.kind().is_host())
            .map(|l| l.kind().to_string())
            .collect();
        return Err(LayersError::unsupported_order(format!(
            "host layers are split by {}",
            split.join(", ")
        )));
    }
    Ok(())
}

/// Split visible custom layers at the first host layer.
pub(crate) fn partition(layers: &[Layer]) -> Partition {
    let first_host = layers
        .iter()
        .position(|l| l.kind().is_host())
        .unwrap_or(layers.len());
    let mut out = Partition::default();
    for (i, l) in layers.iter().enumerate() {
        if l.kind().is_host() || !l.is_visible() {
            continue;
        }
        if i < first_host {
            out.before.push(l.clone());
        } else {
            out.after.push(l.clone());
        }
    }
    out
}

/// Keep layers that contribute pixels; fail on any that cannot rasterize unless told to
/// ignore them.
fn renderable(layers: Vec<Layer>, opts: &ExportOptions) -> LayersResult<Vec<Layer>> {
    let mut out = Vec::with_capacity(layers.len());
    for l in layers {
        if !l.supports_render() {
            if opts.ignore_unsupported_layers {
                tracing::debug!(layer = l.id().0, kind = %l.kind(), "skipping unsupported layer");
                continue;
            }
            return Err(LayersError::unsupported_layer(format!(
                "layer {} of kind '{}' cannot be rasterized",
                l.id().0,
                l.kind()
            )));
        }
        // empty svg/html layers render nothing
        if l.kind().is_canvas() {
            out.push(l);
        }
    }
    Ok(out)
}

impl LayerStack {
    /// Rasterize the stack: host content plus every visible custom layer.
    ///
    /// With no custom layer to rasterize this is exactly the host's native export.
    #[tracing::instrument(skip(self, opts), fields(full = opts.full))]
    pub fn to_raster(&self, opts: &ExportOptions) -> LayersResult<Bitmap> {
        let layers = self.layers();
        if let Err(e) = check_host_order(&layers) {
            if !opts.ignore_unsupported_order {
                return Err(e);
            }
            tracing::debug!(error = %e, "ignoring host layer order");
        }

        let Partition { before, after } = partition(&layers);
        let before = renderable(before, opts)?;
        let after = renderable(after, opts)?;

        let host = self.host();
        if before.is_empty() && after.is_empty() {
            tracing::debug!("no custom layers to composite, delegating to host export");
            return host.export_native(opts);
        }

        let hint = RenderHint::resolve(self.viewport(), host.full_bounds(), opts)?;
        let host_opts = ExportOptions {
            bg: None,
            ..opts.clone()
        };
        let mut out = host.export_native(&host_opts)?;
        if out.width != hint.width || out.height != hint.height {
            return Err(LayersError::validation(format!(
                "host export is {}x{}, expected {}x{}",
                out.width, out.height, hint.width, hint.height
            )));
        }

        for l in before.iter().rev() {
            l.render_into(&mut out, &hint, BlendOp::Behind)?;
        }
        for l in &after {
            l.render_into(&mut out, &hint, BlendOp::Over)?;
        }
        if let Some(bg) = opts.bg {
            apply_background(&mut out, bg);
        }
        tracing::debug!(
            before = before.len(),
            after = after.len(),
            width = hint.width,
            height = hint.height,
            "composited export"
        );
        Ok(out)
    }

    /// Rasterize and encode per `opts.format` and `opts.output`.
    pub fn export(&self, opts: &ExportOptions) -> LayersResult<ExportOutput> {
        let bitmap = self.to_raster(opts)?;
        encode_output(&bitmap, opts)
    }

    pub fn png(&self, opts: &ExportOptions) -> LayersResult<ExportOutput> {
        self.export(&ExportOptions {
            format: ExportFormat::Png,
            ..opts.clone()
        })
    }

    pub fn jpg(&self, opts: &ExportOptions) -> LayersResult<ExportOutput> {
        self.export(&ExportOptions {
            format: ExportFormat::Jpeg,
            ..opts.clone()
        })
    }

    /// Rasterize now and encode to a blob when the returned future is polled.
    pub fn export_blob_async(
        &self,
        opts: &ExportOptions,
    ) -> LayersResult<impl Future<Output = LayersResult<ExportOutput>> + 'static> {
        let bitmap = self.to_raster(opts)?;
        Ok(encode_blob_async(bitmap, opts.format, opts.quality))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/compositor.rs"]
mod tests;
