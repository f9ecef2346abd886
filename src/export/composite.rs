use crate::{
    foundation::core::Rgba8,
    foundation::error::LayersResult,
    foundation::math::mul_div255_u8,
    platform::bitmap::Bitmap,
};

pub type PremulRgba8 = [u8; 4];

/// How a layer's pixels combine with what is already in the shared bitmap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOp {
    /// Source over destination.
    Over,
    /// Destination over source: the new pixels end up behind the existing ones.
    Behind,
}

pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

pub fn blend(dst: PremulRgba8, src: PremulRgba8, op: BlendOp) -> PremulRgba8 {
    match op {
        BlendOp::Over => over(dst, src),
        BlendOp::Behind => over(src, dst),
    }
}

/// Blend `src` into `dst` pixel by pixel. Both must be premultiplied and the same size.
pub fn blend_in_place(dst: &mut Bitmap, src: &Bitmap, op: BlendOp) -> LayersResult<()> {
    dst.ensure_same_size(src)?;
    for (d, s) in dst.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
        let out = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], op);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Paint a solid color behind everything already in `dst`.
pub fn apply_background(dst: &mut Bitmap, bg: Rgba8) {
    let bg = bg.to_premul();
    if bg[3] == 0 {
        return;
    }
    for d in dst.data.chunks_exact_mut(4) {
        let out = over(bg, [d[0], d[1], d[2], d[3]]);
        d.copy_from_slice(&out);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/composite.rs"]
mod tests;
