use crate::foundation::{
    core::Rgba8,
    error::{LayersError, LayersResult},
    math::unpremul_channel,
};

/// A raster image as RGBA8 pixels.
///
/// Bitmaps produced by this crate are **premultiplied alpha**; the `premultiplied` flag makes
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl Bitmap {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
            premultiplied: true,
        }
    }

    pub(crate) fn from_pixmap(pixmap: &vello_cpu::Pixmap) -> Self {
        Self {
            width: u32::from(pixmap.width()),
            height: u32::from(pixmap.height()),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub fn center_pixel(&self) -> Option<[u8; 4]> {
        self.pixel(self.width / 2, self.height / 2)
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    pub(crate) fn ensure_same_size(&self, other: &Bitmap) -> LayersResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(LayersError::validation(format!(
                "bitmap size mismatch: {}x{} vs {}x{}",
                self.width, self.height, other.width, other.height
            )));
        }
        Ok(())
    }

    /// Straight-alpha RGBA8 copy, as expected by image encoders.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(4) {
            let a = px[3];
            out.push(unpremul_channel(px[0], a));
            out.push(unpremul_channel(px[1], a));
            out.push(unpremul_channel(px[2], a));
            out.push(a);
        }
        out
    }

    /// Fill with a single color, replacing all pixels.
    pub fn fill(&mut self, color: Rgba8) {
        let px = if self.premultiplied {
            color.to_premul()
        } else {
            [color.r, color.g, color.b, color.a]
        };
        for d in self.data.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

#[cfg(test)]
#[path = "../../tests/unit/platform/bitmap.rs"]
mod tests;
