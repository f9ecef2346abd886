use std::{future::Future, io::Cursor};

use anyhow::Context;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use image::{DynamicImage, ImageFormat, RgbaImage, codecs::jpeg::JpegEncoder};

use crate::{
    export::options::{ExportFormat, ExportOptions, OutputMode},
    foundation::error::{LayersError, LayersResult},
    platform::bitmap::Bitmap,
};

/// Encoded export result, shaped by [`OutputMode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutput {
    /// `data:<mime>;base64,<payload>`
    Base64Uri(String),
    Base64(String),
    Blob { mime: &'static str, bytes: Vec<u8> },
}

impl ExportOutput {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Base64Uri(s) | Self::Base64(s) => Some(s),
            Self::Blob { .. } => None,
        }
    }

    /// Raw encoded image bytes, decoding base64 payloads.
    pub fn to_bytes(&self) -> LayersResult<Vec<u8>> {
        let payload = match self {
            Self::Blob { bytes, .. } => return Ok(bytes.clone()),
            Self::Base64(s) => s.as_str(),
            Self::Base64Uri(s) => s
                .split_once(',')
                .map(|(_, p)| p)
                .ok_or_else(|| LayersError::encode("data uri has no payload"))?,
        };
        BASE64_STANDARD
            .decode(payload)
            .map_err(|e| LayersError::encode(format!("invalid base64 payload: {e}")))
    }
}

/// Encode a bitmap in `format`. JPEG has no alpha; transparent pixels come out black.
pub fn encode_image(bitmap: &Bitmap, format: ExportFormat, quality: f64) -> LayersResult<Vec<u8>> {
    let straight = bitmap.to_straight_rgba8();
    let img = RgbaImage::from_raw(bitmap.width, bitmap.height, straight)
        .ok_or_else(|| LayersError::encode("bitmap buffer does not match its dimensions"))?;
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
                .context("encode png")?;
        }
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(img).to_rgb8();
            JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality))
                .encode_image(&rgb)
                .context("encode jpeg")?;
        }
    }
    Ok(buf)
}

/// Map a `[0, 1]` quality factor to the encoder's 1..=100 scale.
pub(crate) fn jpeg_quality(quality: f64) -> u8 {
    if !quality.is_finite() {
        return 92;
    }
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

pub fn encode_output(bitmap: &Bitmap, opts: &ExportOptions) -> LayersResult<ExportOutput> {
    let bytes = encode_image(bitmap, opts.format, opts.quality)?;
    let mime = opts.format.mime();
    Ok(match opts.output {
        OutputMode::Base64Uri => {
            ExportOutput::Base64Uri(format!("data:{mime};base64,{}", BASE64_STANDARD.encode(&bytes)))
        }
        OutputMode::Base64 => ExportOutput::Base64(BASE64_STANDARD.encode(&bytes)),
        OutputMode::Blob => ExportOutput::Blob { mime, bytes },
    })
}

/// Encode off the caller's turn. The bitmap is already captured, so later changes to the
/// layers do not affect the result.
pub fn encode_blob_async(
    bitmap: Bitmap,
    format: ExportFormat,
    quality: f64,
) -> impl Future<Output = LayersResult<ExportOutput>> + 'static {
    async move {
        let bytes = encode_image(&bitmap, format, quality)?;
        Ok(ExportOutput::Blob {
            mime: format.mime(),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/encode.rs"]
mod tests;
