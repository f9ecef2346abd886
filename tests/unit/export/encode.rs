use super::*;
use crate::foundation::core::Rgba8;

fn red(w: u32, h: u32) -> Bitmap {
    let mut b = Bitmap::transparent(w, h);
    b.fill(Rgba8::RED);
    b
}

#[test]
fn png_round_trips_through_image_decoder() {
    let bytes = encode_image(&red(3, 2), ExportFormat::Png, 0.92).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (3, 2));
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
}

#[test]
fn jpeg_has_soi_marker() {
    let bytes = encode_image(&red(8, 8), ExportFormat::Jpeg, 0.5).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn quality_maps_to_percent() {
    assert_eq!(jpeg_quality(0.92), 92);
    assert_eq!(jpeg_quality(0.0), 1);
    assert_eq!(jpeg_quality(7.0), 100);
    assert_eq!(jpeg_quality(f64::NAN), 92);
}

#[test]
fn output_modes_shape_the_payload() {
    let bmp = red(2, 2);
    let uri = encode_output(&bmp, &ExportOptions::png()).unwrap();
    let s = uri.as_str().unwrap();
    assert!(s.starts_with("data:image/png;base64,"));

    let b64 = encode_output(&bmp, &ExportOptions::png().with_output(OutputMode::Base64)).unwrap();
    assert!(!b64.as_str().unwrap().starts_with("data:"));
    assert_eq!(uri.to_bytes().unwrap(), b64.to_bytes().unwrap());

    let blob = encode_output(&bmp, &ExportOptions::jpeg().with_output(OutputMode::Blob)).unwrap();
    match &blob {
        ExportOutput::Blob { mime, bytes } => {
            assert_eq!(*mime, "image/jpeg");
            assert!(!bytes.is_empty());
        }
        other => panic!("expected blob, got {other:?}"),
    }
    assert!(blob.as_str().is_none());
}

#[test]
fn async_blob_resolves_to_same_bytes() {
    let bmp = red(4, 4);
    let sync = encode_image(&bmp, ExportFormat::Png, 0.92).unwrap();
    let out = pollster::block_on(encode_blob_async(bmp, ExportFormat::Png, 0.92)).unwrap();
    assert_eq!(
        out,
        ExportOutput::Blob {
            mime: "image/png",
            bytes: sync
        }
    );
}

#[test]
fn malformed_data_uri_is_an_encode_error() {
    let err = ExportOutput::Base64Uri("data:image/png".into())
        .to_bytes()
        .unwrap_err();
    assert!(matches!(err, LayersError::Encode(_)));
}
