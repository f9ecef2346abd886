use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    assert_eq!(over(dst, [255, 255, 255, 0]), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = [255, 0, 0, 255];
    assert_eq!(over([0, 0, 255, 255], src), src);
}

#[test]
fn behind_keeps_opaque_dst() {
    let dst = [0, 255, 0, 255];
    assert_eq!(blend(dst, [255, 0, 0, 255], BlendOp::Behind), dst);
    assert_eq!(
        blend([0, 0, 0, 0], [255, 0, 0, 255], BlendOp::Behind),
        [255, 0, 0, 255]
    );
}

#[test]
fn half_transparent_over_mixes() {
    // 50% red over opaque blue
    let out = over([0, 0, 255, 255], [128, 0, 0, 128]);
    assert_eq!(out, [128, 0, 127, 255]);
}

#[test]
fn blend_in_place_requires_equal_sizes() {
    let mut a = Bitmap::transparent(2, 2);
    let b = Bitmap::transparent(2, 3);
    assert!(blend_in_place(&mut a, &b, BlendOp::Over).is_err());
}

#[test]
fn background_only_shows_through_transparency() {
    let mut bmp = Bitmap::transparent(2, 1);
    bmp.data[..4].copy_from_slice(&[255, 0, 0, 255]);
    apply_background(&mut bmp, Rgba8::WHITE);
    assert_eq!(bmp.pixel(0, 0), Some([255, 0, 0, 255]));
    assert_eq!(bmp.pixel(1, 0), Some([255, 255, 255, 255]));
}
