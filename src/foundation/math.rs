pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Undo premultiplication of one color channel, rounding to nearest.
pub(crate) fn unpremul_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
    v.min(255) as u8
}

/// Linear sample positions along `[0, 1]`: one sample sits at the midpoint, more include both ends.
pub(crate) fn sample_fractions(count: usize) -> impl Iterator<Item = f64> {
    let count = count.max(1);
    (0..count).map(move |i| {
        if count == 1 {
            0.5
        } else {
            i as f64 / (count - 1) as f64
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
