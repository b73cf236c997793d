//! Diverging brown-to-teal colormap for correlation values

use plotters::style::RGBColor;

/// ColorBrewer BrBG, 11 classes, from -1 to 1.
const BRBG_STOPS: [(u8, u8, u8); 11] = [
    (0x54, 0x30, 0x05),
    (0x8c, 0x51, 0x0a),
    (0xbf, 0x81, 0x2d),
    (0xdf, 0xc2, 0x7d),
    (0xf6, 0xe8, 0xc3),
    (0xf5, 0xf5, 0xf5),
    (0xc7, 0xea, 0xe5),
    (0x80, 0xcd, 0xc1),
    (0x35, 0x97, 0x8f),
    (0x01, 0x66, 0x5e),
    (0x00, 0x3c, 0x30),
];

/// Fixed color scale bounds
pub const SCALE_MIN: f64 = -1.0;
pub const SCALE_MAX: f64 = 1.0;

/// Map a value on the fixed -1..1 scale to a color. Out-of-range values are clamped.
pub fn brbg(value: f64) -> RGBColor {
    let t = ((value - SCALE_MIN) / (SCALE_MAX - SCALE_MIN)).clamp(0.0, 1.0);
    let pos = t * (BRBG_STOPS.len() - 1) as f64;
    let lower = (pos.floor() as usize).min(BRBG_STOPS.len() - 2);
    let frac = pos - lower as f64;

    let (r0, g0, b0) = BRBG_STOPS[lower];
    let (r1, g1, b1) = BRBG_STOPS[lower + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Relative luminance in 0..1 (sRGB, WCAG weighting)
pub fn luminance(color: &RGBColor) -> f64 {
    let channel = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * channel(color.0) + 0.7152 * channel(color.1) + 0.0722 * channel(color.2)
}

/// Annotation text color readable on top of `fill`
pub fn text_color_for(fill: &RGBColor) -> RGBColor {
    if luminance(fill) > 0.408 {
        RGBColor(0x26, 0x26, 0x26)
    } else {
        RGBColor(0xff, 0xff, 0xff)
    }
}
