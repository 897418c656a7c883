//! Pixel color representation and the sixel color models.
//!
//! Pixels are packed `u32` values in RGBA byte order on a
//! little-endian machine: red in the low byte, alpha in the high byte.
//! The value 0 doubles as "transparent / never written", which is what
//! lets blits skip untouched pixels.

/// Packed RGBA pixel.
pub type Rgba = u32;

/// Pack four channel bytes into a pixel.
#[must_use]
pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba {
    (a as u32) << 24 | (b as u32) << 16 | (g as u32) << 8 | r as u32
}

#[must_use]
pub const fn red(color: Rgba) -> u8 {
    (color & 0xFF) as u8
}

#[must_use]
pub const fn green(color: Rgba) -> u8 {
    (color >> 8 & 0xFF) as u8
}

#[must_use]
pub const fn blue(color: Rgba) -> u8 {
    (color >> 16 & 0xFF) as u8
}

#[must_use]
pub const fn alpha(color: Rgba) -> u8 {
    (color >> 24) as u8
}

/// Opaque black, the fill color a real VT340 shows behind an image.
pub const DEFAULT_BACKGROUND: Rgba = rgba(0, 0, 0, 255);

/// Scale a 0-100 intensity to a channel byte, rounding half up.
const fn scale_percent(value: u16) -> u8 {
    let value = if value > 100 { 100 } else { value } as u32;
    ((value * 255 + 50) / 100) as u8
}

/// Convert an RGB color register definition (channels 0-100) to a
/// pixel.
#[must_use]
pub const fn normalize_rgb(r: u16, g: u16, b: u16) -> Rgba {
    rgba(scale_percent(r), scale_percent(g), scale_percent(b), 255)
}

/// Convert an HLS color register definition to a pixel.
///
/// Sixel hue is offset so that 120 is red: 0/360 is blue, 240 is
/// green. Lightness and saturation are 0-100.
#[must_use]
pub fn normalize_hls(h: u16, l: u16, s: u16) -> Rgba {
    hls_to_rgb(
        f64::from(h + 240) / 360.0 - 1.0,
        f64::from(l) / 100.0,
        f64::from(s) / 100.0,
    )
}

fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> Rgba {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
        )
    };
    rgba(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        255,
    )
}

/// The 16 color registers a VT340 boots with.
#[must_use]
pub fn vt340_palette() -> Vec<Rgba> {
    vec![
        normalize_rgb(0, 0, 0),
        normalize_rgb(20, 20, 80),
        normalize_rgb(80, 13, 13),
        normalize_rgb(20, 80, 20),
        normalize_rgb(80, 20, 80),
        normalize_rgb(20, 80, 80),
        normalize_rgb(80, 80, 20),
        normalize_rgb(53, 53, 53),
        normalize_rgb(26, 26, 26),
        normalize_rgb(33, 33, 60),
        normalize_rgb(60, 26, 26),
        normalize_rgb(33, 60, 33),
        normalize_rgb(60, 33, 60),
        normalize_rgb(33, 60, 60),
        normalize_rgb(60, 60, 33),
        normalize_rgb(80, 80, 80),
    ]
}
