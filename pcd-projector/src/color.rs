//! Height-to-colour ramp for overlay points.
//!
//! The colour depends on the point's sensor-frame Z only, never on camera depth, so the
//! same point has the same colour in every camera.

pub const MIN_HEIGHT: f64 = -2.0;
pub const MAX_HEIGHT: f64 = 5.0;

/// Hue at [`MIN_HEIGHT`] (blue); [`MAX_HEIGHT`] maps to hue 0 (red).
pub const MAX_HUE: f64 = 240.0;

pub fn height_to_rgb(z: f64) -> [u8; 3] {
    let t = (z.clamp(MIN_HEIGHT, MAX_HEIGHT) - MIN_HEIGHT) / (MAX_HEIGHT - MIN_HEIGHT);
    hsl_to_rgb(MAX_HUE * (1.0 - t), 1.0, 0.5)
}

/// Six-sector HSL to RGB. `h` in degrees, `s` and `l` in `[0, 1]`; channels are rounded.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    // saturating casts: NaN becomes 0
    let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}
