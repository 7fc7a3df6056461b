use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous scale for the world map
// ---------------------------------------------------------------------------

/// Stops of the cyclical "IceFire" scale.
const ICE_FIRE: [(u8, u8, u8); 21] = [
    (0, 0, 0),
    (0, 31, 60),
    (0, 55, 108),
    (4, 82, 169),
    (25, 104, 207),
    (54, 134, 227),
    (95, 163, 235),
    (141, 191, 240),
    (186, 222, 249),
    (230, 239, 254),
    (255, 255, 255),
    (255, 238, 234),
    (255, 208, 194),
    (255, 172, 143),
    (255, 129, 82),
    (249, 84, 41),
    (217, 44, 12),
    (181, 10, 0),
    (137, 0, 0),
    (89, 0, 0),
    (0, 0, 0),
];

/// Colour at position `t` (clamped to `[0, 1]`) on the IceFire scale.
pub fn ice_fire(t: f64) -> Color32 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (ICE_FIRE.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(ICE_FIRE.len() - 2);
    let frac = (scaled - lower as f64) as f32;

    let stop = |(r, g, b): (u8, u8, u8)| Srgb::new(r, g, b).into_format::<f32>().into_linear();
    let mixed = stop(ICE_FIRE[lower]).mix(stop(ICE_FIRE[lower + 1]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Map `value` onto the IceFire scale relative to `[min, max]`.
pub fn ice_fire_for(value: f64, min: f64, max: f64) -> Color32 {
    let range = max - min;
    if range.abs() < f64::EPSILON {
        return ice_fire(0.0);
    }
    ice_fire((value - min) / range)
}
