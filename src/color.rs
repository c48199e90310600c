use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Lab, Mix, Srgb};

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
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Diverging scale: correlation coefficient → Color32
// ---------------------------------------------------------------------------

/// Blue–grey–red diverging scale over [-1, 1], interpolated in Lab space
/// (matplotlib's "coolwarm" end points).
#[derive(Debug, Clone, Copy)]
pub struct DivergingScale {
    low: Lab,
    mid: Lab,
    high: Lab,
}

impl Default for DivergingScale {
    fn default() -> Self {
        let lab = |r: u8, g: u8, b: u8| -> Lab {
            Srgb::new(r, g, b).into_format::<f32>().into_color()
        };
        Self {
            low: lab(59, 76, 192),
            mid: lab(221, 221, 221),
            high: lab(180, 4, 38),
        }
    }
}

impl DivergingScale {
    /// Colour for `value`; clamped to [-1, 1].
    pub fn color_for(&self, value: f64) -> Color32 {
        let t = value.clamp(-1.0, 1.0) as f32;
        let lab = if t < 0.0 {
            self.mid.mix(self.low, -t)
        } else {
            self.mid.mix(self.high, t)
        };
        let rgb: Srgb = lab.into_color();
        to_color32(rgb)
    }

    /// Readable annotation colour on top of [`Self::color_for`].
    pub fn text_color_for(&self, value: f64) -> Color32 {
        if value.abs() > 0.6 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }

    /// Cell colour for an undefined coefficient.
    pub fn missing_color(&self) -> Color32 {
        Color32::from_gray(245)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let p = generate_palette(4);
        assert_eq!(p.len(), 4);
        assert_ne!(p[0], p[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn diverging_scale_endpoints() {
        let scale = DivergingScale::default();
        let low = scale.color_for(-1.0);
        let high = scale.color_for(1.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        let mid = scale.color_for(0.0);
        assert!((mid.r() as i16 - mid.b() as i16).abs() < 6);
        assert_eq!(scale.color_for(5.0), high);
    }
}
