use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Plot colours
// ---------------------------------------------------------------------------

/// Convert an HSL triple (hue in degrees) to an egui colour.
pub fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Colours for the measured points and the fitted curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveColors {
    pub points: Color32,
    pub points_outline: Color32,
    pub fit: Color32,
}

impl Default for CurveColors {
    fn default() -> Self {
        Self {
            // orange fill, navy outline, tomato line
            points: hsl_color(39.0, 1.0, 0.5),
            points_outline: hsl_color(240.0, 1.0, 0.25),
            fit: hsl_color(9.0, 1.0, 0.64),
        }
    }
}

impl CurveColors {
    /// Points colour with partial transparency for dense data.
    pub fn points_translucent(&self) -> Color32 {
        let [r, g, b, _] = self.points.to_array();
        Color32::from_rgba_unmultiplied(r, g, b, 128)
    }
}
