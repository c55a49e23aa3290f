use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Named palettes
// ---------------------------------------------------------------------------

/// Categorical palettes, one flavour per chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Set1,
    Set2,
    Muted,
    Dark,
    Pastel,
    /// Diverging blue → red ramp.
    Coolwarm,
}

impl Palette {
    /// Generate `n` colours from this palette.
    pub fn colors(self, n: usize) -> Vec<Color32> {
        match self {
            Palette::Set1 => hue_wheel(n, 0.80, 0.50),
            Palette::Set2 => hue_wheel(n, 0.45, 0.65),
            Palette::Muted => hue_wheel(n, 0.40, 0.55),
            Palette::Dark => hue_wheel(n, 0.70, 0.30),
            Palette::Pastel => hue_wheel(n, 0.70, 0.80),
            Palette::Coolwarm => diverging(n),
        }
    }
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn hue_wheel(n: usize, saturation: f32, lightness: f32) -> Vec<Color32> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
            to_color32(rgb)
        })
        .collect()
}

fn diverging(n: usize) -> Vec<Color32> {
    let cool = LinSrgb::new(0.05_f32, 0.12, 0.60);
    let warm = LinSrgb::new(0.60_f32, 0.03, 0.02);
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.5 };
            to_color32(Srgb::from_linear(cool.mix(warm, t)))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps category labels of one chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Colour each label in order with `palette`.
    pub fn new<S: AsRef<str>>(labels: &[S], palette: Palette) -> Self {
        let mapping = labels
            .iter()
            .zip(palette.colors(labels.len()))
            .map(|(label, c)| (label.as_ref().to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(label, c)| (label.clone(), *c))
            .collect()
    }
}
