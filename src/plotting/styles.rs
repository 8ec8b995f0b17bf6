use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear RGB interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{}'", raw)))
    }
}

/// Series colors used when the theme palette has no entry for an index.
pub const DEFAULT_CHART_COLORS: [Color; 8] = [
    Color::rgb(0x21, 0x96, 0xf3),
    Color::rgb(0x4c, 0xaf, 0x50),
    Color::rgb(0xff, 0x98, 0x00),
    Color::rgb(0xf4, 0x43, 0x36),
    Color::rgb(0x9c, 0x27, 0xb0),
    Color::rgb(0x00, 0xbc, 0xd4),
    Color::rgb(0xff, 0xeb, 0x3b),
    Color::rgb(0x79, 0x55, 0x48),
];

/// Last resort once both the theme and the default palette run out.
pub const FALLBACK_COLOR: Color = Color::rgb(0x66, 0x66, 0x66);

/// Ordered series colors, consumed by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(pub Vec<Color>);

impl Palette {
    /// Build from hex strings, skipping entries that do not parse.
    pub fn from_hex(colors: &[&str]) -> Self {
        Palette(
            colors
                .iter()
                .filter_map(|hex| {
                    let color = Color::from_hex(hex);
                    if color.is_none() {
                        log::warn!("ignoring invalid palette color '{}'", hex);
                    }
                    color
                })
                .collect(),
        )
    }

    pub fn color(&self, index: usize) -> Color {
        self.0
            .get(index)
            .or_else(|| DEFAULT_CHART_COLORS.get(index))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Colors a chart needs from the active theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartTheme {
    pub name: String,
    pub palette: Palette,
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub border: Color,
    pub axis: Color,
}

impl ChartTheme {
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            palette: Palette(DEFAULT_CHART_COLORS.to_vec()),
            background: Color::rgb(0xff, 0xff, 0xff),
            surface: Color::rgb(0xf5, 0xf5, 0xf5),
            text: Color::rgb(0x21, 0x21, 0x21),
            text_secondary: Color::rgb(0x75, 0x75, 0x75),
            border: Color::rgb(0xe0, 0xe0, 0xe0),
            axis: Color::rgb(0x75, 0x75, 0x75),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            palette: Palette::from_hex(&[
                "#90caf9", "#81c784", "#ffb74d", "#e57373", "#ce93d8", "#80deea", "#fff59d",
                "#a1887f",
            ]),
            background: Color::rgb(0x12, 0x12, 0x12),
            surface: Color::rgb(0x1e, 0x1e, 0x1e),
            text: Color::rgb(0xff, 0xff, 0xff),
            text_secondary: Color::rgb(0xb0, 0xb0, 0xb0),
            border: Color::rgb(0x42, 0x42, 0x42),
            axis: Color::rgb(0xb0, 0xb0, 0xb0),
        }
    }

    pub fn ocean() -> Self {
        Self {
            name: "Ocean".to_string(),
            palette: Palette::from_hex(&[
                "#80deea", "#c5e1a5", "#fff59d", "#ef9a9a", "#ce93d8", "#90caf9", "#ffcc80",
                "#bcaaa4",
            ]),
            ..Self::dark()
        }
    }
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// Chart style configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub line_width: f64,
    pub marker_radius: f64,
    pub tick_font_size: f64,
    pub label_font_size: f64,
    pub title_font_size: f64,
    pub tick_count: usize,
    pub tick_size: f64,
    pub legend_swatch: f64,
    pub legend_spacing: f64,
    /// Commit bars are shaded from `bar_low` (fewest) to `bar_high` (most).
    pub bar_low: Color,
    pub bar_high: Color,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            marker_radius: 4.0,
            tick_font_size: 10.0,
            label_font_size: 12.0,
            title_font_size: 16.0,
            tick_count: 5,
            tick_size: 6.0,
            legend_swatch: 12.0,
            legend_spacing: 120.0,
            bar_low: Color::rgb(0x7f, 0xcd, 0xbb),
            bar_high: Color::rgb(0x2c, 0x7f, 0xb8),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#7fcdbb"), Some(Color::rgb(0x7f, 0xcd, 0xbb)));
        assert_eq!(Color::from_hex("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::from_hex("blue"), None);
        assert_eq!(Color::rgb(0x2c, 0x7f, 0xb8).to_hex(), "#2c7fb8");
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let low = Color::rgb(0, 100, 200);
        let high = Color::rgb(100, 200, 0);
        assert_eq!(low.lerp(high, 0.0), low);
        assert_eq!(low.lerp(high, 1.0), high);
        assert_eq!(low.lerp(high, 0.5), Color::rgb(50, 150, 100));
        assert_eq!(low.lerp(high, f64::NAN), low);
    }

    #[test]
    fn test_palette_falls_back_by_index() {
        let palette = Palette::from_hex(&["#000000", "nope"]);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.color(0), Color::rgb(0, 0, 0));
        assert_eq!(palette.color(1), DEFAULT_CHART_COLORS[1]);
        assert_eq!(palette.color(8), FALLBACK_COLOR);
    }
}
