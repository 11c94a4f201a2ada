use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Series palette
// ---------------------------------------------------------------------------

/// Series colours, cycled by the country's position in the domain.
pub const SERIES_PALETTE: [&str; 18] = [
    "#22d3ee", "#a78bfa", "#34d399", "#f59e0b", "#fb7185", "#60a5fa", "#f472b6", "#10b981",
    "#fbbf24", "#93c5fd", "#c084fc", "#4ade80", "#fca5a5", "#fde047", "#38bdf8", "#f97316",
    "#84cc16", "#e879f9",
];

/// Colour used for "no data" placeholders.
pub const PLACEHOLDER_HEX: &str = "#64748b";

/// Fill opacity of line/bar/scatter series.
pub const SERIES_FILL_ALPHA: f32 = 0.25;
/// Fill opacity of doughnut slices.
pub const SLICE_FILL_ALPHA: f32 = 0.8;
/// Fill opacity of box plot / fallback bars.
pub const SPREAD_FILL_ALPHA: f32 = 0.35;

/// Parse `#rrggbb` (or `rrggbb`) into RGB bytes.
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let rgb = Srgb::<u8>::from_str(hex.trim()).ok()?;
    Some([rgb.red, rgb.green, rgb.blue])
}

fn hex_or_gray(hex: &str) -> [u8; 3] {
    parse_hex(hex).unwrap_or([128, 128, 128])
}

/// Colour for the `idx`-th country (wraps around the palette).
pub fn series_color(idx: usize) -> [u8; 3] {
    hex_or_gray(SERIES_PALETTE[idx % SERIES_PALETTE.len()])
}

pub fn placeholder_color() -> [u8; 3] {
    hex_or_gray(PLACEHOLDER_HEX)
}

// ---------------------------------------------------------------------------
// egui conversion
// ---------------------------------------------------------------------------

pub fn to_color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Translucent variant, `alpha` in `0.0..=1.0`.
pub fn with_alpha(rgb: [u8; 3], alpha: f32) -> Color32 {
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(rgb[0], rgb[1], rgb[2], a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#22d3ee"), Some([0x22, 0xd3, 0xee]));
        assert_eq!(parse_hex("64748b"), Some([0x64, 0x74, 0x8b]));
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_every_palette_entry_parses() {
        for hex in SERIES_PALETTE {
            assert!(parse_hex(hex).is_some(), "{hex}");
        }
    }

    #[test]
    fn test_series_color_wraps() {
        assert_eq!(series_color(0), series_color(SERIES_PALETTE.len()));
        assert_ne!(series_color(0), series_color(1));
    }

    #[test]
    fn test_with_alpha() {
        let c = with_alpha([255, 0, 0], 1.0);
        assert_eq!(c, Color32::from_rgb(255, 0, 0));
        assert_eq!(with_alpha([255, 0, 0], 0.0).a(), 0);
    }
}
