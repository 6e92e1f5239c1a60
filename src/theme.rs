//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::piece::PieceColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Indexed by [`PieceColor::index`].
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, names).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Empty-cell dots and hints.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Theme key for each piece colour, in [`PieceColor::index`] order, with the
/// btop key used as fallback so stock btop themes still colour the pieces.
const PIECE_KEYS: [(&str, &str); 7] = [
    ("piece_cyan", "hi_fg"),
    ("piece_blue", "cpu_box"),
    ("piece_orange", "temp_mid"),
    ("piece_yellow", "title"),
    ("piece_green", "mem_box"),
    ("piece_purple", "net_box"),
    ("piece_red", "cpu_end"),
];

const DEFAULT_PIECES: [Color; 7] = [
    Color::Rgb(0x22, 0xD3, 0xEE),
    Color::Rgb(0x3B, 0x82, 0xF6),
    Color::Rgb(0xF9, 0x73, 0x16),
    Color::Rgb(0xFA, 0xCC, 0x15),
    Color::Rgb(0x22, 0xC5, 0x5E),
    Color::Rgb(0xA8, 0x55, 0xF7),
    Color::Rgb(0xEF, 0x44, 0x44),
];

impl Default for Theme {
    fn default() -> Self {
        Self {
            pieces: DEFAULT_PIECES,
            bg: Color::Rgb(0x11, 0x18, 0x27),
            div_line: Color::Rgb(0x37, 0x41, 0x51),
            main_fg: Color::Rgb(0xD1, 0xD5, 0xDB),
            title: Color::Rgb(0xC0, 0x84, 0xFC),
            inactive_fg: Color::Rgb(0x6B, 0x72, 0x80),
        }
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Missing keys keep their defaults. `palette` then overrides piece colours.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => {
                let s = std::fs::read_to_string(p)?;
                Self::from_map(&parse_theme_file(&s))?
            }
            None => Self::default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Override piece colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.pieces = [
                    Color::Rgb(0x00, 0xFF, 0xFF),
                    Color::Rgb(0x00, 0x55, 0xFF),
                    Color::Rgb(0xFF, 0x88, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0x00),
                ];
                self.bg = Color::Black;
            }
            crate::Palette::Colorblind => {
                // Okabe–Ito: distinguishable without relying on red/green.
                self.pieces = [
                    Color::Rgb(0x56, 0xB4, 0xE9),
                    Color::Rgb(0x00, 0x72, 0xB2),
                    Color::Rgb(0xE6, 0x9F, 0x00),
                    Color::Rgb(0xF0, 0xE4, 0x42),
                    Color::Rgb(0x00, 0x9E, 0x73),
                    Color::Rgb(0xCC, 0x79, 0xA7),
                    Color::Rgb(0xD5, 0x5E, 0x00),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let get = |key: &str| map.get(key).map(|v| parse_hex(v)).transpose();
        let mut theme = Self::default();
        for (slot, (own, btop)) in theme.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(own)?.or(get(btop)?) {
                *slot = c;
            }
        }
        if let Some(c) = get("main_bg")?.or(get("meter_bg")?) {
            theme.bg = c;
        }
        if let Some(c) = get("div_line")? {
            theme.div_line = c;
        }
        if let Some(c) = get("main_fg")? {
            theme.main_fg = c;
        }
        if let Some(c) = get("title")? {
            theme.title = c;
        }
        if let Some(c) = get("inactive_fg")? {
            theme.inactive_fg = c;
        }
        Ok(theme)
    }

    #[inline]
    pub fn piece_color(&self, color: PieceColor) -> Color {
        self.pieces[color.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>, scale: u8| {
        hex.get(range)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .map(|v| v * scale)
            .ok_or_else(invalid)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2, 1)?, channel(2..4, 1)?, channel(4..6, 1)?)),
        3 => Ok(Color::Rgb(channel(0..1, 17)?, channel(1..2, 17)?, channel(2..3, 17)?)),
        _ => Err(invalid()),
    }
}
