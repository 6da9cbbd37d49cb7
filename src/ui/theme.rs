use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::crud_item::ItemStatus;
use crate::ui::tints::{TintColors, TintName};

/// User-selected theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: [ThemeMode; 3] = [ThemeMode::Light, ThemeMode::Dark, ThemeMode::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::System,
            ThemeMode::System => ThemeMode::Light,
        }
    }

    /// Resolve to a concrete scheme, using `system` for `System`
    pub fn resolve(&self, system: ColorScheme) -> ColorScheme {
        match self {
            ThemeMode::Light => ColorScheme::Light,
            ThemeMode::Dark => ColorScheme::Dark,
            ThemeMode::System => system,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(anyhow::anyhow!("Unknown theme: {}", other)),
        }
    }
}

/// The concrete scheme in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
}

impl ColorScheme {
    /// Best guess at the terminal's scheme from `COLORFGBG` ("fg;bg").
    /// Unknown terminals are treated as dark.
    pub fn detect() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| Self::from_colorfgbg(&v))
            .unwrap_or_default()
    }

    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        // ANSI 7 (white) and the bright range are light backgrounds
        Some(if bg == 7 || bg >= 9 {
            ColorScheme::Light
        } else {
            ColorScheme::Dark
        })
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, ColorScheme::Dark)
    }
}

/// Parse `#rrggbb` or `#rrggbbaa` (alpha ignored)
pub fn hex_to_color(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn color(hex: &str) -> Color {
    hex_to_color(hex).unwrap_or(Color::Reset)
}

/// Colors that stay the same whatever tint is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BaseColors {
    destructive: &'static str,
    destructive_foreground: &'static str,
    success: &'static str,
    warning: &'static str,
    error: &'static str,
    info: &'static str,
    rating: &'static str,
    overlay: &'static str,
    overlay_foreground: &'static str,
}

const BASE_LIGHT: BaseColors = BaseColors {
    destructive: "#dc2626",
    destructive_foreground: "#ffffff",
    success: "#10b981",
    warning: "#f59e0b",
    error: "#ef4444",
    info: "#3b82f6",
    rating: "#fbbf24",
    overlay: "#000000",
    overlay_foreground: "#ffffff",
};

const BASE_DARK: BaseColors = BaseColors {
    destructive: "#ef4444",
    ..BASE_LIGHT
};

/// Resolved colors for one scheme and tint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub background_secondary: Color,
    pub foreground: Color,
    pub foreground_secondary: Color,
    pub foreground_tertiary: Color,
    pub primary: Color,
    pub primary_light: Color,
    pub accent: Color,
    pub card: Color,
    pub muted: Color,
    pub muted_foreground: Color,
    pub border: Color,
    pub destructive: Color,
    pub destructive_foreground: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub rating: Color,
    pub overlay: Color,
    pub overlay_foreground: Color,
}

/// Tint colors overlaid with the fixed base colors
pub fn theme_colors(scheme: ColorScheme, tint: TintName) -> Palette {
    let palette = tint.palette();
    let (tint_colors, base): (&TintColors, BaseColors) = match scheme {
        ColorScheme::Light => (&palette.light, BASE_LIGHT),
        ColorScheme::Dark => (&palette.dark, BASE_DARK),
    };

    Palette {
        background: color(tint_colors.background),
        background_secondary: color(tint_colors.background_secondary),
        foreground: color(tint_colors.foreground),
        foreground_secondary: color(tint_colors.foreground_secondary),
        foreground_tertiary: color(tint_colors.foreground_tertiary),
        primary: color(tint_colors.primary),
        primary_light: color(tint_colors.primary_light),
        accent: color(tint_colors.accent),
        card: color(tint_colors.card),
        muted: color(tint_colors.muted),
        muted_foreground: color(tint_colors.muted_foreground),
        border: color(tint_colors.border),
        destructive: color(base.destructive),
        destructive_foreground: color(base.destructive_foreground),
        success: color(base.success),
        warning: color(base.warning),
        error: color(base.error),
        info: color(base.info),
        rating: color(base.rating),
        overlay: color(base.overlay),
        overlay_foreground: color(base.overlay_foreground),
    }
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.foreground).bg(self.background)
    }

    pub fn header(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.muted)
            .add_modifier(Modifier::BOLD)
    }

    /// Header of the pinned column, set apart from the scrollable headers
    pub fn pinned_header(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .bg(self.muted)
            .add_modifier(Modifier::BOLD)
    }

    pub fn pinned_cell(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .bg(self.background_secondary)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.background)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.foreground_tertiary)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Badge style for an item status
    pub fn status_style(&self, status: ItemStatus) -> Style {
        let fg = match status {
            ItemStatus::Active => self.success,
            ItemStatus::Archived => self.muted_foreground,
            ItemStatus::Draft => self.warning,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color() {
        assert_eq!(hex_to_color("#ff8000"), Some(Color::Rgb(255, 128, 0)));
        assert_eq!(hex_to_color("#4d8b99ff"), Some(Color::Rgb(0x4d, 0x8b, 0x99)));
        assert_eq!(hex_to_color("ff8000"), None);
        assert_eq!(hex_to_color("#ff80"), None);
        assert_eq!(hex_to_color("#gg0000"), None);
    }

    #[test]
    fn test_base_colors_win_over_tint() {
        let light = theme_colors(ColorScheme::Light, TintName::Teal);
        let dark = theme_colors(ColorScheme::Dark, TintName::Teal);
        assert_eq!(light.destructive, Color::Rgb(0xdc, 0x26, 0x26));
        assert_eq!(dark.destructive, Color::Rgb(0xef, 0x44, 0x44));
        assert_eq!(light.success, dark.success);
    }

    #[test]
    fn test_tint_changes_primary() {
        let teal = theme_colors(ColorScheme::Light, TintName::Teal);
        let amber = theme_colors(ColorScheme::Light, TintName::Amber);
        assert_ne!(teal.primary, amber.primary);
        assert_eq!(teal.primary, Color::Rgb(0x07, 0x72, 0x87));
    }

    #[test]
    fn test_system_mode_resolution() {
        assert_eq!(ThemeMode::System.resolve(ColorScheme::Light), ColorScheme::Light);
        assert_eq!(ThemeMode::Dark.resolve(ColorScheme::Light), ColorScheme::Dark);
    }

    #[test]
    fn test_colorfgbg() {
        assert_eq!(ColorScheme::from_colorfgbg("15;0"), Some(ColorScheme::Dark));
        assert_eq!(ColorScheme::from_colorfgbg("0;15"), Some(ColorScheme::Light));
        assert_eq!(ColorScheme::from_colorfgbg("0;default"), None);
    }
}
