// Tint palettes. Each tint recolors backgrounds, text, primary/accent and
// borders; status colors come from the base theme and never change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TintName {
    Teal,
    Amber,
    EarthGreen,
    Purple,
    Sienna,
}

pub const DEFAULT_TINT: TintName = TintName::EarthGreen;

impl TintName {
    pub const ALL: [TintName; 5] = [
        TintName::Teal,
        TintName::Amber,
        TintName::EarthGreen,
        TintName::Purple,
        TintName::Sienna,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TintName::Teal => "teal",
            TintName::Amber => "amber",
            TintName::EarthGreen => "earth_green",
            TintName::Purple => "purple",
            TintName::Sienna => "sienna",
        }
    }

    /// Name shown in the tint picker
    pub fn label(&self) -> &'static str {
        match self {
            TintName::Teal => "Teal",
            TintName::Amber => "Amber",
            TintName::EarthGreen => "Earth Green",
            TintName::Purple => "Purple",
            TintName::Sienna => "Sienna",
        }
    }

    pub fn swatch(&self) -> &'static str {
        match self {
            TintName::Teal => "#077287",
            TintName::Amber => "#ca8a04",
            TintName::EarthGreen => "#3f7f63",
            TintName::Purple => "#6b5ca5",
            TintName::Sienna => "#92400e",
        }
    }

    pub fn next(&self) -> Self {
        let pos = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn palette(&self) -> &'static TintPalette {
        match self {
            TintName::Teal => &TEAL,
            TintName::Amber => &AMBER,
            TintName::EarthGreen => &EARTH_GREEN,
            TintName::Purple => &PURPLE,
            TintName::Sienna => &SIENNA,
        }
    }
}

impl Default for TintName {
    fn default() -> Self {
        DEFAULT_TINT
    }
}

impl fmt::Display for TintName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TintName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teal" => Ok(TintName::Teal),
            "amber" => Ok(TintName::Amber),
            "earth_green" | "earthGreen" | "earth-green" => Ok(TintName::EarthGreen),
            "purple" => Ok(TintName::Purple),
            "sienna" => Ok(TintName::Sienna),
            other => Err(anyhow::anyhow!("Unknown tint: {}", other)),
        }
    }
}

/// Hex colors a tint overrides for one color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TintColors {
    pub background: &'static str,
    pub background_secondary: &'static str,
    pub foreground: &'static str,
    pub foreground_secondary: &'static str,
    pub foreground_tertiary: &'static str,
    pub primary: &'static str,
    pub primary_light: &'static str,
    pub accent: &'static str,
    pub card: &'static str,
    pub muted: &'static str,
    pub muted_foreground: &'static str,
    pub border: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TintPalette {
    pub light: TintColors,
    pub dark: TintColors,
}

static TEAL: TintPalette = TintPalette {
    light: TintColors {
        background: "#f0f7f8",
        background_secondary: "#fdfefe",
        foreground: "#032d36",
        foreground_secondary: "#044451",
        foreground_tertiary: "#4d8b99ff",
        primary: "#077287",
        primary_light: "#2cb4d6",
        accent: "#c13b1b",
        card: "#ffffff",
        muted: "#e6f1f3",
        muted_foreground: "#73797a",
        border: "#e6f1f3",
    },
    dark: TintColors {
        background: "#0E1A21",
        background_secondary: "#142732",
        foreground: "#e6f1f3",
        foreground_secondary: "#cde3e7",
        foreground_tertiary: "#b5d5db",
        primary: "#519cab",
        primary_light: "#6aaab7",
        accent: "#38bdf8",
        card: "#1A3442",
        muted: "#214A5D",
        muted_foreground: "#e6f1f3",
        border: "#2B4F63",
    },
};

static AMBER: TintPalette = TintPalette {
    light: TintColors {
        background: "#f8f5f0",
        background_secondary: "#fdfefe",
        foreground: "#2f2618",
        foreground_secondary: "#443824",
        foreground_tertiary: "#8a7a5c",
        primary: "#c0841a",
        primary_light: "#e2b85c",
        accent: "#92400e",
        card: "#ffffff",
        muted: "#f1ede4",
        muted_foreground: "#757269",
        border: "#f1ede4",
    },
    dark: TintColors {
        background: "#1c160c",
        background_secondary: "#261d10",
        foreground: "#f1ede4",
        foreground_secondary: "#e2d9c3",
        foreground_tertiary: "#cbbd9a",
        primary: "#e2b85c",
        primary_light: "#f0cf85",
        accent: "#fbbf24",
        card: "#2a2114",
        muted: "#3a2d19",
        muted_foreground: "#f1ede4",
        border: "#4a3a21",
    },
};

static EARTH_GREEN: TintPalette = TintPalette {
    light: TintColors {
        background: "#f3f7f2",
        background_secondary: "#fdfefe",
        foreground: "#1f2f24",
        foreground_secondary: "#2e4436",
        foreground_tertiary: "#6b8f7a",
        primary: "#3f7f63",
        primary_light: "#6fb899",
        accent: "#b4532a",
        card: "#ffffff",
        muted: "#e6efe9",
        muted_foreground: "#6f7572",
        border: "#e6efe9",
    },
    dark: TintColors {
        background: "#121b16",
        background_secondary: "#18261f",
        foreground: "#e6efe9",
        foreground_secondary: "#cfe2d6",
        foreground_tertiary: "#b4cfc0",
        primary: "#7fbfa3",
        primary_light: "#9fd7be",
        accent: "#84cc16",
        card: "#1d3329",
        muted: "#244236",
        muted_foreground: "#e6efe9",
        border: "#2f4d3f",
    },
};

static PURPLE: TintPalette = TintPalette {
    light: TintColors {
        background: "#f4f3f8",
        background_secondary: "#fdfefe",
        foreground: "#2a2438",
        foreground_secondary: "#3c3350",
        foreground_tertiary: "#7b6f96",
        primary: "#6b5ca5",
        primary_light: "#9a8fd1",
        accent: "#b83280",
        card: "#ffffff",
        muted: "#ebe9f2",
        muted_foreground: "#6f6d78",
        border: "#ebe9f2",
    },
    dark: TintColors {
        background: "#14121d",
        background_secondary: "#1b1830",
        foreground: "#ebe9f2",
        foreground_secondary: "#d6d2e5",
        foreground_tertiary: "#beb9d6",
        primary: "#9a8fd1",
        primary_light: "#b6adeb",
        accent: "#a78bfa",
        card: "#201c36",
        muted: "#2a2550",
        muted_foreground: "#ebe9f2",
        border: "#342f5e",
    },
};

static SIENNA: TintPalette = TintPalette {
    light: TintColors {
        background: "#f8f2ee",
        background_secondary: "#fffdfb",
        foreground: "#3a1f14",
        foreground_secondary: "#543022",
        foreground_tertiary: "#8b5a44ff",
        primary: "#a0522d",
        primary_light: "#c7794fff",
        accent: "#2563eb",
        card: "#ffffff",
        muted: "#efe3dc",
        muted_foreground: "#7b6e68",
        border: "#efe3dc",
    },
    dark: TintColors {
        background: "#1b120e",
        background_secondary: "#261a14",
        foreground: "#f4ebe6",
        foreground_secondary: "#e6d6cc",
        foreground_tertiary: "#d2bfb2",
        primary: "#d08b64",
        primary_light: "#e3a87f",
        accent: "#38bdf8",
        card: "#2c1e17",
        muted: "#3a261d",
        muted_foreground: "#f4ebe6",
        border: "#4a3126",
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_camel_case() {
        assert_eq!("earthGreen".parse::<TintName>().unwrap(), TintName::EarthGreen);
        assert_eq!("earth_green".parse::<TintName>().unwrap(), TintName::EarthGreen);
        assert!("magenta".parse::<TintName>().is_err());
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(TintName::Sienna.next(), TintName::Teal);
    }

    #[test]
    fn test_default_tint() {
        assert_eq!(TintName::default(), TintName::EarthGreen);
        assert_eq!(TintName::EarthGreen.palette().light.primary, "#3f7f63");
    }
}
