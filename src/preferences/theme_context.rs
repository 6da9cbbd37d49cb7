use anyhow::Result;
use tracing::{error, info, warn};

use crate::preferences::PreferenceStore;
use crate::ui::theme::{theme_colors, ColorScheme, Palette, ThemeMode};
use crate::ui::tints::{TintName, DEFAULT_TINT};

pub const THEME_STORAGE_KEY: &str = "theme_preference";
pub const TINT_STORAGE_KEY: &str = "tint_preference";

/// Snapshot of the active theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub scheme: ColorScheme,
    pub is_dark: bool,
    pub tint: TintName,
    pub palette: Palette,
}

/// Theme preference owned by the application root and passed down to views
pub struct ThemeContext {
    store: Box<dyn PreferenceStore>,
    mode: ThemeMode,
    tint: TintName,
    system_scheme: ColorScheme,
}

impl ThemeContext {
    /// Load saved preferences. Unknown or unreadable values fall back to
    /// `system` and the default tint.
    pub fn init(store: Box<dyn PreferenceStore>, system_scheme: ColorScheme) -> Self {
        let mut ctx = Self {
            store,
            mode: ThemeMode::System,
            tint: DEFAULT_TINT,
            system_scheme,
        };

        match ctx.store.get(THEME_STORAGE_KEY) {
            Ok(Some(saved)) => match saved.parse::<ThemeMode>() {
                Ok(mode) => ctx.mode = mode,
                Err(_) => warn!(target: "theme", "Ignoring saved theme {:?}", saved),
            },
            Ok(None) => {}
            Err(e) => error!(target: "theme", "Failed to load theme preference: {}", e),
        }

        match ctx.store.get(TINT_STORAGE_KEY) {
            Ok(Some(saved)) => match saved.parse::<TintName>() {
                Ok(tint) => ctx.tint = tint,
                Err(_) => warn!(target: "theme", "Ignoring saved tint {:?}", saved),
            },
            Ok(None) => {}
            Err(e) => error!(target: "theme", "Failed to load tint preference: {}", e),
        }

        info!(
            target: "theme",
            "Theme {} ({:?}), tint {}",
            ctx.mode,
            ctx.scheme(),
            ctx.tint
        );
        ctx
    }

    pub fn read(&self) -> ThemeState {
        let scheme = self.scheme();
        ThemeState {
            mode: self.mode,
            scheme,
            is_dark: scheme.is_dark(),
            tint: self.tint,
            palette: theme_colors(scheme, self.tint),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn tint(&self) -> TintName {
        self.tint
    }

    pub fn scheme(&self) -> ColorScheme {
        self.mode.resolve(self.system_scheme)
    }

    pub fn palette(&self) -> Palette {
        theme_colors(self.scheme(), self.tint)
    }

    /// The terminal's scheme changed; only visible in `system` mode
    pub fn set_system_scheme(&mut self, scheme: ColorScheme) {
        self.system_scheme = scheme;
    }

    /// Switch theme and persist it. The switch applies even if saving fails.
    pub fn set_theme(&mut self, mode: ThemeMode) -> Result<()> {
        self.mode = mode;
        self.store.set(THEME_STORAGE_KEY, mode.as_str())
    }

    pub fn set_tint(&mut self, tint: TintName) -> Result<()> {
        self.tint = tint;
        self.store.set(TINT_STORAGE_KEY, tint.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStore;

    #[test]
    fn test_defaults_without_saved_values() {
        let ctx = ThemeContext::init(Box::new(MemoryPreferenceStore::new()), ColorScheme::Dark);
        let state = ctx.read();
        assert_eq!(state.mode, ThemeMode::System);
        assert_eq!(state.tint, TintName::EarthGreen);
        assert!(state.is_dark);
    }

    #[test]
    fn test_invalid_saved_values_ignored() {
        let store = MemoryPreferenceStore::new()
            .with(THEME_STORAGE_KEY, "sepia")
            .with(TINT_STORAGE_KEY, "purple");
        let ctx = ThemeContext::init(Box::new(store), ColorScheme::Light);
        assert_eq!(ctx.mode(), ThemeMode::System);
        assert_eq!(ctx.tint(), TintName::Purple);
        assert_eq!(ctx.scheme(), ColorScheme::Light);
    }

    #[test]
    fn test_explicit_mode_beats_system() {
        let store = MemoryPreferenceStore::new().with(THEME_STORAGE_KEY, "light");
        let mut ctx = ThemeContext::init(Box::new(store), ColorScheme::Dark);
        assert!(!ctx.read().is_dark);
        ctx.set_system_scheme(ColorScheme::Dark);
        assert!(!ctx.read().is_dark);
    }
}
