// Theme and language preferences persisted through the file store

use crud_grid::i18n::Language;
use crud_grid::preferences::{FilePreferenceStore, LanguageContext, PreferenceStore, ThemeContext};
use crud_grid::ui::theme::{ColorScheme, ThemeMode};
use crud_grid::ui::tints::TintName;
use tempfile::TempDir;

fn store(dir: &TempDir) -> Box<FilePreferenceStore> {
    Box::new(FilePreferenceStore::new(dir.path().join("prefs").join("preferences.json")))
}

#[test]
fn test_theme_survives_restart() {
    let dir = TempDir::new().unwrap();

    let mut theme = ThemeContext::init(store(&dir), ColorScheme::Light);
    assert_eq!(theme.mode(), ThemeMode::System);
    assert_eq!(theme.scheme(), ColorScheme::Light);

    theme.set_theme(ThemeMode::Dark).unwrap();
    theme.set_tint(TintName::Purple).unwrap();

    let reloaded = ThemeContext::init(store(&dir), ColorScheme::Light);
    let state = reloaded.read();
    assert_eq!(state.mode, ThemeMode::Dark);
    assert!(state.is_dark);
    assert_eq!(state.tint, TintName::Purple);
}

#[test]
fn test_system_mode_follows_scheme_changes() {
    let dir = TempDir::new().unwrap();
    let mut theme = ThemeContext::init(store(&dir), ColorScheme::Light);
    assert!(!theme.read().is_dark);

    theme.set_system_scheme(ColorScheme::Dark);
    assert!(theme.read().is_dark);

    theme.set_theme(ThemeMode::Light).unwrap();
    theme.set_system_scheme(ColorScheme::Dark);
    assert!(!theme.read().is_dark);
}

#[test]
fn test_theme_and_language_share_one_file() {
    let dir = TempDir::new().unwrap();

    let mut theme = ThemeContext::init(store(&dir), ColorScheme::Dark);
    let mut language = LanguageContext::init(store(&dir), None);
    theme.set_theme(ThemeMode::Light).unwrap();
    language.set_language(Language::Es).unwrap();

    let file = store(&dir);
    assert_eq!(file.get("theme_preference").unwrap().as_deref(), Some("light"));
    assert_eq!(file.get("user-language").unwrap().as_deref(), Some("es"));
}

#[test]
fn test_language_restored_over_device_locale() {
    let dir = TempDir::new().unwrap();

    let mut language = LanguageContext::init(store(&dir), Some("en_GB.UTF-8"));
    assert_eq!(language.language(), Language::En);
    language.set_language(Language::Es).unwrap();

    let reloaded = LanguageContext::init(store(&dir), Some("en_GB.UTF-8"));
    assert_eq!(reloaded.language(), Language::Es);
    assert_eq!(reloaded.translator().t("common.cancel"), "Cancelar");
}

#[test]
fn test_unsupported_device_locale_falls_back_to_english() {
    let dir = TempDir::new().unwrap();
    let language = LanguageContext::init(store(&dir), Some("fr_FR.UTF-8"));
    assert_eq!(language.language(), Language::En);
}

#[test]
fn test_corrupt_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("preferences.json");
    std::fs::write(&path, "{ not json").unwrap();

    let theme = ThemeContext::init(Box::new(FilePreferenceStore::new(&path)), ColorScheme::Dark);
    assert_eq!(theme.mode(), ThemeMode::System);
    assert!(theme.read().is_dark);
}
