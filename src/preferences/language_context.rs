use anyhow::Result;
use tracing::{info, warn};

use crate::i18n::{Language, Translator};
use crate::preferences::PreferenceStore;

pub const LANGUAGE_STORAGE_KEY: &str = "user-language";

/// Active UI language, owned by the application root
pub struct LanguageContext {
    store: Box<dyn PreferenceStore>,
    language: Language,
}

impl LanguageContext {
    /// Saved language first, then the device locale if supported, then English
    pub fn init(store: Box<dyn PreferenceStore>, device_locale: Option<&str>) -> Self {
        let saved = match store.get(LANGUAGE_STORAGE_KEY) {
            Ok(value) => value.and_then(|code| match code.parse::<Language>() {
                Ok(language) => Some(language),
                Err(_) => {
                    warn!(target: "i18n", "Ignoring saved language {:?}", code);
                    None
                }
            }),
            Err(e) => {
                warn!(target: "i18n", "Failed to load saved language: {}", e);
                None
            }
        };

        let language = saved
            .or_else(|| device_locale.and_then(Language::from_locale))
            .unwrap_or_default();

        info!(target: "i18n", "Language {}", language);
        Self { store, language }
    }

    /// Locale reported by the environment (`LC_ALL`, `LC_MESSAGES`, then `LANG`)
    pub fn device_locale() -> Option<String> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty() && v != "C" && v != "POSIX")
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn translator(&self) -> Translator {
        Translator::new(self.language)
    }

    pub fn supported_languages(&self) -> &'static [Language] {
        &Language::SUPPORTED
    }

    /// Persist then switch. The switch applies even if saving fails.
    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.language = language;
        self.store.set(LANGUAGE_STORAGE_KEY, language.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferenceStore;

    #[test]
    fn test_saved_language_wins() {
        let store = MemoryPreferenceStore::new().with(LANGUAGE_STORAGE_KEY, "es");
        let ctx = LanguageContext::init(Box::new(store), Some("en_US.UTF-8"));
        assert_eq!(ctx.language(), Language::Es);
    }

    #[test]
    fn test_device_locale_then_english() {
        let ctx = LanguageContext::init(Box::new(MemoryPreferenceStore::new()), Some("es-AR"));
        assert_eq!(ctx.language(), Language::Es);

        let ctx = LanguageContext::init(Box::new(MemoryPreferenceStore::new()), Some("fr_FR"));
        assert_eq!(ctx.language(), Language::En);
    }

    #[test]
    fn test_set_language_switches_translator() {
        let mut ctx = LanguageContext::init(Box::new(MemoryPreferenceStore::new()), None);
        ctx.set_language(Language::Es).unwrap();
        assert_eq!(ctx.translator().t("settings.title"), "Ajustes");
    }
}
