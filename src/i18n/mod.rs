//! Built-in string tables
//!
//! Keys are dot paths into nested JSON (`crud.fields.title`). Lookups fall
//! back to English, then to the key itself. `{{name}}` placeholders are
//! replaced by `t_with`.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub const SUPPORTED: [Language; 2] = [Language::En, Language::Es];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Spanish",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Es => "Espanol",
        }
    }

    /// Match a locale such as `es`, `es-MX` or `es_ES.UTF-8` by its language part
    pub fn from_locale(locale: &str) -> Option<Self> {
        let code = locale
            .split(|c: char| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        Self::SUPPORTED.iter().copied().find(|l| l.code() == code)
    }

    pub fn next(&self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }

    fn table(&self) -> &'static Value {
        static EN: OnceLock<Value> = OnceLock::new();
        static ES: OnceLock<Value> = OnceLock::new();
        match self {
            Language::En => EN.get_or_init(|| parse_table("en", include_str!("locales/en.json"))),
            Language::Es => ES.get_or_init(|| parse_table("es", include_str!("locales/es.json"))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .iter()
            .copied()
            .find(|l| l.code() == s)
            .ok_or_else(|| anyhow::anyhow!("Unsupported language: {}", s))
    }
}

fn parse_table(code: &str, source: &str) -> Value {
    serde_json::from_str(source).unwrap_or_else(|e| {
        error!(target: "i18n", "Invalid {} string table: {}", code, e);
        Value::Object(Default::default())
    })
}

fn lookup<'a>(table: &'a Value, key: &str) -> Option<&'a str> {
    key.split('.')
        .try_fold(table, |node, part| node.get(part))?
        .as_str()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn t(&self, key: &str) -> String {
        lookup(self.language.table(), key)
            .or_else(|| lookup(Language::En.table(), key))
            .unwrap_or(key)
            .to_string()
    }

    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.t(key), |text, (name, value)| {
            text.replace(&format!("{{{{{}}}}}", name), value)
        })
    }

    pub fn has(&self, key: &str) -> bool {
        lookup(self.language.table(), key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lookup() {
        let t = Translator::new(Language::Es);
        assert_eq!(t.t("crud.fields.title"), "Título");
        assert_eq!(Translator::new(Language::En).t("crud.fields.title"), "Title");
    }

    #[test]
    fn test_falls_back_to_english_then_key() {
        let t = Translator::new(Language::Es);
        assert!(!t.has("crud.validation.titleRequired"));
        assert_eq!(t.t("crud.validation.titleRequired"), "Title is required");
        assert_eq!(t.t("no.such.key"), "no.such.key");
        // a branch, not a leaf
        assert_eq!(t.t("crud.fields"), "crud.fields");
    }

    #[test]
    fn test_interpolation() {
        let t = Translator::new(Language::En);
        assert_eq!(
            t.t_with("crud.count", &[("count", "20"), ("total", "120")]),
            "20 of 120 items"
        );
    }

    #[test]
    fn test_locale_matching() {
        assert_eq!(Language::from_locale("es_MX.UTF-8"), Some(Language::Es));
        assert_eq!(Language::from_locale("en-GB"), Some(Language::En));
        assert_eq!(Language::from_locale("fr_FR"), None);
        assert!("de".parse::<Language>().is_err());
    }
}
