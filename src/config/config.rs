use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::data::query::{ViewMode, DEFAULT_PAGE_SIZE};
use crate::grid::synced_grid::DEFAULT_LOAD_MORE_THRESHOLD;
use crate::utils::app_paths::AppPaths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub grid: GridConfig,
    pub backend: BackendConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for icons
    pub use_glyphs: bool,

    /// View shown on startup
    pub default_view: ViewMode,

    /// Locale used when no language has been saved (falls back to $LANG)
    pub locale: Option<String>,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub pin: String,
    pub loading: String,
    pub empty: String,
    pub error: String,
    pub success: String,
    pub sort_asc: String,
    pub sort_desc: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Rows fetched per page
    pub page_size: usize,

    /// Lines per row in the table view
    pub row_height: u16,

    /// Fraction of a viewport from the end at which the next page is requested
    pub load_more_threshold: f32,

    /// Column kept in place while the rest scroll horizontally
    pub pinned_column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    Rest,
}

impl FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "demo" => Ok(BackendKind::Memory),
            "rest" | "supabase" => Ok(BackendKind::Rest),
            other => Err(anyhow!("Unknown backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub kind: BackendKind,

    /// Base URL of the REST endpoint (without /rest/v1)
    pub url: Option<String>,

    /// Environment variable holding the anon API key
    pub api_key_env: String,

    /// Environment variable holding the user's access token
    pub access_token_env: String,

    /// Owner of the items shown
    pub user_id: String,

    /// Items generated for the in-memory backend
    pub demo_items: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Scheme assumed for the "system" theme: "light" or "dark".
    /// Unset means detect from the terminal.
    pub system_scheme: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            default_view: ViewMode::Table,
            locale: None,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            pin: "📌".to_string(),
            loading: "⏳".to_string(),
            empty: "∅".to_string(),
            error: "❌".to_string(),
            success: "✅".to_string(),
            sort_asc: "↑".to_string(),
            sort_desc: "↓".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            pin: "[P]".to_string(),
            loading: "...".to_string(),
            empty: "-".to_string(),
            error: "[X]".to_string(),
            success: "[OK]".to_string(),
            sort_asc: "^".to_string(),
            sort_desc: "v".to_string(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            row_height: 1,
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            pinned_column: Some("title".to_string()),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Memory,
            url: None,
            api_key_env: "CRUD_GRID_API_KEY".to_string(),
            access_token_env: "CRUD_GRID_ACCESS_TOKEN".to_string(),
            user_id: "demo-user".to_string(),
            demo_items: 120,
        }
    }
}

impl BackendConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }

    pub fn access_token(&self) -> Option<String> {
        std::env::var(&self.access_token_env)
            .ok()
            .filter(|k| !k.is_empty())
    }
}

impl Config {
    /// Load config from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }
        config.grid.page_size = config.grid.page_size.max(1);
        config.grid.row_height = config.grid.row_height.max(1);

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# crud-grid configuration
# Location: ~/.config/crud-grid/config.toml (Linux)
#           ~/Library/Application Support/crud-grid/config.toml (macOS)

[display]
# Use Unicode glyphs for icons; false switches to ASCII
use_glyphs = true

# View shown on startup: "list", "grid" or "table"
default_view = "table"

# Language used when none has been saved ("en" or "es"); defaults to $LANG
# locale = "es"

[grid]
# Items fetched per page
page_size = 20

# Lines per row in the table view
row_height = 1

# Request the next page when within this fraction of a screen from the end
load_more_threshold = 0.5

# Column kept in place while the others scroll sideways
pinned_column = "title"

[backend]
# "memory" for built-in demo data, "rest" for a PostgREST-compatible endpoint
kind = "memory"

# Base URL of the REST endpoint
# url = "https://your-project.supabase.co"

# Environment variables holding credentials
api_key_env = "CRUD_GRID_API_KEY"
access_token_env = "CRUD_GRID_ACCESS_TOKEN"

# Owner of the items shown
user_id = "demo-user"

# Number of demo items for the memory backend
demo_items = 120

[theme]
# Scheme used by the "system" theme when the terminal cannot be queried
# system_scheme = "dark"
"#
        .to_string()
    }

    /// Interactive setup used by `init-config`
    pub fn init_wizard() -> Result<Self> {
        println!("crud-grid Configuration Setup");
        println!("=============================");

        print!("Does your terminal support Unicode icons? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let use_glyphs = !input.trim().eq_ignore_ascii_case("n");

        let mut config = Config::default();
        config.display.use_glyphs = use_glyphs;
        if !use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        print!("Backend (memory/rest) [memory]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        let answer = input.trim();
        if !answer.is_empty() {
            config.backend.kind = answer.parse()?;
        }

        if config.backend.kind == BackendKind::Rest {
            print!("REST base URL: ");
            std::io::Write::flush(&mut std::io::stdout())?;
            input.clear();
            std::io::stdin().read_line(&mut input)?;
            let url = input.trim();
            if !url.is_empty() {
                config.backend.url = Some(url.to_string());
            }
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
