use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use std::sync::Arc;
use tracing::info;

use crud_grid::config::{BackendKind, Config};
use crud_grid::data::backend::CrudBackend;
use crud_grid::data::memory_backend::InMemoryBackend;
use crud_grid::data::query::{CrudFilters, SortOption, StatusFilter};
use crud_grid::data::rest_backend::RestBackend;
use crud_grid::i18n::Language;
use crud_grid::preferences::{FilePreferenceStore, LanguageContext, ThemeContext};
use crud_grid::services::CrudItemsService;
use crud_grid::ui::theme::{ColorScheme, ThemeMode};
use crud_grid::ui::tints::TintName;
use crud_grid::ui::CrudApp;
use crud_grid::utils::app_paths::AppPaths;
use crud_grid::utils::dual_logging::get_dual_logger;
use crud_grid::utils::logging::init_tracing_with_dual_logging;

mod table_display;

use table_display::display_items;

#[derive(Parser, Debug)]
#[command(name = "crud-grid", version, about = "Browse and edit items in a terminal data grid")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Data source: memory or rest
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Items fetched per page
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Server ordering: newest, oldest, alphabetical or a column name
    #[arg(long, global = true)]
    sort: Option<String>,

    /// Search title, subtitle and description
    #[arg(long, global = true)]
    search: Option<String>,

    /// Status filter: all, active, archived or draft
    #[arg(long, global = true)]
    status: Option<String>,

    /// Theme: light, dark or system (saved as the new preference)
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Accent tint: teal, amber, earth_green, purple or sienna (saved)
    #[arg(long, global = true)]
    tint: Option<String>,

    /// Language: en or es (saved)
    #[arg(long, global = true)]
    lang: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive item browser (default)
    Tui,
    /// Print the first page as a table
    List,
    /// Initialize configuration with a wizard
    InitConfig,
    /// Write a commented default config file
    GenerateConfig,
}

fn build_backend(config: &Config) -> Result<Arc<dyn CrudBackend>> {
    match config.backend.kind {
        BackendKind::Memory => Ok(Arc::new(InMemoryBackend::seeded(
            &config.backend.user_id,
            config.backend.demo_items,
        ))),
        BackendKind::Rest => {
            let Some(url) = config.backend.url.as_deref() else {
                bail!("backend.url must be set for the rest backend");
            };
            let Some(api_key) = config.backend.api_key() else {
                bail!(
                    "Set {} to the API key for {}",
                    config.backend.api_key_env,
                    url
                );
            };
            Ok(Arc::new(RestBackend::new(
                url,
                &api_key,
                config.backend.access_token(),
            )))
        }
    }
}

fn build_filters(cli: &Cli) -> Result<CrudFilters> {
    let mut filters = CrudFilters {
        search: cli.search.clone().filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };
    if let Some(status) = &cli.status {
        let status: StatusFilter = status.parse()?;
        if status != StatusFilter::All {
            filters.status = vec![status];
        }
    }
    Ok(filters)
}

fn build_service(cli: &Cli, config: &Config) -> Result<CrudItemsService> {
    let backend = build_backend(config)?;
    let mut service = CrudItemsService::new(backend, config.backend.user_id.clone())
        .with_page_size(config.grid.page_size)
        .with_filters(build_filters(cli)?);
    if let Some(sort) = &cli.sort {
        let sort: SortOption = sort.parse().unwrap_or_default();
        service = service.with_sort(sort);
    }
    Ok(service)
}

fn system_scheme(config: &Config) -> ColorScheme {
    match config.theme.system_scheme.as_deref() {
        Some("light") => ColorScheme::Light,
        Some("dark") => ColorScheme::Dark,
        _ => ColorScheme::detect(),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}", format!("Config not loaded, using defaults: {}", e).yellow());
        Config::default()
    });
    if let Some(kind) = &cli.backend {
        config.backend.kind = kind.parse()?;
    }
    if let Some(page_size) = cli.page_size {
        config.grid.page_size = page_size.max(1);
    }
    Ok(config)
}

fn run_list(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let preferences = AppPaths::preferences_file()?;
    let language = language_context(cli, &config, &preferences)?;

    // No runtime: the fetch runs inline and is ready on the first poll
    let mut service = build_service(cli, &config)?;
    service.start();
    service.poll();
    if let Some(error) = service.error() {
        return Err(anyhow!("{}", error));
    }

    display_items(service.items(), service.total(), &language.translator());
    Ok(())
}

fn language_context(
    cli: &Cli,
    config: &Config,
    preferences: &std::path::Path,
) -> Result<LanguageContext> {
    let device_locale = config
        .display
        .locale
        .clone()
        .or_else(LanguageContext::device_locale);
    let mut language = LanguageContext::init(
        Box::new(FilePreferenceStore::new(preferences)),
        device_locale.as_deref(),
    );
    if let Some(code) = &cli.lang {
        language.set_language(code.parse::<Language>()?)?;
    }
    Ok(language)
}

fn run_tui(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let preferences = AppPaths::preferences_file()?;

    let mut theme = ThemeContext::init(
        Box::new(FilePreferenceStore::new(&preferences)),
        system_scheme(&config),
    );
    if let Some(mode) = &cli.theme {
        theme.set_theme(mode.parse::<ThemeMode>()?)?;
    }
    if let Some(tint) = &cli.tint {
        theme.set_tint(tint.parse::<TintName>()?)?;
    }
    let language = language_context(cli, &config, &preferences)?;

    // Fetches run on the blocking pool; the UI thread stays outside the runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let service = build_service(cli, &config)?.with_runtime(runtime.handle().clone());

    info!(
        target: "app",
        "Starting TUI with {} backend, page size {}",
        service.backend_name(),
        service.page_size()
    );

    let app = CrudApp::new(config, service, theme, language);
    let result = app.run();
    runtime.shutdown_background();
    result
}

fn generate_config() -> Result<()> {
    let path = Config::get_config_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating config directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::create_default_with_comments())
        .with_context(|| format!("Error writing config file {}", path.display()))?;
    println!("Configuration file created at: {:?}", path);
    println!("Edit this file to customize crud-grid.");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing_with_dual_logging("info");

    if let Some(dual_logger) = get_dual_logger() {
        eprintln!("📝 Debug logs will be written to:");
        eprintln!("   {}", dual_logger.log_path().display());
    }

    match cli.command.as_ref().unwrap_or(&Command::Tui) {
        Command::Tui => run_tui(&cli),
        Command::List => run_list(&cli),
        Command::InitConfig => {
            let config = Config::init_wizard()?;
            println!("\nConfiguration initialized successfully!");
            if !config.display.use_glyphs {
                println!("Note: Simple mode enabled (ASCII icons)");
            }
            Ok(())
        }
        Command::GenerateConfig => generate_config(),
    }
}
