use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use directories::ProjectDirs;
use storydeck_application::{AppContext, StorySource};
use storydeck_remote::{HttpStorySource, Loader};
use storydeck_ui::Ui;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod config_file;

const LOG_FILE: &str = "storydeck.log";
const LOG_ENV: &str = "STORYDECK_LOG";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "storydeck", "storydeck").context("resolve project dirs")?;

    let config_dir = project_dirs.config_dir();
    fs::create_dir_all(config_dir)
        .with_context(|| format!("create config dir {}", config_dir.display()))?;
    let data_dir = project_dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;

    let _log_guard = init_logging(data_dir)?;

    let settings_path = config_file::settings_path(config_dir);
    let mut stored = config_file::load_settings(&settings_path)?;
    let mut settings = stored.clone();
    config_file::apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    tracing::info!(api = %settings.api_url, images = %settings.image_base_url, "starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("storydeck-fetch")
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let source: Arc<dyn StorySource> = Arc::new(HttpStorySource::new(&settings));
    let (loader, events) = Loader::new(source, runtime.handle().clone());

    let mut ui = Ui::new(AppContext::new(settings), loader, events);
    ui.start();
    let outcome = ui.run();

    let ctx = ui.into_context();
    config_file::keep_ui_choices(&mut stored, &ctx.settings);
    config_file::save_settings(&settings_path, &stored)?;

    runtime.shutdown_timeout(Duration::from_millis(500));
    tracing::info!("bye");
    outcome
}

fn init_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("init logging: {err}"))?;
    Ok(guard)
}
