use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use storydeck_core::Settings;

pub const SETTINGS_FILE: &str = "settings.json";
pub const API_URL_ENV: &str = "STORYDECK_API_URL";
pub const IMAGE_BASE_URL_ENV: &str = "STORYDECK_IMAGE_BASE_URL";

pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Reads `path`; a missing file yields defaults, which are written back.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str::<Settings>(&raw)
            .with_context(|| format!("parse settings {}", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            let settings = Settings::default();
            save_settings(path, &settings)?;
            tracing::info!(path = %path.display(), "wrote default settings");
            settings
        }
        Err(err) => {
            return Err(err).with_context(|| format!("read settings {}", path.display()));
        }
    };
    settings.normalize();
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config dir {}", parent.display()))?;
    }
    let raw = serde_json::to_string_pretty(settings).context("encode settings")?;
    fs::write(path, raw).with_context(|| format!("write settings {}", path.display()))
}

/// Environment values win over the file for this session only.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        settings.api_url = url;
    }
    if let Some(url) = lookup(IMAGE_BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        settings.image_base_url = url;
    }
    settings.normalize();
}

/// Copies what the user can change in-app onto the stored settings.
pub fn keep_ui_choices(stored: &mut Settings, session: &Settings) {
    stored.theme = session.theme;
    stored.show_images = session.show_images;
}
