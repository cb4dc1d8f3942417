use anyhow::{Context, Result};
use shared::settings::GatewaySettings;
use std::path::{Path, PathBuf};

/// `<config_dir>/settings.json` for this user, if a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "Lumina", "Lumina")
        .map(|proj| proj.config_dir().join("settings.json"))
}

/// An explicit path must exist and parse. The default location is optional
/// and falls back to built-in settings when absent.
pub fn load_settings(explicit: Option<&Path>) -> Result<GatewaySettings> {
    if let Some(path) = explicit {
        return GatewaySettings::load(path)
            .with_context(|| format!("reading settings from {}", path.display()));
    }
    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "loading settings");
            GatewaySettings::load(&path)
                .with_context(|| format!("reading settings from {}", path.display()))
        }
        _ => Ok(GatewaySettings::default()),
    }
}
