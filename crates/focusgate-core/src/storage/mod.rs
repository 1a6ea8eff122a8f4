mod config;
pub mod database;

pub use config::Config;
pub use database::LocalStore;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns `~/.config/focusgate[-dev]/` based on FOCUSGATE_ENV.
///
/// Set FOCUSGATE_ENV=dev to use a development data directory, or
/// FOCUSGATE_DATA_DIR to point somewhere else entirely (tests do this).
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FOCUSGATE_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .ok_or_else(|| ConfigError::LoadFailed {
            path: PathBuf::from("~"),
            message: "home directory cannot be determined".into(),
        })?
        .join(".config");

    let env = std::env::var("FOCUSGATE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focusgate-dev")
    } else {
        base_dir.join("focusgate")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
