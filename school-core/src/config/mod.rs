use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate a crate's `config/` directory whether the process runs from the
/// workspace root or from inside the crate.
pub fn configuration_directory(crate_dir: &str) -> Result<PathBuf, AppError> {
    let base_path = std::env::current_dir()?;

    if base_path.ends_with(crate_dir) {
        Ok(base_path.join("config"))
    } else {
        Ok(base_path.join(crate_dir).join("config"))
    }
}

/// Load settings from `<dir>/<file_stem>.yaml`, overlaid with `APP_*`
/// environment variables (`APP_SERVER__PORT=9000`).
pub fn load_layered<T: DeserializeOwned>(dir: &Path, file_stem: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let config = Cfg::builder()
        .add_source(File::from(dir.join(format!("{}.yaml", file_stem))).required(true))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("access.admin_emails"),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}
