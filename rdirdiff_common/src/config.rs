use crate::{AppConfig, RDirDiffError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "rdirdiff.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
}

/// Load the configuration, looking next to the executable first and then in
/// the platform config directory. A missing file yields the defaults.
pub fn load_config() -> Result<LoadedConfig, RDirDiffError> {
    load_config_from(&resolve_config_path()?)
}

/// Load the configuration from an explicit file path
pub fn load_config_from(path: &Path) -> Result<LoadedConfig, RDirDiffError> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(path)?;
        toml::from_str(&data)
            .map_err(|e| RDirDiffError::Config(format!("{}: {}", path.display(), e)))?
    } else {
        AppConfig::default()
    };

    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        exists,
    })
}

fn resolve_config_path() -> Result<PathBuf, RDirDiffError> {
    if let Some(portable_path) = portable_config_path() {
        if portable_path.exists() {
            return Ok(portable_path);
        }
    }

    let dirs = ProjectDirs::from("", "", "rdirdiff").ok_or_else(|| {
        RDirDiffError::Config("Unable to determine config directory".to_string())
    })?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
