use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::payload::MarkerFilter;
use crate::error::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = ".docstring";
const CONFIG_FILE_NAME: &str = "config.ini";
const CONFIG_TEMPLATE: &str = "[global]\napi_key =\n";

const PRODUCTION_ENDPOINT: &str =
    "https://api.docstring.dev/api/integrations/githook/post-merge";
const DEV_ENDPOINT: &str = "http://localhost:8000/api/integrations/githook/post-merge";

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(5);

pub fn config_directory() -> AppResult<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        AppError::Configuration("could not resolve the home directory".to_string())
    })?;
    Ok(home.join(CONFIG_DIR_NAME))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Credentials read from `~/.docstring/config.ini`.
#[derive(Debug, Clone)]
pub struct HookConfig {
    pub api_key: String,
}

impl HookConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    /// Loads the config from an explicit path. A missing file is scaffolded
    /// with an empty `api_key` and reported as an error so the user knows
    /// where to put the key; the run stops there.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                scaffold(path)?;
                return Err(AppError::Configuration(format!(
                    "no configuration found; created {}, set api_key and merge again",
                    path.display()
                )));
            }
            Err(err) => return Err(AppError::Io(err)),
        };

        let raw_key = ini_lookup(&contents, "global", "api_key").ok_or_else(|| {
            AppError::Configuration(format!(
                "no api_key under [global] in {}",
                path.display()
            ))
        })?;

        // Users paste keys with the surrounding quotes often enough that we
        // strip them here.
        let api_key = raw_key
            .trim_matches(|c| c == '\'' || c == '"')
            .to_string();
        if api_key.is_empty() {
            return Err(AppError::Configuration(format!(
                "api_key in {} is empty",
                path.display()
            )));
        }

        Ok(Self { api_key })
    }
}

fn scaffold(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, CONFIG_TEMPLATE)?;
    Ok(())
}

/// Minimal INI lookup: `[section]` headers, `key = value` pairs, `#`/`;`
/// comments. The config file only ever holds one section and one key, so a
/// dedicated parsing crate would be overkill.
fn ini_lookup(contents: &str, section: &str, key: &str) -> Option<String> {
    let mut in_section = false;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = header.trim() == section;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((candidate, value)) = line.split_once('=') {
            if candidate.trim() == key {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Everything the pipeline needs at runtime, assembled once in `main` so no
/// component reads process environment or module-level constants itself.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub marker_filter: MarkerFilter,
    pub workspace_root: PathBuf,
}

impl Settings {
    pub fn new(
        config: HookConfig,
        workspace_root: PathBuf,
        dev_mode: bool,
        legacy_filter: bool,
    ) -> Self {
        let endpoint = if dev_mode {
            DEV_ENDPOINT
        } else {
            PRODUCTION_ENDPOINT
        };
        let marker_filter = if legacy_filter {
            MarkerFilter::LegacyAccumulator
        } else {
            MarkerFilter::FileContent
        };
        Self {
            api_key: config.api_key,
            endpoint: endpoint.to_string(),
            timeout: UPLOAD_TIMEOUT,
            marker_filter,
            workspace_root,
        }
    }
}
