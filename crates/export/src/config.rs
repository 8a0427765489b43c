use crate::error::{ExportError, Result};
use crate::signing::SignMode;
use serde::Deserialize;
use shortcut_model::ContainerFormat;
use std::path::{Path, PathBuf};

/// Directory under the home directory that holds default output and stats.
pub const STATE_DIR_NAME: &str = ".shortcut-mcp";
const STATS_FILE_NAME: &str = "stats.json";
const OUTPUT_DIR_NAME: &str = "shortcuts";

pub const ENV_CONFIG: &str = "SHORTCUT_CONFIG";
pub const ENV_OUTPUT_DIR: &str = "SHORTCUT_OUTPUT_DIR";
pub const ENV_FORMAT: &str = "SHORTCUT_FORMAT";
pub const ENV_SIGN_MODE: &str = "SHORTCUT_SIGN_MODE";
pub const ENV_OPEN: &str = "SHORTCUT_OPEN";
pub const ENV_STATS_PATH: &str = "SHORTCUT_STATS_PATH";

/// Where and how generated shortcuts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: ContainerFormat,
    pub sign_mode: SignMode,
    pub open_after_write: bool,
    pub stats_path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let base = state_dir();
        Self {
            output_dir: base.join(OUTPUT_DIR_NAME),
            format: ContainerFormat::Binary,
            sign_mode: SignMode::Off,
            open_after_write: false,
            stats_path: base.join(STATS_FILE_NAME),
        }
    }
}

fn state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(STATE_DIR_NAME))
}

/// On-disk shape of the TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    output_dir: Option<PathBuf>,
    format: Option<String>,
    sign_mode: Option<String>,
    open_after_write: Option<bool>,
    stats_path: Option<PathBuf>,
}

impl ExportConfig {
    /// Defaults, then the config file (`explicit` or `$SHORTCUT_CONFIG`),
    /// then `SHORTCUT_*` environment variables. Command-line flags are
    /// applied by the caller on top of the result.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        let from_env = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
        if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
            config.apply_file(&path)?;
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        let raw = std::fs::read_to_string(path).map_err(|err| ExportError::io(path, err))?;
        self.apply_toml(path, &raw)
    }

    fn apply_toml(&mut self, path: &Path, raw: &str) -> Result<()> {
        let parsed: RawConfig = toml::from_str(raw).map_err(|err| ExportError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        if let Some(dir) = parsed.output_dir {
            self.output_dir = dir;
        }
        if let Some(format) = parsed.format {
            self.format = parse_setting("format", &format)?;
        }
        if let Some(mode) = parsed.sign_mode {
            self.sign_mode = parse_setting("sign_mode", &mode)?;
        }
        if let Some(open) = parsed.open_after_write {
            self.open_after_write = open;
        }
        if let Some(stats) = parsed.stats_path {
            self.stats_path = stats;
        }
        log::debug!("Loaded export config from {}", path.display());
        Ok(())
    }

    /// Overlay environment variables read through `lookup`. Empty values
    /// are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(format) = get(ENV_FORMAT) {
            self.format = parse_setting(ENV_FORMAT, &format)?;
        }
        if let Some(mode) = get(ENV_SIGN_MODE) {
            self.sign_mode = parse_setting(ENV_SIGN_MODE, &mode)?;
        }
        if let Some(open) = get(ENV_OPEN) {
            self.open_after_write = parse_flag(ENV_OPEN, &open)?;
        }
        if let Some(stats) = get(ENV_STATS_PATH) {
            self.stats_path = PathBuf::from(stats);
        }
        Ok(())
    }
}

fn parse_setting<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>()
        .map_err(|reason| ExportError::invalid_setting(key, raw, reason))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ExportError::invalid_setting(key, raw, "expected a boolean")),
    }
}
