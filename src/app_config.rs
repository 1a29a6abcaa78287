//! Application configuration loading for CLI defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Default cap on URLs given on the command line.
pub const DEFAULT_MANUAL_URL_LIMIT: usize = 9;

/// Default cap on URLs read from a file.
pub const DEFAULT_FILE_URL_LIMIT: usize = 100;

/// Default concurrent page fetches.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// `key = value` file configuration for scrapehub defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Directory export files are written to.
    pub output_dir: Option<PathBuf>,
    /// Per-page fetch timeout in seconds.
    pub fetch_timeout_secs: Option<u64>,
    /// Redirect hops followed per fetch.
    pub max_redirects: Option<u64>,
    /// Cap on URLs given as arguments.
    pub manual_url_limit: Option<u64>,
    /// Cap on URLs read from `--file`.
    pub file_url_limit: Option<u64>,
    /// Concurrent page fetches.
    pub concurrency: Option<u64>,
    /// SQLite file for saved searches.
    pub history_db: Option<PathBuf>,
    /// Saved searches kept before the oldest are evicted.
    pub history_capacity: Option<u64>,
    /// LinkedIn API root.
    pub linkedin_base_url: Option<String>,
    /// LinkedIn records per page.
    pub linkedin_page_size: Option<u64>,
    /// Replace existing export files.
    pub overwrite: Option<bool>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        validate_range("fetch_timeout_secs", self.fetch_timeout_secs, 1, 3600)?;
        validate_range("max_redirects", self.max_redirects, 0, 20)?;
        validate_range("manual_url_limit", self.manual_url_limit, 1, 10_000)?;
        validate_range("file_url_limit", self.file_url_limit, 1, 10_000)?;
        validate_range("concurrency", self.concurrency, 1, 16)?;
        validate_range("history_capacity", self.history_capacity, 1, 100_000)?;
        validate_range("linkedin_page_size", self.linkedin_page_size, 1, 100)?;

        if let Some(base_url) = &self.linkedin_base_url
            && !(base_url.starts_with("https://") || base_url.starts_with("http://"))
        {
            bail!(
                "Invalid config value for `linkedin_base_url`: {base_url}. Expected an http(s) URL"
            );
        }
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: FileConfig,
    /// Indicates whether configuration was loaded from disk.
    pub loaded_from_file: bool,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/scrapehub/config.toml`
/// 2. `$HOME/.config/scrapehub/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("scrapehub")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("scrapehub")
            .join("config.toml"),
    )
}

/// Directory for data files such as the history database.
///
/// `$XDG_DATA_HOME/scrapehub`, else `$HOME/.local/share/scrapehub`, else the
/// current directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    if let Some(xdg_data_home) = env_var_non_empty_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg_data_home).join("scrapehub");
    }
    env_var_non_empty_os("HOME").map_or_else(
        || PathBuf::from("."),
        |home| PathBuf::from(home).join(".local").join("share").join("scrapehub"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from `explicit` if given, else from the default path if present.
pub fn load_file_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config,
            loaded_from_file: true,
        });
    }

    let path = resolve_default_config_path();
    match path.as_deref() {
        Some(path_ref) if path_ref.exists() => {
            let config = read_config(path_ref)?;
            Ok(LoadedConfig {
                path,
                config,
                loaded_from_file: true,
            })
        }
        _ => Ok(LoadedConfig {
            path,
            ..LoadedConfig::default()
        }),
    }
}

fn read_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_number = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let context = || format!("Invalid `{key}` value on line {line_number}");

        match key {
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "history_db" => {
                cfg.history_db = Some(PathBuf::from(
                    parse_string_literal(value).with_context(context)?,
                ));
            }
            "linkedin_base_url" => {
                cfg.linkedin_base_url = Some(parse_string_literal(value).with_context(context)?);
            }
            "fetch_timeout_secs" => {
                cfg.fetch_timeout_secs = Some(parse_integer_u64(value).with_context(context)?);
            }
            "max_redirects" => {
                cfg.max_redirects = Some(parse_integer_u64(value).with_context(context)?);
            }
            "manual_url_limit" => {
                cfg.manual_url_limit = Some(parse_integer_u64(value).with_context(context)?);
            }
            "file_url_limit" => {
                cfg.file_url_limit = Some(parse_integer_u64(value).with_context(context)?);
            }
            "concurrency" => {
                cfg.concurrency = Some(parse_integer_u64(value).with_context(context)?);
            }
            "history_capacity" => {
                cfg.history_capacity = Some(parse_integer_u64(value).with_context(context)?);
            }
            "linkedin_page_size" => {
                cfg.linkedin_page_size = Some(parse_integer_u64(value).with_context(context)?);
            }
            "overwrite" => {
                cfg.overwrite = Some(parse_boolean(value).with_context(context)?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_number}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}
