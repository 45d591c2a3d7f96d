#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::TodoError;
use crate::task::model::Filter;

pub const CONFIG_ENV: &str = "TODOTUI_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub ui: UiConfig,
    pub notify: NotifyConfig,
    pub voice: VoiceConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(alias = "dir")]
    pub data_dir: String,
    #[serde(alias = "key")]
    pub slot: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.local/share/todotui".to_owned(),
            slot: "tasks".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub default_filter: Filter,
    pub confirm_delete: bool,
    pub icons: bool,
    pub tilde_home: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: Filter::All,
            confirm_delete: true,
            icons: true,
            tilde_home: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub command: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "notify-send".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceConfig {
    /// Shell command printing a transcript on stdout. Empty disables voice input.
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub csv_file: String,
    pub pdf_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_file: "tasks.csv".to_owned(),
            pdf_file: "tasks.pdf".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
}

pub fn default_paths() -> anyhow::Result<ConfigPaths> {
    if let Some(explicit) = std::env::var_os(CONFIG_ENV) {
        return Ok(ConfigPaths {
            config_file: PathBuf::from(explicit),
        });
    }

    let unix = home_config_path_unix();
    if !cfg!(windows) {
        return Ok(ConfigPaths { config_file: unix });
    }

    // Windows: prefer the Unix-style path if present for portability.
    if unix.exists() {
        return Ok(ConfigPaths { config_file: unix });
    }

    let proj = ProjectDirs::from("com", "todotui", "todotui")
        .context("failed to determine platform config directory")?;
    Ok(ConfigPaths {
        config_file: proj.config_dir().join("config.toml"),
    })
}

fn home_config_path_unix() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("~"));
    home.join(".config").join("todotui").join("config.toml")
}

fn home_dir() -> Option<PathBuf> {
    if let Some(v) = std::env::var_os("HOME") {
        return Some(PathBuf::from(v));
    }
    if let Some(v) = std::env::var_os("USERPROFILE") {
        return Some(PathBuf::from(v));
    }
    let drive = std::env::var_os("HOMEDRIVE");
    let path = std::env::var_os("HOMEPATH");
    match (drive, path) {
        (Some(d), Some(p)) => Some(PathBuf::from(d).join(PathBuf::from(p))),
        _ => None,
    }
}

#[must_use]
pub fn expand_tilde(input: &str) -> String {
    if let Some(rest) = input.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(rest).to_string_lossy().to_string();
    }
    input.to_owned()
}

#[must_use]
pub fn tilde_path(input: &str) -> String {
    let Some(home) = home_dir() else {
        return input.to_owned();
    };
    let home_str = home.to_string_lossy();
    if let Some(rest) = input.strip_prefix(home_str.as_ref()) {
        if rest.is_empty() {
            return "~".to_owned();
        }
        if rest.starts_with(std::path::MAIN_SEPARATOR) {
            return format!("~{rest}");
        }
    }
    input.to_owned()
}

pub fn expand_path(input: &str) -> anyhow::Result<PathBuf> {
    let expanded = expand_env_vars(&expand_tilde(input));
    let p = PathBuf::from(expanded);
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join(p))
}

fn expand_env_vars(input: &str) -> String {
    // Expand $VAR and ${VAR}. Leave unknown vars untouched.
    let Ok(re) = regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?") else {
        return input.to_owned();
    };
    re.replace_all(input, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        std::env::var(key).unwrap_or_else(|_| caps[0].to_owned())
    })
    .to_string()
}

pub fn load() -> anyhow::Result<(Config, toml_edit::DocumentMut, ConfigPaths)> {
    let paths = default_paths()?;
    let (doc, cfg) = load_from_file(&paths.config_file)?;
    cfg.validate()?;
    Ok((cfg, doc, paths))
}

pub fn list_resolved_toml() -> anyhow::Result<String> {
    let (cfg, _doc, _paths) = load()?;
    Ok(toml::to_string_pretty(&cfg)?)
}

pub fn get_value_string(key: &str) -> anyhow::Result<Option<String>> {
    let paths = default_paths()?;
    get_value_string_at_path(&paths.config_file, key)
}

pub fn set_value_string(key: &str, value: &str) -> anyhow::Result<()> {
    let paths = default_paths()?;
    set_value_string_at_path(&paths.config_file, key, value)
}

fn load_from_file(path: &Path) -> anyhow::Result<(toml_edit::DocumentMut, Config)> {
    if !path.exists() {
        return Ok((toml_edit::DocumentMut::new(), Config::default()));
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let doc = raw
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse TOML in {}", path.display()))?;

    let cfg: Config = toml::from_str(&raw)
        .with_context(|| format!("failed to deserialize TOML in {}", path.display()))?;
    Ok((doc, cfg))
}

pub fn get_value_string_at_path(path: &Path, key: &str) -> anyhow::Result<Option<String>> {
    let (_doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    let norm = normalize_key(key);
    let value = lookup_value(&cfg, &norm);
    Ok(value.map(format_value_for_stdout))
}

pub fn set_value_string_at_path(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let (mut doc, cfg) = load_from_file(path)?;
    cfg.validate()?;

    let (norm_key, value_item) = normalize_key_and_parse_value(key, value)?;
    apply_set(&mut doc, &norm_key, value_item)?;

    // Validate by re-parsing the updated doc into a Config.
    let new_raw = doc.to_string();
    let new_cfg: Config = toml::from_str(&new_raw)
        .with_context(|| format!("config update produced invalid TOML for {}", path.display()))?;
    new_cfg.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, new_raw.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

impl Config {
    pub fn validate(&self) -> Result<(), TodoError> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(TodoError::Config(
                "storage.data_dir must not be empty".to_owned(),
            ));
        }
        if let Err(e) = crate::task::storage::validate_slot_name(&self.storage.slot) {
            return Err(TodoError::Config(format!("storage.slot: {e}")));
        }
        if self.export.csv_file.trim().is_empty() {
            return Err(TodoError::Config(
                "export.csv_file must not be empty".to_owned(),
            ));
        }
        if self.export.pdf_file.trim().is_empty() {
            return Err(TodoError::Config(
                "export.pdf_file must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Path of the log file used while the TUI owns the terminal.
    pub fn log_file(&self) -> anyhow::Result<PathBuf> {
        Ok(expand_path(&self.storage.data_dir)?.join("todotui.log"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Bool,
    String,
    Enum(&'static [&'static str]),
}

fn normalize_key(key: &str) -> String {
    match key {
        "storage.dir" => "storage.data_dir",
        "storage.key" => "storage.slot",
        "ui.filter" => "ui.default_filter",
        "notifications" | "notify" => "notify.enabled",
        _ => key,
    }
    .to_owned()
}

fn normalize_key_and_parse_value(
    key: &str,
    value: &str,
) -> anyhow::Result<(String, toml_edit::Item)> {
    let norm = normalize_key(key);
    let key_type = key_type(&norm).ok_or_else(|| TodoError::InvalidConfigKey(key.to_owned()))?;
    let item = match key_type {
        KeyType::Bool => toml_edit::value(parse_bool(value).map_err(|msg| {
            TodoError::InvalidConfigValue {
                key: key.to_owned(),
                msg,
            }
        })?),
        KeyType::String => toml_edit::value(value),
        KeyType::Enum(allowed) => {
            let v = value.trim().to_lowercase();
            if !allowed.contains(&v.as_str()) {
                return Err(TodoError::InvalidConfigValue {
                    key: key.to_owned(),
                    msg: format!("must be one of: {}", allowed.join(", ")),
                }
                .into());
            }
            toml_edit::value(v)
        }
    };

    Ok((norm, item))
}

fn key_type(key: &str) -> Option<KeyType> {
    Some(match key {
        "storage.data_dir"
        | "storage.slot"
        | "notify.command"
        | "voice.command"
        | "export.csv_file"
        | "export.pdf_file" => KeyType::String,

        "ui.confirm_delete" | "ui.icons" | "ui.tilde_home" | "notify.enabled" => KeyType::Bool,

        "ui.default_filter" => KeyType::Enum(&["all", "active", "completed"]),

        _ => return None,
    })
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("expected true|false, got '{other}'")),
    }
}

fn apply_set(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    value: toml_edit::Item,
) -> anyhow::Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return Err(TodoError::InvalidConfigKey(key.to_owned()).into());
    }

    let mut cur = doc.as_table_mut();
    for seg in &parts[..parts.len().saturating_sub(1)] {
        if !cur.contains_key(seg) {
            let mut t = toml_edit::Table::new();
            t.set_implicit(true);
            cur.insert(seg, toml_edit::Item::Table(t));
        }
        cur = cur[seg].as_table_mut().ok_or_else(|| {
            TodoError::Config(format!("cannot set {key}: '{seg}' is not a table"))
        })?;
    }

    let leaf = parts[parts.len() - 1];
    cur.insert(leaf, value);
    Ok(())
}

fn lookup_value(cfg: &Config, key: &str) -> Option<serde_json::Value> {
    let mut v = serde_json::to_value(cfg).ok()?;
    for seg in key.split('.').filter(|s| !s.is_empty()) {
        match v {
            serde_json::Value::Object(mut map) => {
                v = map.remove(seg)?;
            }
            _ => return None,
        }
    }
    Some(v)
}

fn format_value_for_stdout(v: serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "null".to_owned(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}
