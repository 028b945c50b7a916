pub mod locale;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use kinfolk_core::domain::register_relationship;
use kinfolk_core::rules::{SortColumn, SortDirection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use locale::Translations;

const APP_DIR: &str = "kinfolk";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_CONTACTS_FOLDER: &str = "CollaboratorTracker";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_RELATIONSHIP_TYPES: [&str; 4] = ["family", "collaborator", "colleague", "pet"];
pub const DEFAULT_HOLIDAY_DATES: [&str; 3] = ["01-01", "07-04", "12-25"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    #[default]
    Notes,
    Interactions,
    Markdown,
}

impl DetailTab {
    pub const ALL: [DetailTab; 3] = [DetailTab::Notes, DetailTab::Interactions, DetailTab::Markdown];

    pub fn next(self) -> Self {
        match self {
            DetailTab::Notes => DetailTab::Interactions,
            DetailTab::Interactions => DetailTab::Markdown,
            DetailTab::Markdown => DetailTab::Notes,
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.key().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn key(self) -> &'static str {
        match self {
            DetailTab::Notes => "notes",
            DetailTab::Interactions => "interactions",
            DetailTab::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory the contacts folder is resolved against. `None` means the working directory.
    pub root: Option<PathBuf>,
    pub contacts_folder: String,
    pub default_sort_column: SortColumn,
    pub default_sort_direction: SortDirection,
    pub relationship_types: Vec<String>,
    /// `MM-DD` dates. Validated and kept, nothing reads them yet.
    pub holiday_dates: Vec<String>,
    pub default_active_tab: DetailTab,
    pub language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: None,
            contacts_folder: DEFAULT_CONTACTS_FOLDER.to_string(),
            default_sort_column: SortColumn::DaysUntilBirthday,
            default_sort_direction: SortDirection::Ascending,
            relationship_types: DEFAULT_RELATIONSHIP_TYPES
                .iter()
                .map(|value| value.to_string())
                .collect(),
            holiday_dates: DEFAULT_HOLIDAY_DATES
                .iter()
                .map(|value| value.to_string())
                .collect(),
            default_active_tab: DetailTab::Notes,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl AppConfig {
    /// Returns the normalized type when it was not known yet.
    pub fn register_relationship(&mut self, raw: &str) -> Option<String> {
        register_relationship(&mut self.relationship_types, raw)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("contacts_folder cannot be empty")]
    EmptyContactsFolder,
    #[error("invalid holiday date (expected MM-DD): {0}")]
    InvalidHolidayDate(String),
    #[error("invalid language code: {0}")]
    InvalidLanguage(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contacts_folder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_sort_column: Option<SortColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_sort_direction: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationship_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    holiday_dates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_active_tab: Option<DetailTab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

impl From<&AppConfig> for ConfigFile {
    fn from(config: &AppConfig) -> Self {
        Self {
            root: config.root.clone(),
            contacts_folder: Some(config.contacts_folder.clone()),
            default_sort_column: Some(config.default_sort_column),
            default_sort_direction: Some(config.default_sort_direction),
            relationship_types: Some(config.relationship_types.clone()),
            holiday_dates: Some(config.holiday_dates.clone()),
            default_active_tab: Some(config.default_active_tab),
            language: Some(config.language.clone()),
        }
    }
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path.clone()) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => Ok(config_dir()?.join(CONFIG_FILENAME)),
    }
}

/// `$XDG_CONFIG_HOME/kinfolk`, falling back to `~/.config/kinfolk`.
pub fn config_dir() -> Result<PathBuf> {
    let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(dir);
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        path
    } else {
        let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
        home.join(".config")
    };
    Ok(base.join(APP_DIR))
}

pub fn save(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(&ConfigFile::from(config))?;
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(root) = parsed.root {
        if root.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(root));
        }
        config.root = Some(root);
    }

    if let Some(folder) = parsed.contacts_folder {
        let trimmed = folder.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyContactsFolder);
        }
        config.contacts_folder = trimmed.to_string();
    }

    if let Some(column) = parsed.default_sort_column {
        config.default_sort_column = column;
    }
    if let Some(direction) = parsed.default_sort_direction {
        config.default_sort_direction = direction;
    }

    if let Some(types) = parsed.relationship_types {
        config.relationship_types.clear();
        for raw in types {
            config.register_relationship(&raw);
        }
    }

    if let Some(dates) = parsed.holiday_dates {
        config.holiday_dates = dates
            .into_iter()
            .map(|raw| validate_holiday_date(&raw))
            .collect::<Result<Vec<_>>>()?;
    }

    if let Some(tab) = parsed.default_active_tab {
        config.default_active_tab = tab;
    }

    if let Some(language) = parsed.language {
        config.language = locale::validate_language(&language)?;
    }

    Ok(config)
}

fn validate_holiday_date(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    // 2000 is a leap year so 02-29 is accepted.
    let valid = trimmed.len() == 5
        && NaiveDate::parse_from_str(&format!("2000-{trimmed}"), "%Y-%m-%d").is_ok();
    if !valid {
        return Err(ConfigError::InvalidHolidayDate(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
