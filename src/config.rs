//! Settings for the chat client.
//!
//! Options live under the `ragChat` namespace of a JSON settings file, either
//! nested (`{"ragChat": {"webhookUrl": ...}}`) or flat
//! (`{"ragChat.webhookUrl": ...}`) the way editor settings files spell them.
//! Command-line flags override whatever the file says.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ClientError, ConfigError};
use crate::rag::ParamValue;

/// Namespace holding the chat options.
pub const NAMESPACE: &str = "ragChat";

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = ".rag-chat.json";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// The option bag read from the `ragChat` namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Target endpoint. Required before any call.
    pub webhook_url: String,
    /// Optional scoping key; empty means the server default.
    pub collection: String,
    /// Request timeout in milliseconds.
    pub timeout: u64,
    /// Validate TLS certificates for `https` endpoints.
    #[serde(rename = "validateSSL")]
    pub validate_ssl: bool,
    /// Attach active-file/selection context to requests.
    pub include_context: bool,
    /// Extra key/value pairs merged into the request body.
    pub additional_params: BTreeMap<String, ParamValue>,
    /// Refuse to send when no collection is configured.
    pub require_collection: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            collection: String::new(),
            timeout: DEFAULT_TIMEOUT_MS,
            validate_ssl: true,
            include_context: true,
            additional_params: BTreeMap::new(),
            require_collection: false,
        }
    }
}

impl Settings {
    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// The configured webhook URL.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] when the URL is blank.
    pub fn webhook_url(&self) -> Result<&str, ClientError> {
        let url = self.webhook_url.trim();
        if url.is_empty() {
            Err(ClientError::missing_webhook_url())
        } else {
            Ok(url)
        }
    }

    /// Extracts the `namespace` options from a parsed settings document.
    ///
    /// Nested keys are read first, then flat `namespace.key` entries override
    /// them. Unknown keys are ignored; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the deserializer error when an option has the wrong type.
    pub fn from_document(document: &Value, namespace: &str) -> Result<Self, serde_json::Error> {
        let mut options = Map::new();

        if let Some(Value::Object(nested)) = document.get(namespace) {
            options.extend(nested.clone());
        }

        if let Value::Object(root) = document {
            let prefix = format!("{namespace}.");
            for (key, value) in root {
                if let Some(name) = key.strip_prefix(&prefix) {
                    options.insert(name.to_string(), value.clone());
                }
            }
        }

        serde_json::from_value(Value::Object(options))
    }

    /// Loads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds invalid options.
    pub fn load(path: &Path, namespace: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        };
        let document: Value = serde_json::from_str(&content).map_err(invalid)?;
        let settings = Self::from_document(&document, namespace).map_err(invalid)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Like [`Settings::load`], but a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load_or_default(path: &Path, namespace: &str) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path, namespace)
        } else {
            Ok(Self::default())
        }
    }
}

/// Command-line overrides layered on top of the settings file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Overrides `webhookUrl`.
    pub webhook_url: Option<String>,
    /// Overrides `collection`.
    pub collection: Option<String>,
    /// Overrides `timeout` (milliseconds).
    pub timeout: Option<u64>,
    /// Forces `validateSSL` off.
    pub insecure: bool,
    /// Forces `includeContext` off.
    pub no_context: bool,
}

impl SettingsOverrides {
    /// Applies the overrides to `settings`.
    #[must_use]
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(url) = &self.webhook_url {
            settings.webhook_url.clone_from(url);
        }
        if let Some(collection) = &self.collection {
            settings.collection.clone_from(collection);
        }
        if let Some(timeout) = self.timeout {
            settings.timeout = timeout;
        }
        if self.insecure {
            settings.validate_ssl = false;
        }
        if self.no_context {
            settings.include_context = false;
        }
        settings
    }
}

/// Writes a default settings file into the current directory.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
pub fn init() -> Result<PathBuf, ConfigError> {
    init_in(Path::new("."))
}

/// Writes a default settings file into `dir`.
///
/// The file is written to a temporary sibling and renamed into place.
///
/// # Errors
///
/// Returns an error if the file already exists or cannot be written.
pub fn init_in(dir: &Path) -> Result<PathBuf, ConfigError> {
    let config_file = dir.join(SETTINGS_FILE);
    if config_file.exists() {
        return Err(ConfigError::AlreadyInitialized(config_file));
    }

    let invalid = |source| ConfigError::Invalid {
        path: config_file.clone(),
        source,
    };
    let mut document = Map::new();
    document.insert(
        NAMESPACE.to_string(),
        serde_json::to_value(Settings::default()).map_err(invalid)?,
    );
    let json_str = serde_json::to_string_pretty(&Value::Object(document)).map_err(invalid)?;

    let temp_file = config_file.with_extension("tmp");
    fs::write(&temp_file, json_str).map_err(|source| ConfigError::Io {
        path: temp_file.clone(),
        source,
    })?;
    fs::rename(&temp_file, &config_file).map_err(|source| ConfigError::Io {
        path: config_file.clone(),
        source,
    })?;

    Ok(config_file)
}
