//! Configuration models for formtree.
//!
//! All lookup roots and well-known file names are explicit values held by
//! the caller. Nothing here is process-wide; two stores with different
//! configurations can live side by side in one process.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a single application's resource tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root of the application's resource tree (the directory holding
    /// `ui/`, `config/`, `models/` and `options/`).
    pub app_base_path: PathBuf,

    /// Web root for hosted runtime assets (application script and
    /// stylesheet). Absent when the host serves no static content.
    #[serde(default)]
    pub web_root_path: Option<PathBuf>,

    /// Directory names under the application root.
    #[serde(default)]
    pub folders: FolderConfig,

    /// Well-known file names.
    #[serde(default)]
    pub files: FileNameConfig,

    /// Remote platform services (instance events).
    #[serde(default)]
    pub platform: PlatformConfig,
}

/// Directory names under the application root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Form layouts, settings and other UI assets
    #[serde(default = "default_ui_folder")]
    pub ui: String,

    /// Application configuration (texts, generic resources)
    #[serde(default = "default_config_folder")]
    pub config: String,

    /// Localized text bundles, under the config folder
    #[serde(default = "default_texts_folder")]
    pub texts: String,

    /// Generic resources, under the config folder
    #[serde(default = "default_resources_folder")]
    pub resources: String,

    /// Data model schemas, metadata and prefill documents
    #[serde(default = "default_models_folder")]
    pub models: String,

    /// Option lists for selection components
    #[serde(default = "default_options_folder")]
    pub options: String,
}

fn default_ui_folder() -> String {
    "ui".to_string()
}

fn default_config_folder() -> String {
    "config".to_string()
}

fn default_texts_folder() -> String {
    "texts".to_string()
}

fn default_resources_folder() -> String {
    "resources".to_string()
}

fn default_models_folder() -> String {
    "models".to_string()
}

fn default_options_folder() -> String {
    "options".to_string()
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            ui: default_ui_folder(),
            config: default_config_folder(),
            texts: default_texts_folder(),
            resources: default_resources_folder(),
            models: default_models_folder(),
            options: default_options_folder(),
        }
    }
}

/// Well-known file names resolved by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNameConfig {
    /// Business-rule handler script, under the UI folder
    #[serde(default = "default_rule_handler_file")]
    pub rule_handler: String,

    /// Monolithic legacy layout file, under the UI folder
    #[serde(default = "default_form_layout_file")]
    pub form_layout: String,

    /// Business-rule configuration, under the UI folder
    #[serde(default = "default_rule_configuration_file")]
    pub rule_configuration: String,

    /// Page-order settings file, per layout set
    #[serde(default = "default_layout_settings_file")]
    pub layout_settings: String,

    /// Layout-set index, under the UI folder
    #[serde(default = "default_layout_sets_file")]
    pub layout_sets: String,

    /// Footer definition, under the UI folder
    #[serde(default = "default_footer_file")]
    pub footer: String,

    /// Application script served from the web root
    #[serde(default = "default_runtime_app_file")]
    pub runtime_app: String,

    /// Application stylesheet served from the web root
    #[serde(default = "default_runtime_css_file")]
    pub runtime_css: String,

    /// Name that resolves to the embedded styles manifest
    #[serde(default = "default_styles_config_file")]
    pub styles_config: String,

    /// Suffix appended to a model id for its JSON schema
    #[serde(default = "default_schema_suffix")]
    pub schema_suffix: String,

    /// Suffix appended to a data type id for its model metadata
    #[serde(default = "default_model_metadata_suffix")]
    pub model_metadata_suffix: String,

    /// Suffix appended to a model name for its prefill document
    #[serde(default = "default_prefill_suffix")]
    pub prefill_suffix: String,
}

fn default_rule_handler_file() -> String {
    "RuleHandler.js".to_string()
}

fn default_form_layout_file() -> String {
    "FormLayout.json".to_string()
}

fn default_rule_configuration_file() -> String {
    "RuleConfiguration.json".to_string()
}

fn default_layout_settings_file() -> String {
    "Settings.json".to_string()
}

fn default_layout_sets_file() -> String {
    "layout-sets.json".to_string()
}

fn default_footer_file() -> String {
    "footer.json".to_string()
}

fn default_runtime_app_file() -> String {
    "app.js".to_string()
}

fn default_runtime_css_file() -> String {
    "app.css".to_string()
}

fn default_styles_config_file() -> String {
    "Styles.json".to_string()
}

fn default_schema_suffix() -> String {
    "schema.json".to_string()
}

fn default_model_metadata_suffix() -> String {
    "metadata.json".to_string()
}

fn default_prefill_suffix() -> String {
    "prefill.json".to_string()
}

impl Default for FileNameConfig {
    fn default() -> Self {
        Self {
            rule_handler: default_rule_handler_file(),
            form_layout: default_form_layout_file(),
            rule_configuration: default_rule_configuration_file(),
            layout_settings: default_layout_settings_file(),
            layout_sets: default_layout_sets_file(),
            footer: default_footer_file(),
            runtime_app: default_runtime_app_file(),
            runtime_css: default_runtime_css_file(),
            styles_config: default_styles_config_file(),
            schema_suffix: default_schema_suffix(),
            model_metadata_suffix: default_model_metadata_suffix(),
            prefill_suffix: default_prefill_suffix(),
        }
    }
}

/// Remote platform configuration for the instance-event client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the storage API (e.g. "https://platform.example.com/storage/api/v1")
    #[serde(default)]
    pub storage_endpoint: String,

    /// Subscription key attached to every request.
    /// Supports ${ENV_VAR} expansion.
    #[serde(default)]
    pub subscription_key: Option<String>,

    /// Environment variable consulted when no key is configured
    #[serde(default = "default_subscription_key_env")]
    pub subscription_key_env: String,

    /// Header carrying the subscription key
    #[serde(default = "default_subscription_key_header")]
    pub subscription_key_header: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_subscription_key_env() -> String {
    "PLATFORM_SUBSCRIPTION_KEY".to_string()
}

fn default_subscription_key_header() -> String {
    "Platform-Subscription-Key".to_string()
}

fn default_timeout() -> u64 {
    100
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            storage_endpoint: String::new(),
            subscription_key: None,
            subscription_key_env: default_subscription_key_env(),
            subscription_key_header: default_subscription_key_header(),
            timeout_secs: default_timeout(),
        }
    }
}

impl PlatformConfig {
    /// Resolve the subscription key from config or environment.
    ///
    /// Returns `None` when neither is set; deployments without an API
    /// gateway run keyless.
    pub fn resolve_subscription_key(&self) -> Option<String> {
        if let Some(key) = &self.subscription_key {
            return Some(expand_env_vars(key));
        }
        std::env::var(&self.subscription_key_env).ok()
    }
}

/// Stylesheet manifest served next to the runtime assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylesConfig {
    /// Stylesheets served from the web root, relative paths
    pub internal_styles: Vec<String>,

    /// Absolute URLs to externally hosted stylesheets
    pub external_styles: Vec<String>,
}

impl AppConfig {
    /// Create a configuration with default folder and file names.
    pub fn new(app_base_path: impl Into<PathBuf>) -> Self {
        Self {
            app_base_path: app_base_path.into(),
            web_root_path: None,
            folders: FolderConfig::default(),
            files: FileNameConfig::default(),
            platform: PlatformConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// The UI asset directory.
    pub fn ui_dir(&self) -> PathBuf {
        self.app_base_path.join(&self.folders.ui)
    }

    /// The localized text bundle directory.
    pub fn texts_dir(&self) -> PathBuf {
        self.app_base_path
            .join(&self.folders.config)
            .join(&self.folders.texts)
    }

    /// The generic resource directory.
    pub fn resources_dir(&self) -> PathBuf {
        self.app_base_path
            .join(&self.folders.config)
            .join(&self.folders.resources)
    }

    /// The data model document directory.
    pub fn models_dir(&self) -> PathBuf {
        self.app_base_path.join(&self.folders.models)
    }

    /// The option list directory.
    pub fn options_dir(&self) -> PathBuf {
        self.app_base_path.join(&self.folders.options)
    }

    /// The styles manifest advertising the runtime stylesheet.
    pub fn styles_config(&self) -> StylesConfig {
        StylesConfig {
            internal_styles: vec![format!("runtime/css/react/{}", self.files.runtime_css)],
            external_styles: Vec::new(),
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports ${VAR_NAME} syntax.
/// If the variable is not set, the placeholder is left unchanged.
pub fn expand_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

    for cap in re.captures_iter(s) {
        let var_name = &cap[1];
        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: AppConfig = toml::from_str(r#"app_base_path = "/srv/apps/demo/App""#).unwrap();

        assert_eq!(config.folders.ui, "ui");
        assert_eq!(config.files.layout_settings, "Settings.json");
        assert_eq!(config.files.layout_sets, "layout-sets.json");
        assert!(config.web_root_path.is_none());
        assert_eq!(config.platform.timeout_secs, 100);
    }

    #[test]
    fn test_dir_helpers_compose_configured_names() {
        let mut config = AppConfig::new("/srv/apps/demo/App");
        config.folders.texts = "lang".to_string();

        assert_eq!(config.ui_dir(), PathBuf::from("/srv/apps/demo/App/ui"));
        assert_eq!(
            config.texts_dir(),
            PathBuf::from("/srv/apps/demo/App/config/lang")
        );
        assert_eq!(
            config.resources_dir(),
            PathBuf::from("/srv/apps/demo/App/config/resources")
        );
    }

    #[test]
    fn test_from_file_missing_is_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/formtree.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_styles_config_points_at_runtime_css() {
        let config = AppConfig::new("/srv/apps/demo/App");
        let styles = config.styles_config();

        assert_eq!(styles.internal_styles, vec!["runtime/css/react/app.css"]);
        assert!(styles.external_styles.is_empty());
    }

    #[test]
    fn test_expand_env_vars_leaves_unknown_placeholders() {
        let expanded = expand_env_vars("key-${FORMTREE_TEST_UNSET_VAR}");
        assert_eq!(expanded, "key-${FORMTREE_TEST_UNSET_VAR}");
    }
}
