//! Application manifest models.

use serde::{Deserialize, Serialize};

/// The application manifest in the shape served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application identifier on the form "{org}/{app}"
    pub id: String,

    /// Owning organization
    pub org: String,

    /// Data types the application accepts
    #[serde(default)]
    pub data_types: Vec<DataType>,

    /// Behavior shown before an instance exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_entry: Option<OnEntryConfig>,

    /// Process definition reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,

    /// Authorization policy reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
}

/// A data type accepted by the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataType {
    /// Unique identifier within the application
    pub id: String,

    /// Process task this data type belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// Logic binding; present only for form data types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_logic: Option<AppLogic>,
}

/// Logic binding of a data type to its model class.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppLogic {
    /// Reference to the bound model class; empty means unbound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<String>,
}

/// Entry-behavior configuration shown before an instance exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnEntryConfig {
    /// What to show: "new-instance", "select-instance" or a layout set id
    pub show: String,
}

/// The manifest as the upstream provider serves it.
///
/// Superset of [`Application`]; provider-internal fields survive a
/// round-trip through `extra` but are dropped by the adaptation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationMetadata {
    /// Application identifier on the form "{org}/{app}"
    pub id: String,

    /// Owning organization
    pub org: String,

    /// Data types the application accepts
    #[serde(default)]
    pub data_types: Vec<DataType>,

    /// Behavior shown before an instance exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_entry: Option<OnEntryConfig>,

    /// Process definition reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_id: Option<String>,

    /// Authorization policy reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,

    /// Provider-internal fields, not part of the client shape
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl From<ApplicationMetadata> for Application {
    fn from(meta: ApplicationMetadata) -> Self {
        // The entry behavior is copied verbatim when present.
        let on_entry = meta
            .on_entry
            .map(|entry| OnEntryConfig { show: entry.show });

        Self {
            id: meta.id,
            org: meta.org,
            data_types: meta.data_types,
            on_entry,
            process_id: meta.process_id,
            policy_id: meta.policy_id,
        }
    }
}

impl Application {
    /// The data type carrying the application's form model.
    ///
    /// When several data types carry a logic binding, the last one in
    /// manifest order wins. Older manifests rely on that order.
    pub fn logic_data_type(&self) -> Option<&DataType> {
        self.data_types
            .iter()
            .filter(|data_type| {
                data_type
                    .app_logic
                    .as_ref()
                    .and_then(|logic| logic.class_ref.as_deref())
                    .is_some_and(|class_ref| !class_ref.is_empty())
            })
            .last()
    }

    /// The model class bound to a data type, or an empty string when the
    /// type is unknown or carries no binding.
    pub fn class_ref_for(&self, data_type_id: &str) -> String {
        self.data_types
            .iter()
            .find(|data_type| data_type.id == data_type_id)
            .and_then(|data_type| data_type.app_logic.as_ref())
            .and_then(|logic| logic.class_ref.clone())
            .unwrap_or_default()
    }
}
