//! Localized text bundles and option lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A localized text bundle (`resource.<language>.json`).
///
/// `id`, `org` and `language` are stamped by the store after parsing;
/// the file itself only carries `language` and `resources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextResource {
    /// Bundle identity on the form "{org}-{app}-{language}"
    #[serde(default)]
    pub id: String,

    /// Owning organization
    #[serde(default)]
    pub org: String,

    /// Language code of the bundle
    #[serde(default)]
    pub language: String,

    /// The translated entries
    #[serde(default)]
    pub resources: Vec<TextElement>,
}

/// One translated entry of a text bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    /// Key referenced from layouts and metadata
    pub id: String,

    /// Translated text
    pub value: String,

    /// Substitution variables, uninterpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

/// A key/label pair for selection components (`options/<id>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppOption {
    /// Stored value of the option
    pub value: String,

    /// Display label, either a literal or a text key
    pub label: String,

    /// Longer description of the option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Help text shown next to the option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}
