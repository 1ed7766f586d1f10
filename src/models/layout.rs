//! Layout models: sets, settings, pages and the assembled layout model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Index of the application's layout sets (`layout-sets.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSets {
    /// Declared sets in document order
    #[serde(default)]
    pub sets: Option<Vec<LayoutSet>>,
}

/// A named group of layout pages, bound to process tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSet {
    /// Folder name under the UI directory
    pub id: String,

    /// Data type presented by this set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Process tasks this set serves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
}

impl LayoutSets {
    /// First set in document order bound to the given task.
    pub fn set_for_task(&self, task_id: &str) -> Option<&LayoutSet> {
        self.sets.as_deref().unwrap_or_default().iter().find(|set| {
            set.tasks
                .as_deref()
                .is_some_and(|tasks| tasks.iter().any(|task| task == task_id))
        })
    }
}

/// Per-set display settings (`Settings.json`).
///
/// Only the page order is interpreted; everything else rides along
/// opaquely and survives re-serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSettings {
    /// Page-level settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<PagesSettings>,

    /// Uninterpreted settings (component overrides, schema pointer)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `pages` section of the display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesSettings {
    /// Page names without extension, in display and assembly order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,

    /// Uninterpreted page settings (pdf exclusions, triggers)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The assembled form: every page of a layout set, in declared order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayoutModel {
    pages: Vec<PageComponent>,
}

impl LayoutModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page. Pages keep insertion order.
    pub fn insert(&mut self, page: PageComponent) {
        self.pages.push(page);
    }

    /// Look up a page by name.
    pub fn get(&self, page_name: &str) -> Option<&PageComponent> {
        self.pages.iter().find(|page| page.page_name == page_name)
    }

    /// Pages in assembly order.
    pub fn pages(&self) -> impl Iterator<Item = &PageComponent> {
        self.pages.iter()
    }

    /// Page names in assembly order.
    pub fn page_names(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.page_name.as_str())
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the model holds no pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// A single layout page with its components.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageComponent {
    /// Page name without extension
    pub page_name: String,

    /// Components in document order
    pub components: Vec<Component>,
}

/// One component of a layout page.
///
/// Component bodies are not interpreted here; only the identity fields
/// and the owning page are modeled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Component identifier, unique within the page
    pub id: String,

    /// Component kind as declared in the document
    #[serde(rename = "type")]
    pub component_type: String,

    /// Name of the page this component belongs to
    pub page_name: String,

    /// Everything else in the component body, uninterpreted
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wire shape of a layout page file.
#[derive(Debug, Deserialize)]
struct PageDocument {
    data: PageData,
}

#[derive(Debug, Deserialize)]
struct PageData {
    layout: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    id: String,
    #[serde(rename = "type")]
    component_type: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PageComponent {
    /// Convert a parsed page document, binding every component to
    /// `page_name`.
    ///
    /// The name is threaded through the conversion as a plain argument,
    /// so concurrent assemblies never observe each other's pages.
    pub fn from_value(page_name: &str, value: Value) -> Result<Self, serde_json::Error> {
        let document: PageDocument = serde_json::from_value(value)?;

        let components = document
            .data
            .layout
            .into_iter()
            .map(|raw| Component {
                id: raw.id,
                component_type: raw.component_type,
                page_name: page_name.to_string(),
                extra: raw.extra,
            })
            .collect();

        Ok(Self {
            page_name: page_name.to_string(),
            components,
        })
    }
}
