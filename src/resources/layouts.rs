//! Layout resolution: set lookup, page assembly, legacy merging and
//! display settings.

use crate::models::{
    FormtreeError, LayoutModel, LayoutSet, LayoutSets, LayoutSettings, PageComponent, Result,
};
use crate::resources::{paths, reader, ResourceStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subfolder holding the page files of a layout set.
const LAYOUTS_SUBFOLDER: &str = "layouts";

impl ResourceStore {
    /// Raw contents of the layout-set index.
    ///
    /// `Ok(None)` for applications that predate layout sets.
    pub fn get_layout_sets(&self) -> Result<Option<String>> {
        reader::read_text(&self.config.ui_dir().join(&self.config.files.layout_sets))
    }

    /// Parsed layout-set index.
    pub fn get_layout_set_index(&self) -> Result<Option<LayoutSets>> {
        let Some(raw) = self.get_layout_sets()? else {
            return Ok(None);
        };

        let sets = serde_json::from_str(&raw)
            .map_err(|e| FormtreeError::parse("layout-set index", e))?;
        Ok(Some(sets))
    }

    /// First layout set in document order bound to the given process
    /// task. `Ok(None)` when no set matches or the index is absent.
    pub fn get_set_for_task(&self, task_id: &str) -> Result<Option<LayoutSet>> {
        let Some(index) = self.get_layout_set_index()? else {
            return Ok(None);
        };
        Ok(index.set_for_task(task_id).cloned())
    }

    /// Assemble the layout model for a set, or for the set-less layout
    /// when `layout_set_id` is `None`.
    ///
    /// Pages are read in the order declared by the set's settings. Every
    /// declared page must exist and parse to a non-null document; the
    /// page name is bound into each component during parsing.
    pub fn get_layout_model(&self, layout_set_id: Option<&str>) -> Result<LayoutModel> {
        let layouts_dir = self.layouts_dir(layout_set_id)?;

        let order = self
            .get_layout_settings_for_set(layout_set_id)?
            .and_then(|settings| settings.pages)
            .and_then(|pages| pages.order)
            .ok_or_else(|| FormtreeError::MissingOrder {
                layout_set: layout_set_id.unwrap_or("default").to_string(),
            })?;

        let mut model = LayoutModel::new();
        for page in &order {
            let path = layouts_dir.join(format!("{page}.json"));
            paths::ensure_legal(&layouts_dir, &path)?;

            let bytes = reader::read_bytes(&path)?.ok_or_else(|| FormtreeError::MissingPage {
                page: page.clone(),
            })?;

            let value: serde_json::Value = serde_json::from_slice(reader::strip_bom(&bytes))
                .map_err(|e| FormtreeError::InvalidDocument {
                    page: page.clone(),
                    source: e,
                })?;
            if value.is_null() {
                return Err(FormtreeError::EmptyDocument { page: page.clone() });
            }

            let component = PageComponent::from_value(page, value).map_err(|e| {
                FormtreeError::InvalidDocument {
                    page: page.clone(),
                    source: e,
                }
            })?;
            model.insert(component);
        }

        debug!(
            layout_set = layout_set_id.unwrap_or("default"),
            pages = model.len(),
            "assembled layout model"
        );
        Ok(model)
    }

    /// All set-less layout pages as one serialized JSON object.
    ///
    /// A monolithic legacy file takes precedence and becomes the single
    /// entry; otherwise the `layouts/` directory is merged, keyed by
    /// file stem in sorted order.
    pub fn get_layouts(&self) -> Result<String> {
        let ui_dir = self.config.ui_dir();

        let legacy_path = ui_dir.join(&self.config.files.form_layout);
        if let Some(raw) = reader::read_text(&legacy_path)? {
            let document: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
                FormtreeError::parse(format!("layout {}", legacy_path.display()), e)
            })?;

            let name = self.config.files.form_layout.trim_end_matches(".json");
            let mut merged = serde_json::Map::new();
            merged.insert(name.to_string(), document);
            return serialize_merged(merged);
        }

        self.merge_layout_dir(&ui_dir.join(LAYOUTS_SUBFOLDER))
    }

    /// All pages of a layout set as one serialized JSON object, keyed by
    /// file stem in sorted order.
    pub fn get_layouts_for_set(&self, layout_set_id: &str) -> Result<String> {
        let ui_dir = self.config.ui_dir();
        let layouts_dir = ui_dir.join(layout_set_id).join(LAYOUTS_SUBFOLDER);
        paths::ensure_legal(&ui_dir, &layouts_dir)?;

        self.merge_layout_dir(&layouts_dir)
    }

    /// Raw display settings for a set, or the set-less location when
    /// `layout_set_id` is `None`. `Ok(None)` when absent.
    pub fn get_layout_settings_string_for_set(
        &self,
        layout_set_id: Option<&str>,
    ) -> Result<Option<String>> {
        reader::read_text(&self.settings_path(layout_set_id)?)
    }

    /// Parsed display settings for a set, or the set-less location when
    /// `layout_set_id` is `None`. `Ok(None)` when absent.
    pub fn get_layout_settings_for_set(
        &self,
        layout_set_id: Option<&str>,
    ) -> Result<Option<LayoutSettings>> {
        let path = self.settings_path(layout_set_id)?;
        let Some(raw) = reader::read_text(&path)? else {
            return Ok(None);
        };

        let settings = serde_json::from_str(&raw)
            .map_err(|e| FormtreeError::parse(format!("layout settings {}", path.display()), e))?;
        Ok(Some(settings))
    }

    /// Raw display settings from the legacy set-less location,
    /// absent-tolerant.
    pub fn get_layout_settings_string(&self) -> Result<Option<String>> {
        self.get_layout_settings_string_for_set(None)
    }

    /// Parsed display settings from the legacy set-less location.
    ///
    /// Unlike the set-scoped lookups, a missing file here is a
    /// [`FormtreeError::NotFound`], not `None`.
    pub fn get_layout_settings(&self) -> Result<LayoutSettings> {
        let path = self.settings_path(None)?;
        let Some(raw) = reader::read_text(&path)? else {
            return Err(FormtreeError::NotFound(path));
        };

        serde_json::from_str(&raw)
            .map_err(|e| FormtreeError::parse(format!("layout settings {}", path.display()), e))
    }

    /// The business-rule configuration for a layout set. `Ok(None)` when
    /// the set has none.
    pub fn get_rule_configuration_for_set(&self, layout_set_id: &str) -> Result<Option<Vec<u8>>> {
        self.rule_file_for_set(layout_set_id, &self.config.files.rule_configuration)
    }

    /// The business-rule handler script for a layout set. `Ok(None)`
    /// when the set has none.
    pub fn get_rule_handler_for_set(&self, layout_set_id: &str) -> Result<Option<Vec<u8>>> {
        self.rule_file_for_set(layout_set_id, &self.config.files.rule_handler)
    }

    fn rule_file_for_set(&self, layout_set_id: &str, file_name: &str) -> Result<Option<Vec<u8>>> {
        let ui_dir = self.config.ui_dir();
        let path = ui_dir.join(layout_set_id).join(file_name);
        paths::ensure_legal(&ui_dir, &path)?;

        reader::read_bytes(&path)
    }

    /// Page directory for a set, with the set id validated against the
    /// UI directory.
    fn layouts_dir(&self, layout_set_id: Option<&str>) -> Result<PathBuf> {
        let ui_dir = self.config.ui_dir();
        match layout_set_id {
            Some(set_id) => {
                let dir = ui_dir.join(set_id).join(LAYOUTS_SUBFOLDER);
                paths::ensure_legal(&ui_dir, &dir)?;
                Ok(dir)
            }
            None => Ok(ui_dir.join(LAYOUTS_SUBFOLDER)),
        }
    }

    /// Settings file location for a set, validated when set-scoped.
    fn settings_path(&self, layout_set_id: Option<&str>) -> Result<PathBuf> {
        let ui_dir = self.config.ui_dir();
        match layout_set_id {
            Some(set_id) => {
                let path = ui_dir.join(set_id).join(&self.config.files.layout_settings);
                paths::ensure_legal(&ui_dir, &path)?;
                Ok(path)
            }
            None => Ok(ui_dir.join(&self.config.files.layout_settings)),
        }
    }

    /// Merge every `*.json` in a directory into one object keyed by file
    /// stem. File names are sorted so the output is deterministic.
    fn merge_layout_dir(&self, layouts_dir: &Path) -> Result<String> {
        let mut merged = serde_json::Map::new();

        if layouts_dir.is_dir() {
            let pattern = layouts_dir.join("*.json");
            let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
                .map_err(|e| FormtreeError::Internal(format!("Invalid glob pattern: {e}")))?
                .filter_map(|entry| entry.ok())
                .collect();
            files.sort();

            for file in files {
                let Some(raw) = reader::read_text(&file)? else {
                    continue;
                };
                let document: serde_json::Value = serde_json::from_str(&raw)
                    .map_err(|e| FormtreeError::parse(format!("layout {}", file.display()), e))?;

                let name = file
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or_default()
                    .to_string();
                merged.insert(name, document);
            }
        }

        serialize_merged(merged)
    }
}

fn serialize_merged(merged: serde_json::Map<String, serde_json::Value>) -> Result<String> {
    serde_json::to_string(&serde_json::Value::Object(merged))
        .map_err(|e| FormtreeError::parse("merged layouts", e))
}
