//! The resource store: type dispatch, texts, model documents and
//! static assets.

use crate::models::{AppConfig, AppOption, Application, FormtreeError, Result, TextResource};
use crate::resources::{paths, reader};
use std::path::Path;
use tracing::debug;

/// Read-side access to one application's resource tree.
///
/// The store is stateless: every call re-reads the filesystem, nothing
/// is cached and no locks are taken. One instance can serve any number
/// of concurrent callers.
#[derive(Debug, Clone)]
pub struct ResourceStore {
    pub(crate) config: AppConfig,
}

impl ResourceStore {
    /// Create a store over the tree described by `config`.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// The configuration this store reads from.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Raw bytes of a named application resource.
    ///
    /// Well-known names (rule handler, legacy form layout, rule
    /// configuration) resolve under the UI directory; every other name
    /// resolves under the generic resource directory. Illegal and
    /// missing names both answer `Ok(None)`.
    pub fn get_app_resource(&self, resource: &str) -> Result<Option<Vec<u8>>> {
        let files = &self.config.files;
        let dir = if resource == files.rule_handler
            || resource == files.form_layout
            || resource == files.rule_configuration
        {
            self.config.ui_dir()
        } else {
            self.config.resources_dir()
        };

        self.read_checked(&dir, resource)
    }

    /// Raw bytes of a named text asset for a language.
    ///
    /// The conventional bundle name is `resource.<language>.json`;
    /// callers pass the file name they want.
    pub fn get_text(&self, language: &str, resource: &str) -> Result<Option<Vec<u8>>> {
        debug!(language, resource, "text asset requested");
        self.read_checked(&self.config.texts_dir(), resource)
    }

    /// The localized text bundle for a language, stamped with its
    /// identity.
    ///
    /// `Ok(None)` when the application has no bundle for `language`.
    pub fn get_texts(&self, org: &str, app: &str, language: &str) -> Result<Option<TextResource>> {
        let dir = self.config.texts_dir();
        let path = dir.join(format!("resource.{language}.json"));

        // Language codes name a file in the flat texts directory. A
        // separator would re-anchor the lookup, and a `..` right after the
        // `resource.` stem folds back inside the base, past the guard.
        if language.contains(['/', '\\']) {
            return Err(FormtreeError::traversal(&dir, &path));
        }
        paths::ensure_legal(&dir, &path)?;

        let Some(bytes) = reader::read_bytes(&path)? else {
            return Ok(None);
        };

        let mut bundle: TextResource = serde_json::from_slice(reader::strip_bom(&bytes))
            .map_err(|e| FormtreeError::parse(format!("text bundle {}", path.display()), e))?;
        bundle.id = format!("{org}-{app}-{language}");
        bundle.org = org.to_string();
        bundle.language = language.to_string();

        Ok(Some(bundle))
    }

    /// JSON schema for a model, by model id.
    ///
    /// A missing schema is an error; deployed applications always ship
    /// schemas for their models.
    pub fn get_model_json_schema(&self, model_id: &str) -> Result<String> {
        let dir = self.config.models_dir();
        let path = dir.join(format!("{model_id}.{}", self.config.files.schema_suffix));
        paths::ensure_legal(&dir, &path)?;

        reader::read_text(&path)?.ok_or(FormtreeError::NotFound(path))
    }

    /// Model metadata for the application's logic-bound data type.
    ///
    /// The data type is resolved via [`Application::logic_data_type`];
    /// when several types carry a binding the last one wins.
    pub fn get_model_metadata_json(&self, application: &Application) -> Result<String> {
        let data_type_id = application
            .logic_data_type()
            .map(|data_type| data_type.id.as_str())
            .unwrap_or_default();

        let dir = self.config.models_dir();
        let path = dir.join(format!(
            "{data_type_id}.{}",
            self.config.files.model_metadata_suffix
        ));
        paths::ensure_legal(&dir, &path)?;

        reader::read_text(&path)?.ok_or(FormtreeError::NotFound(path))
    }

    /// Prefill configuration for a model, by model name.
    pub fn get_prefill_json(&self, model_name: &str) -> Result<Option<String>> {
        let dir = self.config.models_dir();
        let path = dir.join(format!("{model_name}.{}", self.config.files.prefill_suffix));
        paths::ensure_legal(&dir, &path)?;

        reader::read_text(&path)
    }

    /// A runtime asset served from the web root.
    ///
    /// The styles manifest is generated from configuration; the
    /// application script is read from `runtime/js/react/` and any other
    /// name resolves to the stylesheet under `runtime/css/react/`.
    /// Without a configured web root only the manifest is served.
    pub fn get_runtime_resource(&self, resource: &str) -> Result<Option<Vec<u8>>> {
        if resource == self.config.files.styles_config {
            let body = serde_json::to_vec(&self.config.styles_config())
                .map_err(|e| FormtreeError::parse("styles manifest", e))?;
            return Ok(Some(body));
        }

        let Some(web_root) = &self.config.web_root_path else {
            debug!(resource, "no web root configured");
            return Ok(None);
        };

        let path = if resource == self.config.files.runtime_app {
            web_root
                .join("runtime")
                .join("js")
                .join("react")
                .join(&self.config.files.runtime_app)
        } else {
            web_root
                .join("runtime")
                .join("css")
                .join("react")
                .join(&self.config.files.runtime_css)
        };

        reader::read_bytes(&path)
    }

    /// The footer definition, when the application has one.
    pub fn get_footer(&self) -> Result<Option<String>> {
        reader::read_text(&self.config.ui_dir().join(&self.config.files.footer))
    }

    /// A parsed option list, by options id.
    pub fn get_options(&self, options_id: &str) -> Result<Option<Vec<AppOption>>> {
        let dir = self.config.options_dir();
        let path = dir.join(format!("{options_id}.json"));
        paths::ensure_legal(&dir, &path)?;

        let Some(bytes) = reader::read_bytes(&path)? else {
            return Ok(None);
        };

        let options = serde_json::from_slice(reader::strip_bom(&bytes))
            .map_err(|e| FormtreeError::parse(format!("option list {}", path.display()), e))?;
        Ok(Some(options))
    }

    fn read_checked(&self, dir: &Path, name: &str) -> Result<Option<Vec<u8>>> {
        let path = dir.join(name);
        if !paths::is_legal(dir, &path) {
            debug!(name, "rejected illegal resource name");
            return Ok(None);
        }
        reader::read_bytes(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppLogic, DataType, StylesConfig};
    use std::fs;
    use tempfile::TempDir;

    fn store_with_tree() -> (TempDir, ResourceStore) {
        let temp_dir = TempDir::new().unwrap();
        let app_base = temp_dir.path().join("App");
        fs::create_dir_all(app_base.join("ui")).unwrap();
        fs::create_dir_all(app_base.join("config").join("texts")).unwrap();
        fs::create_dir_all(app_base.join("config").join("resources")).unwrap();
        fs::create_dir_all(app_base.join("models")).unwrap();
        fs::create_dir_all(app_base.join("options")).unwrap();

        let store = ResourceStore::new(AppConfig::new(app_base));
        (temp_dir, store)
    }

    fn demo_application(data_types: Vec<DataType>) -> Application {
        Application {
            id: "ttd/demo".to_string(),
            org: "ttd".to_string(),
            data_types,
            on_entry: None,
            process_id: None,
            policy_id: None,
        }
    }

    #[test]
    fn test_well_known_names_resolve_under_ui() {
        let (_guard, store) = store_with_tree();
        let base = &store.config.app_base_path;
        fs::write(base.join("ui").join("RuleHandler.js"), b"handler").unwrap();
        fs::write(
            base.join("config").join("resources").join("logo.svg"),
            b"<svg/>",
        )
        .unwrap();

        assert_eq!(
            store.get_app_resource("RuleHandler.js").unwrap().unwrap(),
            b"handler"
        );
        assert_eq!(
            store.get_app_resource("logo.svg").unwrap().unwrap(),
            b"<svg/>"
        );
        assert!(store.get_app_resource("FormLayout.json").unwrap().is_none());
    }

    #[test]
    fn test_illegal_resource_name_answers_absent() {
        let (_guard, store) = store_with_tree();
        let base = &store.config.app_base_path;
        fs::write(base.join("secret.json"), b"x").unwrap();

        let result = store.get_app_resource("../secret.json").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_get_text_reads_named_asset() {
        let (_guard, store) = store_with_tree();
        let texts = store.config.texts_dir();
        fs::write(texts.join("resource.en.json"), b"{\"language\":\"en\"}").unwrap();

        let bytes = store.get_text("en", "resource.en.json").unwrap().unwrap();
        assert_eq!(bytes, b"{\"language\":\"en\"}");
        assert!(store.get_text("en", "../secret").unwrap().is_none());
    }

    #[test]
    fn test_get_texts_stamps_identity() {
        let (_guard, store) = store_with_tree();
        let texts = store.config.texts_dir();
        fs::write(
            texts.join("resource.nb.json"),
            r#"{"language": "nb", "resources": [{"id": "form.title", "value": "Melding"}]}"#,
        )
        .unwrap();

        let bundle = store.get_texts("ttd", "demo", "nb").unwrap().unwrap();
        assert_eq!(bundle.id, "ttd-demo-nb");
        assert_eq!(bundle.org, "ttd");
        assert_eq!(bundle.language, "nb");
        assert_eq!(bundle.resources[0].value, "Melding");
    }

    #[test]
    fn test_get_texts_absent_language_is_none() {
        let (_guard, store) = store_with_tree();
        assert!(store.get_texts("ttd", "demo", "en").unwrap().is_none());
    }

    #[test]
    fn test_get_texts_rejects_traversal_in_language() {
        let (_guard, store) = store_with_tree();

        // A shallow escape folds back inside the texts directory after the
        // synthetic `resource.` segment; it must still be rejected.
        let err = store.get_texts("ttd", "demo", "../../en").unwrap_err();
        assert!(matches!(err, FormtreeError::Traversal { .. }));

        let err = store
            .get_texts("ttd", "demo", "../../../../../../etc/passwd")
            .unwrap_err();
        assert!(matches!(err, FormtreeError::Traversal { .. }));
    }

    #[test]
    fn test_model_schema_missing_is_not_found() {
        let (_guard, store) = store_with_tree();
        let models = store.config.models_dir();
        fs::write(models.join("model.schema.json"), "{\"type\":\"object\"}").unwrap();

        assert_eq!(
            store.get_model_json_schema("model").unwrap(),
            "{\"type\":\"object\"}"
        );
        assert!(matches!(
            store.get_model_json_schema("other").unwrap_err(),
            FormtreeError::NotFound(_)
        ));
    }

    #[test]
    fn test_model_metadata_uses_last_bound_data_type() {
        let (_guard, store) = store_with_tree();
        let models = store.config.models_dir();
        fs::write(models.join("second.metadata.json"), "{\"elements\":{}}").unwrap();

        let application = demo_application(vec![
            DataType {
                id: "first".to_string(),
                task_id: None,
                app_logic: Some(AppLogic {
                    class_ref: Some("Demo.First".to_string()),
                }),
            },
            DataType {
                id: "second".to_string(),
                task_id: None,
                app_logic: Some(AppLogic {
                    class_ref: Some("Demo.Second".to_string()),
                }),
            },
        ]);

        assert_eq!(
            store.get_model_metadata_json(&application).unwrap(),
            "{\"elements\":{}}"
        );
    }

    #[test]
    fn test_prefill_absent_is_none() {
        let (_guard, store) = store_with_tree();
        let models = store.config.models_dir();
        fs::write(models.join("ServiceModel.prefill.json"), "{\"ER\":{}}").unwrap();

        assert_eq!(
            store.get_prefill_json("ServiceModel").unwrap().unwrap(),
            "{\"ER\":{}}"
        );
        assert!(store.get_prefill_json("Other").unwrap().is_none());
    }

    #[test]
    fn test_runtime_resource_without_web_root() {
        let (_guard, store) = store_with_tree();
        assert!(store.get_runtime_resource("app.js").unwrap().is_none());

        // The styles manifest is generated, not read.
        let body = store.get_runtime_resource("Styles.json").unwrap().unwrap();
        let styles: StylesConfig = serde_json::from_slice(&body).unwrap();
        assert_eq!(styles.internal_styles, vec!["runtime/css/react/app.css"]);
    }

    #[test]
    fn test_runtime_resource_reads_script_and_stylesheet() {
        let (guard, mut store) = store_with_tree();
        let web_root = guard.path().join("wwwroot");
        fs::create_dir_all(web_root.join("runtime").join("js").join("react")).unwrap();
        fs::create_dir_all(web_root.join("runtime").join("css").join("react")).unwrap();
        fs::write(
            web_root.join("runtime").join("js").join("react").join("app.js"),
            b"js",
        )
        .unwrap();
        fs::write(
            web_root.join("runtime").join("css").join("react").join("app.css"),
            b"css",
        )
        .unwrap();
        store.config.web_root_path = Some(web_root);

        assert_eq!(store.get_runtime_resource("app.js").unwrap().unwrap(), b"js");
        // Unrecognized names fall back to the stylesheet.
        assert_eq!(
            store.get_runtime_resource("whatever.css").unwrap().unwrap(),
            b"css"
        );
    }

    #[test]
    fn test_footer_absent_then_present() {
        let (_guard, store) = store_with_tree();
        assert!(store.get_footer().unwrap().is_none());

        fs::write(
            store.config.ui_dir().join("footer.json"),
            r#"{"footer": []}"#,
        )
        .unwrap();
        assert_eq!(store.get_footer().unwrap().unwrap(), r#"{"footer": []}"#);
    }

    #[test]
    fn test_options_parse_and_absence() {
        let (_guard, store) = store_with_tree();
        fs::write(
            store.config.options_dir().join("countries.json"),
            r#"[{"value": "no", "label": "Norway"}]"#,
        )
        .unwrap();

        let options = store.get_options("countries").unwrap().unwrap();
        assert_eq!(options[0].value, "no");
        assert!(store.get_options("missing").unwrap().is_none());

        let err = store.get_options("../countries").unwrap_err();
        assert!(matches!(err, FormtreeError::Traversal { .. }));
    }
}
