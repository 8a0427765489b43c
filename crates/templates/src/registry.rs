use crate::builtin;
use crate::error::{Result, TemplateError};
use crate::schema::TemplateInput;
use crate::template::{Template, TemplateSummary};
use shortcut_model::{Action, IdSource};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Name → template table.
///
/// Created once by the composition root and shared by reference. Registering
/// a name that already exists replaces the earlier template.
#[derive(Default)]
pub struct TemplateRegistry {
    templates: RwLock<BTreeMap<String, Arc<dyn Template>>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in templates.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for template in builtin::all() {
            registry.register_arc(template);
        }
        registry
    }

    /// Register `template`, returning the template it displaced, if any.
    pub fn register(&self, template: impl Template + 'static) -> Option<Arc<dyn Template>> {
        self.register_arc(Arc::new(template))
    }

    pub fn register_arc(&self, template: Arc<dyn Template>) -> Option<Arc<dyn Template>> {
        let name = template.name().to_string();
        let previous = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), template);
        if previous.is_some() {
            log::debug!("Template '{name}' replaced an earlier registration");
        }
        previous
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Template>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Template>> {
        self.lookup(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }

    /// Summaries sorted by template name.
    pub fn list_all(&self) -> Vec<TemplateSummary> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|template| template.summary())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `name` and generate. The table lock is released before
    /// generation starts.
    pub fn generate(
        &self,
        name: &str,
        input: &TemplateInput,
        ids: &mut dyn IdSource,
    ) -> Result<Vec<Action>> {
        let template = self.get(name)?;
        template.generate(input, ids)
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.names())
            .finish()
    }
}
