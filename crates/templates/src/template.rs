use crate::error::Result;
use crate::schema::{validate_parameters, ParameterSpec, ResolvedParams, TemplateInput};
use serde::Serialize;
use shortcut_model::{Action, IdSource};

/// A named generator of action sequences.
///
/// Implementors supply metadata, a parameter schema and [`Template::lower`];
/// [`Template::generate`] validates before lowering, so a template never
/// sees parameters that violate its schema.
pub trait Template: Send + Sync {
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &[ParameterSpec];

    /// Template-specific lowering. Allocate one id per action from `ids`.
    fn lower(&self, params: &ResolvedParams, ids: &mut dyn IdSource) -> Result<Vec<Action>>;

    fn generate(&self, input: &TemplateInput, ids: &mut dyn IdSource) -> Result<Vec<Action>> {
        let params = validate_parameters(self.parameter_schema(), input)?;
        let actions = self.lower(&params, ids)?;
        log::debug!(
            "Template '{}' produced {} action(s) from {} parameter(s)",
            self.name(),
            actions.len(),
            params.len()
        );
        Ok(actions)
    }

    fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            name: self.name().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            required_parameters: self
                .parameter_schema()
                .iter()
                .filter(|spec| spec.required)
                .map(|spec| spec.name.clone())
                .collect(),
        }
    }

    fn describe(&self) -> TemplateDescription {
        TemplateDescription {
            name: self.name().to_string(),
            display_name: self.display_name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameter_schema().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub required_parameters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDescription {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}
