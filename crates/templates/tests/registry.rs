use pretty_assertions::assert_eq;
use serde_json::json;
use shortcut_model::{Action, IdSource, SequentialIds};
use shortcut_templates::{
    ParameterSpec, ResolvedParams, Result, Template, TemplateError, TemplateRegistry,
};

struct Fixed {
    name: &'static str,
    identifier: &'static str,
    schema: Vec<ParameterSpec>,
}

impl Fixed {
    fn new(name: &'static str, identifier: &'static str) -> Self {
        Self {
            name,
            identifier,
            schema: vec![ParameterSpec::string("note")],
        }
    }
}

impl Template for Fixed {
    fn name(&self) -> &str {
        self.name
    }

    fn display_name(&self) -> &str {
        "Fixed"
    }

    fn description(&self) -> &str {
        "Emits a single action"
    }

    fn parameter_schema(&self) -> &[ParameterSpec] {
        &self.schema
    }

    fn lower(&self, _params: &ResolvedParams, ids: &mut dyn IdSource) -> Result<Vec<Action>> {
        Ok(vec![Action::new(self.identifier).with_uuid(ids.next_id())])
    }
}

#[test]
fn builtins_are_listed_by_name() {
    let registry = TemplateRegistry::with_builtins();
    assert_eq!(
        registry.names(),
        vec!["api-request", "choose-menu", "text-pipeline"]
    );
    let summaries = registry.list_all();
    let pipeline = summaries
        .iter()
        .find(|summary| summary.name == "text-pipeline")
        .unwrap();
    assert_eq!(
        pipeline.required_parameters,
        vec!["input".to_string(), "operations".to_string()]
    );
}

#[test]
fn unknown_template_is_not_found() {
    let registry = TemplateRegistry::with_builtins();
    assert!(registry.lookup("nope").is_none());
    let err = registry
        .generate("nope", &Default::default(), &mut SequentialIds::new())
        .unwrap_err();
    assert_eq!(err, TemplateError::NotFound("nope".into()));
    assert_eq!(err.code(), "template_not_found");
}

#[test]
fn registering_a_taken_name_replaces_it() {
    let registry = TemplateRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.register(Fixed::new("custom", "first.action")).is_none());
    let displaced = registry
        .register(Fixed::new("custom", "second.action"))
        .unwrap();
    assert_eq!(displaced.name(), "custom");
    assert_eq!(registry.len(), 1);

    let actions = registry
        .generate("custom", &Default::default(), &mut SequentialIds::new())
        .unwrap();
    assert_eq!(actions[0].identifier, "second.action");
}

#[test]
fn builtin_can_be_overridden() {
    let registry = TemplateRegistry::with_builtins();
    registry.register(Fixed::new("text-pipeline", "override.action"));
    let params = json!({ "note": "ignored" });
    let actions = registry
        .generate(
            "text-pipeline",
            params.as_object().unwrap(),
            &mut SequentialIds::new(),
        )
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].identifier, "override.action");
}

#[test]
fn description_carries_full_schema() {
    let registry = TemplateRegistry::with_builtins();
    let description = registry.get("api-request").unwrap().describe();
    let names: Vec<&str> = description
        .parameters
        .iter()
        .map(|spec| spec.name.as_str())
        .collect();
    assert_eq!(names, vec!["url", "method", "body", "jsonKey", "showResult"]);
    let rendered = serde_json::to_value(&description).unwrap();
    assert_eq!(rendered["parameters"][1]["kind"]["type"], json!("choice"));
    assert_eq!(rendered["parameters"][1]["default"], json!("GET"));
}
