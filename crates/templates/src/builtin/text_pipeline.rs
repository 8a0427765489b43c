use super::common::{identifiers, show_result_step, text_step, Step};
use crate::error::{Result, TemplateError};
use crate::schema::{ParamValue, ParameterSpec, ResolvedParams};
use crate::template::Template;
use serde_json::{Map, Value};
use shortcut_model::{Action, IdSource};

const NAME: &str = "text-pipeline";

/// Separator names the consumer understands natively.
const SEPARATOR_NEW_LINES: &str = "New Lines";
const SEPARATOR_SPACES: &str = "Spaces";
const SEPARATOR_EVERY_CHARACTER: &str = "Every Character";
const SEPARATOR_CUSTOM: &str = "Custom";

/// Start from a piece of text, then run it through a list of text operations.
pub struct TextPipelineTemplate {
    schema: Vec<ParameterSpec>,
}

impl TextPipelineTemplate {
    pub fn new() -> Self {
        Self {
            schema: vec![
                ParameterSpec::string("input")
                    .required()
                    .describe("Text the pipeline starts from"),
                ParameterSpec::string("operations").required().describe(
                    "JSON array of operations, each {\"type\": ...}. Types: uppercase, lowercase, \
                     capitalize, titlecase, sentencecase, alternatingcase, replace \
                     (find, replace, caseSensitive, regex), split (separator), combine (separator)",
                ),
                ParameterSpec::boolean("showResult")
                    .with_default(ParamValue::Boolean(true))
                    .describe("Append a Show Result action bound to the last operation"),
            ],
        }
    }
}

impl Default for TextPipelineTemplate {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operation {
    ChangeCase(&'static str),
    Replace {
        find: String,
        replace: String,
        case_sensitive: bool,
        regex: bool,
    },
    Split(Separator),
    Combine(Separator),
}

#[derive(Debug, Clone, PartialEq)]
enum Separator {
    Named(&'static str),
    Custom(String),
}

impl Separator {
    fn parse(fields: &Map<String, Value>) -> Self {
        let raw = match fields.get("separator").and_then(Value::as_str) {
            Some(raw) => raw,
            None => return Self::Named(SEPARATOR_NEW_LINES),
        };
        match raw.to_ascii_lowercase().as_str() {
            "newlines" | "new_lines" | "new lines" | "\n" => Self::Named(SEPARATOR_NEW_LINES),
            "spaces" | "space" | " " => Self::Named(SEPARATOR_SPACES),
            "every_character" | "every character" | "characters" => {
                Self::Named(SEPARATOR_EVERY_CHARACTER)
            }
            _ => Self::Custom(raw.to_string()),
        }
    }

    fn apply(&self, action: Action) -> Action {
        match self {
            Self::Named(name) => action.with_parameter("WFTextSeparator", *name),
            Self::Custom(text) => action
                .with_parameter("WFTextSeparator", SEPARATOR_CUSTOM)
                .with_parameter("WFTextCustomSeparator", text.as_str()),
        }
    }
}

fn parse_operations(raw: &str) -> Result<Vec<Operation>> {
    let parsed: Value = serde_json::from_str(raw).map_err(|err| {
        TemplateError::generation(format!("operations must be a JSON array of objects: {err}"))
    })?;
    let items = parsed.as_array().ok_or_else(|| {
        TemplateError::generation("operations must be a JSON array of objects")
    })?;
    if items.is_empty() {
        return Err(TemplateError::generation(
            "at least one operation is required",
        ));
    }
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_operation(index, item))
        .collect()
}

fn parse_operation(index: usize, item: &Value) -> Result<Operation> {
    let fields = item.as_object().ok_or_else(|| {
        TemplateError::generation(format!("operation {index} is not an object"))
    })?;
    let kind = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| TemplateError::generation(format!("operation {index} is missing 'type'")))?;

    let case = |case_type: &'static str| Ok(Operation::ChangeCase(case_type));
    match kind {
        "uppercase" => case("UPPERCASE"),
        "lowercase" => case("lowercase"),
        "capitalize" => case("Capitalize Every Word"),
        "titlecase" => case("Title Case"),
        "sentencecase" => case("Sentence case"),
        "alternatingcase" => case("cApItAlIzE eVeRy WoRd"),
        "replace" => {
            let find = fields
                .get("find")
                .and_then(Value::as_str)
                .ok_or_else(|| TemplateError::generation("missing 'find' field"))?
                .to_string();
            let regex = fields.get("regex").and_then(Value::as_bool).unwrap_or(false);
            if regex {
                regex::Regex::new(&find).map_err(|err| {
                    TemplateError::generation(format!("invalid regular expression '{find}': {err}"))
                })?;
            }
            Ok(Operation::Replace {
                replace: fields
                    .get("replace")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                case_sensitive: fields
                    .get("caseSensitive")
                    .and_then(Value::as_bool)
                    .unwrap_or(true),
                find,
                regex,
            })
        }
        "split" => Ok(Operation::Split(Separator::parse(fields))),
        "combine" => Ok(Operation::Combine(Separator::parse(fields))),
        other => Err(TemplateError::generation(format!(
            "unknown operation type '{other}'"
        ))),
    }
}

fn operation_step(ids: &mut dyn IdSource, operation: &Operation, input: &Step) -> Result<Step> {
    let step = match operation {
        Operation::ChangeCase(case_type) => Step::new(
            Action::new(identifiers::CHANGE_CASE)
                .with_uuid(ids.next_id())
                .with_parameter("WFCaseType", *case_type)
                .with_token("text", input.reference()?),
            "Updated Text",
        ),
        Operation::Replace {
            find,
            replace,
            case_sensitive,
            regex,
        } => Step::new(
            Action::new(identifiers::REPLACE_TEXT)
                .with_uuid(ids.next_id())
                .with_token("WFInput", input.reference()?)
                .with_token("WFReplaceTextFind", find.as_str())
                .with_token("WFReplaceTextReplace", replace.as_str())
                .with_parameter("WFReplaceTextCaseSensitive", *case_sensitive)
                .with_parameter("WFReplaceTextRegularExpression", *regex),
            "Updated Text",
        ),
        Operation::Split(separator) => Step::new(
            separator.apply(
                Action::new(identifiers::SPLIT_TEXT)
                    .with_uuid(ids.next_id())
                    .with_token("text", input.reference()?),
            ),
            "Split Text",
        ),
        Operation::Combine(separator) => Step::new(
            separator.apply(
                Action::new(identifiers::COMBINE_TEXT)
                    .with_uuid(ids.next_id())
                    .with_token("text", input.reference()?),
            ),
            "Combined Text",
        ),
    };
    Ok(step)
}

impl Template for TextPipelineTemplate {
    fn name(&self) -> &str {
        NAME
    }

    fn display_name(&self) -> &str {
        "Text Pipeline"
    }

    fn description(&self) -> &str {
        "Create a text value, transform it with a chain of case, replace, split and combine \
         operations, and optionally show the result."
    }

    fn parameter_schema(&self) -> &[ParameterSpec] {
        &self.schema
    }

    fn lower(&self, params: &ResolvedParams, ids: &mut dyn IdSource) -> Result<Vec<Action>> {
        let input = params.str("input").unwrap_or_default();
        let operations = parse_operations(params.str("operations").unwrap_or_default())?;

        let mut actions = Vec::with_capacity(operations.len() + 2);
        let mut current = text_step(ids, input);
        for operation in &operations {
            let next = operation_step(ids, operation, &current)?;
            actions.push(std::mem::replace(&mut current, next).action);
        }
        let show = if params.bool("showResult").unwrap_or(true) {
            Some(show_result_step(ids, &current)?)
        } else {
            None
        };
        actions.push(current.action);
        actions.extend(show.map(|step| step.action));
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn separators_map_to_native_names() {
        let fields = |raw: &str| {
            let mut map = Map::new();
            map.insert("separator".into(), Value::String(raw.into()));
            map
        };
        assert_eq!(
            Separator::parse(&Map::new()),
            Separator::Named(SEPARATOR_NEW_LINES)
        );
        assert_eq!(
            Separator::parse(&fields("Spaces")),
            Separator::Named(SEPARATOR_SPACES)
        );
        assert_eq!(
            Separator::parse(&fields("every_character")),
            Separator::Named(SEPARATOR_EVERY_CHARACTER)
        );
        assert_eq!(
            Separator::parse(&fields(", ")),
            Separator::Custom(", ".into())
        );
    }

    #[test]
    fn case_operations_map_to_case_types() {
        let ops = parse_operations(
            r#"[{"type":"capitalize"},{"type":"alternatingcase"},{"type":"sentencecase"}]"#,
        )
        .unwrap();
        assert_eq!(
            ops,
            vec![
                Operation::ChangeCase("Capitalize Every Word"),
                Operation::ChangeCase("cApItAlIzE eVeRy WoRd"),
                Operation::ChangeCase("Sentence case"),
            ]
        );
    }

    #[test]
    fn replace_defaults() {
        let ops = parse_operations(r#"[{"type":"replace","find":"a"}]"#).unwrap();
        assert_eq!(
            ops,
            vec![Operation::Replace {
                find: "a".into(),
                replace: String::new(),
                case_sensitive: true,
                regex: false,
            }]
        );
    }

    #[test]
    fn invalid_regex_is_a_generation_failure() {
        let err = parse_operations(r#"[{"type":"replace","find":"(","regex":true}]"#).unwrap_err();
        assert!(matches!(err, TemplateError::GenerationFailed(ref reason) if reason.contains("regular expression")));
    }

    #[test]
    fn operation_without_type_is_rejected() {
        let err = parse_operations(r#"[{"find":"x"}]"#).unwrap_err();
        assert_eq!(
            err,
            TemplateError::generation("operation 0 is missing 'type'")
        );
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let err = parse_operations(r#"{"type":"uppercase"}"#).unwrap_err();
        assert!(matches!(err, TemplateError::GenerationFailed(_)));
    }
}
