use super::common::{identifiers, show_result_step, Step};
use crate::error::{Result, TemplateError};
use crate::schema::{ParamValue, ParameterSpec, ResolvedParams};
use crate::template::Template;
use serde_json::Value;
use shortcut_model::{Action, IdSource, ParameterValue};

const NAME: &str = "api-request";
const METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Dictionary field item kinds understood by the consumer.
const ITEM_TYPE_TEXT: i64 = 0;
const ITEM_TYPE_NUMBER: i64 = 3;
const ITEM_TYPE_BOOLEAN: i64 = 4;

/// Fetch a URL, optionally with a JSON body, and optionally pull one key
/// out of the response.
pub struct ApiRequestTemplate {
    schema: Vec<ParameterSpec>,
}

impl ApiRequestTemplate {
    pub fn new() -> Self {
        Self {
            schema: vec![
                ParameterSpec::url("url")
                    .required()
                    .describe("Endpoint to call (http://, https:// or file://)"),
                ParameterSpec::choice("method", METHODS)
                    .with_default(ParamValue::String("GET".into()))
                    .describe("HTTP method"),
                ParameterSpec::string("body")
                    .describe("JSON object sent as the request body; values must be scalars"),
                ParameterSpec::string("jsonKey")
                    .describe("Key to read from the JSON response before showing it"),
                ParameterSpec::boolean("showResult")
                    .with_default(ParamValue::Boolean(true))
                    .describe("Append a Show Result action bound to the response"),
            ],
        }
    }
}

impl Default for ApiRequestTemplate {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a flat JSON object as a dictionary field value. Nested arrays and
/// objects are rejected.
fn body_fields(raw: &str) -> Result<ParameterValue> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|err| TemplateError::generation(format!("body must be a JSON object: {err}")))?;
    let object = parsed
        .as_object()
        .ok_or_else(|| TemplateError::generation("body must be a JSON object"))?;

    let mut items = Vec::with_capacity(object.len());
    for (key, value) in object {
        let (item_type, value) = match value {
            Value::String(text) => (ITEM_TYPE_TEXT, text.clone()),
            Value::Number(number) => (ITEM_TYPE_NUMBER, number.to_string()),
            Value::Bool(flag) => (ITEM_TYPE_BOOLEAN, flag.to_string()),
            Value::Null => (ITEM_TYPE_TEXT, String::new()),
            Value::Array(_) | Value::Object(_) => {
                return Err(TemplateError::generation(format!(
                    "body field '{key}' must be a string, number or boolean"
                )))
            }
        };
        items.push(ParameterValue::map([
            ("WFItemType", ParameterValue::Int(item_type)),
            ("WFKey", ParameterValue::from(key.as_str())),
            ("WFValue", ParameterValue::from(value)),
        ]));
    }

    Ok(ParameterValue::map([
        (
            "Value",
            ParameterValue::map([("WFDictionaryFieldValueItems", ParameterValue::List(items))]),
        ),
        (
            "WFSerializationType",
            ParameterValue::from("WFDictionaryFieldValue"),
        ),
    ]))
}

impl Template for ApiRequestTemplate {
    fn name(&self) -> &str {
        NAME
    }

    fn display_name(&self) -> &str {
        "API Request"
    }

    fn description(&self) -> &str {
        "Call an HTTP endpoint with a chosen method and optional JSON body, optionally extract \
         one key from the JSON response, and show it."
    }

    fn parameter_schema(&self) -> &[ParameterSpec] {
        &self.schema
    }

    fn lower(&self, params: &ResolvedParams, ids: &mut dyn IdSource) -> Result<Vec<Action>> {
        let url = params.str("url").unwrap_or_default();
        let method = params.str("method").unwrap_or("GET");

        let url_step = Step::new(
            Action::new(identifiers::URL)
                .with_uuid(ids.next_id())
                .with_parameter("WFURLActionURL", url),
            "URL",
        );

        let mut download = Action::new(identifiers::DOWNLOAD_URL)
            .with_uuid(ids.next_id())
            .with_token("WFURL", url_step.token_string()?)
            .with_parameter("WFHTTPMethod", method);
        if let Some(body) = params.str("body").filter(|body| !body.trim().is_empty()) {
            download = download
                .with_parameter("WFHTTPBodyType", "JSON")
                .with_parameter("WFJSONValues", body_fields(body)?);
        }
        let download_step = Step::new(download, "Contents of URL");

        let mut steps = vec![url_step, download_step];
        if let Some(key) = params.str("jsonKey").filter(|key| !key.is_empty()) {
            let source = &steps[steps.len() - 1];
            let extract = Step::new(
                Action::new(identifiers::GET_VALUE_FOR_KEY)
                    .with_uuid(ids.next_id())
                    .with_token("WFInput", source.reference()?)
                    .with_parameter("WFDictionaryKey", key)
                    .with_parameter("WFGetDictionaryValueType", "Value"),
                "Dictionary Value",
            );
            steps.push(extract);
        }
        if params.bool("showResult").unwrap_or(true) {
            let show = show_result_step(ids, &steps[steps.len() - 1])?;
            steps.push(show);
        }
        Ok(steps.into_iter().map(|step| step.action).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn body_fields_carry_item_types() {
        let encoded = body_fields(r#"{"name":"Ada","age":36,"admin":false}"#).unwrap();
        let items = encoded
            .get("Value")
            .and_then(|value| value.get("WFDictionaryFieldValueItems"))
            .and_then(ParameterValue::as_list)
            .unwrap();
        let mut summary: Vec<(i64, &str, &str)> = items
            .iter()
            .map(|item| {
                (
                    item.get("WFItemType").and_then(ParameterValue::as_int).unwrap(),
                    item.get("WFKey").and_then(ParameterValue::as_str).unwrap(),
                    item.get("WFValue").and_then(ParameterValue::as_str).unwrap(),
                )
            })
            .collect();
        summary.sort_by_key(|(_, key, _)| *key);
        assert_eq!(
            summary,
            vec![
                (ITEM_TYPE_BOOLEAN, "admin", "false"),
                (ITEM_TYPE_NUMBER, "age", "36"),
                (ITEM_TYPE_TEXT, "name", "Ada"),
            ]
        );
        assert_eq!(
            encoded.get("WFSerializationType").and_then(ParameterValue::as_str),
            Some("WFDictionaryFieldValue")
        );
    }

    #[test]
    fn nested_body_values_are_rejected() {
        let err = body_fields(r#"{"tags":["a"]}"#).unwrap_err();
        assert!(matches!(err, TemplateError::GenerationFailed(ref reason) if reason.contains("tags")));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(body_fields("[1,2]").is_err());
        assert!(body_fields("not json").is_err());
    }
}
