use crate::error::{Result, TemplateError};
use serde::Serialize;
use std::collections::BTreeMap;

/// Loosely typed caller parameters, as received over JSON.
pub type TemplateInput = serde_json::Map<String, serde_json::Value>;

/// Schemes that make a string count as a URL.
const URL_PREFIXES: &[&str] = &["http://", "https://", "file://"];

/// Heuristic only: a string is treated as a URL when it starts with one of
/// `http://`, `https://` or `file://` (case-insensitive). No further parsing.
pub fn looks_like_url(raw: &str) -> bool {
    let trimmed = raw.trim_start();
    URL_PREFIXES.iter().any(|prefix| {
        trimmed
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterKind {
    String,
    Number,
    Boolean,
    Url,
    Choice { allowed: Vec<String> },
}

impl ParameterKind {
    pub fn label(&self) -> String {
        match self {
            Self::String => "a string".to_string(),
            Self::Number => "a number".to_string(),
            Self::Boolean => "a boolean".to_string(),
            Self::Url => "a URL (http://, https:// or file://)".to_string(),
            Self::Choice { allowed } => format!("one of {}", allowed.join(", ")),
        }
    }
}

/// A classified caller value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    String(String),
    Url(String),
    Number(f64),
    Boolean(bool),
}

impl ParamValue {
    /// Classify a JSON value. Strings that look like URLs become `Url`;
    /// arrays and objects are carried as their JSON text. `null` is `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;
        match value {
            Json::Null => None,
            Json::Bool(b) => Some(Self::Boolean(*b)),
            Json::Number(n) => n.as_f64().map(Self::Number),
            Json::String(s) if looks_like_url(s) => Some(Self::Url(s.clone())),
            Json::String(s) => Some(Self::String(s.clone())),
            Json::Array(_) | Json::Object(_) => Some(Self::String(value.to_string())),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Url(_) => "url",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Url(s) => Some(s),
            Self::Number(_) | Self::Boolean(_) => None,
        }
    }

    fn matches(&self, kind: &ParameterKind) -> bool {
        match (kind, self) {
            (ParameterKind::String, Self::String(_) | Self::Url(_)) => true,
            (ParameterKind::Url, Self::Url(_)) => true,
            (ParameterKind::Number, Self::Number(_)) => true,
            (ParameterKind::Boolean, Self::Boolean(_)) => true,
            (ParameterKind::Choice { .. }, Self::String(_) | Self::Url(_)) => true,
            _ => false,
        }
    }
}

/// One entry of a template's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    pub description: String,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            description: String::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Boolean)
    }

    pub fn url(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Url)
    }

    /// Choice over `allowed`; duplicates are dropped, first occurrence wins.
    pub fn choice<I, S>(name: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for value in allowed.into_iter().map(Into::into) {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        Self::new(name, ParameterKind::Choice { allowed: unique })
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: ParamValue) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn check(&self, value: &ParamValue) -> Result<()> {
        if !value.matches(&self.kind) {
            return Err(TemplateError::InvalidParameterType {
                name: self.name.clone(),
                expected: self.kind.label(),
                actual: value.kind_name().to_string(),
            });
        }
        if let ParameterKind::Choice { allowed } = &self.kind {
            let raw = value.as_str().unwrap_or_default();
            if !allowed.iter().any(|candidate| candidate == raw) {
                return Err(TemplateError::InvalidChoiceValue {
                    name: self.name.clone(),
                    value: raw.to_string(),
                    allowed: allowed.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Parameters after validation, with defaults filled in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParams {
    values: BTreeMap<String, ParamValue>,
}

impl ResolvedParams {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(ParamValue::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(ParamValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Check `input` against `schema` in declaration order and stop at the
/// first violation. Keys not named by the schema are ignored.
pub fn validate_parameters(schema: &[ParameterSpec], input: &TemplateInput) -> Result<ResolvedParams> {
    let mut values = BTreeMap::new();
    for spec in schema {
        let supplied = input.get(&spec.name).and_then(ParamValue::from_json);
        match supplied {
            Some(value) => {
                spec.check(&value)?;
                values.insert(spec.name.clone(), value);
            }
            None if spec.required => {
                return Err(TemplateError::MissingRequiredParameter(spec.name.clone()));
            }
            None => {
                if let Some(default) = &spec.default {
                    values.insert(spec.name.clone(), default.clone());
                }
            }
        }
    }
    for key in input.keys() {
        if !schema.iter().any(|spec| &spec.name == key) {
            log::debug!("Ignoring unknown template parameter '{key}'");
        }
    }
    Ok(ResolvedParams { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(value: serde_json::Value) -> TemplateInput {
        value.as_object().cloned().unwrap_or_default()
    }

    fn method_schema() -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::url("url").required(),
            ParameterSpec::choice("method", ["GET", "POST", "PUT", "PATCH", "DELETE"])
                .with_default(ParamValue::String("GET".into())),
            ParameterSpec::boolean("verbose").with_default(ParamValue::Boolean(false)),
        ]
    }

    #[test]
    fn url_heuristic_is_prefix_only() {
        assert!(looks_like_url("https://example.com"));
        assert!(looks_like_url("HTTP://EXAMPLE.COM"));
        assert!(looks_like_url("file:///tmp/x"));
        assert!(!looks_like_url("example.com"));
        assert!(!looks_like_url("ftp://example.com"));
        assert!(!looks_like_url("ht"));
    }

    #[test]
    fn defaults_fill_missing_optionals() {
        let params =
            validate_parameters(&method_schema(), &input(json!({ "url": "https://a.b" }))).unwrap();
        assert_eq!(params.str("method"), Some("GET"));
        assert_eq!(params.bool("verbose"), Some(false));
        assert_eq!(params.get("url"), Some(&ParamValue::Url("https://a.b".into())));
    }

    #[test]
    fn missing_required_fails_first() {
        let err =
            validate_parameters(&method_schema(), &input(json!({ "method": "NOPE" }))).unwrap_err();
        assert_eq!(err, TemplateError::MissingRequiredParameter("url".into()));
    }

    #[test]
    fn null_counts_as_missing() {
        let err = validate_parameters(&method_schema(), &input(json!({ "url": null }))).unwrap_err();
        assert_eq!(err, TemplateError::MissingRequiredParameter("url".into()));
    }

    #[test]
    fn invalid_choice_reports_allowed_values() {
        let err = validate_parameters(
            &method_schema(),
            &input(json!({ "url": "https://a.b", "method": "INVALID" })),
        )
        .unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidChoiceValue {
                name: "method".into(),
                value: "INVALID".into(),
                allowed: vec![
                    "GET".into(),
                    "POST".into(),
                    "PUT".into(),
                    "PATCH".into(),
                    "DELETE".into()
                ],
            }
        );
    }

    #[test]
    fn plain_string_is_not_a_url() {
        let err = validate_parameters(&method_schema(), &input(json!({ "url": "example.com" })))
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::InvalidParameterType { ref name, ref actual, .. }
                if name == "url" && actual == "string"
        ));
    }

    #[test]
    fn url_string_still_satisfies_string_kind() {
        let schema = vec![ParameterSpec::string("note").required()];
        let params = validate_parameters(&schema, &input(json!({ "note": "https://x.y" }))).unwrap();
        assert_eq!(params.str("note"), Some("https://x.y"));
    }

    #[test]
    fn wrong_kind_is_reported() {
        let err = validate_parameters(
            &method_schema(),
            &input(json!({ "url": "https://a.b", "verbose": "yes" })),
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidParameterType { .. }));
    }

    #[test]
    fn structured_values_become_json_text() {
        let schema = vec![ParameterSpec::string("operations").required()];
        let params = validate_parameters(
            &schema,
            &input(json!({ "operations": [{ "type": "uppercase" }] })),
        )
        .unwrap();
        let text = params.str("operations").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, json!([{ "type": "uppercase" }]));
    }

    #[test]
    fn choice_deduplicates_allowed_values() {
        let spec = ParameterSpec::choice("mode", ["a", "b", "a"]);
        assert_eq!(
            spec.kind,
            ParameterKind::Choice {
                allowed: vec!["a".into(), "b".into()]
            }
        );
    }
}
