use crate::error::{Result, TemplateError};
use shortcut_model::{Action, Attachment, IdSource, TokenString, TokenValue};

/// Action identifiers emitted by the built-in templates.
pub mod identifiers {
    pub const GET_TEXT: &str = "is.workflow.actions.gettext";
    pub const CHANGE_CASE: &str = "is.workflow.actions.text.changecase";
    pub const REPLACE_TEXT: &str = "is.workflow.actions.text.replace";
    pub const SPLIT_TEXT: &str = "is.workflow.actions.text.split";
    pub const COMBINE_TEXT: &str = "is.workflow.actions.text.combine";
    pub const SHOW_RESULT: &str = "is.workflow.actions.showresult";
    pub const URL: &str = "is.workflow.actions.url";
    pub const DOWNLOAD_URL: &str = "is.workflow.actions.downloadurl";
    pub const GET_VALUE_FOR_KEY: &str = "is.workflow.actions.getvalueforkey";
    pub const CHOOSE_FROM_MENU: &str = "is.workflow.actions.choosefrommenu";
}

/// An emitted action together with the name its output goes by.
pub(crate) struct Step {
    pub action: Action,
    pub output_name: &'static str,
}

impl Step {
    pub fn new(action: Action, output_name: &'static str) -> Self {
        Self {
            action,
            output_name,
        }
    }

    fn attachment(&self) -> Result<Attachment> {
        self.action
            .output_reference(self.output_name)
            .ok_or_else(|| {
                TemplateError::generation(format!(
                    "action {} has no id to reference",
                    self.action.identifier
                ))
            })
    }

    /// Bare reference to this step's output.
    pub fn reference(&self) -> Result<TokenValue> {
        self.attachment().map(TokenValue::Reference)
    }

    /// `"\u{FFFC}"` token string pointing at this step's output.
    pub fn token_string(&self) -> Result<TokenValue> {
        self.attachment()
            .map(|attachment| TokenValue::Composite(TokenString::single(attachment)))
    }
}

pub(crate) fn text_step(ids: &mut dyn IdSource, text: &str) -> Step {
    Step::new(
        Action::new(identifiers::GET_TEXT)
            .with_uuid(ids.next_id())
            .with_token("WFTextActionText", text),
        "Text",
    )
}

pub(crate) fn show_result_step(ids: &mut dyn IdSource, source: &Step) -> Result<Step> {
    Ok(Step::new(
        Action::new(identifiers::SHOW_RESULT)
            .with_uuid(ids.next_id())
            .with_token("Text", source.token_string()?),
        "Result",
    ))
}

pub(crate) fn show_text_step(ids: &mut dyn IdSource, text: &str) -> Step {
    Step::new(
        Action::new(identifiers::SHOW_RESULT)
            .with_uuid(ids.next_id())
            .with_token("Text", text),
        "Result",
    )
}
