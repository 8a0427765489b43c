use super::common::{identifiers, show_text_step};
use crate::error::{Result, TemplateError};
use crate::schema::{ParamValue, ParameterSpec, ResolvedParams};
use crate::template::Template;
use shortcut_model::{Action, IdSource, ParameterValue};

const NAME: &str = "choose-menu";

/// `WFControlFlowMode` values for the three parts of a menu block.
const MODE_START: i64 = 0;
const MODE_ITEM: i64 = 1;
const MODE_END: i64 = 2;

/// A choose-from-menu block with one branch per item; each branch shows
/// which item was picked.
pub struct ChooseMenuTemplate {
    schema: Vec<ParameterSpec>,
}

impl ChooseMenuTemplate {
    pub fn new() -> Self {
        Self {
            schema: vec![
                ParameterSpec::string("prompt")
                    .with_default(ParamValue::String("Choose an option".into()))
                    .describe("Question shown above the menu"),
                ParameterSpec::string("items")
                    .required()
                    .describe("Menu items as a JSON array of strings or a comma-separated list"),
            ],
        }
    }
}

impl Default for ChooseMenuTemplate {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_items(raw: &str) -> Result<Vec<String>> {
    let items: Vec<String> = if raw.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<String>>(raw).map_err(|err| {
            TemplateError::generation(format!("items must be a JSON array of strings: {err}"))
        })?
    } else {
        raw.split(',').map(str::to_string).collect()
    };
    let items: Vec<String> = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    if items.is_empty() {
        return Err(TemplateError::generation("at least one menu item is required"));
    }
    for (index, item) in items.iter().enumerate() {
        if items[..index].contains(item) {
            return Err(TemplateError::generation(format!(
                "duplicate menu item '{item}'"
            )));
        }
    }
    Ok(items)
}

fn menu_action(ids: &mut dyn IdSource, group: &str, mode: i64) -> Action {
    Action::new(identifiers::CHOOSE_FROM_MENU)
        .with_uuid(ids.next_id())
        .with_group_id(group)
        .with_parameter("WFControlFlowMode", mode)
}

impl Template for ChooseMenuTemplate {
    fn name(&self) -> &str {
        NAME
    }

    fn display_name(&self) -> &str {
        "Choose From Menu"
    }

    fn description(&self) -> &str {
        "Ask the user to pick one of several items and show which one was chosen."
    }

    fn parameter_schema(&self) -> &[ParameterSpec] {
        &self.schema
    }

    fn lower(&self, params: &ResolvedParams, ids: &mut dyn IdSource) -> Result<Vec<Action>> {
        let prompt = params.str("prompt").unwrap_or_default();
        let items = parse_items(params.str("items").unwrap_or_default())?;
        let group = ids.next_id();

        let mut actions = Vec::with_capacity(items.len() * 2 + 2);
        actions.push(
            menu_action(ids, &group, MODE_START)
                .with_token("WFMenuPrompt", prompt)
                .with_parameter(
                    "WFMenuItems",
                    ParameterValue::List(items.iter().map(|item| item.as_str().into()).collect()),
                ),
        );
        for item in &items {
            actions.push(
                menu_action(ids, &group, MODE_ITEM).with_parameter("WFMenuItemTitle", item.as_str()),
            );
            actions.push(show_text_step(ids, &format!("You chose {item}")).action);
        }
        actions.push(menu_action(ids, &group, MODE_END));
        Ok(actions)
    }
}
