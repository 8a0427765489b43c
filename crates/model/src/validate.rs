use crate::error::ValidationError;
use crate::keys;
use crate::shortcut::Shortcut;
use crate::value::ParameterValue;
use std::collections::HashMap;

impl Shortcut {
    /// Check that every `ActionOutput` attachment names an action that
    /// precedes the referencing action, that UUIDs are unique, and that no
    /// parameter map holds one of the reserved identity keys.
    ///
    /// The consumer silently drops references that fail this check, so it
    /// runs before a shortcut is written.
    pub fn validate_references(&self) -> Result<(), ValidationError> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        for (index, action) in self.actions.iter().enumerate() {
            if let Some(key) = action
                .parameters
                .keys()
                .find(|key| keys::is_reserved_parameter(key))
            {
                return Err(ValidationError::ReservedParameter {
                    action_index: index,
                    key: key.clone(),
                });
            }
            if let Some(uuid) = action.uuid.as_deref() {
                if let Some(first_index) = positions.insert(uuid, index) {
                    return Err(ValidationError::DuplicateUuid {
                        uuid: uuid.to_string(),
                        first_index,
                        second_index: index,
                    });
                }
            }
        }

        for (index, action) in self.actions.iter().enumerate() {
            let mut referenced = Vec::new();
            for value in action.parameters.values() {
                collect_output_uuids(value, &mut referenced);
            }
            for output_uuid in referenced {
                match positions.get(output_uuid) {
                    Some(&target_index) if target_index < index => {}
                    Some(&target_index) => {
                        return Err(ValidationError::ForwardReference {
                            action_index: index,
                            output_uuid: output_uuid.to_string(),
                            target_index,
                        })
                    }
                    None => {
                        return Err(ValidationError::DanglingReference {
                            action_index: index,
                            output_uuid: output_uuid.to_string(),
                        })
                    }
                }
            }
        }
        Ok(())
    }
}

fn collect_output_uuids<'a>(value: &'a ParameterValue, out: &mut Vec<&'a str>) {
    match value {
        ParameterValue::Map(map) => {
            let is_output = map
                .get(keys::ATTACHMENT_TYPE)
                .and_then(ParameterValue::as_str)
                == Some("ActionOutput");
            if is_output {
                if let Some(uuid) = map
                    .get(keys::ATTACHMENT_OUTPUT_UUID)
                    .and_then(ParameterValue::as_str)
                {
                    out.push(uuid);
                }
            }
            for nested in map.values() {
                collect_output_uuids(nested, out);
            }
        }
        ParameterValue::List(items) => {
            for item in items {
                collect_output_uuids(item, out);
            }
        }
        ParameterValue::String(_)
        | ParameterValue::Int(_)
        | ParameterValue::Double(_)
        | ParameterValue::Bool(_)
        | ParameterValue::Bytes(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, Attachment, TokenString, TokenValue};

    fn text_action(uuid: &str) -> Action {
        Action::new("is.workflow.actions.gettext")
            .with_uuid(uuid)
            .with_token("WFTextActionText", "hi")
    }

    fn show(uuid: &str) -> Action {
        Action::new("is.workflow.actions.showresult").with_token(
            "Text",
            TokenValue::Composite(TokenString::single(Attachment::action_output(uuid, "Text"))),
        )
    }

    #[test]
    fn backward_references_pass() {
        let shortcut = Shortcut::builder("ok")
            .action(text_action("A"))
            .action(show("A"))
            .build();
        assert_eq!(shortcut.validate_references(), Ok(()));
    }

    #[test]
    fn unknown_uuid_is_dangling() {
        let shortcut = Shortcut::builder("bad")
            .action(text_action("A"))
            .action(show("B"))
            .build();
        assert_eq!(
            shortcut.validate_references(),
            Err(ValidationError::DanglingReference {
                action_index: 1,
                output_uuid: "B".into()
            })
        );
    }

    #[test]
    fn later_target_is_a_forward_reference() {
        let shortcut = Shortcut::builder("bad")
            .action(show("A"))
            .action(text_action("A"))
            .build();
        assert!(matches!(
            shortcut.validate_references(),
            Err(ValidationError::ForwardReference {
                action_index: 0,
                target_index: 1,
                ..
            })
        ));
    }

    #[test]
    fn self_reference_is_rejected() {
        let looped = text_action("A").with_token(
            "WFInput",
            TokenValue::Reference(Attachment::action_output("A", "Text")),
        );
        let shortcut = Shortcut::builder("bad").action(looped).build();
        assert!(matches!(
            shortcut.validate_references(),
            Err(ValidationError::ForwardReference { .. })
        ));
    }

    #[test]
    fn duplicate_uuids_are_rejected() {
        let shortcut = Shortcut::builder("dup")
            .action(text_action("A"))
            .action(text_action("A"))
            .build();
        assert!(matches!(
            shortcut.validate_references(),
            Err(ValidationError::DuplicateUuid { .. })
        ));
    }

    #[test]
    fn references_nested_in_lists_are_checked() {
        let nested = Action::new("is.workflow.actions.list").with_parameter(
            "WFItems",
            ParameterValue::List(vec![
                TokenValue::Reference(Attachment::action_output("Z", "Text")).to_parameter_value(),
            ]),
        );
        let shortcut = Shortcut::builder("nested").action(nested).build();
        assert!(matches!(
            shortcut.validate_references(),
            Err(ValidationError::DanglingReference { .. })
        ));
    }

    #[test]
    fn reserved_keys_in_the_parameter_map_are_rejected() {
        let mut action = text_action("A");
        action
            .parameters
            .insert("UUID".into(), ParameterValue::String("other".into()));
        let shortcut = Shortcut::builder("reserved").action(action).build();
        assert_eq!(
            shortcut.validate_references(),
            Err(ValidationError::ReservedParameter {
                action_index: 0,
                key: "UUID".into(),
            })
        );
    }
}
