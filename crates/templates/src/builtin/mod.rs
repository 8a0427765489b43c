//! Templates shipped with the registry.

mod api_request;
mod choose_menu;
mod common;
mod text_pipeline;

pub use api_request::ApiRequestTemplate;
pub use choose_menu::ChooseMenuTemplate;
pub use common::identifiers;
pub use text_pipeline::TextPipelineTemplate;

use crate::template::Template;
use std::sync::Arc;

pub fn all() -> Vec<Arc<dyn Template>> {
    vec![
        Arc::new(TextPipelineTemplate::new()),
        Arc::new(ApiRequestTemplate::new()),
        Arc::new(ChooseMenuTemplate::new()),
    ]
}
