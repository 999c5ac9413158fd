//! Declared task metadata.
//!
//! Each task advertises its display name and accepted configuration
//! options so the workflow UI can render a form for them. This is a data
//! contract only; the task itself reads options through
//! [`TaskConfig`](crate::task_config::TaskConfig).

use serde::Serialize;
use serde_json::Value;

/// Form widget used to edit an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Checkbox,
    Text,
    Textarea,
}

/// One configurable option of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigOption {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskMetadata {
    pub display_name: &'static str,
    pub description: &'static str,
    pub task_config: Vec<ConfigOption>,
}

impl TaskMetadata {
    pub fn option(&self, name: &str) -> Option<&ConfigOption> {
        self.task_config.iter().find(|o| o.name == name)
    }
}
