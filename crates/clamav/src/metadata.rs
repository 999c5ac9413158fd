//! Task registration name and the configuration form it advertises.

use relik_core::task_metadata::{ConfigOption, OptionType, TaskMetadata};
use serde_json::Value;

pub const TASK_NAME: &str = "openrelik-worker-clamav.tasks.clamav-scan";

pub const OPT_RECURSIVE: &str = "recursive";
pub const OPT_UPDATE_SIGNATURES: &str = "update_signatures";
pub const OPT_DATABASE_PATHS: &str = "database_paths";
pub const OPT_FRESHCLAM_MIRROR: &str = "freshclam_mirror";
pub const OPT_ALLMATCH: &str = "allmatch";
pub const OPT_DETECT_PUA: &str = "detect_pua";

pub fn task_metadata() -> TaskMetadata {
    TaskMetadata {
        display_name: "ClamAV scan",
        description: "Scan files and folders for malware with ClamAV.",
        task_config: vec![
            ConfigOption {
                name: OPT_RECURSIVE,
                label: "Scan directories recursively",
                description: "If checked, recursively scans input directories.",
                option_type: OptionType::Checkbox,
                required: true,
                default_value: Some(Value::Bool(true)),
            },
            ConfigOption {
                name: OPT_UPDATE_SIGNATURES,
                label: "Update signatures before scanning",
                description: "Runs freshclam at task start to fetch latest official signatures.",
                option_type: OptionType::Checkbox,
                required: true,
                default_value: Some(Value::Bool(true)),
            },
            ConfigOption {
                name: OPT_DATABASE_PATHS,
                label: "/var/lib/clamav",
                description: "Optional newline-separated list of ClamAV database files/directories.",
                option_type: OptionType::Textarea,
                required: false,
                default_value: None,
            },
            ConfigOption {
                name: OPT_FRESHCLAM_MIRROR,
                label: "database.clamav.net",
                description: "Optional custom mirror for freshclam updates.",
                option_type: OptionType::Text,
                required: false,
                default_value: None,
            },
            ConfigOption {
                name: OPT_ALLMATCH,
                label: "Report all signature matches",
                description:
                    "Enable clamscan --allmatch to return all detections instead of first match.",
                option_type: OptionType::Checkbox,
                required: true,
                default_value: Some(Value::Bool(true)),
            },
            ConfigOption {
                name: OPT_DETECT_PUA,
                label: "Detect PUA",
                description: "Enable potentially unwanted application (PUA) detection.",
                option_type: OptionType::Checkbox,
                required: true,
                default_value: Some(Value::Bool(true)),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn task_name_and_display_name() {
        assert_eq!(TASK_NAME, "openrelik-worker-clamav.tasks.clamav-scan");
        assert_eq!(task_metadata().display_name, "ClamAV scan");
    }

    #[test]
    fn advertises_every_option_the_task_reads() {
        let meta = task_metadata();
        let names: HashSet<&str> = meta.task_config.iter().map(|o| o.name).collect();
        let expected: HashSet<&str> = [
            OPT_RECURSIVE,
            OPT_UPDATE_SIGNATURES,
            OPT_DATABASE_PATHS,
            OPT_FRESHCLAM_MIRROR,
            OPT_ALLMATCH,
            OPT_DETECT_PUA,
        ]
        .into_iter()
        .collect();
        assert_eq!(names, expected);
        assert_eq!(meta.task_config.len(), expected.len(), "no duplicate options");
    }

    #[test]
    fn checkboxes_default_to_true() {
        let meta = task_metadata();
        for option in meta
            .task_config
            .iter()
            .filter(|o| o.option_type == OptionType::Checkbox)
        {
            assert_eq!(
                option.default_value,
                Some(Value::Bool(true)),
                "{} should default to true",
                option.name
            );
            assert!(option.required);
        }
    }

    #[test]
    fn free_text_options_are_optional() {
        let meta = task_metadata();
        let paths = meta.option(OPT_DATABASE_PATHS).expect("database_paths");
        assert_eq!(paths.option_type, OptionType::Textarea);
        assert!(!paths.required);
        let mirror = meta.option(OPT_FRESHCLAM_MIRROR).expect("freshclam_mirror");
        assert_eq!(mirror.option_type, OptionType::Text);
        assert!(!mirror.required);
    }
}
