//! Built-in action catalog.
//!
//! These descriptors mirror the desktop automation capabilities shipped with
//! the external runner: application launchers, system monitors, and shell
//! execution. The runner owns the side effects; the catalog only carries the
//! metadata needed for retrieval and code synthesis.

use indexmap::IndexMap;
use serde_json::json;

use crate::registry::types::{
    ActionDescriptor, ParamType, ParameterSchema, ParameterSpec, DEFAULT_MODULE,
};

fn action(name: &str, description: &str, parameters: ParameterSchema) -> ActionDescriptor {
    ActionDescriptor {
        name: name.to_string(),
        module: DEFAULT_MODULE.to_string(),
        description: description.to_string(),
        parameters,
    }
}

/// The immutable built-in set, in catalog order.
pub fn builtin_catalog() -> Vec<ActionDescriptor> {
    vec![
        action(
            "open_chrome",
            "Open Google Chrome browser with optional URL parameter",
            IndexMap::from([(
                "url".to_string(),
                ParameterSpec::optional(
                    ParamType::Str,
                    json!("https://www.google.com"),
                    "URL to open in Chrome",
                ),
            )]),
        ),
        action(
            "open_calculator",
            "Open system calculator application",
            IndexMap::new(),
        ),
        action(
            "open_notepad",
            "Open system notepad/text editor",
            IndexMap::new(),
        ),
        action(
            "open_vscode",
            "Open Visual Studio Code editor",
            IndexMap::new(),
        ),
        action(
            "get_cpu_usage",
            "Get current CPU usage statistics",
            IndexMap::new(),
        ),
        action(
            "get_memory_usage",
            "Get current memory usage statistics",
            IndexMap::new(),
        ),
        action(
            "get_disk_usage",
            "Get disk usage information",
            IndexMap::new(),
        ),
        action(
            "run_command",
            "Execute a shell command and return results",
            IndexMap::from([(
                "cmd".to_string(),
                ParameterSpec::required(ParamType::Str, "Command to execute"),
            )]),
        ),
        action(
            "get_system_info",
            "Get comprehensive system information",
            IndexMap::new(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        let catalog = builtin_catalog();
        let mut names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
    }

    #[test]
    fn test_run_command_requires_cmd() {
        let catalog = builtin_catalog();
        let run_command = catalog.iter().find(|d| d.name == "run_command").unwrap();
        let cmd = &run_command.parameters["cmd"];
        assert!(cmd.required);
        assert!(cmd.default.is_none());
    }

    #[test]
    fn test_open_chrome_has_default_url() {
        let catalog = builtin_catalog();
        let open_chrome = catalog.iter().find(|d| d.name == "open_chrome").unwrap();
        let url = &open_chrome.parameters["url"];
        assert!(!url.required);
        assert_eq!(url.default, Some(json!("https://www.google.com")));
    }
}
