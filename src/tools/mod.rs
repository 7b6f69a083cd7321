//! Backend tools the agents can call
//!
//! Each tool wraps one agent-bridge endpoint and renders the result as
//! plain text for the model to read. Tools that would write (creating or
//! updating issues and specs) file proposals instead.
//!
//! # Module Structure
//!
//! - [`registry`](crate::tools::registry) - `Tool` trait, registry and tool groups
//! - [`issue`](crate::tools::issue) - issue search, details, create/update proposals
//! - [`cycle`](crate::tools::cycle) - sprint listing, active sprint, metrics
//! - [`capacity`](crate::tools::capacity) - workload and allocation checks
//! - [`team`](crate::tools::team) - team roster and skills
//! - [`spec`](crate::tools::spec) - specification documents
//! - [`git`](crate::tools::git) - commits and pull requests
//! - [`project`](crate::tools::project) - project summary

pub mod capacity;
pub mod cycle;
pub mod git;
pub mod issue;
pub mod project;
pub mod registry;
pub mod spec;
pub mod team;

use crate::backend::BackendClient;
use crate::types::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Shared state handed to every tool of one agent run
pub struct ToolContext {
    pub backend: BackendClient,
    /// Project the conversation is about, used when the model omits one
    pub project_id: Option<String>,
}

impl ToolContext {
    pub fn new(backend: BackendClient, project_id: Option<String>) -> Self {
        Self {
            backend,
            project_id,
        }
    }

    pub(crate) fn project_id(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.project_id.clone())
            .ok_or_else(|| AppError::InvalidInput("project_id is required".to_string()))
    }
}

pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    // Models sometimes send `null` for "no arguments"
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .map_err(|e| AppError::InvalidInput(format!("Invalid arguments for {}: {}", tool, e)))
}

/// Render a field for display, whatever its JSON type
pub(crate) fn display(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

pub(crate) fn number(value: &Value, key: &str) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

/// A list result: either the array itself or the array under `key`
pub(crate) fn list(value: &Value, key: &str) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => other
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_handles_types() {
        let v = json!({"s": "x", "n": 3, "f": 2.5, "b": true});
        assert_eq!(display(&v, "s", "-"), "x");
        assert_eq!(display(&v, "n", "-"), "3");
        assert_eq!(display(&v, "f", "-"), "2.5");
        assert_eq!(display(&v, "b", "-"), "true");
        assert_eq!(display(&v, "missing", "-"), "-");
    }

    #[test]
    fn test_list_accepts_bare_or_wrapped_arrays() {
        assert_eq!(list(&json!([1, 2]), "items").len(), 2);
        assert_eq!(list(&json!({"items": [1]}), "items").len(), 1);
        assert!(list(&json!({"other": 1}), "items").is_empty());
    }

    #[test]
    fn test_parse_args_treats_null_as_empty() {
        #[derive(serde::Deserialize)]
        struct Args {
            #[serde(default)]
            days: Option<u32>,
        }
        let args: Args = parse_args("t", Value::Null).unwrap();
        assert!(args.days.is_none());

        let bad: Result<Args> = parse_args("t", json!({"days": "many"}));
        assert!(matches!(bad, Err(AppError::InvalidInput(_))));
    }
}
