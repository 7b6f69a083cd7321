use crate::tools::registry::Tool;
use crate::tools::{display, number, parse_args, ToolContext};
use crate::types::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ProjectSummary {
    ctx: Arc<ToolContext>,
}

impl ProjectSummary {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct ProjectArgs {
    #[serde(default)]
    project_id: Option<String>,
}

#[async_trait]
impl Tool for ProjectSummary {
    fn name(&self) -> &str {
        "get_project_summary"
    }

    fn description(&self) -> &str {
        "Get the project's status, issue counts by state and the current sprint."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ProjectArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let summary = self
            .ctx
            .backend
            .call_tool("/projects/summary", json!({ "projectId": project_id }))
            .await?;

        let counts = summary.get("issueCounts").cloned().unwrap_or(Value::Null);
        let mut lines = vec![
            format!("**{}**", display(&summary, "name", "Project")),
            format!("Status: {}", display(&summary, "status", "unknown")),
            format!(
                "Issues: {} open, {} in progress, {} done",
                number(&counts, "open"),
                number(&counts, "inProgress"),
                number(&counts, "done")
            ),
        ];
        if let Some(cycle) = summary.get("activeCycle").filter(|c| c.is_object()) {
            lines.push(format!("Current sprint: {}", display(cycle, "name", "Unnamed")));
        }
        if let Some(description) = summary.get("description").and_then(Value::as_str) {
            lines.push(String::new());
            lines.push(description.to_string());
        }

        Ok(lines.join("\n"))
    }
}
