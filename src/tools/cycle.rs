use crate::tools::registry::Tool;
use crate::tools::{display, list, number, parse_args, ToolContext};
use crate::types::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

fn format_cycle_header(cycle: &Value) -> String {
    format!(
        "**{}** ({}) {} → {}",
        display(cycle, "name", "Unnamed sprint"),
        display(cycle, "status", "unknown"),
        display(cycle, "startDate", "?"),
        display(cycle, "endDate", "?"),
    )
}

pub struct ListCycles {
    ctx: Arc<ToolContext>,
}

impl ListCycles {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct ListArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl Tool for ListCycles {
    fn name(&self) -> &str {
        "list_cycles"
    }

    fn description(&self) -> &str {
        "List the project's sprints, optionally filtered by status (planned, active, completed)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["planned", "active", "completed"] }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ListArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let result = self
            .ctx
            .backend
            .call_tool(
                "/cycles/list",
                json!({ "projectId": project_id, "status": args.status }),
            )
            .await?;

        let cycles = list(&result, "cycles");
        if cycles.is_empty() {
            return Ok("No sprints found for this project.".to_string());
        }

        let mut lines = vec![format!("**Sprints ({})**", cycles.len())];
        lines.extend(cycles.iter().map(|c| format!("• {}", format_cycle_header(c))));
        Ok(lines.join("\n"))
    }
}

pub struct GetActiveCycle {
    ctx: Arc<ToolContext>,
}

impl GetActiveCycle {
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
impl Tool for GetActiveCycle {
    fn name(&self) -> &str {
        "get_active_cycle"
    }

    fn description(&self) -> &str {
        "Get the sprint currently in progress, with its dates, goal and issue counts."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ProjectArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let cycle = self
            .ctx
            .backend
            .call_tool("/cycles/get-active", json!({ "projectId": project_id }))
            .await?;

        if cycle.get("id").is_none() {
            return Ok("There is no active sprint.".to_string());
        }

        let mut lines = vec![
            format_cycle_header(&cycle),
            format!("ID: {}", display(&cycle, "id", "")),
        ];
        if let Some(goal) = cycle.get("goal").and_then(Value::as_str) {
            lines.push(format!("Goal: {}", goal));
        }
        let issues = list(&cycle, "issues");
        if !issues.is_empty() {
            let done = issues
                .iter()
                .filter(|i| i.get("status").and_then(Value::as_str) == Some("done"))
                .count();
            lines.push(format!("Issues: {} ({} done)", issues.len(), done));
        }
        Ok(lines.join("\n"))
    }
}

pub struct GetCycleMetrics {
    ctx: Arc<ToolContext>,
}

impl GetCycleMetrics {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct CycleIdArgs {
    cycle_id: String,
}

#[async_trait]
impl Tool for GetCycleMetrics {
    fn name(&self) -> &str {
        "get_cycle_metrics"
    }

    fn description(&self) -> &str {
        "Get progress, velocity and on-track health for a sprint."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "cycle_id": { "type": "string" } },
            "required": ["cycle_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: CycleIdArgs = parse_args(self.name(), args)?;
        let metrics = self
            .ctx
            .backend
            .call_tool("/cycles/metrics", json!({ "cycleId": args.cycle_id }))
            .await?;

        let progress = metrics.get("progress").cloned().unwrap_or(Value::Null);
        let health = metrics.get("health").cloned().unwrap_or(Value::Null);
        let dates = metrics.get("dates").cloned().unwrap_or(Value::Null);
        let on_track = health
            .get("isOnTrack")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let lines = [
            "**Sprint Metrics**".to_string(),
            format!(
                "📊 Progress: {}% (expected {}%)",
                number(&progress, "actualProgress"),
                number(&progress, "expectedProgress"),
            ),
            format!(
                "📦 Points: {} / {} completed",
                number(&progress, "completedPoints"),
                number(&progress, "totalPoints"),
            ),
            format!("⏰ Days remaining: {}", number(&dates, "daysRemaining")),
            if on_track {
                "✅ On track".to_string()
            } else {
                "⚠️ Behind schedule".to_string()
            },
        ];
        Ok(lines.join("\n"))
    }
}
