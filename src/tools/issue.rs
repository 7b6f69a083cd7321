use crate::backend::ProposalDraft;
use crate::tools::registry::Tool;
use crate::tools::{display, list, parse_args, ToolContext};
use crate::types::Result;
use crate::utils::json::truncate_chars;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn format_issue_line(issue: &Value) -> String {
    let id = display(issue, "id", "unknown");
    format!(
        "• [{}] {} (ID: {}, Status: {})",
        display(issue, "priority", "medium").to_uppercase(),
        display(issue, "title", "Untitled"),
        truncate_chars(&id, 8),
        display(issue, "status", "unknown"),
    )
}

pub struct SearchIssues {
    ctx: Arc<ToolContext>,
}

impl SearchIssues {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct SearchArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default)]
    query: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    assignee_id: Option<String>,
    #[serde(default)]
    cycle_id: Option<String>,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    20
}

#[async_trait]
impl Tool for SearchIssues {
    fn name(&self) -> &str {
        "search_issues"
    }

    fn description(&self) -> &str {
        "Search issues in the project by text, status (backlog, todo, in_progress, review, done), \
         priority (critical, high, medium, low), assignee or sprint."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Text to match in title and description" },
                "status": { "type": "string", "description": "Comma-separated statuses" },
                "priority": { "type": "string", "description": "Comma-separated priorities" },
                "assignee_id": { "type": "string" },
                "cycle_id": { "type": "string" },
                "limit": { "type": "integer", "default": 20 }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: SearchArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let mut filters = Map::new();
        if !args.status.is_empty() {
            filters.insert("status".to_string(), json!(split_csv(&args.status)));
        }
        if !args.priority.is_empty() {
            filters.insert("priority".to_string(), json!(split_csv(&args.priority)));
        }
        if let Some(assignee) = args.assignee_id {
            filters.insert("assigneeId".to_string(), json!(assignee));
        }
        if let Some(cycle) = args.cycle_id {
            filters.insert("cycleId".to_string(), json!(cycle));
        }

        let result = self
            .ctx
            .backend
            .call_tool(
                "/issues/search",
                json!({
                    "projectId": project_id,
                    "query": args.query,
                    "filters": filters,
                    "limit": args.limit,
                }),
            )
            .await?;

        let issues = list(&result, "issues");
        if issues.is_empty() {
            return Ok("No issues found matching the criteria.".to_string());
        }

        let lines: Vec<String> = issues.iter().map(format_issue_line).collect();
        Ok(format!("Found {} issues:\n{}", issues.len(), lines.join("\n")))
    }
}

pub struct GetIssueDetails {
    ctx: Arc<ToolContext>,
}

impl GetIssueDetails {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct IssueIdArgs {
    issue_id: String,
}

#[async_trait]
impl Tool for GetIssueDetails {
    fn name(&self) -> &str {
        "get_issue_details"
    }

    fn description(&self) -> &str {
        "Get the full details of one issue: description, assignee, sprint, story points."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "issue_id": { "type": "string" } },
            "required": ["issue_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: IssueIdArgs = parse_args(self.name(), args)?;
        let issue = self
            .ctx
            .backend
            .call_tool("/issues/get", json!({ "issueId": args.issue_id }))
            .await?;

        if !issue.is_object() || issue.as_object().is_some_and(Map::is_empty) {
            return Ok(format!("Issue {} not found.", args.issue_id));
        }

        let mut details = vec![
            format!("**{}**", display(&issue, "title", "Untitled")),
            format!("ID: {}", display(&issue, "id", &args.issue_id)),
            format!("Status: {}", display(&issue, "status", "unknown")),
            format!("Priority: {}", display(&issue, "priority", "medium")),
            format!("Type: {}", display(&issue, "type", "task")),
        ];

        match issue.get("assignee").filter(|a| a.is_object()) {
            Some(assignee) => details.push(format!(
                "Assignee: {}",
                display(assignee, "fullName", "Unassigned")
            )),
            None => details.push("Assignee: Unassigned".to_string()),
        }
        if issue.get("storyPoints").is_some_and(|p| !p.is_null()) {
            details.push(format!("Story Points: {}", display(&issue, "storyPoints", "")));
        }
        if let Some(cycle) = issue.get("cycle").filter(|c| c.is_object()) {
            details.push(format!("Sprint: {}", display(cycle, "name", "Unknown")));
        }
        if let Some(description) = issue.get("description").and_then(Value::as_str) {
            if !description.is_empty() {
                details.push(format!(
                    "\nDescription:\n{}",
                    truncate_chars(description, 500)
                ));
            }
        }

        Ok(details.join("\n"))
    }
}

pub struct CreateIssue {
    ctx: Arc<ToolContext>,
}

impl CreateIssue {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct CreateIssueArgs {
    #[serde(default)]
    project_id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_priority")]
    priority: String,
    #[serde(default = "default_issue_type")]
    issue_type: String,
    #[serde(default)]
    story_points: Option<u32>,
    #[serde(default)]
    assignee_id: Option<String>,
    #[serde(default)]
    cycle_id: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_issue_type() -> String {
    "task".to_string()
}

#[async_trait]
impl Tool for CreateIssue {
    fn name(&self) -> &str {
        "create_issue"
    }

    fn description(&self) -> &str {
        "Propose a new issue. The issue is created only after a human approves the proposal."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "description": { "type": "string", "description": "Include acceptance criteria" },
                "priority": { "type": "string", "enum": ["critical", "high", "medium", "low"] },
                "issue_type": { "type": "string", "enum": ["bug", "feature", "task", "story"] },
                "story_points": { "type": "integer" },
                "assignee_id": { "type": "string" },
                "cycle_id": { "type": "string" }
            },
            "required": ["title"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: CreateIssueArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let mut draft = ProposalDraft::new(
            "create_issue",
            json!({
                "projectId": project_id,
                "title": args.title,
                "description": args.description,
                "priority": args.priority,
                "type": args.issue_type,
                "storyPoints": args.story_points,
                "assigneeId": args.assignee_id,
                "cycleId": args.cycle_id,
            }),
            format!("Creating new issue '{}' as requested.", args.title),
        );
        draft.affected_entities = vec![json!({ "type": "project", "id": project_id })];
        draft.confidence_score = 1.0;

        self.ctx.backend.propose(draft).await
    }
}

pub struct UpdateIssue {
    ctx: Arc<ToolContext>,
}

impl UpdateIssue {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct UpdateIssueArgs {
    issue_id: String,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    story_points: Option<u32>,
    assignee_id: Option<String>,
}

#[async_trait]
impl Tool for UpdateIssue {
    fn name(&self) -> &str {
        "update_issue"
    }

    fn description(&self) -> &str {
        "Propose changes to an existing issue. Only pass the fields that should change."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_id": { "type": "string" },
                "title": { "type": "string" },
                "description": { "type": "string" },
                "status": { "type": "string", "enum": ["backlog", "todo", "in_progress", "review", "done"] },
                "priority": { "type": "string", "enum": ["critical", "high", "medium", "low"] },
                "story_points": { "type": "integer" },
                "assignee_id": { "type": "string" }
            },
            "required": ["issue_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: UpdateIssueArgs = parse_args(self.name(), args)?;

        let mut updates = Map::new();
        let fields = [
            ("title", args.title.map(Value::from)),
            ("description", args.description.map(Value::from)),
            ("status", args.status.map(Value::from)),
            ("priority", args.priority.map(Value::from)),
            ("storyPoints", args.story_points.map(Value::from)),
            ("assigneeId", args.assignee_id.map(Value::from)),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                updates.insert(key.to_string(), value);
            }
        }

        if updates.is_empty() {
            return Ok(
                "No updates specified. Please provide at least one field to update.".to_string(),
            );
        }

        let mut draft = ProposalDraft::new(
            "update_issue",
            json!({ "issueId": args.issue_id, "updates": updates }),
            format!("Updating issue {} based on user request.", args.issue_id),
        );
        draft.affected_entities = vec![json!({ "type": "issue", "id": args.issue_id })];
        draft.confidence_score = 1.0;

        self.ctx.backend.propose(draft).await
    }
}
