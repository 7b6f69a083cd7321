use crate::tools::registry::Tool;
use crate::tools::{display, list, parse_args, ToolContext};
use crate::types::Result;
use crate::utils::json::truncate_chars;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_COMMITS_SHOWN: usize = 15;

pub(crate) fn format_commit(commit: &Value) -> String {
    let sha = display(commit, "sha", "unknown");
    let date = display(commit, "date", "");
    format!(
        "• `{}` {} - **{}** ({})",
        truncate_chars(&sha, 7),
        display(commit, "message", ""),
        display(commit, "author", "unknown"),
        truncate_chars(&date, 10),
    )
}

pub struct RecentCommits {
    ctx: Arc<ToolContext>,
}

impl RecentCommits {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct CommitArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

#[async_trait]
impl Tool for RecentCommits {
    fn name(&self) -> &str {
        "get_recent_commits"
    }

    fn description(&self) -> &str {
        "List recent commits with authors, to see who has been working on what."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "days": { "type": "integer", "default": 7 } }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: CommitArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let result = self
            .ctx
            .backend
            .call_tool(
                "/git/commits",
                json!({ "projectId": project_id, "days": args.days }),
            )
            .await?;

        let commits = list(&result, "commits");
        if commits.is_empty() {
            return Ok("No recent commits found.".to_string());
        }

        let mut formatted = vec![
            format!("**Recent Commits (Last {} days)**", args.days),
            String::new(),
        ];
        formatted.extend(commits.iter().take(MAX_COMMITS_SHOWN).map(format_commit));
        if commits.len() > MAX_COMMITS_SHOWN {
            formatted.push(format!("...and {} more", commits.len() - MAX_COMMITS_SHOWN));
        }

        Ok(formatted.join("\n"))
    }
}

pub struct PullRequests {
    ctx: Arc<ToolContext>,
}

impl PullRequests {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct PrArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default = "default_status")]
    status: String,
}

fn default_status() -> String {
    "open".to_string()
}

#[async_trait]
impl Tool for PullRequests {
    fn name(&self) -> &str {
        "get_pull_requests"
    }

    fn description(&self) -> &str {
        "List pull requests linked to the project by status (open, closed, merged, all)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["open", "closed", "merged", "all"], "default": "open" }
            }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: PrArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let result = self
            .ctx
            .backend
            .call_tool(
                "/git/prs",
                json!({ "projectId": project_id, "status": args.status }),
            )
            .await?;

        let prs = list(&result, "pullRequests");
        if prs.is_empty() {
            return Ok(format!("No {} PRs found.", args.status));
        }

        let mut formatted = vec![format!("**Pull Requests ({})**", args.status), String::new()];
        for pr in &prs {
            let icon = match pr.get("status").and_then(Value::as_str) {
                Some("open") => "🟢",
                Some("merged") => "🟣",
                Some("closed") => "🔴",
                _ => "⚪",
            };
            formatted.push(format!(
                "{} **{}** ({})\n   url: {}",
                icon,
                display(pr, "title", "Untitled"),
                display(pr, "author", "unknown"),
                display(pr, "url", "")
            ));
        }

        Ok(formatted.join("\n"))
    }
}
