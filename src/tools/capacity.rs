use crate::tools::registry::Tool;
use crate::tools::{display, list, number, parse_args, ToolContext};
use crate::types::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
struct ProjectArgs {
    #[serde(default)]
    project_id: Option<String>,
}

pub struct TeamCapacityOverview {
    ctx: Arc<ToolContext>,
}

impl TeamCapacityOverview {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for TeamCapacityOverview {
    fn name(&self) -> &str {
        "get_team_capacity_overview"
    }

    fn description(&self) -> &str {
        "Get team utilization, allocated and available hours, warnings and a per-member breakdown."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ProjectArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let data = self
            .ctx
            .backend
            .call_tool("/capacity/overview", json!({ "projectId": project_id }))
            .await?;

        let team = data.get("team").cloned().unwrap_or(Value::Null);
        let mut details = vec![
            "**Team Capacity Overview**".to_string(),
            format!("👥 Team Size: {} members", number(&team, "memberCount")),
            format!("📊 Utilization: {}%", number(&team, "utilizationPercent")),
            format!("⏰ Total Capacity: {} hours/week", number(&team, "totalCapacity")),
            format!("📋 Allocated: {} hours", number(&team, "totalAllocated")),
            format!("✅ Available: {} hours", number(&team, "availableCapacity")),
        ];

        let warnings = list(&data, "warnings");
        if !warnings.is_empty() {
            details.push(String::new());
            details.push("⚠️ **Warnings:**".to_string());
            for warning in &warnings {
                details.push(format!("  • {}", display(warning, "message", "Unknown warning")));
            }
        }

        let members = list(&data, "members");
        if !members.is_empty() {
            details.push(String::new());
            details.push("**Member Breakdown:**".to_string());
            for member in &members {
                let overallocated = member
                    .get("isOverallocated")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                details.push(format!(
                    "  {} {}: {}% ({} issues)",
                    if overallocated { "🔴" } else { "🟢" },
                    display(member, "name", "Unknown"),
                    number(member, "utilizationPercent"),
                    number(member, "assignedIssues"),
                ));
            }
        }

        Ok(details.join("\n"))
    }
}

pub struct MemberWorkload {
    ctx: Arc<ToolContext>,
}

impl MemberWorkload {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct MemberArgs {
    #[serde(alias = "member_id")]
    user_id: String,
    #[serde(default)]
    project_id: Option<String>,
}

#[async_trait]
impl Tool for MemberWorkload {
    fn name(&self) -> &str {
        "get_member_workload"
    }

    fn description(&self) -> &str {
        "Get one team member's allocation, issues by status and priority, and urgent items."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "user_id": { "type": "string" } },
            "required": ["user_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: MemberArgs = parse_args(self.name(), args)?;
        let project_id = args.project_id.or_else(|| self.ctx.project_id.clone());

        let data = self
            .ctx
            .backend
            .call_tool(
                "/capacity/member-workload",
                json!({ "userId": args.user_id, "projectId": project_id }),
            )
            .await?;

        let issues = data.get("issues").cloned().unwrap_or(Value::Null);
        let by_status = issues.get("byStatus").cloned().unwrap_or(Value::Null);
        let by_priority = issues.get("byPriority").cloned().unwrap_or(Value::Null);
        let weekly = data
            .get("weeklyCapacity")
            .and_then(Value::as_f64)
            .unwrap_or(40.0);

        let mut details = vec![
            format!("**Workload: {}**", display(&data, "name", "Unknown")),
            format!("📊 Utilization: {}%", number(&data, "utilizationPercent")),
            format!(
                "⏰ Allocated: {} / {} hours",
                number(&data, "allocatedHours"),
                weekly
            ),
            format!("📦 Story Points: {}", number(&data, "allocatedPoints")),
            "**Issues by Status:**".to_string(),
            format!("  • To Do: {}", number(&by_status, "todo")),
            format!("  • In Progress: {}", number(&by_status, "in_progress")),
            format!("  • In Review: {}", number(&by_status, "review")),
            "**Issues by Priority:**".to_string(),
            format!(
                "  • Critical/High: {}",
                number(&by_priority, "critical") + number(&by_priority, "high")
            ),
            format!("  • Medium: {}", number(&by_priority, "medium")),
            format!("  • Low: {}", number(&by_priority, "low")),
        ];

        let urgent = list(&data, "urgentItems");
        if !urgent.is_empty() {
            details.push(String::new());
            details.push("🚨 **Urgent Items:**".to_string());
            for item in &urgent {
                details.push(format!(
                    "  • [{}] {}",
                    display(item, "priority", "high").to_uppercase(),
                    display(item, "title", "Untitled"),
                ));
            }
        }
        if data
            .get("isOverallocated")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            details.push(String::new());
            details.push(
                "⚠️ This team member is OVERALLOCATED. Consider reassigning some work.".to_string(),
            );
        }

        Ok(details.join("\n"))
    }
}

pub struct CheckOverallocation {
    ctx: Arc<ToolContext>,
}

impl CheckOverallocation {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct OverallocationArgs {
    #[serde(default)]
    project_id: Option<String>,
    #[serde(default = "default_threshold")]
    threshold: u32,
}

fn default_threshold() -> u32 {
    100
}

#[async_trait]
impl Tool for CheckOverallocation {
    fn name(&self) -> &str {
        "check_overallocation"
    }

    fn description(&self) -> &str {
        "Find team members whose utilization exceeds a threshold percentage (default 100)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "threshold": { "type": "integer", "default": 100 } }
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: OverallocationArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let data = self
            .ctx
            .backend
            .call_tool(
                "/capacity/check-overallocation",
                json!({ "projectId": project_id, "threshold": args.threshold }),
            )
            .await?;

        let overallocated = list(&data, "overallocatedMembers");
        if overallocated.is_empty() {
            let summary = data.get("healthySummary").cloned().unwrap_or(Value::Null);
            return Ok(format!(
                "✅ No team members are overallocated (threshold: {}%).\n\n\
                 Team Health:\n  \
                 • Underutilized (<70%): {}\n  \
                 • Optimal (70-99%): {}\n  \
                 • At Capacity (100-119%): {}",
                args.threshold,
                number(&summary, "underutilized"),
                number(&summary, "optimal"),
                number(&summary, "atCapacity"),
            ));
        }

        let mut details = vec![
            format!("⚠️ **{} Team Members Overallocated**", overallocated.len()),
            format!("(Threshold: {}%)", args.threshold),
            String::new(),
        ];
        for member in &overallocated {
            details.push(format!(
                "**{}** - {}%",
                display(member, "name", "Unknown"),
                number(member, "utilizationPercent")
            ));
            details.push(format!(
                "  • Excess: {} hours over capacity",
                number(member, "excessHours")
            ));
            details.push(format!(
                "  • Issues: {} assigned",
                number(member, "assignedIssues")
            ));
            if let Some(rec) = member.get("recommendation").and_then(Value::as_str) {
                details.push(format!("  💡 {}", rec));
            }
            details.push(String::new());
        }

        Ok(details.join("\n").trim_end().to_string())
    }
}

pub struct SuggestAssignee {
    ctx: Arc<ToolContext>,
}

impl SuggestAssignee {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct SuggestArgs {
    issue_id: String,
    #[serde(default)]
    required_skills: Option<String>,
}

#[async_trait]
impl Tool for SuggestAssignee {
    fn name(&self) -> &str {
        "suggest_assignee"
    }

    fn description(&self) -> &str {
        "Recommend who should take an issue based on workload and skills."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_id": { "type": "string" },
                "required_skills": { "type": "string", "description": "Comma-separated skills" }
            },
            "required": ["issue_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: SuggestArgs = parse_args(self.name(), args)?;
        let skills: Vec<String> = args
            .required_skills
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let data = self
            .ctx
            .backend
            .call_tool(
                "/team/suggest-assignee",
                json!({ "issueId": args.issue_id, "requiredSkills": skills }),
            )
            .await?;

        let issue = data.get("issue").cloned().unwrap_or(Value::Null);
        let mut details = vec![
            format!(
                "**Assignee Suggestion for: {}**",
                display(&issue, "title", "Unknown Issue")
            ),
            String::new(),
        ];

        match data.get("recommendation").filter(|r| r.is_object()) {
            Some(rec) => {
                let workload = rec.get("currentWorkload").cloned().unwrap_or(Value::Null);
                details.push("✅ **Recommended:**".to_string());
                details.push(format!(
                    "  {} ({})",
                    display(rec, "name", "Unknown"),
                    display(rec, "email", "")
                ));
                details.push(format!(
                    "  • Current utilization: {}%",
                    number(&workload, "utilizationPercent")
                ));
                details.push(format!(
                    "  • Active issues: {}",
                    number(&workload, "issueCount")
                ));
                if let Some(reasoning) = data.get("reasoning").and_then(Value::as_str) {
                    details.push(format!("  💡 {}", reasoning));
                }
            }
            None => details.push(
                "❌ No suitable assignee found - all team members are at capacity.".to_string(),
            ),
        }

        let alternatives = list(&data, "alternatives");
        if !alternatives.is_empty() {
            details.push(String::new());
            details.push("**Alternatives:**".to_string());
            for alt in &alternatives {
                let workload = alt.get("currentWorkload").cloned().unwrap_or(Value::Null);
                details.push(format!(
                    "  • {} - {}% utilized",
                    display(alt, "name", "Unknown"),
                    number(&workload, "utilizationPercent")
                ));
            }
        }

        Ok(details.join("\n"))
    }
}
