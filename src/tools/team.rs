use crate::tools::registry::Tool;
use crate::tools::{display, list, number, parse_args, ToolContext};
use crate::types::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

fn is_lead(member: &Value) -> bool {
    member.get("isLead").and_then(Value::as_bool).unwrap_or(false)
}

fn skill_label(skill: &Value) -> String {
    format!(
        "{} ({})",
        display(skill, "skill", "unknown"),
        display(skill, "level", "mid")
    )
}

pub struct ListTeamMembers {
    ctx: Arc<ToolContext>,
}

impl ListTeamMembers {
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
impl Tool for ListTeamMembers {
    fn name(&self) -> &str {
        "list_team_members"
    }

    fn description(&self) -> &str {
        "List the project team with roles, leads and top skills."
    }

    fn parameters_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: ProjectArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let result = self
            .ctx
            .backend
            .call_tool("/team/list", json!({ "projectId": project_id }))
            .await?;

        let mut members = list(&result, "members");
        if members.is_empty() {
            return Ok("No team members found for this project.".to_string());
        }
        // Leads first, otherwise keep backend order
        members.sort_by_key(|m| !is_lead(m));

        let mut formatted = vec!["**Project Team**".to_string(), String::new()];
        for member in &members {
            let badge = if is_lead(member) { " 👑 (Lead)" } else { "" };
            formatted.push(format!("• **{}**{}", display(member, "name", "Unknown"), badge));
            formatted.push(format!("  📧 {}", display(member, "email", "")));

            let skills = list(member, "skills");
            if !skills.is_empty() {
                let labels: Vec<String> = skills.iter().take(5).map(skill_label).collect();
                formatted.push(format!("  🛠️ Skills: {}", labels.join(", ")));
            }
            formatted.push(String::new());
        }
        formatted.push(format!("**Total:** {} members", members.len()));

        Ok(formatted.join("\n"))
    }
}

pub struct MemberSkills {
    ctx: Arc<ToolContext>,
}

impl MemberSkills {
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
impl Tool for MemberSkills {
    fn name(&self) -> &str {
        "get_member_skills"
    }

    fn description(&self) -> &str {
        "Get a team member's skills with levels, plus their current workload."
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

        // Workload payload carries the skills too
        let data = self
            .ctx
            .backend
            .call_tool(
                "/capacity/member-workload",
                json!({ "userId": args.user_id, "projectId": project_id }),
            )
            .await?;

        if !data.is_object() {
            return Ok("Member not found.".to_string());
        }

        let issues = data.get("issues").cloned().unwrap_or(Value::Null);
        let mut formatted = vec![
            format!("**{}**", display(&data, "name", "Unknown")),
            String::new(),
            "**Current Workload:**".to_string(),
            format!("  • Utilization: {}%", number(&data, "utilizationPercent")),
            format!("  • Active Issues: {}", number(&issues, "total")),
            String::new(),
        ];

        let skills = list(&data, "skills");
        if skills.is_empty() {
            formatted.push("*No skills data available*".to_string());
        } else {
            formatted.push("**Skills:**".to_string());
            for skill in &skills {
                let icon = match skill.get("level").and_then(Value::as_str).unwrap_or("mid") {
                    "junior" => "🟢",
                    "mid" => "🟡",
                    "senior" => "🟠",
                    "expert" => "🔴",
                    _ => "⚪",
                };
                formatted.push(format!("  {} {}", icon, skill_label(skill)));
            }
        }

        Ok(formatted.join("\n"))
    }
}
