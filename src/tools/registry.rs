use crate::tools::ToolContext;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    /// Run the tool and render its result as text for the model
    async fn execute(&self, args: Value) -> Result<String>;
}

/// What the model is told about a tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Named groups that can be granted to an agent on top of its own tools
pub const TOOL_GROUPS: &[(&str, &[&str])] = &[
    (
        "issues",
        &["search_issues", "get_issue_details", "create_issue", "update_issue"],
    ),
    (
        "cycles",
        &["list_cycles", "get_active_cycle", "get_cycle_metrics"],
    ),
    (
        "capacity",
        &[
            "get_team_capacity_overview",
            "get_member_workload",
            "check_overallocation",
            "suggest_assignee",
        ],
    ),
    ("team", &["list_team_members", "get_member_skills"]),
    (
        "specs",
        &["list_specs", "get_spec", "create_spec", "update_spec"],
    ),
    ("git", &["get_recent_commits", "get_pull_requests"]),
    ("project", &["get_project_summary"]),
];

pub fn group_tools(group: &str) -> Option<&'static [&'static str]> {
    TOOL_GROUPS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(group.trim()))
        .map(|(_, tools)| *tools)
}

pub struct ToolRegistry {
    // Ordered so prompts list tools deterministically
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Every backend tool, bound to one request context
    pub fn for_backend(ctx: Arc<ToolContext>) -> Self {
        use crate::tools::{capacity, cycle, git, issue, project, spec, team};

        let mut registry = Self::new();

        registry.register(Arc::new(issue::SearchIssues::new(ctx.clone())));
        registry.register(Arc::new(issue::GetIssueDetails::new(ctx.clone())));
        registry.register(Arc::new(issue::CreateIssue::new(ctx.clone())));
        registry.register(Arc::new(issue::UpdateIssue::new(ctx.clone())));

        registry.register(Arc::new(cycle::ListCycles::new(ctx.clone())));
        registry.register(Arc::new(cycle::GetActiveCycle::new(ctx.clone())));
        registry.register(Arc::new(cycle::GetCycleMetrics::new(ctx.clone())));

        registry.register(Arc::new(capacity::TeamCapacityOverview::new(ctx.clone())));
        registry.register(Arc::new(capacity::MemberWorkload::new(ctx.clone())));
        registry.register(Arc::new(capacity::CheckOverallocation::new(ctx.clone())));
        registry.register(Arc::new(capacity::SuggestAssignee::new(ctx.clone())));

        registry.register(Arc::new(team::ListTeamMembers::new(ctx.clone())));
        registry.register(Arc::new(team::MemberSkills::new(ctx.clone())));

        registry.register(Arc::new(spec::ListSpecs::new(ctx.clone())));
        registry.register(Arc::new(spec::GetSpec::new(ctx.clone())));
        registry.register(Arc::new(spec::CreateSpec::new(ctx.clone())));
        registry.register(Arc::new(spec::UpdateSpec::new(ctx.clone())));

        registry.register(Arc::new(git::RecentCommits::new(ctx.clone())));
        registry.register(Arc::new(git::PullRequests::new(ctx.clone())));

        registry.register(Arc::new(project::ProjectSummary::new(ctx)));

        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Keep only the named tools
    pub fn retain(&mut self, allowed: &HashSet<String>) {
        self.tools.retain(|name, _| allowed.contains(name));
    }

    pub fn get_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        if let Some(tool) = self.tools.get(name) {
            tool.execute(args).await
        } else {
            Err(AppError::NotFound(format!("Tool not found: {}", name)))
        }
    }

    /// Get a list of all registered tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendClient, RequestScope};
    use crate::utils::config::Settings;

    fn context() -> Arc<ToolContext> {
        let backend = BackendClient::new(
            reqwest::Client::new(),
            &Settings::default(),
            RequestScope::new("t", "u"),
        );
        Arc::new(ToolContext::new(backend, Some("p1".to_string())))
    }

    #[test]
    fn test_every_group_tool_is_registered() {
        let registry = ToolRegistry::for_backend(context());
        for (group, tools) in TOOL_GROUPS {
            for tool in *tools {
                assert!(registry.has_tool(tool), "{} from {} missing", tool, group);
            }
        }
        assert_eq!(registry.tool_names().len(), 20);
    }

    #[test]
    fn test_retain_filters_tools() {
        let mut registry = ToolRegistry::for_backend(context());
        let allowed: HashSet<String> = ["search_issues", "get_spec"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        registry.retain(&allowed);
        assert_eq!(registry.tool_names(), vec!["get_spec", "search_issues"]);
    }

    #[test]
    fn test_group_lookup_is_case_insensitive() {
        assert_eq!(group_tools("Git").unwrap().len(), 2);
        assert!(group_tools("calendar").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let registry = ToolRegistry::new();
        let result = registry.execute("nope", Value::Null).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_definitions_include_schemas() {
        let registry = ToolRegistry::for_backend(context());
        for def in registry.get_tool_definitions() {
            assert_eq!(def.parameters["type"], "object", "{}", def.name);
            assert!(!def.description.is_empty());
        }
    }
}
