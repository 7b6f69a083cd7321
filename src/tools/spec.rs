use crate::backend::ProposalDraft;
use crate::tools::registry::Tool;
use crate::tools::{display, list, parse_args, ToolContext};
use crate::types::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const DEFAULT_CHANGE_LOG: &str = "Updated via AI agent";

pub struct ListSpecs {
    ctx: Arc<ToolContext>,
}

impl ListSpecs {
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
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    20
}

#[async_trait]
impl Tool for ListSpecs {
    fn name(&self) -> &str {
        "list_specs"
    }

    fn description(&self) -> &str {
        "List specification documents (PRDs, technical specs) with their status."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "status": { "type": "string", "enum": ["draft", "review", "approved", "archived"] },
                "limit": { "type": "integer", "default": 20 }
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
                "/specs/list",
                json!({ "projectId": project_id, "status": args.status, "limit": args.limit }),
            )
            .await?;

        let specs = list(&result, "specs");
        if specs.is_empty() {
            return Ok("No specs found for this project.".to_string());
        }

        let mut formatted = vec!["**Specification Documents**".to_string(), String::new()];
        for spec in &specs {
            let status = display(spec, "status", "draft");
            let icon = match status.as_str() {
                "draft" => "📝",
                "review" => "👀",
                "approved" => "✅",
                "archived" => "📦",
                _ => "📄",
            };
            formatted.push(format!(
                "{} **{}** ({}) ID: {}",
                icon,
                display(spec, "title", "Untitled"),
                status,
                display(spec, "id", "?")
            ));
            if let Some(author) = spec.get("author").filter(|a| a.is_object()) {
                formatted.push(format!("   Author: {}", display(author, "fullName", "Unknown")));
            }
            formatted.push(format!("   Updated: {}", display(spec, "updatedAt", "N/A")));
        }

        Ok(formatted.join("\n"))
    }
}

pub struct GetSpec {
    ctx: Arc<ToolContext>,
}

impl GetSpec {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct SpecIdArgs {
    spec_id: String,
}

#[async_trait]
impl Tool for GetSpec {
    fn name(&self) -> &str {
        "get_spec"
    }

    fn description(&self) -> &str {
        "Read one specification document in full."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "spec_id": { "type": "string" } },
            "required": ["spec_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: SpecIdArgs = parse_args(self.name(), args)?;
        let spec = self
            .ctx
            .backend
            .call_tool("/specs/get", json!({ "specId": args.spec_id }))
            .await?;

        if !spec.is_object() {
            return Ok("Spec not found.".to_string());
        }

        let author = spec.get("author").cloned().unwrap_or(Value::Null);
        let details = [
            format!("# {}", display(&spec, "title", "Untitled Spec")),
            String::new(),
            format!("**Status:** {}", display(&spec, "status", "draft")),
            format!("**Author:** {}", display(&author, "fullName", "Unknown")),
            format!("**Created:** {}", display(&spec, "createdAt", "N/A")),
            format!("**Updated:** {}", display(&spec, "updatedAt", "N/A")),
            String::new(),
            "---".to_string(),
            String::new(),
            display(&spec, "content", "*No content available*"),
        ];

        Ok(details.join("\n"))
    }
}

pub struct CreateSpec {
    ctx: Arc<ToolContext>,
}

impl CreateSpec {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct CreateArgs {
    #[serde(default)]
    project_id: Option<String>,
    title: String,
    content: String,
}

#[async_trait]
impl Tool for CreateSpec {
    fn name(&self) -> &str {
        "create_spec"
    }

    fn description(&self) -> &str {
        "Propose a new specification document written in markdown."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "content": { "type": "string", "description": "Full markdown body" }
            },
            "required": ["title", "content"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: CreateArgs = parse_args(self.name(), args)?;
        let project_id = self.ctx.project_id(args.project_id)?;

        let mut draft = ProposalDraft::new(
            "create_spec",
            json!({ "projectId": project_id, "title": args.title, "content": args.content }),
            format!("Creating new spec '{}'.", args.title),
        );
        draft.affected_entities = vec![json!({ "type": "project", "id": project_id })];
        draft.confidence_score = 1.0;

        self.ctx.backend.propose(draft).await
    }
}

pub struct UpdateSpec {
    ctx: Arc<ToolContext>,
}

impl UpdateSpec {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        Self { ctx }
    }
}

#[derive(Deserialize)]
struct UpdateArgs {
    spec_id: String,
    title: Option<String>,
    content: Option<String>,
    status: Option<String>,
    change_log: Option<String>,
}

#[async_trait]
impl Tool for UpdateSpec {
    fn name(&self) -> &str {
        "update_spec"
    }

    fn description(&self) -> &str {
        "Propose changes to a specification. Content changes create a new version."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "spec_id": { "type": "string" },
                "title": { "type": "string" },
                "content": { "type": "string" },
                "status": { "type": "string", "enum": ["draft", "review", "approved", "archived"] },
                "change_log": { "type": "string" }
            },
            "required": ["spec_id"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let args: UpdateArgs = parse_args(self.name(), args)?;

        let mut updates = Map::new();
        for (key, value) in [
            ("title", args.title),
            ("content", args.content),
            ("status", args.status),
        ] {
            if let Some(value) = value {
                updates.insert(key.to_string(), Value::from(value));
            }
        }
        if updates.is_empty() {
            return Ok("No updates provided.".to_string());
        }

        let mut draft = ProposalDraft::new(
            "update_spec",
            json!({
                "specId": args.spec_id,
                "updates": updates,
                "changeLog": args.change_log.unwrap_or_else(|| DEFAULT_CHANGE_LOG.to_string()),
            }),
            format!("Updating spec {}.", args.spec_id),
        );
        draft.affected_entities = vec![json!({ "type": "spec", "id": args.spec_id })];
        draft.confidence_score = 1.0;

        self.ctx.backend.propose(draft).await
    }
}
