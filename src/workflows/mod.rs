//! DevTel AI workflows
//!
//! Five single-shot workflows (prioritize, suggest-sprint, breakdown,
//! suggest-assignee, generate-spec). Each asks the provider cascade for a
//! structured answer and falls back to a deterministic one when the model
//! is unavailable or its output cannot be used.
//!
//! ```ignore
//! let service = WorkflowService::new(factory);
//! let result = service.run(Workflow::Prioritize, &json!({"issues": issues})).await;
//! ```

pub mod engine;
pub mod fallback;

pub use engine::{parse_workflow_output, Workflow, WorkflowService};
