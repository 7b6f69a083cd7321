//! Agent personas, intent routing and the tool-using executor
//!
//! - [`router`] picks a persona from the message text
//! - [`definitions`] holds the persona catalog
//! - [`executor`] runs a persona against an LLM and its backend tools

pub mod definitions;
pub mod executor;
pub mod router;

pub use definitions::{agent_infos, get_agent, AgentProfile};
pub use executor::{AgentExecutor, AgentStep};
pub use router::{detect, select_agent, Intent};
