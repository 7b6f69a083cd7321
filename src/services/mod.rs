//! Request-level services behind the chat orchestrator endpoints

pub mod chat_processor;
pub mod insight_generator;
pub mod summarizer;
pub mod telemetry;
pub mod title_generator;

pub use chat_processor::ChatProcessor;
pub use insight_generator::InsightGenerator;
pub use summarizer::Summarizer;
pub use telemetry::{TelemetryEvent, TelemetryReporter};
pub use title_generator::TitleGenerator;
