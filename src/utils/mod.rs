/// Layered service settings (defaults, TOML file, environment).
pub mod config;
/// Helpers for pulling JSON out of free-form model output.
pub mod json;
