//! Tool modules for the toolchat agent.

pub mod base;
pub mod calculate;
pub mod function;
pub mod registry;

pub use base::{require_string, Tool, ToolArgs};
pub use calculate::CalculateTool;
pub use function::FunctionTool;
pub use registry::ToolRegistry;
