//! External tool plumbing.
//!
//! - **Toolset**: locates the four required programs once at startup
//! - **ToolRunner**: runs a command to completion (or a two-stage pipe),
//!   collecting stderr for diagnosis and mapping exit status to errors
//!
//! Commands always receive absolute paths. A tool that writes into its
//! working directory gets one set on its own `Command`; the process-wide
//! working directory is never changed.

mod locate;
mod runner;
mod types;

pub use locate::{find_program, Toolset};
pub use runner::{describe_command, ToolRunner};
pub use types::{ToolError, ToolResult, ToolRole};
