//! External process execution shared by all collaborators.
//!
//! Every downloader, encoder and analysis tool call goes through
//! [`ToolCommand`], which captures output, enforces a timeout and kills the
//! child when the caller gives up on it.

mod command;
mod error;

pub use command::{check_binary, ToolCommand, ToolOutput, DEFAULT_TIMEOUT_SECS};
pub use error::ToolError;
