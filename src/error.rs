//! Error types for rpatcho

use thiserror::Error;

/// Main error type for dylib patching operations
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse Mach-O file: {0}")]
    Parse(#[from] goblin::error::Error),

    #[error("could not read load command string: {0}")]
    ReadString(#[from] scroll::Error),

    #[error("fat binary given; a single-architecture thin binary is required")]
    FatBinary,

    #[error("malformed binary: {0}")]
    MalformedBinary(String),

    #[error("failed to find install_name_tool: please install Xcode command line tools")]
    ToolNotFound(#[from] which::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Failure of a single external editing tool invocation.
///
/// Carries the full argument vector and combined output so callers can
/// report exactly what was attempted.
#[derive(Error, Debug)]
#[error("{program} failed with exit code {code:?} (args: {args:?})\noutput: {output}")]
pub struct ToolError {
    /// Program that was invoked
    pub program: String,
    /// Arguments passed to the program, target file last
    pub args: Vec<String>,
    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}
