//! Building and running install_name_tool invocations

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use crate::error::PatchError;
use crate::error::ToolError;
use crate::plan::RewritePlan;

/// A single edit applied by the external editing tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// `-id <new>`: replace the dylib's install name
    SetId { new: String },
    /// `-change <old> <new>`: replace a dependency path
    ChangeDep { old: String, new: String },
    /// `-delete_rpath <path>`: drop a runtime search path entry
    DeleteRpath { path: String },
    /// `-add_rpath <path>`: declare a runtime search path entry
    AddRpath { path: String },
}

impl EditOp {
    fn push_args(&self, args: &mut Vec<String>) {
        match self {
            EditOp::SetId { new } => {
                args.push("-id".to_string());
                args.push(new.clone());
            }
            EditOp::ChangeDep { old, new } => {
                args.push("-change".to_string());
                args.push(old.clone());
                args.push(new.clone());
            }
            EditOp::DeleteRpath { path } => {
                args.push("-delete_rpath".to_string());
                args.push(path.clone());
            }
            EditOp::AddRpath { path } => {
                args.push("-add_rpath".to_string());
                args.push(path.clone());
            }
        }
    }
}

/// Serialize a plan into tool operations.
///
/// Fixed order: identity change, dependency changes, rpath removals, rpath
/// addition. An empty plan yields an empty list.
pub fn build_edit_ops(plan: &RewritePlan) -> Vec<EditOp> {
    let mut ops = Vec::new();

    if let Some((_, new)) = &plan.identity_rewrite {
        ops.push(EditOp::SetId { new: new.clone() });
    }

    for (old, new) in &plan.dependency_rewrites {
        ops.push(EditOp::ChangeDep {
            old: old.clone(),
            new: new.clone(),
        });
    }

    for path in &plan.search_paths_to_remove {
        ops.push(EditOp::DeleteRpath { path: path.clone() });
    }

    if let Some(path) = &plan.search_path_to_add {
        ops.push(EditOp::AddRpath { path: path.clone() });
    }

    ops
}

/// Handle to the external editing tool
#[derive(Debug, Clone)]
pub struct InstallNameTool {
    program: PathBuf,
}

impl InstallNameTool {
    /// Find install_name_tool on PATH
    pub fn locate() -> Result<Self, PatchError> {
        Ok(Self {
            program: which::which("install_name_tool")?,
        })
    }

    /// Use a specific program instead of looking one up on PATH
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The flat argument vector for one invocation, target file last
    pub fn args_for(ops: &[EditOp], file: &Path) -> Vec<String> {
        let mut args = Vec::new();
        for op in ops {
            op.push_args(&mut args);
        }
        args.push(file.to_string_lossy().into_owned());
        args
    }

    /// Apply the operations to the file in a single tool invocation.
    ///
    /// An empty operation list is a valid no-op and spawns no process. A
    /// non-zero exit is a hard failure carrying the argument vector and the
    /// combined output; there is no retry and no rollback.
    pub fn apply(&self, file: &Path, ops: &[EditOp]) -> Result<(), PatchError> {
        if ops.is_empty() {
            tracing::debug!(file = %file.display(), "nothing to rewrite");
            return Ok(());
        }

        let args = Self::args_for(ops, file);
        tracing::info!(
            program = %self.program.display(),
            operations = ops.len(),
            file = %file.display(),
            "rewriting load commands"
        );

        let output = Command::new(&self.program).args(&args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(ToolError {
                program: self.program.to_string_lossy().into_owned(),
                args,
                code: output.status.code(),
                output: combined,
            }
            .into());
        }

        Ok(())
    }
}
