//! rpatcho: patches dylib load commands for bundled distribution
//!
//! This library rewrites the dependency metadata of a Mach-O dylib so that
//! it resolves its non-system dependencies through a runtime search path
//! (`@rpath`) instead of fixed filesystem paths. It computes the minimal set
//! of rewrites from the binary's load commands and applies them with a
//! single `install_name_tool` invocation; a binary that is already fully
//! relocated is left untouched.
//!
//! # Example
//!
//! ```no_run
//! use rpatcho::DylibPatcher;
//!
//! // Inspect a dylib
//! let patcher = DylibPatcher::open("libtest.dylib").unwrap();
//!
//! // Point all non-system dependencies at the bundle's Frameworks directory
//! patcher.relocate("@loader_path/../Frameworks").unwrap();
//! ```

pub mod error;
pub mod macho;
pub mod plan;
pub mod policy;
pub mod tool;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

pub use error::PatchError;
pub use error::ToolError;
pub use macho::BinaryFacts;
pub use macho::DylibRefKind;
pub use macho::LoadCommand;
pub use macho::is_macho_file;
pub use macho::read_load_commands;
pub use plan::RewritePlan;
pub use plan::plan_rewrites;
pub use policy::RewritePolicy;
pub use tool::EditOp;
pub use tool::InstallNameTool;
pub use tool::build_edit_ops;

/// High-level API for relocating a dylib onto a runtime search path
///
/// Reads the binary's load commands once on open; planning is pure and can
/// be inspected before anything is applied.
pub struct DylibPatcher {
    path: PathBuf,
    facts: BinaryFacts,
    policy: RewritePolicy,
}

impl DylibPatcher {
    /// Open a dylib with the default rewrite policy
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PatchError> {
        Self::with_policy(path, RewritePolicy::default())
    }

    /// Open a dylib with a custom rewrite policy
    pub fn with_policy(path: impl AsRef<Path>, policy: RewritePolicy) -> Result<Self, PatchError> {
        let path = path.as_ref().to_path_buf();
        let data = fs::read(&path)?;
        let commands = read_load_commands(&data)?;
        let facts = BinaryFacts::from_commands(&commands)?;

        Ok(Self {
            path,
            facts,
            policy,
        })
    }

    /// Get the path to the binary
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the classified dependency metadata
    pub fn facts(&self) -> &BinaryFacts {
        &self.facts
    }

    /// Get the rewrite policy in effect
    pub fn policy(&self) -> &RewritePolicy {
        &self.policy
    }

    /// Compute the rewrite plan for the given target rpath
    pub fn plan(&self, target_rpath: &str) -> RewritePlan {
        plan_rewrites(&self.facts, target_rpath, &self.policy)
    }

    /// Plan and apply all rewrites with install_name_tool from PATH.
    ///
    /// When the plan is empty no tool is looked up or invoked.
    pub fn relocate(&self, target_rpath: &str) -> Result<(), PatchError> {
        let ops = build_edit_ops(&self.plan(target_rpath));
        if ops.is_empty() {
            tracing::debug!(file = %self.path.display(), "already relocated");
            return Ok(());
        }
        InstallNameTool::locate()?.apply(&self.path, &ops)
    }

    /// Plan and apply all rewrites with a specific tool
    pub fn relocate_with(
        &self,
        target_rpath: &str,
        tool: &InstallNameTool,
    ) -> Result<(), PatchError> {
        let ops = build_edit_ops(&self.plan(target_rpath));
        tool.apply(&self.path, &ops)
    }
}

/// Relocate a dylib onto `target_rpath` with the default policy.
///
/// The single-call equivalent of open + relocate.
pub fn relocate_dylib(path: impl AsRef<Path>, target_rpath: &str) -> Result<(), PatchError> {
    DylibPatcher::open(path)?.relocate(target_rpath)
}
