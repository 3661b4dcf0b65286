//! Types describing a computed set of load-command rewrites

use std::collections::BTreeSet;

/// The minimal set of edits that relocates a binary onto the runtime
/// search path.
///
/// By construction the target search path never appears both as a removal
/// and as the addition; `install_name_tool` rejects `-delete_rpath` and
/// `-add_rpath` with the same value in one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewritePlan {
    /// Replacement for the dylib's own install name, as (old, new)
    pub identity_rewrite: Option<(String, String)>,
    /// Dependency path replacements, in deterministic discovery order
    pub dependency_rewrites: Vec<(String, String)>,
    /// Existing runtime search paths slated for removal
    pub search_paths_to_remove: BTreeSet<String>,
    /// Target search path, when it is needed and not already declared
    pub search_path_to_add: Option<String>,
}

impl RewritePlan {
    /// An empty plan means the binary is already fully relocated
    pub fn is_empty(&self) -> bool {
        self.identity_rewrite.is_none()
            && self.dependency_rewrites.is_empty()
            && self.search_paths_to_remove.is_empty()
            && self.search_path_to_add.is_none()
    }
}
