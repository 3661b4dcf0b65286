//! Decides which rewrites relocate a binary onto a runtime search path

use std::path::Path;

use crate::macho::BinaryFacts;
use crate::policy::RewritePolicy;

use super::types::RewritePlan;

/// Join the search-path token with just the file name component of a path,
/// discarding all directory components.
fn rpath_form(token: &str, path: &str) -> String {
    match Path::new(path).file_name() {
        Some(name) => format!("{}/{}", token, name.to_string_lossy()),
        None => path.to_string(),
    }
}

/// Compute the minimal rewrite plan for one binary.
///
/// Pure function of its inputs; never touches the binary or the filesystem.
pub fn plan_rewrites(
    facts: &BinaryFacts,
    target_rpath: &str,
    policy: &RewritePolicy,
) -> RewritePlan {
    let token = policy.search_path_token.as_str();
    let mut plan = RewritePlan::default();

    // If the dylib has an identity set, normalize it to `@rpath/basename`.
    if let Some(identity) = facts.identity.as_deref() {
        let normalized = rpath_form(token, identity);
        if normalized != identity {
            plan.identity_rewrite = Some((identity.to_string(), normalized));
        }
    }

    // Find dependencies whose prefix path should change to the search-path
    // token. If any dependency ends up using the token, originally or due to
    // a rewrite, the target rpath must be present on the binary.
    let mut rpath_required = false;
    for dependency in &facts.dependencies {
        // Leave system dynamic libraries unchanged.
        if policy.is_system_path(dependency) {
            continue;
        }
        if policy.is_exempt(dependency) {
            continue;
        }

        // This dependency will end up using the token, modified or not.
        rpath_required = true;

        let new_path = rpath_form(token, dependency);
        if *dependency != new_path {
            plan.dependency_rewrites
                .push((dependency.clone(), new_path));
        }
    }

    // Remove every existing rpath except the target (if already declared).
    // Removing and re-adding the same value in one edit is not allowed.
    plan.search_paths_to_remove = facts
        .search_paths
        .iter()
        .filter(|path| path.as_str() != target_rpath)
        .cloned()
        .collect();

    // An rpath entry only matters when a dependency resolves through the
    // token; the identity alone never requires one.
    if rpath_required && !facts.search_paths.contains(target_rpath) {
        plan.search_path_to_add = Some(target_rpath.to_string());
    }

    plan
}
