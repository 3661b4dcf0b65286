//! Path exemption policy for dependency rewriting
//!
//! The set of locations that count as operating-system libraries, and the
//! legacy framework locations exempted from rewriting, are data rather than
//! part of the planning algorithm so they can be extended independently.

/// Configuration consulted when deciding whether a dependency path is
/// rewritten to resolve through the runtime search path.
#[derive(Debug, Clone)]
pub struct RewritePolicy {
    /// Marker token prefixed to rewritten basenames, normally `@rpath`
    pub search_path_token: String,
    /// Directories whose contents are OS libraries and stay untouched
    pub system_prefixes: Vec<String>,
    /// Substrings marking historically-exempted framework locations
    pub exempt_substrings: Vec<String>,
}

impl Default for RewritePolicy {
    fn default() -> Self {
        Self {
            search_path_token: "@rpath".to_string(),
            system_prefixes: vec!["/usr/lib".to_string(), "/System/Library".to_string()],
            // The older python.org builds link _tkinter against
            // /Library/Frameworks/Tcl.framework and Tk.framework even though
            // the actual frameworks live under /System/Library/Frameworks,
            // so they escape the system-prefix check.
            exempt_substrings: vec![
                "/Library/Frameworks/Tcl.framework/".to_string(),
                "/Library/Frameworks/Tk.framework/".to_string(),
            ],
        }
    }
}

impl RewritePolicy {
    /// Whether the path lies under one of the system library directories.
    ///
    /// Matches on path-component boundaries, so `/usr/libfoo.dylib` is not
    /// considered a system path.
    pub fn is_system_path(&self, path: &str) -> bool {
        self.system_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || (path.starts_with(prefix) && path[prefix.len()..].starts_with('/'))
        })
    }

    /// Whether the path matches one of the legacy framework exemptions
    pub fn is_exempt(&self, path: &str) -> bool {
        self.exempt_substrings
            .iter()
            .any(|substring| path.contains(substring))
    }
}
