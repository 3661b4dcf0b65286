//! Types for Mach-O dependency metadata

use std::collections::BTreeSet;

use crate::error::PatchError;

/// Which relocatable dylib-reference command a dependency came from.
///
/// These are the five load-command variants whose paths identify another
/// dylib this binary depends on and which may be rewritten to an rpath form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DylibRefKind {
    /// LC_LOAD_DYLIB
    Load,
    /// LC_LOAD_UPWARD_DYLIB
    Upward,
    /// LC_LOAD_WEAK_DYLIB
    Weak,
    /// LC_PREBOUND_DYLIB
    Prebound,
    /// LC_REEXPORT_DYLIB
    Reexport,
}

/// One entry of a binary's dependency metadata table.
///
/// Produced by the reader with path strings already decoded and NUL-stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    /// LC_ID_DYLIB - the dylib's own install name
    DylibId { path: String },
    /// A dependency on another dylib
    DylibRef { kind: DylibRefKind, path: String },
    /// LC_RPATH - a runtime search path entry
    Rpath { path: String },
    /// Any other load command; carried for completeness, never rewritten
    Other { cmd: u32 },
}

/// Dependency metadata extracted from a single Mach-O header.
///
/// The sets are deduplicated and iterate in sorted order, so plans derived
/// from the same binary always come out in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryFacts {
    /// LC_ID_DYLIB path, present when the binary is itself a dylib
    pub identity: Option<String>,
    /// Paths of all linked dylibs
    pub dependencies: BTreeSet<String>,
    /// Existing LC_RPATH entries
    pub search_paths: BTreeSet<String>,
}

impl BinaryFacts {
    /// Classify a binary's load commands into dependency metadata.
    ///
    /// A binary with more than one LC_ID_DYLIB command is rejected as
    /// malformed rather than silently keeping one of them.
    pub fn from_commands(commands: &[LoadCommand]) -> Result<Self, PatchError> {
        let mut facts = BinaryFacts::default();

        for command in commands {
            match command {
                LoadCommand::DylibId { path } => {
                    if facts.identity.is_some() {
                        return Err(PatchError::MalformedBinary(
                            "more than one LC_ID_DYLIB load command".to_string(),
                        ));
                    }
                    facts.identity = Some(path.clone());
                }
                LoadCommand::DylibRef { path, .. } => {
                    facts.dependencies.insert(path.clone());
                }
                LoadCommand::Rpath { path } => {
                    facts.search_paths.insert(path.clone());
                }
                LoadCommand::Other { .. } => {}
            }
        }

        Ok(facts)
    }
}
