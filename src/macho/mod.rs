//! Mach-O load-command reading and classification

mod reader;
mod types;

pub use reader::is_macho_file;
pub use reader::read_load_commands;
pub use types::BinaryFacts;
pub use types::DylibRefKind;
pub use types::LoadCommand;
