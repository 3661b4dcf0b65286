//! Mach-O load-command extraction using goblin
//!
//! This module is the only place that touches the binary container format.
//! goblin parses the header and load-command table; the path payloads are
//! read out of the raw bytes with scroll, which stops at the first NUL, so
//! the trailing NUL padding of lc_str fields never reaches the classifier.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use goblin::mach::load_command::CommandVariant;
use goblin::mach::Mach;
use scroll::Pread;

use crate::error::PatchError;

use super::types::DylibRefKind;
use super::types::LoadCommand;

/// Only parse the magic number of a file and check if it is a thin Mach-O
pub fn is_macho_file(path: &Path) -> Result<bool, std::io::Error> {
    let mut file = File::open(path)?;
    let mut buf: [u8; 4] = [0; 4];
    file.read_exact(&mut buf)?;
    match goblin::mach::parse_magic_and_ctx(&buf, 0) {
        Ok((_, Some(_))) => Ok(true),
        Ok((_, None)) => Ok(false),
        Err(_) => Ok(false),
    }
}

/// Extract the load-command table of a single-architecture Mach-O binary.
///
/// Fat (universal) binaries are rejected; the caller is expected to supply a
/// thin binary rather than have one slice picked silently.
pub fn read_load_commands(data: &[u8]) -> Result<Vec<LoadCommand>, PatchError> {
    let macho = match Mach::parse(data)? {
        Mach::Binary(macho) => macho,
        Mach::Fat(_) => return Err(PatchError::FatBinary),
    };

    let mut commands = Vec::with_capacity(macho.load_commands.len());
    for cmd in macho.load_commands.iter() {
        let command = match cmd.command {
            CommandVariant::IdDylib(ref id) => LoadCommand::DylibId {
                path: read_lc_str(data, cmd.offset + id.dylib.name as usize)?,
            },
            CommandVariant::LoadDylib(ref d) => LoadCommand::DylibRef {
                kind: DylibRefKind::Load,
                path: read_lc_str(data, cmd.offset + d.dylib.name as usize)?,
            },
            CommandVariant::LoadUpwardDylib(ref d) => LoadCommand::DylibRef {
                kind: DylibRefKind::Upward,
                path: read_lc_str(data, cmd.offset + d.dylib.name as usize)?,
            },
            CommandVariant::LoadWeakDylib(ref d) => LoadCommand::DylibRef {
                kind: DylibRefKind::Weak,
                path: read_lc_str(data, cmd.offset + d.dylib.name as usize)?,
            },
            CommandVariant::PreboundDylib(ref d) => LoadCommand::DylibRef {
                kind: DylibRefKind::Prebound,
                path: read_lc_str(data, cmd.offset + d.name as usize)?,
            },
            CommandVariant::ReexportDylib(ref d) => LoadCommand::DylibRef {
                kind: DylibRefKind::Reexport,
                path: read_lc_str(data, cmd.offset + d.dylib.name as usize)?,
            },
            CommandVariant::Rpath(ref rpath) => LoadCommand::Rpath {
                path: read_lc_str(data, cmd.offset + rpath.path as usize)?,
            },
            ref other => LoadCommand::Other { cmd: other.cmd() },
        };
        commands.push(command);
    }

    Ok(commands)
}

/// Read a NUL-terminated load-command string at the given file offset
fn read_lc_str(data: &[u8], offset: usize) -> Result<String, PatchError> {
    let s: &str = data.pread(offset)?;
    Ok(s.to_string())
}
