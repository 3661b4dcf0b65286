//! Integration tests for the rpatcho binary.
//!
//! These tests drive the compiled CLI end-to-end against hand-assembled thin
//! Mach-O dylibs, with a stub install_name_tool on PATH that records the
//! argument vector it receives instead of editing anything.
//!
//! Run with:
//!   cargo test --test integration_test -- --nocapture

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use tempfile::TempDir;

const LC_LOAD_DYLIB: u32 = 0xc;
const LC_ID_DYLIB: u32 = 0xd;
const LC_LOAD_WEAK_DYLIB: u32 = 0x8000_0018;
const LC_RPATH: u32 = 0x8000_001c;

const TARGET_RPATH: &str = "@loader_path/../Frameworks";

/// Build a dylib_command carrying the given path, NUL-padded to alignment
fn dylib_command(cmd: u32, path: &str) -> Vec<u8> {
    let cmdsize = (24 + path.len() + 1 + 7) & !7;
    let mut buf = Vec::with_capacity(cmdsize);
    buf.extend_from_slice(&cmd.to_le_bytes());
    buf.extend_from_slice(&(cmdsize as u32).to_le_bytes());
    buf.extend_from_slice(&24u32.to_le_bytes()); // lc_str offset
    buf.extend_from_slice(&2u32.to_le_bytes()); // timestamp
    buf.extend_from_slice(&0x0001_0000u32.to_le_bytes()); // current_version
    buf.extend_from_slice(&0x0001_0000u32.to_le_bytes()); // compatibility_version
    buf.extend_from_slice(path.as_bytes());
    buf.resize(cmdsize, 0);
    buf
}

fn rpath_command(path: &str) -> Vec<u8> {
    let cmdsize = (12 + path.len() + 1 + 7) & !7;
    let mut buf = Vec::with_capacity(cmdsize);
    buf.extend_from_slice(&LC_RPATH.to_le_bytes());
    buf.extend_from_slice(&(cmdsize as u32).to_le_bytes());
    buf.extend_from_slice(&12u32.to_le_bytes()); // lc_str offset
    buf.extend_from_slice(path.as_bytes());
    buf.resize(cmdsize, 0);
    buf
}

/// Assemble a minimal thin 64-bit Mach-O dylib around the given commands
fn thin_dylib(commands: &[Vec<u8>]) -> Vec<u8> {
    let sizeofcmds: usize = commands.iter().map(Vec::len).sum();
    let mut buf = Vec::with_capacity(32 + sizeofcmds);
    buf.extend_from_slice(&0xfeed_facfu32.to_le_bytes()); // MH_MAGIC_64
    buf.extend_from_slice(&0x0100_0007u32.to_le_bytes()); // CPU_TYPE_X86_64
    buf.extend_from_slice(&3u32.to_le_bytes()); // CPU_SUBTYPE_X86_64_ALL
    buf.extend_from_slice(&6u32.to_le_bytes()); // MH_DYLIB
    buf.extend_from_slice(&(commands.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(sizeofcmds as u32).to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags
    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    for command in commands {
        buf.extend_from_slice(command);
    }
    buf
}

/// Install a stub install_name_tool into `dir` and return the record file it
/// writes its argument vector to
fn install_stub_tool(dir: &Path, exit_code: i32) -> PathBuf {
    let record_path = dir.join("argv.txt");
    let stub_path = dir.join("install_name_tool");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"{}\"\nexit {}\n",
        record_path.display(),
        exit_code
    );
    std::fs::write(&stub_path, script).unwrap();
    std::fs::set_permissions(&stub_path, std::fs::Permissions::from_mode(0o755)).unwrap();
    record_path
}

/// Run the rpatcho binary with the given arguments and PATH
fn run_rpatcho(args: &[&str], path_env: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rpatcho"))
        .args(args)
        .env("PATH", path_env)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run rpatcho")
}

#[test]
fn test_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_rpatcho(&[], temp_dir.path());

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().count(), 2);
    assert!(stderr.contains("[rpath] [file]"));
}

#[test]
fn test_relocates_dylib() {
    let temp_dir = TempDir::new().unwrap();
    let record_path = install_stub_tool(temp_dir.path(), 0);

    let dylib_path = temp_dir.path().join("libtest.dylib");
    let data = thin_dylib(&[
        dylib_command(LC_ID_DYLIB, "/opt/lib/libtest.dylib"),
        dylib_command(LC_LOAD_DYLIB, "/opt/lib/libdep.dylib"),
        dylib_command(LC_LOAD_WEAK_DYLIB, "/opt/lib/libweak.dylib"),
        dylib_command(LC_LOAD_DYLIB, "/usr/lib/libSystem.B.dylib"),
        rpath_command("/opt/lib"),
        rpath_command("/usr/local/lib"),
    ]);
    std::fs::write(&dylib_path, data).unwrap();

    let output = run_rpatcho(
        &[TARGET_RPATH, dylib_path.to_str().unwrap()],
        temp_dir.path(),
    );
    assert!(
        output.status.success(),
        "rpatcho failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let recorded = std::fs::read_to_string(&record_path).unwrap();
    let argv: Vec<&str> = recorded.lines().collect();
    assert_eq!(
        argv,
        vec![
            "-id",
            "@rpath/libtest.dylib",
            "-change",
            "/opt/lib/libdep.dylib",
            "@rpath/libdep.dylib",
            "-change",
            "/opt/lib/libweak.dylib",
            "@rpath/libweak.dylib",
            "-delete_rpath",
            "/opt/lib",
            "-delete_rpath",
            "/usr/local/lib",
            "-add_rpath",
            TARGET_RPATH,
            dylib_path.to_str().unwrap(),
        ]
    );
}

#[test]
fn test_already_relocated_dylib_spawns_no_tool() {
    let temp_dir = TempDir::new().unwrap();
    let record_path = install_stub_tool(temp_dir.path(), 0);

    let dylib_path = temp_dir.path().join("libdone.dylib");
    let data = thin_dylib(&[
        dylib_command(LC_ID_DYLIB, "@rpath/libdone.dylib"),
        dylib_command(LC_LOAD_DYLIB, "@rpath/libdep.dylib"),
        dylib_command(LC_LOAD_DYLIB, "/usr/lib/libSystem.B.dylib"),
        rpath_command(TARGET_RPATH),
    ]);
    std::fs::write(&dylib_path, data).unwrap();

    let output = run_rpatcho(
        &[TARGET_RPATH, dylib_path.to_str().unwrap()],
        temp_dir.path(),
    );
    assert!(output.status.success());

    // The stub was never invoked, so it never wrote its record file.
    assert!(!record_path.exists());
}

#[test]
fn test_tool_failure_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    install_stub_tool(temp_dir.path(), 1);

    let dylib_path = temp_dir.path().join("libfail.dylib");
    let data = thin_dylib(&[dylib_command(LC_LOAD_DYLIB, "/opt/lib/libdep.dylib")]);
    std::fs::write(&dylib_path, data).unwrap();

    let output = run_rpatcho(
        &[TARGET_RPATH, dylib_path.to_str().unwrap()],
        temp_dir.path(),
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exit code Some(1)"), "stderr: {stderr}");
}

#[test]
fn test_fat_binary_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    install_stub_tool(temp_dir.path(), 0);

    let thin = thin_dylib(&[dylib_command(LC_LOAD_DYLIB, "/opt/lib/libdep.dylib")]);
    let offset = 4096u32;
    let mut fat = Vec::new();
    fat.extend_from_slice(&0xcafe_babeu32.to_be_bytes()); // FAT_MAGIC
    fat.extend_from_slice(&1u32.to_be_bytes()); // nfat_arch
    fat.extend_from_slice(&0x0100_0007u32.to_be_bytes()); // cputype
    fat.extend_from_slice(&3u32.to_be_bytes()); // cpusubtype
    fat.extend_from_slice(&offset.to_be_bytes());
    fat.extend_from_slice(&(thin.len() as u32).to_be_bytes());
    fat.extend_from_slice(&12u32.to_be_bytes()); // align
    fat.resize(offset as usize, 0);
    fat.extend_from_slice(&thin);

    let fat_path = temp_dir.path().join("libfat.dylib");
    std::fs::write(&fat_path, fat).unwrap();

    let output = run_rpatcho(&[TARGET_RPATH, fat_path.to_str().unwrap()], temp_dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fat binary"), "stderr: {stderr}");
}
