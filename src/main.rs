//! Command-line entry point for rpatcho
//!
//! Usage: `rpatcho <rpath> <file>` rewrites the dylib at `file` so its
//! non-system dependencies resolve through `rpath`.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("{} [rpath] [file]", args[0]);
        eprintln!("{} \"@loader_path/../Frameworks\" libtest.dylib", args[0]);
        return ExitCode::from(1);
    }

    match rpatcho::relocate_dylib(&args[2], &args[1]) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("rpatcho: {err}");
            ExitCode::from(1)
        }
    }
}
