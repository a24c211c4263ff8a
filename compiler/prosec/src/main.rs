//! Prose CLI.

use std::process::ExitCode;

use prosec::commands::{repl, run_file};

fn main() -> ExitCode {
    prosec::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [] => repl(),
        [flag] if flag == "--help" || flag == "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        [flag, path] if flag == "--check" => run_file(path, true),
        [path] if !path.starts_with('-') => run_file(path, false),
        _ => {
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Usage: prose [--check] [file.prose]");
    eprintln!();
    eprintln!("With no file, starts an interactive session. Type `exit` to leave.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --check    Run the static checker before executing");
    eprintln!();
    eprintln!("Set PROSE_LOG (e.g. PROSE_LOG=prose_eval=debug) for tracing output.");
}
