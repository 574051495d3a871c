#![deny(unsafe_code)]

use mimalloc::MiMalloc;

/// High-performance memory allocator for improved allocation throughput.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[path = "cli.rs"]
mod cli;

use std::sync::Arc;
use std::{env, io, process::ExitCode};

use manager::LogManager;

fn main() -> ExitCode {
    let manager = Arc::new(LogManager::new());
    cli::init_tracing(Arc::clone(&manager));

    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    cli::run_with(&manager, env::args_os(), stdin, &mut stdout, &mut stderr)
}
