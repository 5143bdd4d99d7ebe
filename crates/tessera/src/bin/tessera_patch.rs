//! `tessera-patch` — apply a patch to a JSON document.
//!
//! Usage:
//!   tessera-patch ORIGINAL.json PATCH.json
//!
//! The patched document is written to stdout as JSON. Exits 1 on I/O or
//! parse failure.

use std::io;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: tessera-patch ORIGINAL.json PATCH.json");
        process::exit(1);
    }

    if let Err(err) = tessera::cli::run_patch(&args[1], &args[2], &mut io::stdout()) {
        eprintln!("{err}");
        process::exit(1);
    }
}
