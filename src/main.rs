//! wattlog - Local-first logbook for electricity meters

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = wattlog::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
