//! taglight - semantic identifier tagging for Go, served to an editor host
//!
//! Usage: `taglight <program-name> <debug 0|1> <active-file> <package-dir>
//! [<project-root>] [<connect-path> <listen-path>]`

use clap::Parser;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::process::ExitCode;
use taglight::{Args, Launch};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // misuse exits 1, not clap's usual 2
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let result = Launch::from_args(args)
        .map_err(|e| eyre::Report::new(e).wrap_err("Failed to resolve launch paths"))
        .and_then(taglight::serve);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if std::io::stderr().is_terminal() {
                eprintln!("{} {:?}", "error:".red().bold(), e);
            } else {
                eprintln!("error: {e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
