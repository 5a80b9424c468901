//! Benchlog CLI entry point.

use colored::Colorize;

fn main() {
    if let Err(e) = benchlog_cli::run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
