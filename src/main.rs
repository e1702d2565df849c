use clap::Parser;
use quotelab::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
