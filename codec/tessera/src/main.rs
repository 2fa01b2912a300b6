//! The executable signing and verifying checksum-trailed files.

use std::process::ExitCode;

use clap::Parser;
use tessera_driver::Arguments;

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    tessera_driver::run(Arguments::parse())
}
