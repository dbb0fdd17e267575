//! Binary entrypoint for the static table backend.

use std::process::ExitCode;

use tablekit_config::Config;

fn main() -> ExitCode {
    match Config::load() {
        Ok(config) => tablekit_static::run(&config),
        Err(error) => error.into_clap().exit(),
    }
}
