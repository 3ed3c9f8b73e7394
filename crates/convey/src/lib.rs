mod ops;

use std::ffi::OsString;

use clap::{Parser, Subcommand};
use ops::{convert, snippet};

/// Environment variable that enables reporting compilation errors when set to `1` or `true`.
pub const SHOW_COMPILATION_ERRORS_ENV: &str = "CONVEY_SHOW_COMPILATION_ERRORS";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Converts a snake project into a pascal project
    Convert(convert::Args),

    /// Converts a snippet of snake code and prints the result
    Snippet(snippet::Args),
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error,
}

impl From<bool> for ExitStatus {
    fn from(value: bool) -> Self {
        if value {
            ExitStatus::Success
        } else {
            ExitStatus::Error
        }
    }
}

pub fn run_with_args<T, I>(args: I) -> Result<ExitStatus, anyhow::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::parse_from(args);
    match args.command {
        Command::Convert(args) => convert::convert(args),
        Command::Snippet(args) => snippet::snippet(args),
    }
}
