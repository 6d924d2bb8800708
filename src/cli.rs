mod help_text;

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Build or update a patch repository
#[derive(Parser, Debug)]
#[command(
    name = "repo-update",
    version,
    about,
    long_about = help_text::ROOT_LONG_ABOUT
)]
pub struct Cli {
    /// Repository source path. Also receives the updated repo.js, patch.js
    /// and files.js
    #[arg(short = 'f', long = "from", value_name = "PATH", default_value = ".")]
    pub from: PathBuf,

    /// Destination directory. If different from the source, all patch files
    /// are copied there
    #[arg(short = 't', long = "to", value_name = "PATH", default_value = ".")]
    pub to: PathBuf,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
