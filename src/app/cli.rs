use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Regenerate the TrustInSoft CI configuration of a C project"
)]
pub struct Cli {
    /// Project root to scan and write into (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// TOML file overriding the project layout (defaults to trustinsoft/regenerate.toml)
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Additional test files to leave out of tis.config (e.g. 'unity_setup.c')
    #[arg(long, num_args = 1..)]
    pub exclude_test: Option<Vec<String>>,
}
