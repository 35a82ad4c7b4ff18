//! Definitions for the command line, e.g. `exedeps --platform unix deps app`.
use crate::introspect::Platform;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(infer_subcommands(true))] // allow abbreviations, e.g. `sec`
pub struct Cli {
    /// Platform the binaries were built for, auto uses the magic bytes
    #[arg(short, long, default_value_t = PlatformArg::Auto)]
    pub platform: PlatformArg,

    #[command(subcommand)]
    pub command: MainCommand,
}

#[derive(Subcommand)]
pub enum MainCommand {
    /// Show word size, debug build, and dependencies for one or more binaries
    Info(InfoArgs),

    /// List the libraries a binary directly depends on, one per line
    Deps(DepsArgs),

    /// Show a binary's section table
    Sections(TableArgs),
}

#[derive(Args)]
pub struct InfoArgs {
    /// Executables or shared libraries
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    /// Executable or shared library
    pub path: PathBuf,
}

#[derive(Args)]
pub struct TableArgs {
    /// Executable or shared library
    pub path: PathBuf,

    /// Explain columns, fields, etc.
    #[arg(short, long)]
    pub explain: bool,

    /// Add column headers
    #[arg(short, long)]
    pub titles: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum PlatformArg {
    /// PE/COFF
    Windows,

    /// PE/COFF
    #[value(name = "winrt")]
    WinRt,

    /// ELF
    Unix,

    /// Decide using the first few bytes of each file
    Auto,
}

impl fmt::Display for PlatformArg {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlatformArg::Windows => fmt.write_str("windows")?,
            PlatformArg::WinRt => fmt.write_str("winrt")?,
            PlatformArg::Unix => fmt.write_str("unix")?,
            PlatformArg::Auto => fmt.write_str("auto")?,
        }
        Ok(())
    }
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::WinRt => Platform::WinRt,
            PlatformArg::Unix => Platform::Unix,
            PlatformArg::Auto => Platform::Unknown,
        }
    }
}
