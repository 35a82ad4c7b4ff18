use clap::Parser;
use exedeps::cli::{Cli, MainCommand};
use exedeps::{commands, utils};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    utils::generate_style_file();

    let cli = Cli::parse();
    let platform = cli.platform.into();
    let out = io::stdout().lock();
    let ok = match cli.command {
        MainCommand::Info(args) => commands::info(out, platform, &args),
        MainCommand::Deps(args) => commands::deps(out, platform, &args),
        MainCommand::Sections(args) => commands::sections(out, platform, &args),
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
