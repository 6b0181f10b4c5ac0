//! `isle-sim`: interactive shell over a simulated island.

use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
};

use clap::Parser;
use isle_cli::{Flow, Shell, ShellError, ShellOptions, parse};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Island engine simulator
#[derive(Parser, Debug)]
#[command(name = "isle-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Run in the owner user as device owner instead of inside the island
    #[arg(long)]
    owner: bool,

    /// Platform API level of the simulated device
    #[arg(long, default_value_t = 28)]
    sdk: u32,

    /// Display name of the island profile
    #[arg(long, default_value = "Island")]
    profile_name: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let options = ShellOptions { owner: args.owner, sdk: args.sdk, profile_name: args.profile_name };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "shell failed");
            ExitCode::FAILURE
        },
    }
}

fn run(options: &ShellOptions) -> Result<(), ShellError> {
    let mut shell = Shell::new(options, io::stdout());
    let stdin = io::stdin();

    loop {
        {
            let mut out = io::stdout().lock();
            write!(out, "isle> ")?;
            out.flush()?;
        }

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        if shell.execute(parse(&line))? == Flow::Quit {
            return Ok(());
        }
    }
}
