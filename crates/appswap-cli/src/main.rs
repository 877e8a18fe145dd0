use std::process::ExitCode;

use clap::Parser;

mod dispatch;
mod logging;
mod render;

use dispatch::run_cli;

#[derive(Parser, Debug)]
#[command(name = "appswap", version)]
#[command(
    about = "Waits for an application to exit, replaces its files and restarts it",
    long_about = None
)]
struct Cli {
    /// <sourceDir> <targetDir> <mainExecutable>
    #[arg(
        value_name = "ARGS",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let outcome = run_cli(cli.args);
    ExitCode::from(outcome.exit_code())
}
