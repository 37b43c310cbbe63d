use bf_lines::commands::run::{self, RunArgs};
use clap::Parser;
use std::env;

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

fn main() {
    // Logs go to stderr so program output on stdout stays untouched.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();
    let code = run::run(&program, cli.run);

    std::process::exit(code);
}
