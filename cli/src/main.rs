mod cli;
mod error;
mod health;
mod info;
mod logging;
mod process;
mod progress;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use ocr_client::config::DEFAULT_TIMEOUT_SECS;
use process::ProcessArgs;

fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init(cli.command.verbose());

    if let Err(err) = run(&cli) {
        if !err.is_already_reported() {
            eprintln!("{} {}", "Error:".bold().red(), err.user_message());
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> error::Result<()> {
    match &cli.command {
        Commands::Process {
            input,
            name,
            format,
            copy,
            save_text,
            save_json,
            output_dir,
            timeout,
            interactive,
            skip_health_check,
            verbose,
        } => process::execute(
            cli.client_config(*timeout)?,
            ProcessArgs {
                input: input.clone(),
                name: name.clone(),
                format: *format,
                copy: *copy,
                save_text: *save_text,
                save_json: *save_json,
                output_dir: output_dir.clone(),
                interactive: *interactive,
                skip_health_check: *skip_health_check,
                verbose: *verbose,
            },
        ),
        Commands::Health { verbose } => {
            health::execute(cli.client_config(DEFAULT_TIMEOUT_SECS)?, *verbose)
        }
        Commands::Info { json, verbose } => {
            info::execute(cli.client_config(DEFAULT_TIMEOUT_SECS)?, *json, *verbose)
        }
    }
}
