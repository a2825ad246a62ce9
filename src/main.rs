use std::{
    io::{stdin, stdout},
    process::ExitCode,
};

use clap::Parser;
use log::{debug, info};

use addbit::{api_key_from, process_env, App, Cli, Result, RunOutcome, Structurer};

pub fn initialize_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

async fn run(cli: Cli) -> Result<RunOutcome> {
    // Checked before any input is read
    let api_key = api_key_from(process_env)?;
    let config = cli.load_config(process_env)?;

    let structurer = Structurer::new(api_key, &config);
    let stdin = stdin();
    App::new(config)
        .run(&structurer, &mut stdin.lock(), &mut stdout())
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    match run(cli).await {
        Ok(outcome) => {
            info!("Finished: {:?}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("{:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
