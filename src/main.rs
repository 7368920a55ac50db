use clap::Parser;
use portsweep::cli::Cli;
use portsweep::error::CliError;
use portsweep::{logging, output};
use std::process::ExitCode;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            exit_code(&e)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    cli.execute().await?;
    Ok(())
}

/// 1 when the host could not be resolved, 2 for any other bad input.
fn exit_code(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<CliError>() {
        Some(CliError::Target(_)) => ExitCode::from(1),
        _ => ExitCode::from(2),
    }
}
