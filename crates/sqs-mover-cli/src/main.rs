use clap::Parser;
use sqs_mover_cli::{logging, report_exit_code, run, summary, Cli, CliError, EXIT_CANCELLED};
use sqs_mover_core::CancellationToken;
use tracing::{error, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_level.as_deref(), cli.json_logs) {
        let e = CliError::from(e);
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }

    let cancellation = CancellationToken::new();
    spawn_interrupt_handler(cancellation.clone());

    match run(&cli, cancellation).await {
        Ok(report) => {
            println!("{}", summary(&report));
            std::process::exit(report_exit_code(&report));
        }
        Err(e) => {
            error!(error = %e, "Move failed");
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// First Ctrl-C stops the run after the current batch, a second one exits at once
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, stopping after the current batch. Press Ctrl-C again to abort");
        token.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(EXIT_CANCELLED);
        }
    });
}
