use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use slotvisor::{App, RunOutcome, Settings, logging};

const EXIT_CONFIG: u8 = 1;
const EXIT_GRACE_EXCEEDED: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "slotvisor")]
#[command(about = "Watches an appointment inventory and reserves the first claimable slot")]
struct Cli {
    /// Path to the configuration file
    #[arg(default_value = "config.yaml")]
    config: PathBuf,

    /// Log filter directive, overrides RUST_LOG (e.g. "slotvisor=debug")
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_filter.as_deref()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::from(EXIT_CONFIG);
    }

    let settings = match Settings::load(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            error!(path = %cli.config.display(), error = %e, label = e.as_label(), "configuration rejected");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!(path = %cli.config.display(), member = %settings.credentials.member_id, "configuration loaded");

    let app = match App::new(settings, cli.config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, label = e.as_label(), "startup failed");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match app.run().await {
        Ok(RunOutcome::Reserved(reservation)) => {
            info!(order_id = %reservation.order_id, candidate = %reservation.candidate, "done");
            println!("{}", reservation.order_id);
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Interrupted) => {
            info!("interrupted before a reservation was confirmed");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Ok(RunOutcome::Drained) => {
            warn!("all jobs exited without a reservation");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, label = e.as_label(), "shutdown did not complete");
            ExitCode::from(EXIT_GRACE_EXCEEDED)
        }
    }
}
