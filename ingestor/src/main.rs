use std::sync::Arc;

use chrono::Utc;
use clap::Parser as _;
use dotenvy::dotenv;
use ingestor::cli::{Cli, Commands, ServiceArgs};
use ingestor::core::config::Config;
use ingestor::types::payload::{JobWindow, WtssPayload};
use ingestor::utils::logging::init_logging;
use ingestor::worker::{JobService, RunOutcome};
use ingestor::IngestorResult;
use tracing::{error, info};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    init_logging()?;
    info!("Starting ingestor");
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { run_command } => {
            info!("Executing run command with args: {:?}", run_command);
            match JobWindow::new(run_command.start_date, run_command.end_date, run_command.mode) {
                Ok(window) => execute(&run_command.service, WtssPayload::Admin { window, geometry: None }).await,
                Err(e) => Err(e.into()),
            }
        }
        Commands::Handle { handle_command } => {
            info!("Executing handle command with args: {:?}", handle_command);
            match JobService::read_payload(&handle_command.payload).await {
                Ok(payload) => execute(&handle_command.service, payload).await,
                Err(e) => Err(e),
            }
        }
        Commands::Cron { cron_command } => {
            let today = cron_command.today.unwrap_or_else(|| Utc::now().date_naive());
            info!(%today, "Executing scheduled run");
            execute(&cron_command.service, WtssPayload::cron(today)).await
        }
    };

    match result {
        Ok(outcome) => {
            info!(
                status = %outcome.report.status,
                attempted = outcome.attempted_indexes.len(),
                documents_written = outcome.documents_written,
                stop_reason = ?outcome.stop_reason,
                "Ingestor run completed"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                error = %e,
                error_chain = ?e,
                "Ingestor run failed"
            );
            Err(e.into())
        }
    }
}

async fn execute(service: &ServiceArgs, payload: WtssPayload) -> IngestorResult<RunOutcome> {
    let config = Arc::new(Config::from_service_args(service).await?);
    JobService::handle_payload(config, payload).await
}
