use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::types::jobs::ProcessingMode;

pub mod database;
pub mod job;
pub mod provider;

#[derive(Parser, Debug)]
#[command(
    name = "ingestor",
    about = "WTSS time-series ingestor - fetches per-pixel series for a polygon set and extends the stored documents",
    after_help = "Examples:\n  \
    ingestor run --start-date 2024-01-01 --end-date 2024-01-31\n  \
    ingestor run --start-date 2024-01-01 --end-date 2024-01-31 --mode resume\n  \
    ingestor handle --payload message.json\n  \
    ingestor cron"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one job for an explicit date window
    Run {
        #[command(flatten)]
        run_command: Box<RunCmd>,
    },
    /// Run the job described by a queue message
    Handle {
        #[command(flatten)]
        handle_command: Box<HandleCmd>,
    },
    /// Run the scheduled job covering the last seven days
    Cron {
        #[command(flatten)]
        cron_command: Box<CronCmd>,
    },
}

/// Arguments shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    #[clap(flatten, next_help_heading = "MongoDB")]
    pub mongodb_args: database::mongodb::MongoDBCliArgs,

    #[clap(flatten, next_help_heading = "WTSS")]
    pub wtss_args: provider::wtss::WtssCliArgs,

    #[clap(flatten, next_help_heading = "Job")]
    pub job_args: job::JobCliArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct RunCmd {
    /// First day of the window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: NaiveDate,

    /// Last day of the window (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: NaiveDate,

    /// full, resume or retry_failed
    #[arg(long, default_value = "full")]
    pub mode: ProcessingMode,

    #[clap(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct HandleCmd {
    /// Queue message to handle, `-` reads it from stdin
    #[arg(long, value_name = "PATH")]
    pub payload: PathBuf,

    #[clap(flatten)]
    pub service: ServiceArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct CronCmd {
    /// Day the window ends on, defaults to today (UTC)
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    #[clap(flatten)]
    pub service: ServiceArgs,
}
