use std::time::Duration;

use clap::Args;
use ingestor_wtss_service::constants::DEFAULT_WTSS_URL;
use ingestor_wtss_service::WtssValidatedArgs;
use url::Url;

/// Parameters used to reach the WTSS service.
#[derive(Debug, Clone, Args)]
pub struct WtssCliArgs {
    /// Base URL of the WTSS service.
    #[arg(env = "INGESTOR_WTSS_URL", long, default_value = DEFAULT_WTSS_URL)]
    pub wtss_url: Url,
}

impl WtssCliArgs {
    /// The HTTP client timeout follows the per-item fetch timeout.
    pub fn validated(&self, request_timeout: Duration) -> WtssValidatedArgs {
        WtssValidatedArgs { wtss_service_url: self.wtss_url.clone(), request_timeout }
    }
}
