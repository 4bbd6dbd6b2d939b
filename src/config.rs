use clap::{Parser, Subcommand};

/// Runwatch — triggers headless test runs in the cloud and watches them to completion.
#[derive(Parser, Debug, Clone)]
#[command(name = "runwatch", version)]
pub struct CliArgs {
    /// Use the development endpoint instead of production
    #[arg(short = 'd', long = "dev-endpoint", global = true)]
    pub dev_endpoint: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Trigger and watch state of a headless run
    Run {
        /// Id of the headless run definition to trigger
        #[arg(long = "headless-id")]
        headless_id: String,
    },
}

// Endpoint constants
pub const PRODUCTION_ENDPOINT: &str = "https://app.testissimo.io";
pub const DEV_ENDPOINT: &str = "http://app-dev.testissimo.io:8080";

// Fetcher constants
pub const MAX_REDIRECTS: u32 = 4;
pub const FETCH_MAX_ATTEMPTS: u32 = 3;
pub const FETCH_RETRY_DELAY_MS: u64 = 2_000;

// Poller constants
pub const RUN_STATUS_CHECK_INTERVAL_MS: u64 = 10_000;

/// Remote API endpoints, fixed at startup by the endpoint flag.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_args(args: &CliArgs) -> Self {
        let endpoint = if args.dev_endpoint {
            DEV_ENDPOINT
        } else {
            PRODUCTION_ENDPOINT
        };
        Self::with_base(endpoint)
    }

    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Trigger endpoint for a run definition.
    pub fn trigger_url(&self, run_def_id: &str) -> String {
        format!("{}/headless/{}/trigger/", self.base_url, run_def_id)
    }

    /// Status endpoint for a run instance.
    pub fn run_status_url(&self, instance_id: &str) -> String {
        format!("{}/reports/runs/{}", self.base_url, instance_id)
    }

    /// Report page with recordings for a run instance; shown to the user,
    /// never fetched.
    pub fn report_url(&self, run_def_id: &str, instance_id: &str) -> String {
        format!("{}/reports/{}/{}", self.base_url, run_def_id, instance_id)
    }
}
