//! CLI module for sharewatch
//!
//! Command-line interface for the continuity probe.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{BackoffPolicy, ProbeConfig, ScheduleConfig, Timeouts};

/// sharewatch - epoch continuity probe for mining pool share ledgers
#[derive(Parser, Debug, Clone)]
#[command(name = "sharewatch")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    SHAREWATCH_LOG_LEVEL    Log level / filter directive (default: info)
    SHAREWATCH_LOG_DIR      Also write daily-rolling log files to this directory
"#)]
pub struct Cli {
    /// DSN for the Oula (distributor) database
    #[arg(long, env = "OULA_DSN", hide_env_values = true)]
    pub oula_dsn: String,

    /// DSN for the Aleo shares database
    #[arg(long, env = "ALEO_DSN", hide_env_values = true)]
    pub aleo_dsn: String,

    /// DSN for the Quai shares database
    #[arg(long, env = "QUAI_DSN", hide_env_values = true)]
    pub quai_dsn: String,

    /// Pushgateway URL
    #[arg(
        long,
        alias = "push-url",
        env = "PUSHGATEWAY_URL",
        default_value = "http://127.0.0.1:9091"
    )]
    pub pushgateway: String,

    /// Check interval in minutes
    #[arg(
        long,
        env = "CHECK_INTERVAL_MINUTES",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Value of the `instance` grouping label
    #[arg(long, env = "PUSH_INSTANCE", default_value = "oula-jumpserver")]
    pub instance: String,

    /// Push without an `instance` grouping label
    #[arg(long, default_value_t = false)]
    pub no_instance: bool,

    /// Backoff after a failed epoch read or continuity check
    #[arg(long, value_enum, env = "BACKOFF_POLICY", default_value_t = BackoffKind::Fixed)]
    pub backoff: BackoffKind,

    /// Delay before retrying a failed cycle (fixed backoff)
    #[arg(long, env = "RETRY_DELAY_SECS", default_value_t = 10)]
    pub retry_delay_secs: u64,

    /// Deadline for each database call
    #[arg(long, env = "QUERY_TIMEOUT_SECS", default_value_t = 30)]
    pub query_timeout_secs: u64,

    /// Deadline for each metric push
    #[arg(long, env = "PUSH_TIMEOUT_SECS", default_value_t = 10)]
    pub push_timeout_secs: u64,

    /// Deadline for connecting to each database
    #[arg(long, env = "CONNECT_TIMEOUT_SECS", default_value_t = 15)]
    pub connect_timeout_secs: u64,

    /// Run a single cycle, print the report and exit
    #[arg(long, default_value_t = false)]
    pub once: bool,

    /// Print the `--once` report as JSON
    #[arg(long, default_value_t = false, requires = "once")]
    pub json: bool,
}

/// Backoff policy selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffKind {
    /// Retry after `--retry-delay-secs`
    Fixed,
    /// Wait for the next regular interval
    Interval,
}

impl Cli {
    /// Resolve the parsed arguments into a probe configuration.
    pub fn probe_config(&self) -> ProbeConfig {
        let backoff = match self.backoff {
            BackoffKind::Fixed => BackoffPolicy::Fixed(Duration::from_secs(self.retry_delay_secs)),
            BackoffKind::Interval => BackoffPolicy::Interval,
        };

        ProbeConfig {
            oula_dsn: self.oula_dsn.clone(),
            aleo_dsn: self.aleo_dsn.clone(),
            quai_dsn: self.quai_dsn.clone(),
            pushgateway_url: self.pushgateway.clone(),
            instance: (!self.no_instance).then(|| self.instance.clone()),
            schedule: ScheduleConfig {
                interval: Duration::from_secs(self.interval * 60),
                backoff,
            },
            timeouts: Timeouts {
                query: Duration::from_secs(self.query_timeout_secs),
                push: Duration::from_secs(self.push_timeout_secs),
                connect: Duration::from_secs(self.connect_timeout_secs),
            },
        }
    }
}
