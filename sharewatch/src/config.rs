//! Configuration management
//!
//! Resolved runtime configuration plus helpers for reading environment
//! variables that have a short alias.

use std::time::Duration;

use crate::common::error::{ProbeError, ProbeResult};
use crate::common::types::Project;

/// Get an environment variable, falling back to its short alias
///
/// The prefixed name wins when both are set. Neither name is deprecated.
///
/// # Example
/// ```
/// use sharewatch::config::get_env_with_alias;
///
/// let level = get_env_with_alias("SHAREWATCH_LOG_LEVEL", "LOG_LEVEL");
/// ```
pub fn get_env_with_alias(name: &str, alias: &str) -> Option<String> {
    std::env::var(name).or_else(|_| std::env::var(alias)).ok()
}

/// Get an environment variable or its alias, with a default value
pub fn get_env_with_alias_or(name: &str, alias: &str, default: &str) -> String {
    get_env_with_alias(name, alias).unwrap_or_else(|| default.to_string())
}

/// What the loop does after a cycle in which an epoch read or continuity check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    /// Retry only the failed projects once after a short fixed delay; the regular interval is unchanged
    Fixed(Duration),
    /// Wait for the next regular tick, same as after a successful cycle
    Interval,
}

/// Poll schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleConfig {
    /// Period between regular cycles
    pub interval: Duration,
    /// Failure backoff
    pub backoff: BackoffPolicy,
}

impl ScheduleConfig {
    /// Validate the schedule.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.interval.is_zero() {
            return Err(ProbeError::Config("interval must be positive".to_string()));
        }
        if let BackoffPolicy::Fixed(delay) = self.backoff {
            if delay.is_zero() {
                return Err(ProbeError::Config(
                    "retry delay must be positive for the fixed backoff policy".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Per-call deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Epoch read and continuity check
    pub query: Duration,
    /// Metric push
    pub push: Duration,
    /// Startup connection and pool acquire
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            query: Duration::from_secs(30),
            push: Duration::from_secs(10),
            connect: Duration::from_secs(15),
        }
    }
}

/// Fully resolved probe configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Distributor (coordination) store DSN
    pub oula_dsn: String,
    /// Aleo shares store DSN
    pub aleo_dsn: String,
    /// Quai shares store DSN
    pub quai_dsn: String,
    /// Pushgateway base URL
    pub pushgateway_url: String,
    /// `instance` grouping label, omitted when `None`
    pub instance: Option<String>,
    /// Poll schedule
    pub schedule: ScheduleConfig,
    /// Per-call deadlines
    pub timeouts: Timeouts,
}

impl ProbeConfig {
    /// DSN of the shares database for `project`
    pub fn shares_dsn(&self, project: Project) -> &str {
        match project {
            Project::Aleo => &self.aleo_dsn,
            Project::QuaiGarden => &self.quai_dsn,
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ProbeResult<()> {
        for (flag, dsn) in [
            ("--oula-dsn", &self.oula_dsn),
            ("--aleo-dsn", &self.aleo_dsn),
            ("--quai-dsn", &self.quai_dsn),
        ] {
            if dsn.trim().is_empty() {
                return Err(ProbeError::Config(format!("{flag} must not be empty")));
            }
        }
        if self.pushgateway_url.trim().is_empty() {
            return Err(ProbeError::Config(
                "--pushgateway must not be empty".to_string(),
            ));
        }
        if self.timeouts.query.is_zero()
            || self.timeouts.push.is_zero()
            || self.timeouts.connect.is_zero()
        {
            return Err(ProbeError::Config("timeouts must be positive".to_string()));
        }
        self.schedule.validate()
    }
}
