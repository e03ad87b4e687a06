//! CLI argument parsing definitions

use clap::{ArgAction, Parser};
use fraudload_config::domains::logging::LogLevel;
use fraudload_config::{LoadTestConfig, UserType};
use std::path::PathBuf;
use std::time::Duration;

/// Generate evaluation traffic against a card fraud rule engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(long, value_name = "PATH", env = "FRAUDLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the rule engine (overrides TARGET_HOST)
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Number of concurrent virtual users
    #[arg(short = 'u', long, value_name = "USERS")]
    pub users: Option<usize>,

    /// Users started per second
    #[arg(short = 'r', long, value_name = "RATE")]
    pub spawn_rate: Option<f64>,

    /// Run time in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub run_time: Option<u64>,

    /// Virtual user behavior
    #[arg(long, value_enum, value_name = "TYPE")]
    pub user_type: Option<UserType>,

    /// Skip the token exchange and send no Authorization header
    #[arg(long)]
    pub no_auth: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the effective configuration (secrets redacted) and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Layer the command-line flags over a loaded configuration
    pub fn apply(&self, config: &mut LoadTestConfig) {
        if let Some(host) = &self.host {
            config.target.host = host.clone();
        }
        if let Some(users) = self.users {
            config.run.users = users;
        }
        if let Some(rate) = self.spawn_rate {
            config.run.spawn_rate = rate;
        }
        if let Some(secs) = self.run_time {
            config.run.run_time = Duration::from_secs(secs);
        }
        if let Some(user_type) = self.user_type {
            config.run.user_type = user_type;
        }
        if self.no_auth {
            config.auth.disabled = true;
        }
        match self.verbose {
            0 => {}
            1 => config.logging.level = LogLevel::Debug,
            _ => config.logging.level = LogLevel::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "fraudload",
            "--host",
            "http://engine:9000",
            "-u",
            "25",
            "-r",
            "5",
            "-t",
            "120",
            "--user-type",
            "high-volume",
            "--no-auth",
            "-vv",
        ])
        .unwrap();

        let mut config = LoadTestConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.target.host, "http://engine:9000");
        assert_eq!(config.run.users, 25);
        assert_eq!(config.run.spawn_rate, 5.0);
        assert_eq!(config.run.run_time, Duration::from_secs(120));
        assert_eq!(config.run.user_type, UserType::HighVolume);
        assert!(!config.auth.is_enabled());
        assert_eq!(config.logging.level, LogLevel::Trace);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["fraudload"]).unwrap();
        let mut config = LoadTestConfig::default();
        config.run.users = 7;
        cli.apply(&mut config);

        assert_eq!(config.run.users, 7);
        assert_eq!(config.target.host, LoadTestConfig::default().target.host);
    }

    #[test]
    fn test_unknown_user_type_rejected() {
        assert!(Cli::try_parse_from(["fraudload", "--user-type", "bursty"]).is_err());
    }
}
