//! Runtime configuration for the vanity address search.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::matcher::Pattern;

/// Environment variable consulted when `--password` is not given.
pub const PASSWORD_ENV: &str = "ethVA_PASSWORD";

/// Ethereum vanity address search
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Prefix of the address, starting with `0x`, e.g. '0xABc'
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Suffix of the address, e.g. 'DEf'
    #[arg(short, long, default_value = "")]
    pub suffix: String,

    /// Case insensitive search for prefix and suffix
    #[arg(short, long)]
    pub ignore_case: bool,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short, long, visible_alias = "concurrency")]
    pub workers: Option<usize>,

    /// Save found keys into password protected keyfiles
    #[arg(long, env = PASSWORD_ENV, hide_env_values = true)]
    pub password: Option<String>,

    /// Directory the keyfiles are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Stop after finding N addresses (0 = run forever). Matches already
    /// found by other workers when the target is reached are still reported
    #[arg(short = 'n', long, default_value = "0")]
    pub count: u64,

    /// Seconds between progress flushes from each worker
    #[arg(long, default_value = "30")]
    pub flush_interval: u64,

    /// Seconds between cumulative progress reports
    #[arg(short, long, default_value = "900")]
    pub report_interval: u64,
}

/// Picks the password from the argument, falling back to `env` when the
/// argument is absent or empty.
fn resolve_secret(arg: Option<&str>, env: Option<String>) -> Option<String> {
    let raw = match arg {
        Some(arg) if !arg.is_empty() => arg.to_string(),
        _ => env?,
    };
    let trimmed = raw.trim_end_matches(['\r', '\n']);
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// What the search does after a match has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Keep searching until the process is told to stop.
    #[default]
    Continuous,
    /// Stop once this many matches have been handled.
    StopAfter(u64),
}

impl MatchPolicy {
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => MatchPolicy::Continuous,
            n => MatchPolicy::StopAfter(n),
        }
    }

    /// Returns true when `handled` matches satisfy the policy.
    pub fn is_satisfied(self, handled: u64) -> bool {
        match self {
            MatchPolicy::Continuous => false,
            MatchPolicy::StopAfter(n) => handled >= n,
        }
    }
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count() == 0 {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.flush_interval == 0 || self.report_interval <= self.flush_interval {
            return Err(ConfigError::InvalidIntervals {
                flush: self.flush_interval,
                report: self.report_interval,
            });
        }

        self.pattern().map(|_| ())
    }

    /// Builds the search pattern from the raw flags.
    pub fn pattern(&self) -> Result<Pattern, ConfigError> {
        Pattern::parse(&self.prefix, &self.suffix, !self.ignore_case)
    }

    /// The keyfile password, with trailing line breaks removed.
    ///
    /// An empty `--password` counts as not given. An empty password means
    /// keys are printed instead of exported.
    pub fn export_secret(&self) -> Option<String> {
        resolve_secret(self.password.as_deref(), std::env::var(PASSWORD_ENV).ok())
    }

    pub fn match_policy(&self) -> MatchPolicy {
        MatchPolicy::from_count(self.count)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("prefix must begin with '0x' followed by 1-39 hex characters, got '{0}'")]
    InvalidPrefix(String),

    #[error("suffix must contain 1-39 hex characters, got '{0}'")]
    InvalidSuffix(String),

    #[error("prefix or suffix is required")]
    EmptyPattern,

    #[error("worker count must be at least 1")]
    InvalidWorkers,

    #[error("report interval ({report}s) must be longer than a non-zero flush interval ({flush}s)")]
    InvalidIntervals { flush: u64, report: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config(prefix: &str, suffix: &str) -> Config {
        Config {
            prefix: prefix.into(),
            suffix: suffix.into(),
            ignore_case: false,
            workers: None,
            password: None,
            output_dir: PathBuf::from("."),
            count: 0,
            flush_interval: 30,
            report_interval: 900,
        }
    }

    #[test]
    fn test_valid_pattern() {
        assert!(make_test_config("0xdead", "").validate().is_ok());
        assert!(make_test_config("", "beef").validate().is_ok());
        assert!(make_test_config("0xDEAD", "beef").validate().is_ok());
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(make_test_config("dead", "").validate().is_err());
        assert!(make_test_config("0xxyz", "").validate().is_err());
        assert!(make_test_config("", "xyz").validate().is_err());
    }

    #[test]
    fn test_pattern_required() {
        assert!(matches!(
            make_test_config("", "").validate(),
            Err(ConfigError::EmptyPattern)
        ));
    }

    #[test]
    fn test_worker_count() {
        let mut config = make_test_config("0xab", "");
        assert!(config.worker_count() >= 1);

        config.workers = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidWorkers)));

        config.workers = Some(3);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_intervals() {
        let mut config = make_test_config("0xab", "");
        config.report_interval = 30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidIntervals { .. })
        ));

        config.flush_interval = 0;
        config.report_interval = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_export_secret() {
        let mut config = make_test_config("0xab", "");
        config.password = Some("secret\r\n".into());
        assert_eq!(config.export_secret().as_deref(), Some("secret"));
    }

    #[test]
    fn test_resolve_secret() {
        let env = || Some("from-env\n".to_string());

        assert_eq!(resolve_secret(Some("arg"), env()).as_deref(), Some("arg"));
        assert_eq!(resolve_secret(None, env()).as_deref(), Some("from-env"));
        assert_eq!(resolve_secret(None, None), None);

        // An empty argument is treated as not given
        assert_eq!(resolve_secret(Some(""), env()).as_deref(), Some("from-env"));
        assert_eq!(resolve_secret(Some(""), None), None);

        // Only line breaks: no export, and no fallback
        assert_eq!(resolve_secret(Some("\r\n"), env()), None);
        assert_eq!(resolve_secret(None, Some("\n".into())), None);
    }

    #[test]
    fn test_ignore_case_lowers_pattern() {
        let mut config = make_test_config("0xABC", "DEF");
        config.ignore_case = true;
        let pattern = config.pattern().unwrap();
        assert_eq!(pattern.prefix(), "0xabc");
        assert_eq!(pattern.suffix(), "def");
        assert!(!pattern.is_case_sensitive());
    }

    #[test]
    fn test_match_policy() {
        assert_eq!(MatchPolicy::from_count(0), MatchPolicy::Continuous);
        assert!(!MatchPolicy::Continuous.is_satisfied(u64::MAX));
        assert!(!MatchPolicy::StopAfter(2).is_satisfied(1));
        assert!(MatchPolicy::StopAfter(2).is_satisfied(2));
    }

    #[test]
    fn test_cli_parsing() {
        let config = Config::try_parse_from([
            "eth_va",
            "--prefix",
            "0xAB",
            "--ignore-case",
            "--concurrency",
            "2",
            "-n",
            "1",
        ])
        .unwrap();
        assert_eq!(config.prefix, "0xAB");
        assert!(config.ignore_case);
        assert_eq!(config.worker_count(), 2);
        assert_eq!(config.match_policy(), MatchPolicy::StopAfter(1));
        assert_eq!(config.flush_interval(), Duration::from_secs(30));
        assert_eq!(config.report_interval(), Duration::from_secs(900));
    }
}
