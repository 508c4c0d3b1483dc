use clap::Parser;
use std::time::Duration;

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "ghaw", version = VERSION, about = "GitHub Actions Watcher TUI")]
pub struct Cli {
    /// Repository in owner/name format (auto-detected from the origin remote)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Poll interval in seconds
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Number of most recent runs to display
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(1..=1000))]
    pub limit: u64,

    /// Enable verbose logging to $XDG_STATE_HOME/ghaw/debug.log
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn limit(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}

/// Validates that `repo` is `owner/name`: two non-empty segments, no whitespace.
pub fn validate_repo_format(repo: &str) -> Result<(), String> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2
        || parts.iter().any(|p| p.is_empty())
        || repo.contains(char::is_whitespace)
    {
        return Err(format!(
            "Invalid repository '{repo}'. Expected 'owner/name' (e.g. 'rust-lang/cargo')."
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_repo_format() {
        assert!(validate_repo_format("owner/name").is_ok());
        assert!(validate_repo_format("rust-lang/rust.vim").is_ok());
    }

    #[test]
    fn invalid_repo_no_slash() {
        assert!(validate_repo_format("noslash").is_err());
    }

    #[test]
    fn invalid_repo_extra_segment() {
        assert!(validate_repo_format("a/b/c").is_err());
    }

    #[test]
    fn invalid_repo_empty_segment() {
        assert!(validate_repo_format("/name").is_err());
        assert!(validate_repo_format("owner/").is_err());
    }

    #[test]
    fn invalid_repo_whitespace_or_empty() {
        assert!(validate_repo_format("owner /name").is_err());
        assert!(validate_repo_format("").is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["ghaw"]);
        assert_eq!(cli.interval(), Duration::from_secs(10));
        assert_eq!(cli.limit(), 20);
        assert!(cli.repo.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn zero_interval_rejected() {
        assert!(Cli::try_parse_from(["ghaw", "--interval", "0"]).is_err());
    }

    #[test]
    fn short_flags() {
        let cli = Cli::parse_from(["ghaw", "-i", "5", "-r", "o/r", "-l", "50"]);
        assert_eq!(cli.interval, 5);
        assert_eq!(cli.repo.as_deref(), Some("o/r"));
        assert_eq!(cli.limit(), 50);
    }
}
