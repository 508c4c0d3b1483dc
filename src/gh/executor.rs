use crate::app::{RunDetail, WorkflowRun};
use crate::gh::parser;
use crate::traits::FetchGateway;
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Result};
use std::time::Duration;
use tokio::process::Command;

const GH_TIMEOUT: Duration = Duration::from_secs(30);
const GIT_TIMEOUT: Duration = Duration::from_secs(5);

const RUN_FIELDS: &str = "databaseId,displayTitle,event,headBranch,name,number,status,conclusion,createdAt,updatedAt,url,workflowName";

/// Gateway backed by the `gh` CLI. Stateless: the repository is passed per call.
pub struct GhGateway;

#[async_trait]
impl FetchGateway for GhGateway {
    async fn check_available(&self) -> Result<()> {
        run_gh(&["--version"]).await.map(|_| ())
    }

    async fn detect_repository(&self) -> Result<String> {
        let output = tokio::time::timeout(
            GIT_TIMEOUT,
            Command::new("git")
                .args(["remote", "get-url", "origin"])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| eyre!("git command timed out after {}s", GIT_TIMEOUT.as_secs()))?
        .map_err(|e| eyre!("Failed to run git: {e}"))?;

        if !output.status.success() {
            return Err(eyre!(
                "No git remote 'origin' found in the current directory."
            ));
        }
        let url = String::from_utf8_lossy(&output.stdout);
        parser::parse_remote_url(url.trim())
            .ok_or_else(|| eyre!("Remote origin is not a GitHub repository: {}", url.trim()))
    }

    async fn list_runs(&self, repo: &str, limit: usize) -> Result<Vec<WorkflowRun>> {
        let limit_str = limit.to_string();
        let json = run_gh(&[
            "run", "list",
            "--repo", repo,
            "--limit", &limit_str,
            "--json", RUN_FIELDS,
        ])
        .await?;
        parser::parse_runs(&json)
    }

    async fn get_run_detail(&self, repo: &str, run_id: u64) -> Result<RunDetail> {
        let run_id_str = run_id.to_string();
        let fields = format!("{RUN_FIELDS},jobs");
        let json = run_gh(&["run", "view", &run_id_str, "--repo", repo, "--json", &fields]).await?;
        parser::parse_run_detail(&json)
    }

    fn open_in_browser(&self, url: &str) -> Result<()> {
        open_in_browser_impl(url)
    }
}

async fn run_gh(args: &[&str]) -> Result<String> {
    let start = std::time::Instant::now();
    let output = tokio::time::timeout(
        GH_TIMEOUT,
        Command::new("gh").args(args).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| eyre!("gh command timed out after {}s", GH_TIMEOUT.as_secs()))?
    .map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            eyre!("gh CLI not found. Install it from https://cli.github.com/")
        } else {
            eyre!("Failed to run gh: {e}")
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(eyre!("{}", classify_gh_error(&stderr)));
    }

    tracing::debug!(
        args = ?args,
        elapsed_ms = start.elapsed().as_millis(),
        "gh command completed"
    );
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Opens a URL in the user's default browser. Only http(s) URLs are accepted.
fn open_in_browser_impl(url: &str) -> Result<()> {
    use std::process::{Command, Stdio};

    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(eyre!("Refusing to open non-HTTP URL: {url}"));
    }

    let spawn = |cmd: &str, args: &[&str]| {
        Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
    };

    if cfg!(target_os = "windows") {
        // Empty title argument keeps `start` from treating the URL as a window title.
        return spawn("cmd", &["/C", "start", "", url])
            .map_err(|e| eyre!("Failed to open browser: {e}"));
    }

    let wsl = std::env::var_os("WSL_DISTRO_NAME").is_some();
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if wsl {
        "wslview"
    } else {
        "xdg-open"
    };

    match spawn(opener, &[url]) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && wsl => {
            spawn("cmd.exe", &["/C", "start", "", url])
                .map_err(|e| eyre!("Failed to open browser via cmd.exe: {e}"))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(eyre!(
            "No browser opener found. On WSL install wslu; on Linux install xdg-utils."
        )),
        Err(e) => Err(eyre!("Failed to open browser with {opener}: {e}")),
    }
}

pub fn classify_gh_error(stderr: &str) -> String {
    if stderr.contains("not logged") || stderr.contains("auth login") {
        "Not authenticated with gh. Run `gh auth login` first.".to_string()
    } else if stderr.contains("Could not resolve to a Repository") {
        "Repository not found or not accessible.".to_string()
    } else if stderr.contains("API rate limit") {
        "GitHub API rate limit exceeded.".to_string()
    } else {
        let trimmed = stderr.trim();
        if trimmed.is_empty() {
            "gh command failed".to_string()
        } else {
            format!("gh command failed: {trimmed}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_not_logged_in() {
        let msg = classify_gh_error("You are not logged into any GitHub hosts");
        assert!(msg.contains("Not authenticated"));
    }

    #[test]
    fn classify_auth_login() {
        let msg = classify_gh_error("To get started with GitHub CLI, please run: gh auth login");
        assert!(msg.contains("Not authenticated"));
    }

    #[test]
    fn classify_missing_repo() {
        let msg = classify_gh_error(
            "GraphQL: Could not resolve to a Repository with the name 'o/nope'. (repository)",
        );
        assert_eq!(msg, "Repository not found or not accessible.");
    }

    #[test]
    fn classify_rate_limit() {
        let msg = classify_gh_error("HTTP 403: API rate limit exceeded for user ID 1.");
        assert!(msg.contains("rate limit"));
    }

    #[test]
    fn classify_generic_error() {
        let msg = classify_gh_error("something went wrong");
        assert_eq!(msg, "gh command failed: something went wrong");
    }

    #[test]
    fn classify_whitespace_only_stderr() {
        let msg = classify_gh_error("   \n  ");
        assert_eq!(msg, "gh command failed");
    }

    #[test]
    fn open_rejects_non_http_urls() {
        let err = open_in_browser_impl("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("Refusing"));
    }
}
