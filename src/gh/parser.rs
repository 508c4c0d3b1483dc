use crate::app::{RunDetail, WorkflowRun};
use color_eyre::eyre::{eyre, Result};

pub fn parse_runs(json: &str) -> Result<Vec<WorkflowRun>> {
    serde_json::from_str(json).map_err(|e| eyre!("Failed to parse run list: {e}"))
}

pub fn parse_run_detail(json: &str) -> Result<RunDetail> {
    serde_json::from_str(json).map_err(|e| eyre!("Failed to parse run detail: {e}"))
}

/// Extract `owner/name` from a GitHub remote URL.
///
/// Accepts `git@github.com:owner/name.git`, `ssh://git@github.com/owner/name.git`
/// and `https://github.com/owner/name(.git)`.
pub fn parse_remote_url(url: &str) -> Option<String> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("git@github.com:") {
        rest
    } else {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .or_else(|| url.strip_prefix("ssh://"))?;
        // Drop optional userinfo (`git@`, `user:token@`).
        let rest = rest.rsplit_once('@').map_or(rest, |(_, host_path)| host_path);
        rest.strip_prefix("github.com/")?
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
            Some(format!("{owner}/{name}"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Conclusion, RunStatus};

    fn run_json(id: u64, status: &str, conclusion: &str) -> String {
        format!(
            r#"{{"databaseId":{id},"displayTitle":"Bump deps","name":"CI","workflowName":"CI",
            "headBranch":"main","event":"push","number":{id},"status":"{status}",
            "conclusion":{conclusion},"createdAt":"2024-03-01T12:00:00Z",
            "updatedAt":"2024-03-01T12:04:00Z","url":"https://github.com/o/r/actions/runs/{id}"}}"#
        )
    }

    #[test]
    fn parse_completed_run() {
        let json = format!("[{}]", run_json(9, "completed", r#""success""#));
        let runs = parse_runs(&json).unwrap();
        assert_eq!(runs.len(), 1);
        let run = &runs[0];
        assert_eq!(run.database_id, 9);
        assert_eq!(run.display_title, "Bump deps");
        assert_eq!(run.workflow_name, "CI");
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.conclusion, Some(Conclusion::Success));
        assert_eq!(run.url, "https://github.com/o/r/actions/runs/9");
    }

    #[test]
    fn parse_status_strings() {
        let statuses = [
            ("completed", RunStatus::Completed),
            ("in_progress", RunStatus::InProgress),
            ("queued", RunStatus::Queued),
            ("requested", RunStatus::Requested),
            ("waiting", RunStatus::Waiting),
            ("pending", RunStatus::Pending),
            ("brand_new", RunStatus::Unknown),
        ];
        for (s, expected) in statuses {
            let json = format!("[{}]", run_json(1, s, "null"));
            assert_eq!(parse_runs(&json).unwrap()[0].status, expected, "status {s}");
        }
    }

    #[test]
    fn parse_conclusion_strings() {
        let conclusions = [
            ("success", Conclusion::Success),
            ("failure", Conclusion::Failure),
            ("cancelled", Conclusion::Cancelled),
            ("skipped", Conclusion::Skipped),
            ("timed_out", Conclusion::TimedOut),
            ("action_required", Conclusion::ActionRequired),
            ("neutral", Conclusion::Neutral),
            ("stale", Conclusion::Stale),
            ("startup_failure", Conclusion::Unknown),
        ];
        for (s, expected) in conclusions {
            let json = format!("[{}]", run_json(1, "completed", &format!("\"{s}\"")));
            assert_eq!(
                parse_runs(&json).unwrap()[0].conclusion,
                Some(expected),
                "conclusion {s}"
            );
        }
    }

    #[test]
    fn parse_in_progress_empty_conclusion() {
        let json = format!("[{}]", run_json(1, "in_progress", r#""""#));
        assert_eq!(parse_runs(&json).unwrap()[0].conclusion, None);
    }

    #[test]
    fn parse_empty_list() {
        assert!(parse_runs("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_invalid_json_error() {
        assert!(parse_runs("not json").is_err());
        assert!(parse_runs(r#"[{"databaseId": 1}]"#).is_err());
    }

    #[test]
    fn parse_detail_with_jobs() {
        let run = run_json(5, "in_progress", "null");
        let json = format!(
            r#"{}, "jobs":[{{
                "databaseId": 77, "name": "test", "status": "in_progress", "conclusion": "",
                "startedAt": "2024-03-01T12:00:10Z", "completedAt": "0001-01-01T00:00:00Z",
                "url": "https://github.com/o/r/actions/runs/5/job/77",
                "steps": [
                    {{"name": "Set up job", "number": 1, "status": "completed", "conclusion": "success",
                      "startedAt": "2024-03-01T12:00:10Z", "completedAt": "2024-03-01T12:00:12Z"}},
                    {{"name": "Run tests", "number": 2, "status": "in_progress", "conclusion": null}}
                ]
            }}]}}"#,
            run.trim_end_matches('}')
        );
        let detail = parse_run_detail(&json).unwrap();
        assert_eq!(detail.run.database_id, 5);
        assert_eq!(detail.jobs.len(), 1);
        let job = &detail.jobs[0];
        assert_eq!(job.database_id, Some(77));
        assert_eq!(job.conclusion, None);
        assert!(job.started_at.is_some());
        assert!(job.completed_at.is_none());
        assert_eq!(job.steps[1].status, RunStatus::InProgress);
        assert!(job.steps[1].started_at.is_none());
    }

    #[test]
    fn parse_detail_without_jobs_field() {
        let detail = parse_run_detail(&run_json(5, "queued", "null")).unwrap();
        assert!(detail.jobs.is_empty());
    }

    #[test]
    fn remote_ssh_form() {
        assert_eq!(
            parse_remote_url("git@github.com:rust-lang/cargo.git").as_deref(),
            Some("rust-lang/cargo")
        );
    }

    #[test]
    fn remote_ssh_url_form() {
        assert_eq!(
            parse_remote_url("ssh://git@github.com/rust-lang/cargo.git").as_deref(),
            Some("rust-lang/cargo")
        );
    }

    #[test]
    fn remote_https_form() {
        assert_eq!(
            parse_remote_url("https://github.com/rust-lang/cargo").as_deref(),
            Some("rust-lang/cargo")
        );
        assert_eq!(
            parse_remote_url("https://token@github.com/rust-lang/cargo.git\n").as_deref(),
            Some("rust-lang/cargo")
        );
    }

    #[test]
    fn remote_non_github_rejected() {
        assert_eq!(parse_remote_url("https://gitlab.com/group/project.git"), None);
        assert_eq!(parse_remote_url("/local/path/repo"), None);
        assert_eq!(parse_remote_url("https://github.com/only-owner"), None);
    }
}
