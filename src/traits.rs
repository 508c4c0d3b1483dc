use crate::app::{RunDetail, WorkflowRun};
use async_trait::async_trait;
use color_eyre::eyre::Result;

/// Source of workflow data plus the browser side effect. The gh CLI implementation
/// lives in `gh::executor`; tests substitute in-memory fakes.
#[async_trait]
pub trait FetchGateway: Send + Sync {
    async fn check_available(&self) -> Result<()>;
    async fn detect_repository(&self) -> Result<String>;
    async fn list_runs(&self, repo: &str, limit: usize) -> Result<Vec<WorkflowRun>>;
    async fn get_run_detail(&self, repo: &str, run_id: u64) -> Result<RunDetail>;
    fn open_in_browser(&self, url: &str) -> Result<()>;
}
