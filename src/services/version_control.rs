use async_trait::async_trait;

use crate::error::AppResult;

/// The five read-only repository queries the hook depends on. Kept narrow
/// so tests can fake the repository without a real git checkout.
#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// URL of the `origin` remote. Informational only.
    async fn origin_url(&self) -> AppResult<String>;
    /// Branch the remote designates as its primary integration target.
    async fn default_branch(&self) -> AppResult<String>;
    /// Abbreviated ref name of `HEAD`.
    async fn current_branch(&self) -> AppResult<String>;
    /// Full hash of `HEAD`.
    async fn head_commit(&self) -> AppResult<String>;
    /// Repo-relative paths touched by the merge commit at `HEAD`.
    async fn changed_files(&self) -> AppResult<Vec<String>>;
}
