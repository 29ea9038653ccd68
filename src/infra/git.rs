use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const REMOTE_HEAD_REF: &str = "refs/remotes/origin/HEAD";
const REMOTE_REF_PREFIX: &str = "refs/remotes/origin/";

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn run(&self, query: &str, args: &[&str]) -> AppResult<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workspace_root)
            .output()
            .await
            .map_err(|err| {
                AppError::VersionControl(format!("{query}: failed to invoke git: {err}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::VersionControl(format!(
                "{query}: `git {}` failed: {}",
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_line(&self, query: &str, args: &[&str]) -> AppResult<String> {
        Ok(self.run(query, args).await?.trim().to_string())
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn origin_url(&self) -> AppResult<String> {
        self.run_line("origin url", &["config", "--get", "remote.origin.url"])
            .await
    }

    async fn default_branch(&self) -> AppResult<String> {
        let full_ref = self
            .run_line("default branch", &["symbolic-ref", REMOTE_HEAD_REF])
            .await?;
        Ok(full_ref
            .strip_prefix(REMOTE_REF_PREFIX)
            .unwrap_or(&full_ref)
            .to_string())
    }

    async fn current_branch(&self) -> AppResult<String> {
        self.run_line("current branch", &["rev-parse", "--abbrev-ref", "HEAD"])
            .await
    }

    async fn head_commit(&self) -> AppResult<String> {
        self.run_line("head commit", &["rev-parse", "HEAD"]).await
    }

    async fn changed_files(&self) -> AppResult<Vec<String>> {
        // `git diff` terminates every name with a newline; the final blank
        // entry must not survive as a path.
        let listing = self
            .run("changed files", &["diff", "--name-only", "HEAD~", "HEAD"])
            .await?;
        Ok(listing
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}
