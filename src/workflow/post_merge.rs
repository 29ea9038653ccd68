use std::fs;
use std::path::Path;

use tracing::debug;

use crate::context::HookContext;
use crate::domain::payload::{
    ChangedFile, MarkerFilter, UploadPayload, validate_branch, validate_commit,
};
use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub enum PostMergeOutcome {
    /// The merge landed somewhere other than the default branch.
    Skipped,
    Uploaded {
        branch: String,
        commit: String,
        files: usize,
    },
}

pub async fn run(ctx: &HookContext) -> AppResult<PostMergeOutcome> {
    let origin = ctx.version_control.origin_url().await?;
    debug!(origin = %origin, "resolved origin remote");

    let default_branch = ctx.version_control.default_branch().await?;
    let current_branch = ctx.version_control.current_branch().await?;
    if current_branch != default_branch {
        debug!(
            current = %current_branch,
            default = %default_branch,
            "merge did not land on the default branch, nothing to report"
        );
        return Ok(PostMergeOutcome::Skipped);
    }
    validate_branch(&current_branch)?;

    let commit = ctx.version_control.head_commit().await?;
    validate_commit(&commit)?;

    let changed = ctx.version_control.changed_files().await?;
    debug!(count = changed.len(), "collected changed files from merge commit");

    let files = collect_changed_files(
        &ctx.settings.workspace_root,
        &changed,
        ctx.settings.marker_filter,
    )?;

    let payload = UploadPayload {
        repo: repo_name(&ctx.settings.workspace_root),
        branch: current_branch.clone(),
        commit: commit.clone(),
        files,
    };

    debug!(
        files = payload.files.len(),
        endpoint = %ctx.settings.endpoint,
        "uploading merge payload"
    );
    ctx.uploader.upload(&payload).await?;

    Ok(PostMergeOutcome::Uploaded {
        branch: current_branch,
        commit,
        files: payload.files.len(),
    })
}

/// Reads every changed file and keeps the ones the marker filter admits.
/// Any unreadable file aborts the run; a partial upload would misrepresent
/// the merge.
fn collect_changed_files(
    workspace_root: &Path,
    changed: &[String],
    filter: MarkerFilter,
) -> AppResult<Vec<ChangedFile>> {
    let mut files = Vec::new();
    for repo_path in changed {
        let full_path = workspace_root.join(repo_path);
        let content = fs::read_to_string(&full_path).map_err(|err| {
            AppError::FileAccess(format!("could not read {}: {err}", full_path.display()))
        })?;
        if filter.includes(&content) {
            files.push(ChangedFile::from_repo_path(repo_path, content));
        }
    }
    Ok(files)
}

fn repo_name(workspace_root: &Path) -> String {
    workspace_root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| workspace_root.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::config::{HookConfig, Settings};
    use crate::services::{UploadService, VersionControlService};

    const COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

    struct FakeRepo {
        default_branch: String,
        current_branch: String,
        commit: String,
        changed: Vec<String>,
    }

    #[async_trait]
    impl VersionControlService for FakeRepo {
        async fn origin_url(&self) -> AppResult<String> {
            Ok("git@example.com:demo/repo.git".to_string())
        }
        async fn default_branch(&self) -> AppResult<String> {
            Ok(self.default_branch.clone())
        }
        async fn current_branch(&self) -> AppResult<String> {
            Ok(self.current_branch.clone())
        }
        async fn head_commit(&self) -> AppResult<String> {
            Ok(self.commit.clone())
        }
        async fn changed_files(&self) -> AppResult<Vec<String>> {
            Ok(self.changed.clone())
        }
    }

    #[derive(Default)]
    struct RecordingUploader {
        payloads: Mutex<Vec<UploadPayload>>,
    }

    #[async_trait]
    impl UploadService for RecordingUploader {
        async fn upload(&self, payload: &UploadPayload) -> AppResult<()> {
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    fn settings(workspace_root: PathBuf, legacy_filter: bool) -> Settings {
        Settings::new(
            HookConfig {
                api_key: "abc123".to_string(),
            },
            workspace_root,
            false,
            legacy_filter,
        )
    }

    fn context(
        repo: FakeRepo,
        workspace_root: PathBuf,
        legacy_filter: bool,
    ) -> (HookContext, Arc<RecordingUploader>) {
        let uploader = Arc::new(RecordingUploader::default());
        let ctx = HookContext::new(
            settings(workspace_root, legacy_filter),
            Arc::new(repo),
            uploader.clone(),
        );
        (ctx, uploader)
    }

    #[tokio::test]
    async fn skips_merges_on_other_branches() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FakeRepo {
            default_branch: "main".to_string(),
            current_branch: "feature/x".to_string(),
            commit: COMMIT.to_string(),
            changed: vec!["would_fail_to_read.py".to_string()],
        };
        let (ctx, uploader) = context(repo, dir.path().to_path_buf(), false);

        let outcome = run(&ctx).await.unwrap();
        assert!(matches!(outcome, PostMergeOutcome::Skipped));
        assert!(uploader.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn uploads_marker_files_from_a_default_branch_merge() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/a.py"), "# @docstring\nprint('a')\n").unwrap();
        fs::write(dir.path().join("b.py"), "# @docstring\nprint('b')\n").unwrap();
        fs::write(dir.path().join("plain.py"), "print('no marker')\n").unwrap();

        let repo = FakeRepo {
            default_branch: "main".to_string(),
            current_branch: "main".to_string(),
            commit: COMMIT.to_string(),
            changed: vec![
                "src/a.py".to_string(),
                "b.py".to_string(),
                "plain.py".to_string(),
            ],
        };
        let (ctx, uploader) = context(repo, dir.path().to_path_buf(), false);

        let outcome = run(&ctx).await.unwrap();
        assert!(matches!(outcome, PostMergeOutcome::Uploaded { files: 2, .. }));

        let payloads = uploader.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        let payload = &payloads[0];
        assert_eq!(
            payload.repo,
            dir.path().file_name().unwrap().to_string_lossy()
        );
        assert_eq!(payload.branch, "main");
        assert_eq!(payload.commit, COMMIT);
        assert_eq!(payload.files[0].filename, "a.py");
        assert_eq!(payload.files[0].path, "src");
        assert_eq!(payload.files[1].filename, "b.py");
        assert_eq!(payload.files[1].path, "");
    }

    #[tokio::test]
    async fn legacy_filter_uploads_an_empty_file_list() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "# @docstring\n").unwrap();

        let repo = FakeRepo {
            default_branch: "main".to_string(),
            current_branch: "main".to_string(),
            commit: COMMIT.to_string(),
            changed: vec!["a.py".to_string()],
        };
        let (ctx, uploader) = context(repo, dir.path().to_path_buf(), true);

        let outcome = run(&ctx).await.unwrap();
        assert!(matches!(outcome, PostMergeOutcome::Uploaded { files: 0, .. }));

        // The POST still happens; only the file list is empty.
        let payloads = uploader.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].files.is_empty());
    }

    #[tokio::test]
    async fn unreadable_changed_file_aborts_before_upload() {
        let dir = tempfile::tempdir().unwrap();

        let repo = FakeRepo {
            default_branch: "main".to_string(),
            current_branch: "main".to_string(),
            commit: COMMIT.to_string(),
            changed: vec!["deleted.py".to_string()],
        };
        let (ctx, uploader) = context(repo, dir.path().to_path_buf(), false);

        let err = run(&ctx).await.unwrap_err();
        assert!(matches!(err, AppError::FileAccess(_)));
        assert!(uploader.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_commit_from_git_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let repo = FakeRepo {
            default_branch: "main".to_string(),
            current_branch: "main".to_string(),
            commit: "not-a-hash".to_string(),
            changed: Vec::new(),
        };
        let (ctx, uploader) = context(repo, dir.path().to_path_buf(), false);

        let err = run(&ctx).await.unwrap_err();
        assert!(matches!(err, AppError::VersionControl(_)));
        assert!(uploader.payloads.lock().unwrap().is_empty());
    }
}
