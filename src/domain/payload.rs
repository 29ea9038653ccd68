use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Marker a file must carry to be included in the upload.
pub const MARKER: &str = "@docstring";

#[derive(Debug, Clone, Serialize)]
pub struct ChangedFile {
    pub filename: String,
    pub path: String,
    pub content: String,
}

impl ChangedFile {
    /// Splits a repo-relative path into base name and containing directory.
    pub fn from_repo_path(repo_path: &str, content: String) -> Self {
        let path = Path::new(repo_path);
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| repo_path.to_string());
        let directory = path
            .parent()
            .map(|parent| parent.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            path: directory,
            content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadPayload {
    pub repo: String,
    pub branch: String,
    pub commit: String,
    pub files: Vec<ChangedFile>,
}

/// Which variable the `@docstring` inclusion check runs against.
///
/// The hook this replaces tested the marker against the list of records
/// collected so far instead of the text of the file just read, so no file
/// ever qualified. Both readings stay selectable until product clarifies
/// which one is intended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerFilter {
    /// Include a file when its text contains the marker.
    FileContent,
    /// Bug-compatible check against the accumulator; a record never equals
    /// the marker string, so nothing is ever included.
    LegacyAccumulator,
}

impl MarkerFilter {
    pub fn includes(&self, content: &str) -> bool {
        match self {
            MarkerFilter::FileContent => content.contains(MARKER),
            MarkerFilter::LegacyAccumulator => false,
        }
    }
}

/// Commit ids come from subprocess output; refuse anything that is not a
/// full lowercase hex hash before it reaches a payload.
pub fn validate_commit(commit: &str) -> AppResult<()> {
    let well_formed = commit.len() == 40
        && commit
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
    if well_formed {
        Ok(())
    } else {
        Err(AppError::VersionControl(format!(
            "malformed commit id from git: {commit:?}"
        )))
    }
}

/// Branch names are embedded in the JSON body; allow the conservative
/// character set git itself produces for ordinary branches.
pub fn validate_branch(branch: &str) -> AppResult<()> {
    let well_formed = !branch.is_empty()
        && branch
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-'));
    if well_formed {
        Ok(())
    } else {
        Err(AppError::VersionControl(format!(
            "malformed branch name from git: {branch:?}"
        )))
    }
}
