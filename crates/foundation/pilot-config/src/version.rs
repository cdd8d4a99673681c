//! Build metadata recorded in the parameter store

use crate::params::{keys, ParamsStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

pub const TERMS_VERSION: &str = "2";
pub const TRAINING_VERSION: &str = "0.2.0";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub terms_version: String,
    pub training_version: String,
    pub git_commit: String,
    pub git_branch: String,
    pub git_remote: String,
}

impl VersionInfo {
    /// Collect version metadata, git fields from the checkout at `repo`.
    ///
    /// Git fields are empty when git is missing or `repo` is not a checkout.
    pub fn detect(repo: &Path) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            terms_version: TERMS_VERSION.to_string(),
            training_version: TRAINING_VERSION.to_string(),
            git_commit: git(repo, &["rev-parse", "HEAD"]),
            git_branch: git(repo, &["rev-parse", "--abbrev-ref", "HEAD"]),
            git_remote: git(repo, &["config", "--get", "remote.origin.url"]),
        }
    }

    /// Write every field under its well-known key
    pub fn store(&self, params: &dyn ParamsStore) -> Result<()> {
        params.put_all(&[
            (keys::VERSION, self.version.as_str()),
            (keys::TERMS_VERSION, self.terms_version.as_str()),
            (keys::TRAINING_VERSION, self.training_version.as_str()),
            (keys::GIT_COMMIT, self.git_commit.as_str()),
            (keys::GIT_BRANCH, self.git_branch.as_str()),
            (keys::GIT_REMOTE, self.git_remote.as_str()),
        ])
    }
}

fn git(repo: &Path, args: &[&str]) -> String {
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_default()
}
