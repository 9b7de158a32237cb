//! Subprocess-backed git gateway

use crate::error::{Error, Result};
use crate::git::{GitGateway, DEFAULT_REMOTE};
use crate::process::{self, Tool};
use crate::types::{BranchDivergence, WorktreeInfo};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Git gateway that shells out to the `git` binary
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCli;

impl GitCli {
    /// Create a new gateway
    pub const fn new() -> Self {
        Self
    }

    async fn git(cwd: &Path, args: &[&str]) -> Result<String> {
        process::run_checked(Tool::Git, args, cwd).await
    }

    async fn ref_exists(cwd: &Path, reference: &str) -> Result<bool> {
        let output =
            process::run("git", &["rev-parse", "--verify", "--quiet", reference], cwd).await?;
        Ok(output.success)
    }
}

#[async_trait]
impl GitGateway for GitCli {
    async fn current_branch(&self, cwd: &Path) -> Result<Option<String>> {
        let output = process::run("git", &["symbolic-ref", "--quiet", "--short", "HEAD"], cwd)
            .await?;
        if output.success {
            Ok(Some(output.stdout.trim().to_string()))
        } else {
            debug!("detached HEAD in {}", cwd.display());
            Ok(None)
        }
    }

    async fn repo_root(&self, cwd: &Path) -> Result<PathBuf> {
        // The common dir's parent is the main worktree, even from a linked worktree
        let common = self.git_common_dir(cwd).await?;
        common
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::Git(format!("unexpected git dir: {}", common.display())))
    }

    async fn git_common_dir(&self, cwd: &Path) -> Result<PathBuf> {
        let dir = Self::git(cwd, &["rev-parse", "--path-format=absolute", "--git-common-dir"])
            .await?;
        Ok(PathBuf::from(dir))
    }

    async fn trunk_branch(&self, repo_root: &Path) -> Result<String> {
        let remote_head = format!("refs/remotes/{DEFAULT_REMOTE}/HEAD");
        let output = process::run(
            "git",
            &["symbolic-ref", "--quiet", "--short", &remote_head],
            repo_root,
        )
        .await?;
        if output.success {
            let full = output.stdout.trim();
            let prefix = format!("{DEFAULT_REMOTE}/");
            return Ok(full.strip_prefix(&prefix).unwrap_or(full).to_string());
        }

        for candidate in ["main", "master"] {
            if Self::ref_exists(repo_root, &format!("refs/heads/{candidate}")).await? {
                return Ok(candidate.to_string());
            }
        }
        Ok("main".to_string())
    }

    #[instrument(skip(self))]
    async fn list_worktrees(&self, repo_root: &Path) -> Result<Vec<WorktreeInfo>> {
        let out = Self::git(repo_root, &["worktree", "list", "--porcelain"]).await?;
        Ok(parse_worktree_list(&out))
    }

    async fn branch_head(&self, repo_root: &Path, branch: &str) -> Result<Option<String>> {
        let reference = format!("refs/heads/{branch}");
        let output =
            process::run("git", &["rev-parse", "--verify", "--quiet", &reference], repo_root)
                .await?;
        Ok(output
            .success
            .then(|| output.stdout.trim().to_string())
            .filter(|sha| !sha.is_empty()))
    }

    async fn local_branches(&self, repo_root: &Path) -> Result<Vec<String>> {
        let out = Self::git(
            repo_root,
            &["for-each-ref", "--format=%(refname:short)", "refs/heads/"],
        )
        .await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(ToString::to_string)
            .collect())
    }

    async fn commits_ahead(&self, cwd: &Path, base: &str) -> Result<u32> {
        let range = format!("{base}..HEAD");
        let out = Self::git(cwd, &["rev-list", "--count", &range]).await?;
        out.parse()
            .map_err(|_| Error::Parse(format!("unexpected rev-list count: {out}")))
    }

    #[instrument(skip(self))]
    async fn divergence(&self, cwd: &Path, branch: &str) -> Result<BranchDivergence> {
        let remote_ref = format!("refs/remotes/{DEFAULT_REMOTE}/{branch}");
        if !Self::ref_exists(cwd, &remote_ref).await? {
            debug!("{branch} has no remote tracking branch");
            return Ok(BranchDivergence::default());
        }

        let range = format!("{branch}...{DEFAULT_REMOTE}/{branch}");
        let out = Self::git(cwd, &["rev-list", "--left-right", "--count", &range]).await?;
        parse_left_right(&out)
    }

    async fn remote_url(&self, cwd: &Path, remote: &str) -> Result<String> {
        Self::git(cwd, &["remote", "get-url", remote])
            .await
            .map_err(|_| Error::RemoteNotFound(remote.to_string()))
    }

    async fn fetch(&self, cwd: &Path) -> Result<()> {
        Self::git(cwd, &["fetch", "--prune", DEFAULT_REMOTE]).await?;
        Ok(())
    }

    async fn pull_rebase(&self, cwd: &Path, branch: &str) -> Result<()> {
        Self::git(cwd, &["pull", "--rebase", DEFAULT_REMOTE, branch]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn push(&self, cwd: &Path, branch: &str, force: bool) -> Result<()> {
        let mut args = vec!["push", "--set-upstream"];
        if force {
            args.push("--force-with-lease");
        }
        args.push(DEFAULT_REMOTE);
        args.push(branch);
        Self::git(cwd, &args).await?;
        Ok(())
    }

    async fn checkout(&self, cwd: &Path, branch: &str) -> Result<()> {
        Self::git(cwd, &["checkout", branch]).await?;
        Ok(())
    }

    async fn create_branch(
        &self,
        repo_root: &Path,
        branch: &str,
        start_point: &str,
    ) -> Result<()> {
        Self::git(repo_root, &["branch", branch, start_point]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_worktree(&self, repo_root: &Path, path: &Path, branch: &str) -> Result<()> {
        let path = path.to_string_lossy();
        Self::git(repo_root, &["worktree", "add", &path, branch]).await?;
        Ok(())
    }

    async fn head_commit_message(&self, cwd: &Path) -> Result<String> {
        Self::git(cwd, &["log", "-1", "--format=%B"]).await
    }

    async fn diff_against(&self, cwd: &Path, base: &str) -> Result<String> {
        let range = format!("{base}...HEAD");
        Self::git(cwd, &["diff", &range]).await
    }
}

/// Parse `git worktree list --porcelain` output
///
/// The first record is always the main worktree.
pub fn parse_worktree_list(output: &str) -> Vec<WorktreeInfo> {
    let mut worktrees = Vec::new();
    let mut path: Option<PathBuf> = None;
    let mut branch: Option<String> = None;

    let mut flush = |path: &mut Option<PathBuf>, branch: &mut Option<String>| {
        if let Some(p) = path.take() {
            let is_root = worktrees.is_empty();
            worktrees.push(WorktreeInfo {
                path: p,
                branch: branch.take(),
                is_root,
            });
        }
        *branch = None;
    };

    for line in output.lines() {
        if line.trim().is_empty() {
            flush(&mut path, &mut branch);
        } else if let Some(p) = line.strip_prefix("worktree ") {
            flush(&mut path, &mut branch);
            path = Some(PathBuf::from(p));
        } else if let Some(b) = line.strip_prefix("branch ") {
            branch = Some(b.strip_prefix("refs/heads/").unwrap_or(b).to_string());
        }
    }
    flush(&mut path, &mut branch);

    worktrees
}

fn parse_left_right(out: &str) -> Result<BranchDivergence> {
    let mut parts = out.split_whitespace().map(str::parse::<u32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(ahead)), Some(Ok(behind))) => Ok(BranchDivergence::from_counts(ahead, behind)),
        _ => Err(Error::Parse(format!("unexpected rev-list output: {out}"))),
    }
}
