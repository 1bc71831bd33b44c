//! Branch listing, classification filters, checkout and deletion

use std::collections::HashSet;

use tracing::debug;

use super::GitRepository;
use crate::error::{FlowError, Result};
use crate::git::classify::{
    compare_production_release_names, parse_branch_list, remote_branch_origin_and_name, Branch,
    BranchKind,
};
use crate::git::runner::CommandRunner;

// Same `<marker>[<name>] <message>` shape as `show-branch --list`, without
// its limit on the number of refs.
const BRANCH_LIST_FORMAT: &str = "--format=%(HEAD) [%(refname:lstrip=2)] %(subject)";

impl<R: CommandRunner> GitRepository<R> {
    pub fn local_branches(&self) -> Result<Vec<Branch>> {
        let stdout = self.git(&["for-each-ref", BRANCH_LIST_FORMAT, "refs/heads"])?;
        Ok(parse_branch_list(&stdout))
    }

    /// Remote-tracking branches. Always empty in local mode.
    pub fn remote_branches(&self) -> Result<Vec<Branch>> {
        if self.mode.is_local() {
            return Ok(Vec::new());
        }

        let stdout = self.git(&["for-each-ref", BRANCH_LIST_FORMAT, "refs/remotes"])?;
        Ok(parse_branch_list(&stdout)
            .into_iter()
            .filter_map(|branch| {
                let (origin, name) = remote_branch_origin_and_name(&branch.name)?;
                if name == "HEAD" {
                    return None;
                }
                Some(Branch {
                    name: name.to_string(),
                    last_commit_message: branch.last_commit_message.clone(),
                    origin: Some(origin.to_string()),
                })
            })
            .collect())
    }

    pub fn all_branches(&self) -> Result<Vec<Branch>> {
        let mut branches = self.local_branches()?;
        branches.extend(self.remote_branches()?);
        Ok(branches)
    }

    /// Local branches plus remote branches that have no local copy, one
    /// record per name.
    pub fn all_branches_favor_local(&self) -> Result<Vec<Branch>> {
        let mut branches = self.local_branches()?;
        let mut seen: HashSet<String> = branches.iter().map(|b| b.name.clone()).collect();
        for branch in self.remote_branches()? {
            if seen.insert(branch.name.clone()) {
                branches.push(branch);
            }
        }
        Ok(branches)
    }

    fn filter_kind(&self, branches: Vec<Branch>, kind: BranchKind) -> Result<Vec<Branch>> {
        let mut matching = Vec::new();
        for branch in branches {
            if self.branch_kind(&branch.name)? == kind {
                matching.push(branch);
            }
        }
        if kind == BranchKind::ProductionRelease {
            matching.sort_by(|a, b| compare_production_release_names(&a.name, &b.name));
        }
        Ok(matching)
    }

    pub fn local_feature_branches(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(self.local_branches()?, BranchKind::Feature)
    }

    pub fn remote_feature_branches(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(self.remote_branches()?, BranchKind::Feature)
    }

    pub fn feature_branches_favor_local(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(self.all_branches_favor_local()?, BranchKind::Feature)
    }

    /// Local production release branches, oldest version first.
    pub fn local_production_release_branches(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(self.local_branches()?, BranchKind::ProductionRelease)
    }

    pub fn remote_production_release_branches(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(self.remote_branches()?, BranchKind::ProductionRelease)
    }

    pub fn production_release_branches_favor_local(&self) -> Result<Vec<Branch>> {
        self.main_branch_name()?;
        self.filter_kind(
            self.all_branches_favor_local()?,
            BranchKind::ProductionRelease,
        )
    }

    /// Whether git accepts `name` as a branch name.
    pub fn is_valid_branch_name(&self, name: &str) -> bool {
        !name.is_empty() && self.git_bool(&["check-ref-format", "--branch", name])
    }

    pub fn has_local_branch(&self, name: &str) -> bool {
        let ref_path = format!("refs/heads/{name}");
        self.git_bool(&["rev-parse", "--verify", "--quiet", &ref_path])
    }

    /// Whether the configured remote has a branch called `name`, according
    /// to the last fetch. Always false in local mode.
    pub fn has_remote_branch(&self, name: &str) -> Result<bool> {
        Ok(self
            .remote_branches()?
            .iter()
            .any(|b| b.name == name && b.origin.as_deref() == Some(self.remote.as_str())))
    }

    pub fn checkout_branch(&self, name: &str) -> Result<()> {
        self.git(&["checkout", name])?;
        Ok(())
    }

    /// Create `name` (from `start_point`, or HEAD) and switch to it.
    pub fn checkout_new_branch(&self, name: &str, start_point: Option<&str>) -> Result<()> {
        let mut args = vec!["checkout", "-b", name];
        if let Some(start) = start_point {
            args.push(start);
        }
        self.git(&args)?;
        Ok(())
    }

    /// Delete a local branch, refusing if git considers it unmerged.
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        self.git(&["branch", "-d", name])?;
        Ok(())
    }

    pub fn delete_branch_force(&self, name: &str) -> Result<()> {
        self.git(&["branch", "-D", name])?;
        Ok(())
    }

    /// Commit `name` points at on the configured remote, asked of the remote
    /// itself rather than read from remote-tracking refs. `None` in local
    /// mode, without a remote, or when the remote has no such branch.
    pub fn remote_branch_head(&self, name: &str) -> Result<Option<String>> {
        if !self.remote_enabled()? {
            return Ok(None);
        }
        let ref_name = format!("refs/heads/{name}");
        let stdout = self.git(&["ls-remote", "--heads", &self.remote, &ref_name])?;
        Ok(stdout.lines().find_map(|line| {
            let (sha, reference) = line.split_once('\t')?;
            (reference.trim() == ref_name).then(|| sha.trim().to_string())
        }))
    }

    /// Delete `name` on the configured remote once it is fully merged into
    /// main.
    ///
    /// A no-op in local mode, without a remote, or when the remote has no
    /// such branch.
    pub fn delete_remote_branch(&self, name: &str) -> Result<()> {
        let Some(head) = self.remote_branch_head(name)? else {
            debug!(branch = name, "no remote branch to delete");
            return Ok(());
        };

        if !self.git_bool(&["cat-file", "-e", &format!("{head}^{{commit}}")]) {
            let ref_name = format!("refs/heads/{name}");
            self.git(&["fetch", &self.remote, &ref_name])?;
        }

        let main = self.main_branch_name()?;
        let ahead = self.commits_ahead_of_branch(main, &head)?;
        if ahead > 0 {
            return Err(FlowError::BranchNotMerged {
                branch: format!("{}/{name}", self.remote),
                base: main.to_string(),
                ahead,
            });
        }

        self.git(&["push", &self.remote, "--delete", name])?;
        Ok(())
    }

    /// Delete `name` on the configured remote without the merge check.
    pub fn delete_remote_branch_force(&self, name: &str) -> Result<()> {
        if self.remote_branch_head(name)?.is_none() {
            debug!(branch = name, "no remote branch to delete");
            return Ok(());
        }

        self.git(&["push", &self.remote, "--delete", name])?;
        Ok(())
    }
}
