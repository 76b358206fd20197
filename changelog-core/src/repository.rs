use anyhow::{Context, Result};
use git2::{Oid, Repository as Git2Repository, Sort};
use std::path::Path;

use crate::graph::CommitEntry;

/// Thin wrapper around libgit2 exposing what the changelog needs: open a
/// repository and walk a revision range.
pub struct Repository {
    repo: Git2Repository,
}

impl Repository {
    /// Open an existing repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Git2Repository::open(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Locate the repository from the current directory and environment,
    /// the way plain `git` does
    pub fn open_from_env() -> Result<Self> {
        let repo = Git2Repository::open_from_env().context("Failed to open repository")?;

        Ok(Self { repo })
    }

    /// Create a walk over `from..to`. A range that does not resolve is a
    /// setup error and fails the whole run; errors while iterating the
    /// returned walk are surfaced per commit instead.
    pub fn walk_range(&self, from: &str, to: &str, topo_order: bool) -> Result<RangeWalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        if topo_order {
            // Stable topology ordering, children before parents
            revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        }

        let range = format!("{from}..{to}");
        revwalk
            .push_range(&range)
            .with_context(|| format!("Failed to push range {range}"))?;

        Ok(RangeWalk {
            repo: &self.repo,
            revwalk,
        })
    }
}

/// Iterator over a revision range, resolving each walked id to a
/// [`CommitEntry`].
pub struct RangeWalk<'repo> {
    repo: &'repo Git2Repository,
    revwalk: git2::Revwalk<'repo>,
}

impl RangeWalk<'_> {
    fn resolve(&self, oid: Oid) -> Result<CommitEntry> {
        let commit = self
            .repo
            .find_commit(oid)
            .with_context(|| format!("Failed to look up commit {oid}"))?;

        let parents = commit.parent_ids().map(|id| id.to_string()).collect();

        Ok(CommitEntry::new(
            oid.to_string(),
            commit.message().unwrap_or("").to_string(),
            parents,
        ))
    }
}

impl Iterator for RangeWalk<'_> {
    type Item = Result<CommitEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.revwalk.next()? {
            Ok(oid) => Some(self.resolve(oid)),
            Err(err) => Some(Err(err).context("Revision walk failed to produce next commit")),
        }
    }
}
