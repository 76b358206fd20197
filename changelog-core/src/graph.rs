use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// A commit as produced by the revision walk.
#[derive(Debug, Clone)]
pub struct CommitEntry {
    /// Full hex SHA
    pub sha: String,
    /// Raw commit message, may span multiple lines
    pub message: String,
    /// Parent SHAs, first parent at index 0
    pub parents: Vec<String>,
}

impl CommitEntry {
    pub fn new(sha: String, message: String, parents: Vec<String>) -> Self {
        Self {
            sha,
            message,
            parents,
        }
    }

    /// Check if this is a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Check if this is a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

/// One rendered bullet: a commit reduced to what the changelog shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEntry {
    pub sha: String,
    pub message: String,
}

/// A top-level changelog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ChangeRecord {
    /// A non-merge commit that is not part of any merge group
    #[serde(rename = "simple")]
    Simple(ChangeEntry),
    /// A merge commit together with the side-branch commits it brought in,
    /// in the order the walk visited them
    #[serde(rename = "merge")]
    MergeGroup {
        merge: ChangeEntry,
        children: Vec<ChangeEntry>,
    },
}

/// Folds an ordered commit stream into a list of change records, absorbing
/// side-branch commits into the merge that introduced them.
///
/// The pending map points awaited SHAs at the index of their owning merge
/// group in `changes`. It only ever grows; an entry registered for one group
/// is never reassigned to another.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    changes: Vec<ChangeRecord>,
    pending: HashMap<String, usize>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one commit from the walk and fold it into the change list.
    pub fn visit(&mut self, commit: CommitEntry) {
        let CommitEntry {
            sha,
            message,
            parents,
        } = commit;

        if parents.len() > 1 {
            // The first parent continues the mainline; everything reachable
            // only through the second parent belongs to this merge.
            let group_idx = self.changes.len();
            self.pending.entry(parents[1].clone()).or_insert(group_idx);
            self.changes.push(ChangeRecord::MergeGroup {
                merge: ChangeEntry { sha, message },
                children: Vec::new(),
            });
        } else if let Some(&group_idx) = self.pending.get(&sha) {
            if let ChangeRecord::MergeGroup { children, .. } = &mut self.changes[group_idx] {
                children.push(ChangeEntry { sha, message });
            }
            // Pull this commit's ancestors into the same group when the walk
            // reaches them. Flat re-registration, not a descent.
            for parent in parents {
                self.pending.entry(parent).or_insert(group_idx);
            }
        } else {
            self.changes.push(ChangeRecord::Simple(ChangeEntry { sha, message }));
        }
    }

    /// Take the accumulated change list.
    pub fn finish(self) -> Vec<ChangeRecord> {
        self.changes
    }

    /// Consume a commit stream in one pass. A stream error terminates the
    /// walk early; everything classified before it is still returned so a
    /// partial changelog can be rendered.
    pub fn build<I>(stream: I) -> Vec<ChangeRecord>
    where
        I: IntoIterator<Item = Result<CommitEntry>>,
    {
        let mut builder = Self::new();

        for item in stream {
            match item {
                Ok(commit) => builder.visit(commit),
                Err(err) => {
                    warn!("Revision walk stopped early: {err:#}");
                    break;
                }
            }
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn commit(sha: &str, message: &str, parents: &[&str]) -> CommitEntry {
        CommitEntry::new(
            sha.to_string(),
            message.to_string(),
            parents.iter().map(|p| p.to_string()).collect(),
        )
    }

    fn simple(sha: &str, message: &str) -> ChangeRecord {
        ChangeRecord::Simple(ChangeEntry {
            sha: sha.to_string(),
            message: message.to_string(),
        })
    }

    #[test]
    fn test_linear_history_stays_simple() {
        let changes = GraphBuilder::build(vec![
            Ok(commit("c3", "Third", &["c2"])),
            Ok(commit("c2", "Second", &["c1"])),
            Ok(commit("c1", "First", &[])),
        ]);

        assert_eq!(
            changes,
            vec![
                simple("c3", "Third"),
                simple("c2", "Second"),
                simple("c1", "First"),
            ]
        );
    }

    #[test]
    fn test_root_commit_is_not_a_merge() {
        let changes = GraphBuilder::build(vec![Ok(commit("root", "Initial commit", &[]))]);

        assert_eq!(changes, vec![simple("root", "Initial commit")]);
    }

    #[test]
    fn test_merge_absorbs_single_side_commit() {
        // merge(m) joins side commit s; mainline commit a stays top-level.
        let changes = GraphBuilder::build(vec![
            Ok(commit("m", "Merge branch 'feature'", &["a", "s"])),
            Ok(commit("s", "Add feature", &["base"])),
            Ok(commit("a", "Mainline work", &["base"])),
        ]);

        assert_eq!(
            changes,
            vec![
                ChangeRecord::MergeGroup {
                    merge: ChangeEntry {
                        sha: "m".to_string(),
                        message: "Merge branch 'feature'".to_string(),
                    },
                    children: vec![ChangeEntry {
                        sha: "s".to_string(),
                        message: "Add feature".to_string(),
                    }],
                },
                simple("a", "Mainline work"),
            ]
        );
    }

    #[test]
    fn test_membership_propagates_along_side_branch() {
        // s2 -> s1 is a two-commit side branch; absorbing s2 must register
        // s1 for the same group.
        let changes = GraphBuilder::build(vec![
            Ok(commit("m", "Merge branch 'feature'", &["a", "s2"])),
            Ok(commit("s2", "Polish feature", &["s1"])),
            Ok(commit("s1", "Start feature", &["base"])),
            Ok(commit("a", "Mainline work", &["base"])),
        ]);

        assert_eq!(changes.len(), 2);
        match &changes[0] {
            ChangeRecord::MergeGroup { children, .. } => {
                let shas: Vec<&str> = children.iter().map(|c| c.sha.as_str()).collect();
                assert_eq!(shas, vec!["s2", "s1"]);
            }
            other => panic!("expected merge group, got {other:?}"),
        }
        assert_eq!(changes[1], simple("a", "Mainline work"));
    }

    #[test]
    fn test_pending_entry_is_never_reassigned() {
        // Two merges both naming s as their second parent; s stays with the
        // group that registered it first.
        let changes = GraphBuilder::build(vec![
            Ok(commit("m1", "Merge once", &["a", "s"])),
            Ok(commit("m2", "Merge again", &["b", "s"])),
            Ok(commit("s", "Shared side commit", &["base"])),
        ]);

        assert_eq!(changes.len(), 2);
        match (&changes[0], &changes[1]) {
            (
                ChangeRecord::MergeGroup {
                    children: first, ..
                },
                ChangeRecord::MergeGroup {
                    children: second, ..
                },
            ) => {
                assert_eq!(first.len(), 1);
                assert_eq!(first[0].sha, "s");
                assert!(second.is_empty());
            }
            other => panic!("expected two merge groups, got {other:?}"),
        }
    }

    #[test]
    fn test_stream_error_yields_partial_result() {
        let changes = GraphBuilder::build(vec![
            Ok(commit("c3", "Third", &["c2"])),
            Ok(commit("c2", "Second", &["c1"])),
            Ok(commit("c1", "First", &["c0"])),
            Err(anyhow!("object not found")),
            Ok(commit("c0", "Never reached", &[])),
        ]);

        assert_eq!(
            changes,
            vec![
                simple("c3", "Third"),
                simple("c2", "Second"),
                simple("c1", "First"),
            ]
        );
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let changes = GraphBuilder::build(vec![Ok(commit("c1", "First", &[]))]);
        let json = serde_json::to_value(&changes).unwrap();

        assert_eq!(json[0]["type"], "simple");
        assert_eq!(json[0]["sha"], "c1");
    }
}
