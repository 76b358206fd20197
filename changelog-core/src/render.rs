use crate::graph::{ChangeEntry, ChangeRecord};

/// Render the change list as a Markdown changelog.
///
/// `repo_name` ("owner/repo") only feeds the GitHub compare/commit links and
/// is never validated against an actual remote. Rendering is a pure string
/// transformation and cannot fail.
pub fn render(repo_name: &str, from: &str, to: &str, changes: &[ChangeRecord]) -> String {
    let mut out = String::from("# Changelog\n\n");
    out.push_str(&format!(
        "Commit range: [{from}..{to}](https://github.com/{repo_name}/compare/{from}...{to})\n\n"
    ));

    for change in changes {
        match change {
            ChangeRecord::Simple(entry) => {
                out.push_str(&format_commit(repo_name, entry, false));
            }
            ChangeRecord::MergeGroup { children, .. } if children.len() == 1 => {
                // A merge that brought in exactly one change carries no
                // information of its own; show the change instead.
                out.push_str(&format_commit(repo_name, &children[0], false));
            }
            ChangeRecord::MergeGroup { merge, children } => {
                out.push_str(&format_commit(repo_name, merge, false));
                out.push_str("\n  <details><summary>Commit details</summary>\n\n");
                for child in children {
                    out.push_str("    ");
                    out.push_str(&format_commit(repo_name, child, true));
                }
                out.push_str("  </details>\n");
            }
        }
    }

    out
}

/// Format one commit as a list item with a short-SHA link. Continuation
/// lines of the message are indented under the bullet, deeper when the item
/// sits inside a details block.
fn format_commit(repo_name: &str, entry: &ChangeEntry, nested: bool) -> String {
    let continuation = if nested { "\n      " } else { "\n  " };
    let sha8 = &entry.sha[..entry.sha.len().min(8)];
    let message = entry
        .message
        .trim()
        .split('\n')
        .collect::<Vec<_>>()
        .join(continuation);

    format!(
        "- [{sha8}](https://github.com/{repo_name}/commit/{sha}) {message}\n",
        sha = entry.sha
    )
}
