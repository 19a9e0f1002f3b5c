//! ASCII rendering of filtered trees.

use crate::domain::model::TreeNode;

/// Render `tree` with box-drawing connectors.
///
/// ```text
/// proj/
/// ├─┬ src/
/// │ └── lib.rs
/// └── README.md
/// ```
///
/// Every line, including the last, ends with a newline.
pub fn render(tree: &TreeNode) -> String {
    let mut out = String::new();
    render_into(&mut out, tree, "", "");
    out
}

fn render_into(out: &mut String, node: &TreeNode, lead: &str, prefix: &str) {
    let continuation = if node.children.is_empty() { "  " } else { "│ " };
    for (index, line) in node.label.split('\n').enumerate() {
        if index == 0 {
            out.push_str(lead);
        } else {
            out.push_str(prefix);
            out.push_str(continuation);
        }
        out.push_str(line);
        out.push('\n');
    }

    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let last = index + 1 == count;
        let branch = if last { '└' } else { '├' };
        let fork = if child.children.is_empty() { '─' } else { '┬' };
        let lead = format!("{prefix}{branch}─{fork} ");
        let child_prefix = format!("{prefix}{}", if last { "  " } else { "│ " });
        render_into(out, child, &lead, &child_prefix);
    }
}
