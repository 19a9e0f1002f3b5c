//! Ignore-file rules for the project tree.
//!
//! Every non-blank, non-comment line of the ignore file becomes a literal pattern that matches
//! anywhere inside a candidate path. Glob syntax is not interpreted: `*.log` only matches paths
//! that literally contain `*.log`, and `node_modules` also matches `node_modules_helper.js`.

use std::fs;
use std::io;
use std::path::Path;

use regex::Regex;

/// Compiled set of ignore rules.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<Regex>,
}

impl IgnoreRules {
    /// Rule set that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load rules from an ignore file. A missing or unreadable file yields an empty set.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let rules = Self::parse(&contents);
                tracing::debug!(path = %path.display(), rules = rules.len(), "loaded ignore rules");
                rules
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no ignore file");
                Self::empty()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read ignore file");
                Self::empty()
            }
        }
    }

    /// Parse ignore-file contents.
    pub fn parse(contents: &str) -> Self {
        let rules = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(compile_literal)
            .collect();
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `true` when any rule's text occurs in `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(path))
    }

    /// [`matches`](Self::matches) for filesystem paths.
    pub fn matches_path(&self, path: &Path) -> bool {
        self.matches(&path.to_string_lossy())
    }
}

fn compile_literal(line: &str) -> Option<Regex> {
    match Regex::new(&regex::escape(line)) {
        Ok(regex) => Some(regex),
        Err(err) => {
            // Escaped literals only fail on pathological sizes.
            tracing::warn!(pattern = line, error = %err, "skipping ignore rule");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_comments_and_blank_lines() {
        let rules = IgnoreRules::parse("# build output\n\ntarget\n   \n  # indented comment\ndist/\n");
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn matches_substrings_anywhere_in_path() {
        let rules = IgnoreRules::parse("node_modules\n");
        assert!(rules.matches("/proj/node_modules/x.js"));
        // Substring semantics are deliberately permissive.
        assert!(rules.matches("/proj/src/node_modules_helper.js"));
        assert!(!rules.matches("/proj/src/main.js"));
    }

    #[test]
    fn metacharacters_are_literal() {
        let rules = IgnoreRules::parse("*.log\nbuild(1)\n[abc]\n");
        assert!(!rules.matches("/proj/debug.log"));
        assert!(rules.matches("/proj/*.log"));
        assert!(rules.matches("/proj/build(1)/out"));
        assert!(!rules.matches("/proj/build1/out"));
        assert!(rules.matches("/proj/[abc]"));
        assert!(!rules.matches("/proj/a"));
    }

    #[test]
    fn trims_whitespace_and_carriage_returns() {
        let rules = IgnoreRules::parse("  coverage  \r\n.env\r\n");
        assert!(rules.matches("/proj/coverage/index.html"));
        assert!(rules.matches("/proj/.env"));
        assert!(!rules.matches("/proj/cover"));
    }

    #[test]
    fn missing_file_yields_no_rules() {
        let temp = tempfile::tempdir().unwrap();
        let rules = IgnoreRules::load(&temp.path().join(".gitignore"));
        assert!(rules.is_empty());
        assert!(!rules.matches("/anything"));
    }

    #[test]
    fn loads_rules_from_disk() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join(".gitignore");
        std::fs::write(&file, "target\n# comment\n.DS_Store\n")?;

        let rules = IgnoreRules::load(&file);
        assert_eq!(rules.len(), 2);
        assert!(rules.matches_path(&temp.path().join("target/debug")));
        Ok(())
    }
}
