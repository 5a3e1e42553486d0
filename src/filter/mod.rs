//! Bad-word content filter.
//!
//! The word list is a flat file, one entry per line. How a line is
//! interpreted is a global choice: plain substring, wildcard (`*` spans any
//! sequence, `?` any single character), or a raw regex. An empty or missing
//! list disables the filter. A line that fails to compile is skipped; it
//! never brings matching down.

use std::fs;
use std::io;
use std::path::PathBuf;

use parking_lot::Mutex;
use regex::RegexBuilder;
use tracing::debug;

use crate::storage::tmp_path;

/// How word-list entries are matched against message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Substr,
    Wildcard,
    Regex,
}

pub struct WordFilter {
    path: PathBuf,
    mode: MatchMode,
    ignore_case: bool,
    lock: Mutex<()>,
}

impl WordFilter {
    pub fn new(path: impl Into<PathBuf>, mode: MatchMode, ignore_case: bool) -> Self {
        Self {
            path: path.into(),
            mode,
            ignore_case,
            lock: Mutex::new(()),
        }
    }

    /// Whether `text` trips any entry of the word list.
    pub fn matches(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let entries = self.entries();
        if entries.is_empty() {
            return false;
        }
        match self.mode {
            MatchMode::Substr => {
                if self.ignore_case {
                    let haystack = text.to_lowercase();
                    entries.iter().any(|e| haystack.contains(&e.to_lowercase()))
                } else {
                    entries.iter().any(|e| text.contains(e.as_str()))
                }
            }
            MatchMode::Wildcard | MatchMode::Regex => entries.iter().any(|e| {
                let pattern = match self.mode {
                    MatchMode::Wildcard => wildcard_to_regex(e),
                    _ => e.clone(),
                };
                match RegexBuilder::new(&pattern)
                    .case_insensitive(self.ignore_case)
                    .build()
                {
                    Ok(re) => re.is_match(text),
                    Err(err) => {
                        debug!("skipping malformed word-list pattern {e:?}: {err}");
                        false
                    }
                }
            }),
        }
    }

    /// Append a whole-line entry. Returns false when it already exists.
    pub fn add(&self, entry: &str) -> io::Result<bool> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(false);
        }
        let _guard = self.lock.lock();
        let mut lines = self.lines();
        if lines.iter().any(|l| l.trim() == entry) {
            return Ok(false);
        }
        lines.push(entry.to_string());
        self.write_lines(&lines)?;
        Ok(true)
    }

    /// Remove a whole-line entry (exact match after trimming). Returns false
    /// when no such line exists.
    pub fn remove(&self, entry: &str) -> io::Result<bool> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(false);
        }
        let _guard = self.lock.lock();
        let lines = self.lines();
        let kept: Vec<String> = lines.iter().filter(|l| l.trim() != entry).cloned().collect();
        if kept.len() == lines.len() {
            return Ok(false);
        }
        self.write_lines(&kept)?;
        Ok(true)
    }

    /// Where the list lives, for admin-facing usage hints.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn entries(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }

    fn lines(&self) -> Vec<String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn write_lines(&self, lines: &[String]) -> io::Result<()> {
        let tmp = tmp_path(&self.path);
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)
    }
}

/// Translate a wildcard entry into a regex: every metacharacter is escaped
/// except `*` (any sequence) and `?` (any single character).
fn wildcard_to_regex(entry: &str) -> String {
    regex::escape(entry).replace("\\*", ".*").replace("\\?", ".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn list(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("bad_words.txt");
        fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn substr_ignores_case_when_configured() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &["spam"]), MatchMode::Substr, true);
        assert!(filter.matches("This is SPAM"));
        assert!(!filter.matches("perfectly fine"));
    }

    #[test]
    fn substr_respects_case_sensitivity() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &["spam"]), MatchMode::Substr, false);
        assert!(!filter.matches("This is SPAM"));
        assert!(filter.matches("this is spam"));
    }

    #[test]
    fn wildcard_star_spans_sequences() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &["a*z"]), MatchMode::Wildcard, true);
        assert!(filter.matches("abcz"));
        assert!(!filter.matches("abc"));
    }

    #[test]
    fn wildcard_question_is_single_char() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &["b?d"]), MatchMode::Wildcard, true);
        assert!(filter.matches("bad"));
        assert!(!filter.matches("bd"));
    }

    #[test]
    fn regex_mode_uses_raw_patterns() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &[r"\bcasino\b"]), MatchMode::Regex, true);
        assert!(filter.matches("free CASINO chips"));
        assert!(!filter.matches("casinos"));
    }

    #[test]
    fn malformed_regex_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(list(dir.path(), &["[", "spam"]), MatchMode::Regex, true);
        assert!(filter.matches("spam here"));
        assert!(!filter.matches("clean"));
    }

    #[test]
    fn empty_or_missing_list_disables_matching() {
        let dir = tempdir().unwrap();
        let missing = WordFilter::new(dir.path().join("none.txt"), MatchMode::Substr, true);
        assert!(!missing.matches("anything"));

        let empty = WordFilter::new(list(dir.path(), &["", "  "]), MatchMode::Substr, true);
        assert!(!empty.matches("anything"));
    }

    #[test]
    fn add_and_remove_entries() {
        let dir = tempdir().unwrap();
        let filter = WordFilter::new(dir.path().join("words.txt"), MatchMode::Substr, true);
        assert!(filter.add("scam").unwrap());
        assert!(!filter.add("scam").unwrap());
        assert!(filter.matches("a scam offer"));
        assert!(filter.remove("scam").unwrap());
        assert!(!filter.remove("scam").unwrap());
        assert!(!filter.matches("a scam offer"));
    }
}
