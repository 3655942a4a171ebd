use crate::domain::Package;

/// A commit as read from history.
///
/// Classification only looks at `subject` and `body`; `touched_paths`
/// decides whether the commit counts toward a package at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub id: String,
    pub subject: String,
    pub body: String,
    pub touched_paths: Vec<String>,
}

impl Commit {
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        touched_paths: Vec<String>,
    ) -> Self {
        Commit {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
            touched_paths,
        }
    }

    /// Split a raw commit message into subject and body.
    ///
    /// The subject is the first paragraph with its lines joined by spaces;
    /// the body is everything after the first blank line.
    pub fn split_message(message: &str) -> (String, String) {
        let mut lines = message.trim_start().lines();
        let mut subject_lines = Vec::new();
        for line in lines.by_ref() {
            if line.trim().is_empty() {
                break;
            }
            subject_lines.push(line.trim());
        }
        let body: Vec<&str> = lines.collect();
        (subject_lines.join(" "), body.join("\n").trim().to_string())
    }

    pub fn touches(&self, package: &Package) -> bool {
        self.touched_paths
            .iter()
            .filter(|p| !p.is_empty())
            .any(|p| package.owns_path(p))
    }

    pub fn short_id(&self) -> &str {
        if self.id.len() > 7 {
            &self.id[..7]
        } else {
            &self.id
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_message() {
        let (subject, body) = Commit::split_message("feat: add x\n\nBREAKING CHANGE: y\n");
        assert_eq!(subject, "feat: add x");
        assert_eq!(body, "BREAKING CHANGE: y");
    }

    #[test]
    fn test_split_message_wrapped_subject() {
        let (subject, body) = Commit::split_message("feat: a long\nsubject line\n\nbody text");
        assert_eq!(subject, "feat: a long subject line");
        assert_eq!(body, "body text");
    }

    #[test]
    fn test_split_message_subject_only() {
        let (subject, body) = Commit::split_message("fix: y");
        assert_eq!(subject, "fix: y");
        assert_eq!(body, "");
    }

    #[test]
    fn test_touches() {
        let pkg = Package::new("p", "/repo/p");
        let commit = Commit::new(
            "abc",
            "fix: y",
            "",
            vec!["README.md".to_string(), "p/src/mod.py".to_string()],
        );
        assert!(commit.touches(&pkg));

        let other = Commit::new("def", "fix: y", "", vec!["q/src/mod.py".to_string()]);
        assert!(!other.touches(&pkg));
    }

    #[test]
    fn test_short_id() {
        let commit = Commit::new("abcdef1234567", "s", "", vec![]);
        assert_eq!(commit.short_id(), "abcdef1");
        let short = Commit::new("abc", "s", "", vec![]);
        assert_eq!(short.short_id(), "abc");
    }
}
