use crate::domain::{Commit, TagRef};
use crate::error::{ReleaseError, Result};
use crate::git::{to_repo_path, Repository};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// A mutation recorded by [MockRepository], in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitOp {
    Stage(Vec<String>),
    Commit(String),
    PushBranch { remote: String, branch: String },
    CreateTag { name: String, message: String },
    PushTag { remote: String, name: String },
}

#[derive(Debug, Default)]
struct MockState {
    /// Oldest first
    history: Vec<Commit>,
    /// Tag name -> (created, number of history entries at tag time)
    tags: Vec<(TagRef, usize)>,
    tracked: BTreeSet<String>,
    staged: Vec<String>,
    clock: i64,
    ops: Vec<GitOp>,
}

/// In-memory repository for testing without actual git operations.
///
/// History is linear. Tags point at the commit that was HEAD when they were
/// added, and every mutation is appended to [MockRepository::ops].
pub struct MockRepository {
    workdir: PathBuf,
    state: RefCell<MockState>,
    diffs: HashMap<(Option<String>, String), Vec<String>>,
    fail_tag_push: Option<String>,
}

impl MockRepository {
    /// Create a new empty mock repository rooted at `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepository {
            workdir: workdir.into(),
            state: RefCell::new(MockState::default()),
            diffs: HashMap::new(),
            fail_tag_push: None,
        }
    }

    /// Append a commit on top of HEAD; its paths become tracked
    pub fn add_commit(&mut self, subject: &str, body: &str, paths: &[&str]) -> String {
        let mut state = self.state.borrow_mut();
        let id = format!("{:040x}", state.history.len() + 1);
        for path in paths {
            state.tracked.insert(path.to_string());
        }
        state.history.push(Commit::new(
            id.clone(),
            subject,
            body,
            paths.iter().map(|p| p.to_string()).collect(),
        ));
        state.clock += 1;
        id
    }

    /// Tag the current HEAD
    pub fn add_tag(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.clock += 1;
        let tag = TagRef::new(name, state.clock, state.tags.len());
        let position = state.history.len();
        state.tags.push((tag, position));
    }

    /// Mark a file as tracked without committing it
    pub fn track(&mut self, path: &str) {
        self.state.borrow_mut().tracked.insert(path.to_string());
    }

    /// Fix the result of `changed_files(from, to)` for a revision pair
    pub fn set_diff(&mut self, from: Option<&str>, to: &str, paths: &[&str]) {
        self.diffs.insert(
            (from.map(str::to_string), to.to_string()),
            paths.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Make `push_tag` fail for this tag
    pub fn fail_push_of_tag(&mut self, name: &str) {
        self.fail_tag_push = Some(name.to_string());
    }

    /// Mutations performed so far
    pub fn ops(&self) -> Vec<GitOp> {
        self.state.borrow().ops.clone()
    }

    /// Names of all tags, in creation order
    pub fn tag_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .tags
            .iter()
            .map(|(tag, _)| tag.name.clone())
            .collect()
    }

    fn position_of(&self, rev: &str) -> Result<usize> {
        let state = self.state.borrow();
        if rev == "HEAD" {
            return Ok(state.history.len());
        }
        if let Some((_, position)) = state.tags.iter().find(|(tag, _)| tag.name == rev) {
            return Ok(*position);
        }
        state
            .history
            .iter()
            .position(|c| c.id == rev)
            .map(|i| i + 1)
            .ok_or_else(|| {
                ReleaseError::command_failed(format!("rev-parse {}", rev), "unknown revision")
            })
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tags_with_prefix(&self, prefix: &str) -> Result<Vec<TagRef>> {
        Ok(self
            .state
            .borrow()
            .tags
            .iter()
            .filter(|(tag, _)| tag.name.starts_with(prefix))
            .map(|(tag, _)| tag.clone())
            .collect())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .state
            .borrow()
            .tags
            .iter()
            .any(|(tag, _)| tag.name == name))
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().tracked.iter().cloned().collect())
    }

    fn changed_files(&self, from: Option<&str>, to: &str) -> Result<Vec<String>> {
        if let Some(paths) = self
            .diffs
            .get(&(from.map(str::to_string), to.to_string()))
        {
            return Ok(paths.clone());
        }

        let start = match from {
            Some(rev) => self.position_of(rev)?,
            None => 0,
        };
        let end = self.position_of(to)?;
        let state = self.state.borrow();
        let mut paths = BTreeSet::new();
        for commit in state.history.iter().take(end).skip(start) {
            paths.extend(commit.touched_paths.iter().cloned());
        }
        Ok(paths.into_iter().collect())
    }

    fn commits_since(&self, reference: Option<&str>) -> Result<Vec<Commit>> {
        let start = match reference {
            Some(rev) => self.position_of(rev)?,
            None => 0,
        };
        let state = self.state.borrow();
        Ok(state.history.iter().skip(start).rev().cloned().collect())
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let relative: Vec<String> = paths
            .iter()
            .map(|p| to_repo_path(&self.workdir, p))
            .collect();
        let mut state = self.state.borrow_mut();
        state.staged.extend(relative.iter().cloned());
        state.ops.push(GitOp::Stage(relative));
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let mut state = self.state.borrow_mut();
        let staged = std::mem::take(&mut state.staged);
        let id = format!("{:040x}", state.history.len() + 1);
        let (subject, body) = Commit::split_message(message);
        state.tracked.extend(staged.iter().cloned());
        state
            .history
            .push(Commit::new(id.clone(), subject, body, staged));
        state.clock += 1;
        state.ops.push(GitOp::Commit(message.to_string()));
        Ok(id)
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.state.borrow_mut().ops.push(GitOp::PushBranch {
            remote: remote.to_string(),
            branch: branch.to_string(),
        });
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        if self.tag_exists(name)? {
            return Err(ReleaseError::TagExists(name.to_string()));
        }
        let mut state = self.state.borrow_mut();
        state.clock += 1;
        let tag = TagRef::new(name, state.clock, state.tags.len());
        let position = state.history.len();
        state.tags.push((tag, position));
        state.ops.push(GitOp::CreateTag {
            name: name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        if self.fail_tag_push.as_deref() == Some(name) {
            return Err(ReleaseError::remote(format!("Failed to push {}", name)));
        }
        self.state.borrow_mut().ops.push(GitOp::PushTag {
            remote: remote.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}
