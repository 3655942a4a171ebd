use crate::domain::{Commit, TagRef};
use crate::error::{ReleaseError, Result};
use crate::git::to_repo_path;
use git2::{Cred, CredentialType, Oid, PushOptions, RemoteCallbacks, Repository as Git2Repo};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository with a working tree
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        Self::from_git2(repo)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Result<Self> {
        let workdir = repo
            .workdir()
            .map(|dir| dir.components().collect::<PathBuf>())
            .ok_or_else(|| ReleaseError::config("Repository has no working tree"))?;
        Ok(Git2Repository { repo, workdir })
    }

    fn resolve_commit(&self, rev: &str) -> Result<git2::Commit<'_>> {
        let object = self.repo.revparse_single(rev).map_err(|e| {
            ReleaseError::command_failed(format!("rev-parse {}", rev), e.message())
        })?;
        Ok(object.peel_to_commit()?)
    }

    fn tag_created(&self, name: &str) -> Result<i64> {
        let reference = self.repo.find_reference(&format!("refs/tags/{}", name))?;
        let oid = reference
            .target()
            .ok_or_else(|| ReleaseError::config(format!("Tag {} has no target", name)))?;

        // Annotated tags carry a tagger date; lightweight ones use the commit date.
        let created = match self.repo.find_tag(oid) {
            Ok(tag) => match tag.tagger() {
                Some(tagger) => tagger.when().seconds(),
                None => tag.target()?.peel_to_commit()?.time().seconds(),
            },
            Err(_) => reference.peel_to_commit()?.time().seconds(),
        };
        Ok(created)
    }

    /// Files a commit changes relative to its first parent.
    ///
    /// Merge commits report nothing: like `git show --name-only`, a clean
    /// merge has no combined diff, and the merged commits are walked anyway.
    fn touched_paths(&self, commit: &git2::Commit<'_>) -> Result<Vec<String>> {
        if commit.parent_count() > 1 {
            return Ok(Vec::new());
        }
        let tree = commit.tree()?;
        let parent_tree = match commit.parent_count() {
            0 => None,
            _ => Some(commit.parent(0)?.tree()?),
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        Ok(diff_paths(&diff))
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    fn push_refspec(&self, remote_name: &str, refspec: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| ReleaseError::remote(format!("Remote '{}' not found", remote_name)))?;

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        remote
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    ReleaseError::remote(format!("Network error pushing {}: {}", refspec, e))
                } else {
                    ReleaseError::remote(format!("Failed to push {}: {}", refspec, e))
                }
            })
    }
}

/// Credentials for pushes: token from the environment (CI), then SSH keys,
/// then the SSH agent, then git's defaults.
fn remote_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Ok(token) = std::env::var("GH_TOKEN").or_else(|_| std::env::var("GITHUB_TOKEN"))
            {
                return Cred::userpass_plaintext("x-access-token", &token);
            }
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let user = username_from_url.unwrap_or("git");
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = Cred::ssh_key(user, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
            if let Ok(cred) = Cred::ssh_key_from_agent(user) {
                return Ok(cred);
            }
        }

        Cred::default()
    });

    // A rejected ref is reported here, not as an error from push().
    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "Push rejected for {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

fn diff_paths(diff: &git2::Diff<'_>) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for delta in diff.deltas() {
        for file in [delta.old_file(), delta.new_file()] {
            if let Some(path) = file.path() {
                let path = to_repo_path(Path::new(""), path);
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
        }
    }
    paths
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn tags_with_prefix(&self, prefix: &str) -> Result<Vec<TagRef>> {
        let pattern = format!("{}*", prefix);
        let names = self.repo.tag_names(Some(pattern.as_str()))?;
        let mut tags = Vec::new();
        for (sequence, name) in names.iter().flatten().enumerate() {
            if !name.starts_with(prefix) {
                continue;
            }
            tags.push(TagRef::new(name, self.tag_created(name)?, sequence));
        }
        debug!("Found {} tags with prefix {}", tags.len(), prefix);
        Ok(tags)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn tracked_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index()?;
        Ok(index
            .iter()
            .map(|entry| String::from_utf8_lossy(&entry.path).into_owned())
            .collect())
    }

    fn changed_files(&self, from: Option<&str>, to: &str) -> Result<Vec<String>> {
        let new_tree = self.resolve_commit(to)?.tree()?;
        let old_tree = match from {
            Some(rev) => Some(self.resolve_commit(rev)?.tree()?),
            None => None,
        };
        let diff = self
            .repo
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), None)?;
        let paths = diff_paths(&diff);
        debug!(
            "{} files changed between {} and {}",
            paths.len(),
            from.unwrap_or("<empty>"),
            to
        );
        Ok(paths)
    }

    fn commits_since(&self, reference: Option<&str>) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.push_head()?;
        if let Some(rev) = reference {
            revwalk.hide(self.resolve_commit(rev)?.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let (subject, body) = Commit::split_message(commit.message().unwrap_or_default());
            commits.push(Commit {
                id: commit.id().to_string(),
                subject,
                body,
                touched_paths: self.touched_paths(&commit)?,
            });
        }
        debug!(
            "{} commits since {}",
            commits.len(),
            reference.unwrap_or("<root>")
        );
        Ok(commits)
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = path.strip_prefix(&self.workdir).unwrap_or(path);
            index.add_path(relative)?;
        }
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<String> {
        let signature = self.repo.signature()?;
        let mut index = self.repo.index()?;
        let tree = self.repo.find_tree(index.write_tree()?)?;
        let parent = self.head_commit()?;

        let oid: Oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;
        info!("Created commit {}: {}", oid, message);
        Ok(oid.to_string())
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        // `HEAD` resolves on detached checkouts too.
        let refspec = format!("HEAD:refs/heads/{}", branch);
        self.push_refspec(remote, &refspec)?;
        info!("Pushed {} to {}", refspec, remote);
        Ok(())
    }

    fn create_annotated_tag(&self, name: &str, message: &str) -> Result<()> {
        if super::Repository::tag_exists(self, name)? {
            return Err(ReleaseError::TagExists(name.to_string()));
        }
        let signature = self.repo.signature()?;
        let head = self.head_commit()?;
        self.repo
            .tag(name, head.as_object(), &signature, message, false)?;
        info!("Created tag {}", name);
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        self.push_refspec(remote, &refspec)?;
        info!("Pushed tag {} to {}", name, remote);
        Ok(())
    }
}
