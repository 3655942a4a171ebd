// tests/integration_test.rs
use git2::{Repository, Signature};
use mono_release::config::Config;
use mono_release::domain::SemverBump;
use mono_release::git::{Git2Repository, Repository as _};
use mono_release::notice::ReleaseNotice;
use mono_release::orchestrator::Orchestrator;
use mono_release::ReleaseError;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ZERO: &str = "0000000000000000000000000000000000000000";

/// A work repository on `main` with a bare `origin` next to it
struct Fixture {
    work: TempDir,
    origin: TempDir,
    repo: Repository,
}

impl Fixture {
    fn new() -> Self {
        let work = TempDir::new().expect("Could not create temp dir");
        let origin = TempDir::new().expect("Could not create temp dir");
        Repository::init_bare(origin.path()).expect("Could not init origin");

        let repo = Repository::init(work.path()).expect("Could not init repo");
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        repo.set_head("refs/heads/main").unwrap();
        repo.remote("origin", origin.path().to_str().unwrap())
            .unwrap();

        Fixture { work, origin, repo }
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.work.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn package(&self, name: &str, version: &str) {
        self.write(
            &format!("{}/pyproject.toml", name),
            &format!("[project]\nname = \"{}\"\nversion = \"{}\"\n", name, version),
        );
    }

    fn init_file(&self, name: &str, version: &str) {
        self.write(
            &format!("{}/src/{}/__init__.py", name, name),
            &format!("\"\"\"{}.\"\"\"\n\n__version__ = \"{}\"\n", name, version),
        );
    }

    /// Stage everything and commit on HEAD
    fn commit(&self, message: &str) -> String {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let signature = Signature::now("Test User", "test@example.com").unwrap();
        let parents = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
            .to_string()
    }

    fn tag(&self, name: &str) {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let signature = Signature::now("Test User", "test@example.com").unwrap();
        self.repo
            .tag(name, head.as_object(), &signature, &format!("Release {}", name), false)
            .unwrap();
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.work.path().join(relative)).unwrap()
    }

    fn open(&self) -> Git2Repository {
        Git2Repository::open(self.work.path()).unwrap()
    }

    fn origin_has(&self, reference: &str) -> bool {
        let origin = Repository::open_bare(self.origin.path()).unwrap();
        let found = origin.find_reference(reference).is_ok();
        found
    }

    fn head_message(&self) -> String {
        let head = self.repo.head().unwrap().peel_to_commit().unwrap();
        let message = head.message().unwrap().to_string();
        message
    }

    fn commit_count(&self) -> usize {
        let mut revwalk = self.repo.revwalk().unwrap();
        revwalk.push_head().unwrap();
        revwalk.count()
    }
}

fn has_tag(path: &Path, name: &str) -> bool {
    let repo = Repository::open(path).unwrap();
    let found = repo.find_reference(&format!("refs/tags/{}", name)).is_ok();
    found
}

#[test]
fn test_first_release_feat_and_fix_is_minor() {
    let fx = Fixture::new();
    fx.package("p", "0.1.0");
    fx.commit("feat: add x");
    fx.write("p/src/p/y.py", "y = 1\n");
    fx.commit("fix: y");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(false).unwrap();

    assert_eq!(report.plans[0].bump, SemverBump::Minor);
    assert_eq!(report.tags, vec!["release-p-v0.2.0"]);
    assert!(fx.read("p/pyproject.toml").contains("version = \"0.2.0\""));
    assert_eq!(fx.head_message(), "chore(release): p v0.2.0");
    assert!(fx.origin_has("refs/heads/main"));
    assert!(fx.origin_has("refs/tags/release-p-v0.2.0"));
}

#[test]
fn test_breaking_change_since_tag_is_major() {
    let fx = Fixture::new();
    fx.package("p", "1.0.0");
    fx.commit("feat: initial");
    fx.tag("release-p-v1.0.0");
    fx.write("p/src/p/api.py", "def new(): pass\n");
    fx.commit("feat!: remove old api");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(false).unwrap();

    assert_eq!(report.plans[0].bump, SemverBump::Major);
    assert_eq!(report.tags, vec!["release-p-v2.0.0"]);
    assert!(fx.read("p/pyproject.toml").contains("version = \"2.0.0\""));
}

#[test]
fn test_unclassified_change_is_forced_patch() {
    let fx = Fixture::new();
    fx.package("p", "1.0.0");
    fx.commit("initial import");
    fx.tag("release-p-v1.0.0");
    fx.write("p/README.md", "# p\n");
    fx.commit("Add readme");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(false).unwrap();

    assert_eq!(report.plans[0].bump, SemverBump::Patch);
    assert_eq!(report.tags, vec!["release-p-v1.0.1"]);
}

#[test]
fn test_two_packages_share_one_commit() {
    let fx = Fixture::new();
    fx.package("a", "0.1.0");
    fx.init_file("a", "0.1.0");
    fx.package("b", "1.4.0");
    fx.commit("chore: scaffold");
    fx.tag("release-a-v0.1.0");
    fx.tag("release-b-v1.4.0");
    fx.write("a/src/a/core.py", "x = 1\n");
    fx.write("b/src/b/core.py", "x = 1\n");
    fx.commit("feat: touch both");
    let before = fx.commit_count();

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(false).unwrap();

    assert_eq!(fx.commit_count(), before + 1);
    assert_eq!(fx.head_message(), "chore(release): a v0.2.0, b v1.5.0");
    assert_eq!(report.tags, vec!["release-a-v0.2.0", "release-b-v1.5.0"]);
    assert!(fx.read("a/src/a/__init__.py").contains("__version__ = \"0.2.0\""));
    assert!(fx.origin_has("refs/tags/release-a-v0.2.0"));
    assert!(fx.origin_has("refs/tags/release-b-v1.5.0"));

    // Both tags point at the pushed release commit.
    let head = fx.repo.head().unwrap().peel_to_commit().unwrap().id();
    for tag in &report.tags {
        let target = fx
            .repo
            .revparse_single(tag)
            .unwrap()
            .peel_to_commit()
            .unwrap()
            .id();
        assert_eq!(target, head);
    }

    // A second run finds nothing new.
    let again = orchestrator.tag_main(false).unwrap();
    assert!(again.tags.is_empty());
    assert!(again.notices.contains(&ReleaseNotice::NothingToRelease));
}

#[test]
fn test_dry_run_leaves_repository_untouched() {
    let fx = Fixture::new();
    fx.package("p", "0.1.0");
    fx.commit("feat: add x");
    let before = fx.commit_count();

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(true).unwrap();

    assert_eq!(report.plans.len(), 1);
    assert_eq!(fx.commit_count(), before);
    assert!(fx.read("p/pyproject.toml").contains("version = \"0.1.0\""));
    assert!(!has_tag(fx.work.path(), "release-p-v0.2.0"));
}

#[test]
fn test_detect_changed_and_bump_level() {
    let fx = Fixture::new();
    fx.package("a", "0.1.0");
    fx.package("b", "0.1.0");
    fx.commit("chore: scaffold");
    fx.tag("release-a-v0.1.0");
    fx.tag("release-b-v0.1.0");
    let since = fx.commit("docs: nothing");
    fx.write("b/src/b/x.py", "x = 1\n");
    fx.commit("perf: faster b");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let changed: Vec<String> = orchestrator
        .changed_packages()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(changed, vec!["b"]);

    assert_eq!(
        orchestrator.bump_level("b", Some(since.as_str())).unwrap(),
        SemverBump::Patch
    );
    assert_eq!(
        orchestrator.bump_level("a", Some(since.as_str())).unwrap(),
        SemverBump::None
    );
}

#[test]
fn test_reconcile_tags_once() {
    let fx = Fixture::new();
    fx.package("a", "0.1.0");
    fx.init_file("a", "0.1.0");
    let before = fx.commit("chore: scaffold");
    fx.package("a", "0.2.0");
    fx.init_file("a", "0.2.0");
    let after = fx.commit("chore(release): a v0.2.0");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();

    let first = orchestrator.reconcile(&before, &after, false).unwrap();
    assert_eq!(first.tags, vec!["release-a-v0.2.0"]);
    assert!(fx.origin_has("refs/tags/release-a-v0.2.0"));

    let second = orchestrator.reconcile(&before, &after, false).unwrap();
    assert!(second.tags.is_empty());
    assert_eq!(second.notices.len(), 1);
    assert_eq!(repo.tags_with_prefix("release-a-v").unwrap().len(), 1);
}

#[test]
fn test_reconcile_first_push() {
    let fx = Fixture::new();
    fx.package("a", "0.1.0");
    let after = fx.commit("chore: scaffold");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.reconcile(ZERO, &after, false).unwrap();
    assert_eq!(report.tags, vec!["release-a-v0.1.0"]);
}

#[test]
fn test_reconcile_version_mismatch_is_fatal() {
    let fx = Fixture::new();
    fx.package("fs", "1.1.9");
    fx.init_file("fs", "1.1.9");
    let before = fx.commit("chore: scaffold");
    fx.package("fs", "1.2.0");
    let after = fx.commit("chore(release): fs v1.2.0");

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let err = orchestrator.reconcile(&before, &after, false).unwrap_err();

    assert!(matches!(err, ReleaseError::VersionMismatch { .. }));
    assert!(err.to_string().contains("descriptor=1.2.0"));
    assert!(err.to_string().contains("secondary=1.1.9"));
    assert!(!has_tag(fx.work.path(), "release-fs-v1.2.0"));
    assert!(fx.read("fs/src/fs/__init__.py").contains("1.1.9"));
}

#[test]
fn test_custom_tag_scheme() {
    let fx = Fixture::new();
    fx.package("p", "0.1.0");
    fx.commit("fix: x");

    let config = Config::from_toml("tag_scheme = \"better-mcps\"\n").unwrap();
    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, config).unwrap();
    let report = orchestrator.tag_main(false).unwrap();
    assert_eq!(report.tags, vec!["better-mcps-p-v0.1.1"]);
}

#[test]
fn test_release_from_detached_head_pushes_to_branch() {
    let fx = Fixture::new();
    fx.package("p", "0.1.0");
    let oid = fx.commit("feat: add x");
    fx.repo
        .set_head_detached(git2::Oid::from_str(&oid).unwrap())
        .unwrap();
    assert!(fx.repo.head_detached().unwrap());

    let repo = fx.open();
    let orchestrator = Orchestrator::new(&repo, Config::default()).unwrap();
    let report = orchestrator.tag_main(false).unwrap();

    assert_eq!(report.tags, vec!["release-p-v0.2.0"]);
    assert!(fx.origin_has("refs/heads/main"));
    assert!(fx.origin_has("refs/tags/release-p-v0.2.0"));

    let origin = Repository::open_bare(fx.origin.path()).unwrap();
    let pushed = origin
        .find_reference("refs/heads/main")
        .unwrap()
        .peel_to_commit()
        .unwrap();
    assert_eq!(pushed.message().unwrap(), "chore(release): p v0.2.0");
}
