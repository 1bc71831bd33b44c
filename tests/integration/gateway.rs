//! Repository gateway tests: initialization, classification, modes, tags

use serial_test::serial;
use tempfile::TempDir;

use branchwise::error::FlowError;
use branchwise::git::{Branch, BranchKind, GitMode, GitRepository};

use super::helpers::*;

fn names(branches: Vec<Branch>) -> Vec<String> {
    branches.into_iter().map(|b| b.name).collect()
}

#[test]
#[serial]
fn test_fresh_repo_resolves_main() {
    let test_repo = init_test_repo();
    let mut repo = GitRepository::open(&test_repo.root, GitMode::Normal).unwrap();

    assert!(!repo.is_initialized());
    assert_eq!(repo.initialize().unwrap(), "main");
    assert_eq!(repo.main_branch_name().unwrap(), "main");
    assert_eq!(repo.branch_kind("main").unwrap(), BranchKind::Main);
    assert!(repo.local_feature_branches().unwrap().is_empty());
}

#[test]
#[serial]
fn test_master_fallback() {
    let test_repo = init_test_repo();
    test_repo.git(&["branch", "-M", "master"]);

    let repo = test_repo.open(GitMode::Normal);
    assert_eq!(repo.main_branch_name().unwrap(), "master");
    assert_eq!(repo.branch_kind("master").unwrap(), BranchKind::Main);
    assert_eq!(repo.branch_kind("main").unwrap(), BranchKind::Feature);
}

#[test]
#[serial]
fn test_uninitialized_gateway_fails_loudly() {
    let test_repo = init_test_repo();
    let repo = GitRepository::open(&test_repo.root, GitMode::Normal).unwrap();

    assert!(matches!(
        repo.main_branch_name(),
        Err(FlowError::NotInitialized(_))
    ));
    assert!(matches!(
        repo.local_feature_branches(),
        Err(FlowError::NotInitialized(_))
    ));
    assert!(matches!(
        repo.production_release_branches_favor_local(),
        Err(FlowError::NotInitialized(_))
    ));
}

#[test]
fn test_open_outside_repository() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        GitRepository::open(temp.path(), GitMode::Normal),
        Err(FlowError::NotAGitRepository(_))
    ));
}

#[test]
#[serial]
fn test_opening_subdirectory_finds_root() {
    let test_repo = init_test_repo();
    let nested = test_repo.root.join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();

    let repo = GitRepository::open(&nested, GitMode::Normal).unwrap();
    assert_eq!(
        repo.root().canonicalize().unwrap(),
        test_repo.root.canonicalize().unwrap()
    );
}

#[test]
#[serial]
fn test_classification_of_local_branches() {
    let test_repo = init_test_repo();
    test_repo.branch_with_file("feature-x", "x.txt", "x");
    test_repo.git(&["checkout", "main"]);
    test_repo.git(&["branch", "web-v1.3.0-prep"]);
    test_repo.git(&["branch", "v1.10.0-prep"]);
    test_repo.git(&["branch", "v1.2.0-prep"]);
    test_repo.git(&["branch", "v1.2-prep"]);

    let repo = test_repo.open(GitMode::Normal);

    assert_eq!(
        names(repo.local_feature_branches().unwrap()),
        vec!["feature-x", "v1.2-prep"]
    );
    assert_eq!(
        names(repo.local_production_release_branches().unwrap()),
        vec!["v1.2.0-prep", "web-v1.3.0-prep", "v1.10.0-prep"]
    );

    let feature = repo
        .local_branches()
        .unwrap()
        .into_iter()
        .find(|b| b.name == "feature-x")
        .unwrap();
    assert_eq!(feature.last_commit_message, "Add x.txt");
    assert!(!feature.is_remote());
}

#[test]
#[serial]
fn test_remote_branches_and_favor_local() {
    let test_repo = init_test_repo_with_remote();
    test_repo.git(&["checkout", "-b", "feature-a"]);
    test_repo.git(&["push", "origin", "feature-a"]);
    test_repo.git(&["checkout", "main"]);
    test_repo.git(&["branch", "-D", "feature-a"]);
    test_repo.git(&["branch", "feature-b"]);

    let repo = test_repo.open(GitMode::Normal);

    let remote = repo.remote_branches().unwrap();
    assert!(remote
        .iter()
        .all(|b| b.origin.as_deref() == Some("origin") && b.name != "HEAD"));
    assert_eq!(names(repo.remote_feature_branches().unwrap()), vec!["feature-a"]);

    let mut favored = names(repo.feature_branches_favor_local().unwrap());
    favored.sort();
    assert_eq!(favored, vec!["feature-a", "feature-b"]);

    let all = names(repo.all_branches_favor_local().unwrap());
    assert_eq!(all.iter().filter(|n| *n == "main").count(), 1);
    assert_eq!(
        repo.all_branches().unwrap().iter().filter(|b| b.name == "main").count(),
        2
    );

    assert!(repo.has_remote_branch("main").unwrap());
    assert!(repo.has_remote_branch("feature-a").unwrap());
    assert!(!repo.has_remote_branch("feature-b").unwrap());
}

#[test]
#[serial]
fn test_local_mode_never_touches_remote() {
    let test_repo = init_test_repo_with_remote();
    let repo = test_repo.open_recording(GitMode::Local);

    repo.fetch().unwrap();
    repo.pull().unwrap();
    repo.push().unwrap();
    repo.push_tags().unwrap();
    repo.setup_tracking_and_push(None).unwrap();
    repo.delete_remote_branch("main").unwrap();

    assert!(repo.remote_branches().unwrap().is_empty());
    assert!(repo.remotes().unwrap().is_empty());
    assert!(!repo.has_remote_branch("main").unwrap());

    let runner = repo.runner();
    for subcommand in ["fetch", "pull", "push", "ls-remote"] {
        assert!(
            !runner.invoked(subcommand),
            "{subcommand} ran in local mode: {:?}",
            runner.calls()
        );
    }
    assert!(test_repo.remote_has_branch("main"));
}

#[test]
#[serial]
fn test_missing_remote_is_a_no_op() {
    let test_repo = init_test_repo();
    let repo = test_repo.open_recording(GitMode::Normal);

    assert!(!repo.remote_enabled().unwrap());
    repo.fetch().unwrap();
    repo.pull().unwrap();
    repo.push().unwrap();
    assert!(!repo.runner().invoked("push"));
}

#[test]
#[serial]
fn test_production_and_candidate_tags() {
    let test_repo = init_test_repo();
    test_repo.git(&["checkout", "-b", "web-v1.2.0-prep"]);
    let repo = test_repo.open(GitMode::Normal);

    assert_eq!(repo.create_release_candidate_tag(None).unwrap(), "web-v1.2.0-rc");
    assert_eq!(repo.create_production_tag(None).unwrap(), "web-v1.2.0");
    assert!(repo.has_tag("web-v1.2.0").unwrap());
    assert!(repo.has_tag("web-v1.2.0-rc").unwrap());

    assert!(matches!(
        repo.create_production_tag(None),
        Err(FlowError::TagAlreadyExists(tag)) if tag == "web-v1.2.0"
    ));

    assert_eq!(
        test_repo.git(&["tag", "-l", "--format=%(contents:subject)", "web-v1.2.0"]),
        "Release web-v1.2.0"
    );

    repo.delete_tags(&["web-v1.2.0", "web-v1.2.0-rc"]).unwrap();
    assert!(repo.tags().unwrap().is_empty());
}

#[test]
#[serial]
fn test_tag_requires_production_release_branch() {
    let test_repo = init_test_repo();
    test_repo.git(&["checkout", "-b", "feature-a"]);
    let repo = test_repo.open(GitMode::Normal);

    assert!(matches!(
        repo.create_production_tag(None),
        Err(FlowError::NotAProductionReleaseBranch(name)) if name == "feature-a"
    ));
    assert!(repo.tags().unwrap().is_empty());
}

#[test]
#[serial]
fn test_commits_ahead_of_branch() {
    let test_repo = init_test_repo();
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.commit_file("b.txt", "b");
    let repo = test_repo.open(GitMode::Normal);

    assert_eq!(repo.commits_ahead_of_branch("main", "feature-a").unwrap(), 2);
    assert_eq!(repo.commits_ahead_of_branch("feature-a", "main").unwrap(), 0);
    assert!(repo.is_branch_merged("main", "feature-a").unwrap());
    assert!(!repo.is_branch_merged("feature-a", "main").unwrap());
}

#[test]
#[serial]
fn test_git_failure_carries_stderr() {
    let test_repo = init_test_repo();
    let repo = test_repo.open(GitMode::Normal);

    match repo.checkout_branch("does-not-exist") {
        Err(FlowError::GitCommandFailed { command, stderr, code }) => {
            assert_eq!(command, "git checkout does-not-exist");
            assert!(!stderr.is_empty());
            assert_ne!(code, Some(0));
        }
        other => panic!("expected GitCommandFailed, got {other:?}"),
    }
}

#[test]
#[serial]
fn test_working_changes_and_stash() {
    let test_repo = init_test_repo();
    let repo = test_repo.open(GitMode::Normal);
    assert!(!repo.has_working_changes().unwrap());

    std::fs::write(test_repo.root.join("new.txt"), "untracked").unwrap();
    assert!(repo.has_working_changes().unwrap());

    repo.stage(".").unwrap();
    repo.stash("wip").unwrap();
    assert!(!repo.has_working_changes().unwrap());
    assert!(test_repo.read("new.txt").is_none());

    repo.pop_stash().unwrap();
    assert_eq!(test_repo.read("new.txt").as_deref(), Some("untracked"));
}

#[test]
#[serial]
fn test_branch_name_validation() {
    let test_repo = init_test_repo();
    let repo = test_repo.open(GitMode::Normal);

    assert!(repo.is_valid_branch_name("feature/login"));
    assert!(!repo.is_valid_branch_name("bad..name"));
    assert!(!repo.is_valid_branch_name(""));
}

#[test]
#[serial]
fn test_remote_delete_asks_the_remote() {
    let test_repo = init_test_repo_with_remote();
    test_repo.git(&[
        "config",
        "remote.origin.fetch",
        "+refs/heads/main:refs/remotes/origin/main",
    ]);
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["push", "origin", "feature-a"]);
    test_repo.git(&["checkout", "main"]);

    let repo = test_repo.open(GitMode::Normal);
    assert!(!repo.has_remote_branch("feature-a").unwrap());
    assert_eq!(
        repo.remote_branch_head("feature-a").unwrap(),
        Some(test_repo.git(&["rev-parse", "feature-a"]))
    );
    assert_eq!(repo.remote_branch_head("missing").unwrap(), None);

    assert!(matches!(
        repo.delete_remote_branch("feature-a"),
        Err(FlowError::BranchNotMerged { ahead: 1, .. })
    ));
    assert!(test_repo.remote_has_branch("feature-a"));

    repo.delete_remote_branch_force("feature-a").unwrap();
    assert!(!test_repo.remote_has_branch("feature-a"));

    repo.delete_remote_branch_force("feature-a").unwrap();
    repo.delete_remote_branch("feature-a").unwrap();
}
