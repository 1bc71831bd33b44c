//! Sync workflow tests

use serial_test::serial;
use std::fs;

use branchwise::error::FlowError;
use branchwise::git::GitMode;
use branchwise::workflows::{sync, StashOutcome};

use super::helpers::*;
use super::helpers::Answer::{Choice, Text, YesNo};

#[test]
#[serial]
fn test_sync_merges_through_related_release_branch() {
    let test_repo = init_test_repo();
    test_repo.git(&["branch", "v1.0.0-prep"]);
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["checkout", "main"]);
    test_repo.commit_file("hotfix.txt", "hotfix");
    test_repo.git(&["checkout", "feature-a"]);

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    store.set_relationship("feature-a", "v1.0.0-prep").unwrap();
    let mut prompter = ScriptedPrompter::new([YesNo(true)]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert!(prompter.is_exhausted());
    assert_eq!(summary.production_release_branches, vec!["v1.0.0-prep"]);
    assert_eq!(summary.feature_branches.len(), 1);
    assert_eq!(summary.feature_branches[0].base, "v1.0.0-prep");
    assert!(summary.feature_branches[0].merged);
    assert_eq!(summary.stash, StashOutcome::NotNeeded);
    assert_eq!(summary.restored_branch, "feature-a");
    assert_eq!(test_repo.current_branch(), "feature-a");

    assert_eq!(test_repo.read("hotfix.txt").as_deref(), Some("hotfix"));
    assert_eq!(repo.commits_ahead_of_branch("v1.0.0-prep", "main").unwrap(), 0);
    assert_eq!(repo.commits_ahead_of_branch("feature-a", "v1.0.0-prep").unwrap(), 0);
}

#[test]
#[serial]
fn test_sync_clears_stale_relationship() {
    let test_repo = init_test_repo();
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["checkout", "main"]);

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    store.set_relationship("feature-a", "v9.9.9-prep").unwrap();
    store.set_relationship("feature-b", "v9.9.9-prep").unwrap();
    let mut prompter = ScriptedPrompter::new([YesNo(false)]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert_eq!(summary.feature_branches[0].base, "main");
    assert!(!summary.feature_branches[0].merged);
    assert_eq!(summary.stale_relationships, vec!["v9.9.9-prep"]);
    assert!(store.get_all_relationships().is_empty());
    assert_eq!(test_repo.current_branch(), "main");
}

#[test]
#[serial]
fn test_sync_asks_for_base_with_several_release_branches() {
    let test_repo = init_test_repo();
    test_repo.git(&["branch", "v1.0.0-prep"]);
    test_repo.git(&["branch", "v2.0.0-prep"]);
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["checkout", "main"]);

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([
        Choice(Some("v2.0.0-prep".to_string())),
        YesNo(true),
        YesNo(true),
    ]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert!(prompter.is_exhausted());
    assert_eq!(summary.feature_branches[0].base, "v2.0.0-prep");
    let saved = store.get_relationship("feature-a").unwrap().unwrap();
    assert_eq!(saved.production_release_branch, "v2.0.0-prep");
    assert!(saved.recorded_at.is_some());
}

#[test]
#[serial]
fn test_sync_cancelled_base_choice() {
    let test_repo = init_test_repo();
    test_repo.git(&["branch", "v1.0.0-prep"]);
    test_repo.git(&["branch", "v2.0.0-prep"]);
    test_repo.git(&["branch", "feature-a"]);

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([Choice(None)]);

    let err = sync(&repo, &mut store, &mut prompter).unwrap_err();
    assert!(err.is_cancelled());
    assert!(store.get_all_relationships().is_empty());
}

#[test]
#[serial]
fn test_sync_stashes_and_restores_changes() {
    let test_repo = init_test_repo();
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    fs::write(test_repo.root.join("README.md"), "work in progress\n").unwrap();

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([
        YesNo(true),
        Text(Some("wip".to_string())),
        YesNo(false),
    ]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert_eq!(summary.stash, StashOutcome::Restored);
    assert_eq!(test_repo.current_branch(), "feature-a");
    assert_eq!(test_repo.read("README.md").as_deref(), Some("work in progress\n"));
    assert!(test_repo.git(&["stash", "list"]).is_empty());
}

#[test]
#[serial]
fn test_sync_cancelled_stash_message() {
    let test_repo = init_test_repo();
    fs::write(test_repo.root.join("README.md"), "dirty\n").unwrap();

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([YesNo(true), Text(None)]);

    assert!(matches!(
        sync(&repo, &mut store, &mut prompter),
        Err(FlowError::UserCancelled)
    ));
    assert_eq!(test_repo.read("README.md").as_deref(), Some("dirty\n"));
}

#[test]
#[serial]
fn test_sync_publishes_new_branch_on_consent() {
    let test_repo = init_test_repo_with_remote();
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["checkout", "main"]);
    test_repo.commit_file("main.txt", "main");

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([YesNo(true), YesNo(true)]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert!(prompter.is_exhausted());
    assert_eq!(summary.published, vec!["feature-a"]);
    assert!(test_repo.remote_has_branch("feature-a"));
    assert_eq!(
        test_repo.git(&["rev-parse", "main"]),
        test_repo.git(&["rev-parse", "origin/main"])
    );
}

#[test]
#[serial]
fn test_sync_in_local_mode_skips_remote() {
    let test_repo = init_test_repo_with_remote();
    test_repo.branch_with_file("feature-a", "a.txt", "a");
    test_repo.git(&["checkout", "main"]);
    test_repo.commit_file("main.txt", "main");

    let repo = test_repo.open_recording(GitMode::Local);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([YesNo(true)]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert!(summary.published.is_empty());
    for subcommand in ["fetch", "pull", "push"] {
        assert!(!repo.runner().invoked(subcommand), "{subcommand} ran");
    }
    assert!(!test_repo.remote_has_branch("feature-a"));
    assert_ne!(
        test_repo.git(&["rev-parse", "main"]),
        test_repo.git(&["rev-parse", "origin/main"])
    );
}

#[test]
#[serial]
fn test_sync_stops_at_conflict() {
    let test_repo = init_test_repo();
    test_repo.git(&["checkout", "-b", "v1.0.0-prep"]);
    test_repo.commit_file("README.md", "prep side\n");
    test_repo.git(&["checkout", "main"]);
    test_repo.commit_file("README.md", "main side\n");

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([]);

    assert!(matches!(
        sync(&repo, &mut store, &mut prompter),
        Err(FlowError::GitCommandFailed { .. })
    ));
    assert_eq!(test_repo.current_branch(), "v1.0.0-prep");
    assert!(test_repo.root.join(".git/MERGE_HEAD").exists());
}

#[test]
#[serial]
fn test_sync_from_detached_head_pops_onto_main_on_consent() {
    let test_repo = init_test_repo();
    test_repo.git(&["checkout", "--detach"]);
    fs::write(test_repo.root.join("README.md"), "work in progress\n").unwrap();

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([
        YesNo(true),
        Text(Some("wip".to_string())),
        YesNo(true),
    ]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert!(prompter.is_exhausted());
    assert!(prompter.asked.last().unwrap().contains("detached HEAD"));
    assert_eq!(summary.stash, StashOutcome::Restored);
    assert_eq!(summary.restored_branch, "main");
    assert_eq!(test_repo.current_branch(), "main");
    assert_eq!(test_repo.read("README.md").as_deref(), Some("work in progress\n"));
    assert!(test_repo.git(&["stash", "list"]).is_empty());
}

#[test]
#[serial]
fn test_sync_from_detached_head_keeps_stash_when_declined() {
    let test_repo = init_test_repo();
    test_repo.git(&["checkout", "--detach"]);
    fs::write(test_repo.root.join("README.md"), "work in progress\n").unwrap();

    let repo = test_repo.open(GitMode::Normal);
    let mut store = memory_store();
    let mut prompter = ScriptedPrompter::new([
        YesNo(true),
        Text(Some("wip".to_string())),
        YesNo(false),
    ]);

    let summary = sync(&repo, &mut store, &mut prompter).unwrap();

    assert_eq!(summary.stash, StashOutcome::LeftInStash);
    assert_eq!(summary.restored_branch, "main");
    assert_eq!(test_repo.current_branch(), "main");
    assert_eq!(test_repo.read("README.md").as_deref(), Some("# Test Repository\n"));
    assert!(test_repo.git(&["stash", "list"]).contains("wip"));
}
