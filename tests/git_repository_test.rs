//! Integration tests for git2-backed diffs and `git commit` on temp repositories.

mod common;

use common::TestRepo;
use quill::error::GitError;
use quill::git::{GitRepository, VersionControl};

fn open(test: &TestRepo) -> GitRepository {
    GitRepository::open(test.path()).expect("Failed to open test repo")
}

// =============================================================================
// DIFF TESTS
// =============================================================================

#[test]
fn test_staged_diff_on_unborn_branch() {
    let test = TestRepo::new();
    test.stage("hello.txt", "hello\n");

    let diff = open(&test).staged_diff().unwrap();
    assert!(diff.contains("hello.txt"));
    assert!(diff.contains("+hello"));
}

#[test]
fn test_staged_diff_empty_after_commit() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");

    assert!(open(&test).staged_diff().unwrap().trim().is_empty());
}

#[test]
fn test_staged_diff_ignores_unstaged_changes() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");
    test.stage("b.txt", "staged\n");
    test.write("a.txt", "unstaged edit\n");

    let diff = open(&test).staged_diff().unwrap();
    assert!(diff.contains("+staged"));
    assert!(!diff.contains("unstaged edit"));
}

#[test]
fn test_all_diff_includes_tracked_but_not_untracked() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");
    test.write("a.txt", "modified\n");
    test.write("untracked.txt", "new\n");

    let repo = open(&test);
    let all = repo.all_diff().unwrap();
    assert!(all.contains("+modified"));
    assert!(all.contains("-a"));
    assert!(!all.contains("untracked.txt"));

    assert!(repo.staged_diff().unwrap().trim().is_empty());
}

#[test]
fn test_branch_diff_uses_merge_base() {
    let test = TestRepo::new();
    let root = test.commit_file("shared.txt", "shared\n", "initial");

    test.checkout_new_branch("feature", root);
    test.commit_file("feature.txt", "feature work\n", "feat: work");

    // Advance main after the branch point.
    test.checkout("main");
    test.commit_file("main-only.txt", "main only\n", "chore: main");
    test.checkout("feature");

    let diff = open(&test).branch_diff("main").unwrap();
    assert!(diff.contains("+feature work"));
    assert!(!diff.contains("main only"));
}

#[test]
fn test_branch_diff_unknown_base() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");

    let result = open(&test).branch_diff("does-not-exist");
    assert!(matches!(result, Err(GitError::ReferenceNotFound(ref base, _)) if base == "does-not-exist"));
}

#[test]
fn test_large_diff_is_truncated() {
    let test = TestRepo::new();
    let line = "x".repeat(99);
    let contents: String = (0..1000).map(|_| format!("{line}\n")).collect();
    test.stage("big.txt", &contents);

    let diff = open(&test).staged_diff().unwrap();
    assert!(diff.len() <= 30_000 + "\n[diff truncated]\n".len());
    assert!(diff.ends_with("[diff truncated]\n"));
}

// =============================================================================
// METADATA TESTS
// =============================================================================

#[test]
fn test_last_commit_message() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "feat: first\n\nWith a body.\n");

    assert_eq!(
        open(&test).last_commit_message().unwrap(),
        "feat: first\n\nWith a body."
    );
}

#[test]
fn test_last_commit_message_without_commits() {
    let test = TestRepo::new();
    assert!(matches!(
        open(&test).last_commit_message(),
        Err(GitError::NoCommits)
    ));
}

#[test]
fn test_repo_info_from_origin() {
    let test = TestRepo::new();
    test.add_origin("git@github.com:test_owner/test_repo.git");

    let (owner, repo) = open(&test).repo_info().unwrap();
    assert_eq!(owner, "test_owner");
    assert_eq!(repo, "test_repo");
}

#[test]
fn test_repo_info_without_origin() {
    let test = TestRepo::new();
    assert!(matches!(
        open(&test).repo_info(),
        Err(GitError::NoOriginRemote)
    ));
}

#[test]
fn test_current_branch() {
    let test = TestRepo::new();
    let root = test.commit_file("a.txt", "a\n", "initial");
    assert_eq!(open(&test).current_branch().unwrap(), "main");

    test.checkout_new_branch("feature-branch", root);
    assert_eq!(open(&test).current_branch().unwrap(), "feature-branch");
}

#[test]
fn test_current_branch_detached() {
    let test = TestRepo::new();
    let root = test.commit_file("a.txt", "a\n", "initial");
    test.repo.set_head_detached(root).unwrap();

    assert!(matches!(
        open(&test).current_branch(),
        Err(GitError::DetachedHead)
    ));
}

// =============================================================================
// COMMIT TESTS (require the git binary)
// =============================================================================

#[test]
fn test_commit_uses_message_file() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");
    test.stage("b.txt", "b\n");

    let short_id = open(&test)
        .commit("feat: add b\n\nExplains the change.", &[])
        .unwrap();

    assert!(!short_id.is_empty());
    assert_eq!(test.head_message().trim_end(), "feat: add b\n\nExplains the change.");
    assert_eq!(test.commit_count(), 2);
}

#[test]
fn test_commit_forwards_passthrough_args() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");

    // Nothing staged: only succeeds because --allow-empty is forwarded.
    open(&test)
        .commit("chore: empty", &["--allow-empty".to_string()])
        .unwrap();
    assert_eq!(test.head_message().trim_end(), "chore: empty");
}

#[test]
fn test_commit_amend_rewrites_head() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");
    test.commit_file("b.txt", "b\n", "fix: typo");
    test.stage("c.txt", "c\n");

    open(&test)
        .commit("fix: typo and add c", &["--amend".to_string()])
        .unwrap();

    assert_eq!(test.head_message().trim_end(), "fix: typo and add c");
    assert_eq!(test.commit_count(), 2);
}

#[test]
fn test_commit_failure_is_reported() {
    let test = TestRepo::new();
    test.commit_file("a.txt", "a\n", "initial");

    // Nothing staged and no --allow-empty: git refuses.
    let result = open(&test).commit("chore: nothing", &[]);
    assert!(matches!(result, Err(GitError::CommandFailed { .. })));
}
