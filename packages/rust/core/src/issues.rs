//! Issue-tracker updates: marker issues, critical-change notices, and draft
//! pull requests for feature branches.

use std::sync::LazyLock;

use regex::RegexSet;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, instrument};

use codecache_extract::{Marker, MarkerKind, base_name, read_source, scan_markers};

use crate::remote::{RemoteExecutor, deliver};

const CREATE_ISSUE: &str = "mcp__github__create_issue";
const CREATE_PULL_REQUEST: &str = "mcp__github__create_pull_request";

/// Branches with fewer commits than this get no draft pull request.
pub const MIN_PR_COMMITS: usize = 3;

/// Commits listed in a pull request body.
const PR_COMMIT_PREVIEW: usize = 5;

/// Titles quote at most this many characters of the marker text.
const TITLE_TEXT_LEN: usize = 50;

/// Paths whose changes warrant a review notice.
static CRITICAL_PATHS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r".*/(api|routes?)/",
        r".*/models?/",
        r".*/schema/",
        r".*/(config|settings)",
        r"package\.json$",
        r"requirements\.txt$",
        r"go\.mod$",
        r"Dockerfile$",
        r"docker-compose\.ya?ml$",
    ])
    .expect("critical path patterns")
});

/// An issue ready to be filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDraft {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// A draft pull request ready to be opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDraft {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Commits on a feature branch that are not on its base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSummary {
    pub branch: String,
    pub base: String,
    pub commit_count: usize,
    /// `git log --oneline` lines, newest first.
    pub commits: Vec<String>,
}

/// Owner and name of a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

impl RepoCoordinates {
    /// Parse a github.com remote URL in SSH (`git@github.com:o/r.git`) or
    /// HTTPS (`https://github.com/o/r.git`) form.
    pub fn parse_remote(url: &str) -> Option<Self> {
        let url = url.trim();
        if !url.contains("github.com") {
            return None;
        }

        let (owner, name) = if url.starts_with("git@") {
            let (_, path) = url.split_once(':')?;
            let mut parts = path.split('/');
            (parts.next()?, parts.next()?)
        } else {
            let mut parts = url.trim_end_matches('/').rsplit('/');
            let name = parts.next()?;
            (parts.next()?, name)
        };

        let name = name.strip_suffix(".git").unwrap_or(name);
        if owner.is_empty() || name.is_empty() {
            return None;
        }

        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

/// Whether changes to `path` should notify reviewers.
pub fn is_critical_path(path: &str) -> bool {
    CRITICAL_PATHS.is_match(path)
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// Draft an issue for a marker found in `file`.
pub fn marker_issue(marker: &Marker, file: &str) -> IssueDraft {
    let mut title_text: String = marker.text.chars().take(TITLE_TEXT_LEN).collect();
    if marker.text.chars().count() > TITLE_TEXT_LEN {
        title_text.push_str("...");
    }

    let body = format!(
        "**File:** `{file}`  \n\
         **Line:** {line}  \n\
         **Type:** {kind}\n\
         \n\
         **Description:**\n\
         {text}\n\
         \n\
         **Context:**\n\
         ```\n\
         {context}\n\
         ```\n\
         \n\
         ---\n\
         *This issue was created automatically from a source comment marker.*",
        line = marker.line,
        kind = marker.kind,
        text = marker.text,
        context = marker.context,
    );

    let mut labels = vec!["todo".to_string(), "auto-generated".to_string()];
    match marker.kind {
        MarkerKind::Fixme => labels.push("bug".into()),
        MarkerKind::Hack => labels.push("technical-debt".into()),
        MarkerKind::Todo | MarkerKind::Note => {}
    }

    IssueDraft {
        title: format!("{}: {title_text}", marker.kind),
        body,
        labels,
    }
}

/// Draft a review notice for a change to a critical file.
pub fn critical_change_issue(path: &str, change_type: &str, project: &str) -> IssueDraft {
    let body = format!(
        "**File:** `{path}`  \n\
         **Change Type:** {change_type}  \n\
         **Project:** {project}\n\
         \n\
         A critical file has been modified. Please review the changes to ensure they \
         don't break existing functionality.\n\
         \n\
         **Why this is flagged as critical:**\n\
         - This file appears to be part of core infrastructure, API, or configuration\n\
         \n\
         ---\n\
         *This notification was created automatically by a change hook.*"
    );

    IssueDraft {
        title: format!("Critical File Modified: {}", base_name(path)),
        body,
        labels: vec![
            "critical-change".into(),
            "review-needed".into(),
            "auto-generated".into(),
        ],
    }
}

/// Draft a pull request for a feature branch, or `None` when it has fewer
/// than [`MIN_PR_COMMITS`] commits.
pub fn feature_pr(summary: &BranchSummary) -> Option<PullRequestDraft> {
    if summary.commit_count < MIN_PR_COMMITS {
        return None;
    }

    let mut commits: Vec<String> = summary
        .commits
        .iter()
        .take(PR_COMMIT_PREVIEW)
        .map(|c| format!("- {c}"))
        .collect();
    if summary.commit_count > PR_COMMIT_PREVIEW {
        commits.push(format!(
            "- ... and {} more commits",
            summary.commit_count - PR_COMMIT_PREVIEW
        ));
    }

    let body = format!(
        "## Summary\n\
         Draft pull request for feature branch `{branch}`.\n\
         \n\
         ## Commits ({count})\n\
         {commits}\n\
         \n\
         ---\n\
         *This pull request was created automatically by a change hook.*",
        branch = summary.branch,
        count = summary.commit_count,
        commits = commits.join("\n"),
    );

    Some(PullRequestDraft {
        title: format!("Draft: {}", title_case(&summary.branch.replace('-', " "))),
        body,
        head: summary.branch.clone(),
        base: summary.base.clone(),
        draft: true,
    })
}

/// Upper-case the first letter of every word and lower-case the rest. Any
/// non-letter starts a new word, so `feature/add login` becomes
/// `Feature/Add Login`.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if in_word {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        in_word = c.is_alphabetic();
    }
    out
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Files issues through a [`RemoteExecutor`].
pub struct IssueIntegrator<E> {
    executor: E,
    project: String,
}

impl<E: RemoteExecutor> IssueIntegrator<E> {
    pub fn new(executor: E, project: impl Into<String>) -> Self {
        Self {
            executor,
            project: project.into(),
        }
    }

    /// File one issue per TODO, FIXME, or HACK marker in `path`. NOTE
    /// markers are informational and skipped. Returns how many were filed.
    #[instrument(skip(self))]
    pub fn issues_from_markers(&self, path: &str) -> usize {
        let Some(content) = read_source(path) else {
            return 0;
        };

        let filed = scan_markers(&content)
            .iter()
            .filter(|m| m.kind != MarkerKind::Note)
            .filter(|m| self.file(&marker_issue(m, path)))
            .count();

        info!(file = path, filed, "marker issues processed");
        filed
    }

    /// File a review notice when `path` is critical. Returns whether one was filed.
    #[instrument(skip(self))]
    pub fn notify_critical_change(&self, path: &str, change_type: &str) -> bool {
        if !is_critical_path(path) {
            debug!(file = path, "not a critical path");
            return false;
        }

        self.file(&critical_change_issue(path, change_type, &self.project))
    }

    /// Open a draft pull request for a branch with enough commits. Returns
    /// whether one was opened.
    #[instrument(skip_all, fields(branch = %summary.branch, base = %summary.base))]
    pub fn create_feature_pr(&self, summary: &BranchSummary) -> bool {
        let Some(draft) = feature_pr(summary) else {
            debug!(commits = summary.commit_count, "too few commits for a draft pull request");
            return false;
        };

        deliver(&self.executor, CREATE_PULL_REQUEST, json!(draft))
    }

    fn file(&self, draft: &IssueDraft) -> bool {
        deliver(&self.executor, CREATE_ISSUE, json!(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingExecutor;

    fn marker(kind: MarkerKind, text: &str) -> Marker {
        Marker {
            kind,
            text: text.into(),
            line: 7,
            context: format!("# {kind}: {text}"),
        }
    }

    #[test]
    fn parses_ssh_and_https_remotes() {
        let ssh = RepoCoordinates::parse_remote("git@github.com:acme/billing.git").unwrap();
        assert_eq!(ssh.owner, "acme");
        assert_eq!(ssh.name, "billing");

        let https =
            RepoCoordinates::parse_remote("https://github.com/acme/billing.git\n").unwrap();
        assert_eq!(https, ssh);

        let bare = RepoCoordinates::parse_remote("https://github.com/acme/billing").unwrap();
        assert_eq!(bare.name, "billing");
    }

    #[test]
    fn other_hosts_are_ignored() {
        assert!(RepoCoordinates::parse_remote("git@gitlab.com:acme/billing.git").is_none());
        assert!(RepoCoordinates::parse_remote("").is_none());
    }

    #[test]
    fn critical_paths() {
        assert!(is_critical_path("src/api/users.py"));
        assert!(is_critical_path("app/routes/index.js"));
        assert!(is_critical_path("app/models/user.rb"));
        assert!(is_critical_path("db/schema/001.sql"));
        assert!(is_critical_path("app/config.py"));
        assert!(is_critical_path("web/package.json"));
        assert!(is_critical_path("Dockerfile"));
        assert!(is_critical_path("deploy/docker-compose.yml"));

        assert!(!is_critical_path("src/lib/strings.py"));
        assert!(!is_critical_path("api/users.py"));
    }

    #[test]
    fn marker_issue_title_and_labels() {
        let draft = marker_issue(&marker(MarkerKind::Fixme, "null deref"), "src/app.py");
        assert_eq!(draft.title, "FIXME: null deref");
        assert_eq!(draft.labels, vec!["todo", "auto-generated", "bug"]);
        assert!(draft.body.contains("**File:** `src/app.py`  \n**Line:** 7  \n"));
        assert!(draft.body.contains("```\n# FIXME: null deref\n```"));

        let hack = marker_issue(&marker(MarkerKind::Hack, "skip auth"), "a.py");
        assert_eq!(hack.labels.last().map(String::as_str), Some("technical-debt"));
    }

    #[test]
    fn long_marker_text_is_truncated() {
        let text = "x".repeat(60);
        let draft = marker_issue(&marker(MarkerKind::Todo, &text), "a.py");
        assert_eq!(draft.title, format!("TODO: {}...", "x".repeat(50)));

        let exact = "y".repeat(50);
        let draft = marker_issue(&marker(MarkerKind::Todo, &exact), "a.py");
        assert_eq!(draft.title, format!("TODO: {exact}"));
    }

    #[test]
    fn files_issues_for_actionable_markers() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("worker.py");
        std::fs::write(
            &path,
            "# TODO: batch writes\n# NOTE: keep sorted\n# FIXME: leaks fds\nx = 1\n",
        )
        .unwrap();

        let exec = RecordingExecutor::available();
        let issues = IssueIntegrator::new(&exec, "billing");
        assert_eq!(issues.issues_from_markers(path.to_str().unwrap()), 2);

        let calls = exec.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, CREATE_ISSUE);
        assert_eq!(calls[0].1["title"], "TODO: batch writes");
        assert_eq!(calls[1].1["title"], "FIXME: leaks fds");
    }

    #[test]
    fn missing_file_files_nothing() {
        let exec = RecordingExecutor::available();
        let issues = IssueIntegrator::new(&exec, "billing");
        assert_eq!(issues.issues_from_markers("/nonexistent/worker.py"), 0);
        assert!(exec.calls().is_empty());
    }

    #[test]
    fn critical_change_notice() {
        let exec = RecordingExecutor::available();
        let issues = IssueIntegrator::new(&exec, "billing");

        assert!(!issues.notify_critical_change("src/lib/strings.py", "edit"));
        assert!(issues.notify_critical_change("src/api/users.py", "edit"));

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1["title"], "Critical File Modified: users.py");
        assert_eq!(calls[0].1["labels"][0], "critical-change");
        let body = calls[0].1["body"].as_str().unwrap();
        assert!(body.contains("**Change Type:** edit  \n**Project:** billing\n"));
    }

    #[test]
    fn unavailable_tracker_files_nothing() {
        let exec = RecordingExecutor::unavailable();
        let issues = IssueIntegrator::new(&exec, "billing");
        assert!(!issues.notify_critical_change("Dockerfile", "create"));
    }

    fn branch(count: usize) -> BranchSummary {
        BranchSummary {
            branch: "feature/add-user-login".into(),
            base: "main".into(),
            commit_count: count,
            commits: (1..=count).rev().map(|n| format!("c{n} commit {n}")).collect(),
        }
    }

    #[test]
    fn feature_pr_needs_three_commits() {
        assert!(feature_pr(&branch(2)).is_none());
        assert!(feature_pr(&branch(3)).is_some());
    }

    #[test]
    fn feature_pr_title_and_refs() {
        let draft = feature_pr(&branch(3)).unwrap();
        assert_eq!(draft.title, "Draft: Feature/Add User Login");
        assert_eq!(draft.head, "feature/add-user-login");
        assert_eq!(draft.base, "main");
        assert!(draft.draft);
        assert!(draft.body.contains("- c3 commit 3\n- c2 commit 2\n- c1 commit 1\n"));
        assert!(!draft.body.contains("more commits"));
    }

    #[test]
    fn feature_pr_lists_five_commits() {
        let draft = feature_pr(&branch(8)).unwrap();
        assert!(draft.body.contains("## Commits (8)\n- c8 commit 8\n"));
        assert!(draft.body.contains("- c4 commit 4\n- ... and 3 more commits\n"));
        assert!(!draft.body.contains("c3 commit 3"));
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("fix API timeout"), "Fix Api Timeout");
        assert_eq!(title_case("v2 rollout"), "V2 Rollout");
    }

    #[test]
    fn creates_draft_pull_request() {
        let exec = RecordingExecutor::available();
        let issues = IssueIntegrator::new(&exec, "billing");

        assert!(!issues.create_feature_pr(&branch(1)));
        assert!(issues.create_feature_pr(&branch(4)));

        let calls = exec.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, CREATE_PULL_REQUEST);
        assert_eq!(calls[0].1["head"], "feature/add-user-login");
        assert_eq!(calls[0].1["base"], "main");
        assert_eq!(calls[0].1["draft"], true);
    }
}
