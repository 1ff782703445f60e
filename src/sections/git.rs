//! Local repository status: uncommitted work, upstream drift, recent commits.
use crate::briefing::{SectionPayload, SectionResult};
use crate::config::BriefingConfig;
use crate::process::run_command;
use anyhow::{anyhow, Result};
use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

const GIT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoStatus {
    pub name: String,
    pub path: String,
    pub branch: String,
    /// Tracking branch, `None` when the branch has no upstream.
    pub upstream: Option<String>,
    pub uncommitted: usize,
    pub ahead: u32,
    pub behind: u32,
    pub recent_commits: usize,
}

impl RepoStatus {
    /// Local work not yet pushed or committed.
    pub fn is_active(&self) -> bool {
        self.uncommitted > 0 || self.ahead > 0
    }

    /// Anything a reader of the briefing would want to see.
    pub fn is_interesting(&self) -> bool {
        self.is_active() || self.behind > 0 || self.recent_commits > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSummary {
    pub total_repos: usize,
    pub dirty_repos: usize,
    pub repos_with_recent_commits: usize,
    pub repos: Vec<RepoStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl GitSummary {
    /// Sort repos and derive the counters from them.
    pub fn new(mut repos: Vec<RepoStatus>, errors: Vec<String>) -> Self {
        repos.sort_by(|a, b| {
            b.is_active()
                .cmp(&a.is_active())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Self {
            total_repos: repos.len(),
            dirty_repos: repos.iter().filter(|r| r.uncommitted > 0).count(),
            repos_with_recent_commits: repos.iter().filter(|r| r.recent_commits > 0).count(),
            repos,
            errors,
        }
    }
}

pub fn gather(config: &BriefingConfig) -> Result<SectionResult> {
    let mut repos = Vec::new();
    let mut errors = Vec::new();

    for dir in &config.git_dirs {
        match candidate_repos(dir) {
            Ok(candidates) => {
                for repo in candidates {
                    repos.push(scan_repo(&repo, &mut errors));
                }
            }
            Err(err) => errors.push(format!("{}: {err}", dir.display())),
        }
    }

    tracing::debug!(repos = repos.len(), errors = errors.len(), "git scan done");
    Ok(SectionResult::Ready(SectionPayload::Git(GitSummary::new(
        repos, errors,
    ))))
}

/// Immediate, non-hidden sub-directories of `dir` that contain `.git`.
fn candidate_repos(dir: &Path) -> std::io::Result<Vec<std::path::PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(true);
        if !hidden && path.is_dir() && path.join(".git").exists() {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}

fn scan_repo(repo: &Path, errors: &mut Vec<String>) -> RepoStatus {
    let name = repo
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo.display().to_string());

    let uncommitted = git(repo, &["status", "--porcelain"])
        .map(|out| count_lines(&out))
        .unwrap_or(0);

    let branch = match git(repo, &["branch", "--show-current"]) {
        Ok(out) if out.is_empty() => "detached".to_string(),
        Ok(out) => out,
        Err(_) => "unknown".to_string(),
    };

    // No upstream is a normal state; a failing count against a known
    // upstream is reported.
    let upstream = git(
        repo,
        &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{upstream}"],
    )
    .ok()
    .filter(|name| !name.is_empty());
    let (ahead, behind) = match &upstream {
        Some(_) => match git(repo, &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"])
            .and_then(|out| parse_ahead_behind(&out))
        {
            Ok(counts) => counts,
            Err(err) => {
                errors.push(format!("{name}: ahead/behind: {err}"));
                (0, 0)
            }
        },
        None => (0, 0),
    };

    let since = (Utc::now() - ChronoDuration::days(1)).to_rfc3339();
    let since_arg = format!("--since={since}");
    let recent_commits = git(repo, &["log", &since_arg, "--oneline", "--no-merges"])
        .map(|out| count_lines(&out))
        .unwrap_or(0);

    RepoStatus {
        name,
        path: repo.display().to_string(),
        branch,
        upstream,
        uncommitted,
        ahead,
        behind,
        recent_commits,
    }
}

fn git(repo: &Path, args: &[&str]) -> Result<String> {
    run_command("git", args, Some(repo), GIT_TIMEOUT)?.into_stdout()
}

fn count_lines(out: &str) -> usize {
    out.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Parse `rev-list --left-right --count` output: `<ahead>\t<behind>`.
fn parse_ahead_behind(out: &str) -> Result<(u32, u32)> {
    let mut parts = out.split_whitespace();
    let mut next = |label: &str| -> Result<u32> {
        parts
            .next()
            .ok_or_else(|| anyhow!("missing {label} count in {out:?}"))?
            .parse()
            .map_err(|_| anyhow!("invalid {label} count in {out:?}"))
    };
    let ahead = next("ahead")?;
    let behind = next("behind")?;
    Ok((ahead, behind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn repo(name: &str, uncommitted: usize, ahead: u32, recent: usize) -> RepoStatus {
        RepoStatus {
            name: name.to_string(),
            path: format!("/git/{name}"),
            branch: "main".to_string(),
            upstream: None,
            uncommitted,
            ahead,
            behind: 0,
            recent_commits: recent,
        }
    }

    #[test]
    fn parses_ahead_behind_counts() {
        assert_eq!(parse_ahead_behind("3\t1").unwrap(), (3, 1));
        assert_eq!(parse_ahead_behind("0 0").unwrap(), (0, 0));
        assert!(parse_ahead_behind("").is_err());
        assert!(parse_ahead_behind("x 1").is_err());
    }

    #[test]
    fn counts_non_blank_lines() {
        assert_eq!(count_lines(" M src/main.rs\n?? new.txt\n\n"), 2);
        assert_eq!(count_lines(""), 0);
    }

    #[test]
    fn active_repos_sort_first_then_by_name() {
        let summary = GitSummary::new(
            vec![
                repo("zeta", 0, 0, 0),
                repo("Beta", 0, 0, 2),
                repo("alpha", 0, 0, 0),
                repo("omega", 2, 0, 0),
                repo("delta", 0, 1, 0),
            ],
            Vec::new(),
        );
        let names: Vec<&str> = summary.repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["delta", "omega", "alpha", "Beta", "zeta"]);
        assert_eq!(summary.total_repos, 5);
        assert_eq!(summary.dirty_repos, 1);
        assert_eq!(summary.repos_with_recent_commits, 1);
    }

    #[test]
    fn serializes_with_camel_case_keys_and_omits_empty_errors() {
        let summary = GitSummary::new(vec![repo("a", 1, 0, 0)], Vec::new());
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["totalRepos"], 1);
        assert_eq!(value["reposWithRecentCommits"], 0);
        assert_eq!(value["repos"][0]["recentCommits"], 0);
        assert!(value.get("errors").is_none());
    }

    #[test]
    fn missing_scan_dir_is_recorded_not_fatal() {
        let config = BriefingConfig {
            git_dirs: vec![PathBuf::from("/definitely/not/here")],
            ..BriefingConfig::default()
        };
        let SectionResult::Ready(SectionPayload::Git(summary)) = gather(&config).unwrap() else {
            panic!("expected git payload");
        };
        assert_eq!(summary.total_repos, 0);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("/definitely/not/here: "));
    }

    #[test]
    fn skips_hidden_and_non_repo_directories() {
        let root = tempfile::tempdir().expect("tempdir");
        for dir in ["plain", ".hidden/.git", "repo/.git"] {
            fs::create_dir_all(root.path().join(dir)).expect("mkdir");
        }
        let found = candidate_repos(root.path()).expect("scan");
        assert_eq!(found, vec![root.path().join("repo")]);
    }

    #[test]
    fn scans_a_real_repository() {
        let root = tempfile::tempdir().expect("tempdir");
        let repo_dir = root.path().join("demo");
        fs::create_dir_all(&repo_dir).expect("mkdir");
        if run_command("git", &["init", "-q"], Some(&repo_dir), GIT_TIMEOUT)
            .map(|out| !out.success)
            .unwrap_or(true)
        {
            eprintln!("Skipping: git not available");
            return;
        }
        fs::write(repo_dir.join("notes.txt"), "draft").expect("write");

        let mut errors = Vec::new();
        let status = scan_repo(&repo_dir, &mut errors);
        assert_eq!(status.name, "demo");
        assert_eq!(status.uncommitted, 1);
        assert_eq!(status.upstream, None);
        assert_eq!((status.ahead, status.behind), (0, 0));
        assert!(errors.is_empty());
    }
}
