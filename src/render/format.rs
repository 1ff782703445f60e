use crate::sections::RepoStatus;
use chrono::{DateTime, Local};

pub(super) use crate::util::plural;

/// `Monday, October 19, 2026 7:05 AM`
pub(super) fn banner_date(now: &DateTime<Local>) -> String {
    let date = now.format("%A, %B %d, %Y");
    let time = now.format("%I:%M %p").to_string();
    format!("{date} {}", time.trim_start_matches('0'))
}

/// Repo flags shared by both text renderers, each wrapped by `paint`.
pub(super) fn repo_flags(repo: &RepoStatus, paint: impl Fn(FlagKind, String) -> String) -> String {
    let mut flags = Vec::new();
    if repo.uncommitted > 0 {
        flags.push(paint(FlagKind::Dirty, format!("{} uncommitted", repo.uncommitted)));
    }
    if repo.ahead > 0 {
        flags.push(paint(FlagKind::Ahead, format!("↑{}", repo.ahead)));
    }
    if repo.behind > 0 {
        flags.push(paint(FlagKind::Behind, format!("↓{}", repo.behind)));
    }
    if repo.recent_commits > 0 {
        flags.push(paint(FlagKind::Recent, format!("{} recent", repo.recent_commits)));
    }
    flags.join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FlagKind {
    Dirty,
    Ahead,
    Behind,
    Recent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn banner_drops_leading_hour_zero() {
        let now = Local
            .with_ymd_and_hms(2026, 10, 19, 7, 5, 0)
            .single()
            .expect("valid local time");
        assert_eq!(banner_date(&now), "Monday, October 19, 2026 7:05 AM");
    }

    #[test]
    fn repo_flags_list_only_nonzero_counters() {
        let repo = RepoStatus {
            name: "x".to_string(),
            path: "/x".to_string(),
            branch: "main".to_string(),
            upstream: None,
            uncommitted: 0,
            ahead: 2,
            behind: 1,
            recent_commits: 0,
        };
        assert_eq!(repo_flags(&repo, |_, text| text), "↑2, ↓1");
    }
}
