//! Messaging-friendly plain text.
use super::format::{banner_date, plural, repo_flags};
use super::{ordered_sections, section_label};
use crate::briefing::{BriefingResult, SectionPayload, SectionResult};
use crate::sections::{CalendarAgenda, ClusterHealth, GitSummary, SystemHealth, WeatherReport};
use chrono::{DateTime, Local};

const LIST_LIMIT: usize = 5;

pub(super) fn render(result: &BriefingResult, now: &DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str(&format!("☀️ DAILY BRIEFING — {}\n\n", banner_date(now)));
    for (name, section) in ordered_sections(result) {
        out.push_str(&render_section(name, section));
        out.push_str("\n\n");
    }
    out.push_str(&format!("Generated at {}\n", result.timestamp));
    out
}

fn render_section(name: &str, section: &SectionResult) -> String {
    let (icon, title) = section_label(name);
    match section {
        SectionResult::Failed { error } => format!("{icon} {title}\nError: {error}"),
        SectionResult::Unavailable { note } => format!("{icon} {title}\n{note}"),
        SectionResult::Ready(payload) => match payload {
            SectionPayload::Weather(report) => weather(report),
            SectionPayload::Calendar(agenda) => calendar(agenda),
            SectionPayload::Git(summary) => git(summary),
            SectionPayload::System(health) => system(health),
            SectionPayload::Kubernetes(cluster) => kubernetes(cluster),
        },
    }
}

fn weather(w: &WeatherReport) -> String {
    [
        format!("🌤️ Weather — {}", w.location),
        format!(
            "{} | {}°F (feels like {}°F)",
            w.condition, w.temp_f, w.feels_like_f
        ),
        format!("High: {}°F / Low: {}°F", w.high_f, w.low_f),
        format!(
            "Humidity: {}% | Wind: {} mph {}",
            w.humidity, w.wind_mph, w.wind_dir
        ),
        format!("UV: {} | Rain chance: {}%", w.uv_index, w.precip_chance),
        format!("Sunrise: {} | Sunset: {}", w.sunrise, w.sunset),
    ]
    .join("\n")
}

fn calendar(agenda: &CalendarAgenda) -> String {
    if agenda.events.is_empty() {
        return "📅 Calendar\nNo events today — wide open!".to_string();
    }
    let mut lines = vec![format!(
        "📅 Calendar — {} event{}",
        agenda.count,
        plural(agenda.count)
    )];
    for event in &agenda.events {
        let location = if event.location.is_empty() {
            String::new()
        } else {
            format!(" @ {}", event.location)
        };
        lines.push(format!(
            "  {} — {}{location}",
            event.start_time, event.title
        ));
    }
    lines.join("\n")
}

fn git(summary: &GitSummary) -> String {
    let mut lines = vec![format!("📦 Git Status — {} repos", summary.total_repos)];
    if summary.dirty_repos > 0 {
        lines.push(format!(
            "⚠ {} with uncommitted changes",
            summary.dirty_repos
        ));
    }
    if summary.repos_with_recent_commits > 0 {
        lines.push(format!(
            "✓ {} with recent commits",
            summary.repos_with_recent_commits
        ));
    }

    let interesting: Vec<_> = summary.repos.iter().filter(|r| r.is_interesting()).collect();
    for repo in &interesting {
        let flags = repo_flags(repo, |_, text| text);
        lines.push(format!("  {} ({}) — {flags}", repo.name, repo.branch));
    }
    for error in &summary.errors {
        lines.push(format!("  {error}"));
    }
    if interesting.is_empty() && summary.dirty_repos == 0 {
        lines.push("All clean!".to_string());
    }
    lines.join("\n")
}

fn system(health: &SystemHealth) -> String {
    let memory = &health.memory;
    let mut lines = vec![
        "🖥️ System Health".to_string(),
        format!("Uptime: {} | CPUs: {}", health.uptime, health.cpus),
        format!(
            "Load: {} / {} / {}",
            health.load.one, health.load.five, health.load.fifteen
        ),
        format!(
            "Memory: {}% ({}/{} GB)",
            memory.percent, memory.used_gb, memory.total_gb
        ),
    ];
    let warnings: Vec<_> = health
        .disks
        .iter()
        .flatten()
        .filter(|disk| disk.warning)
        .collect();
    if warnings.is_empty() {
        lines.push("Disks: All healthy".to_string());
    } else {
        for disk in warnings {
            lines.push(format!(
                "⚠️ Disk {}: {}% ({}/{})",
                disk.mount, disk.percent, disk.used, disk.size
            ));
        }
    }
    lines.join("\n")
}

fn kubernetes(cluster: &ClusterHealth) -> String {
    let mut lines = vec!["☸️ Kubernetes".to_string()];
    if let (Some(ready), Some(total)) = (cluster.nodes_ready, cluster.node_count) {
        if total > 0 {
            lines.push(format!("Nodes: {ready}/{total} ready"));
        }
    }
    lines.push(format!("Pods: {} total", cluster.total_pods));

    if cluster.unhealthy_count > 0 {
        lines.push(format!("⚠ {} unhealthy pods:", cluster.unhealthy_count));
        for pod in cluster.unhealthy_pods.iter().take(LIST_LIMIT) {
            lines.push(format!(
                "  {}/{} ({})",
                pod.namespace.as_deref().unwrap_or("-"),
                pod.name.as_deref().unwrap_or("-"),
                pod.phase.as_deref().unwrap_or("Unknown")
            ));
        }
    } else {
        lines.push("All pods healthy ✓".to_string());
    }

    if cluster.restart_issue_count > 0 {
        lines.push(format!("🔄 {} restart loops:", cluster.restart_issue_count));
        for issue in cluster.restart_issues.iter().take(LIST_LIMIT) {
            lines.push(format!(
                "  {}/{}:{} ({}x)",
                issue.namespace.as_deref().unwrap_or("-"),
                issue.pod.as_deref().unwrap_or("-"),
                issue.container.as_deref().unwrap_or("-"),
                issue.restarts
            ));
        }
    }
    lines.join("\n")
}
