//! Colorful ANSI output for an interactive terminal.
use super::format::{banner_date, plural, repo_flags, FlagKind};
use super::{ordered_sections, section_label};
use crate::briefing::{BriefingResult, SectionPayload, SectionResult};
use crate::sections::{CalendarAgenda, ClusterHealth, GitSummary, SystemHealth, WeatherReport};
use chrono::{DateTime, Local};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const BG_BLUE: &str = "\x1b[44m";

const RULE_WIDTH: usize = 50;
const LIST_LIMIT: usize = 10;

pub(super) fn render(result: &BriefingResult, now: &DateTime<Local>) -> String {
    let mut parts = vec![format!(
        "\n{BOLD}{BG_BLUE}{WHITE} ☀️  DAILY BRIEFING — {} {RESET}\n",
        banner_date(now)
    )];
    for (name, section) in ordered_sections(result) {
        parts.push(render_section(name, section));
    }
    parts.push(format!(
        "\n{DIM}Generated at {}{RESET}\n",
        result.timestamp
    ));
    parts.join("\n")
}

fn render_section(name: &str, section: &SectionResult) -> String {
    let (icon, title) = section_label(name);
    match section {
        SectionResult::Failed { error } => {
            format!("{}\n  {RED}Error: {error}{RESET}", header(icon, &title))
        }
        SectionResult::Unavailable { note } => {
            format!("{}\n  {DIM}{note}{RESET}", header(icon, &title))
        }
        SectionResult::Ready(payload) => match payload {
            SectionPayload::Weather(report) => weather(report),
            SectionPayload::Calendar(agenda) => calendar(agenda),
            SectionPayload::Git(summary) => git(summary),
            SectionPayload::System(health) => system(health),
            SectionPayload::Kubernetes(cluster) => kubernetes(cluster),
        },
    }
}

fn header(icon: &str, title: &str) -> String {
    format!("\n{BOLD}{CYAN}{icon}  {title}{RESET}\n{}", "─".repeat(RULE_WIDTH))
}

fn weather(w: &WeatherReport) -> String {
    [
        header("🌤️", &format!("Weather — {}", w.location)),
        format!(
            "  {BOLD}{}{RESET}  {}°F (feels like {}°F)",
            w.condition, w.temp_f, w.feels_like_f
        ),
        format!("  {DIM}High: {}°F  Low: {}°F{RESET}", w.high_f, w.low_f),
        format!(
            "  💧 Humidity: {}%  🌬️  Wind: {} mph {}",
            w.humidity, w.wind_mph, w.wind_dir
        ),
        format!("  ☀️  UV: {}  🌧️  Rain: {}%", w.uv_index, w.precip_chance),
        format!("  🌅 Sunrise: {}  🌇 Sunset: {}", w.sunrise, w.sunset),
    ]
    .join("\n")
}

fn calendar(agenda: &CalendarAgenda) -> String {
    if agenda.events.is_empty() {
        return format!(
            "{}\n  {GREEN}No events today — wide open!{RESET}",
            header("📅", "Calendar")
        );
    }
    let mut lines = vec![header(
        "📅",
        &format!("Calendar — {} event{}", agenda.count, plural(agenda.count)),
    )];
    for event in &agenda.events {
        let location = if event.location.is_empty() {
            String::new()
        } else {
            format!("  {DIM}@ {}{RESET}", event.location)
        };
        lines.push(format!(
            "  {BOLD}{}{RESET} {}{location}",
            event.start_time, event.title
        ));
    }
    lines.join("\n")
}

fn git(summary: &GitSummary) -> String {
    let mut lines = vec![header(
        "📦",
        &format!("Git Status — {} repos", summary.total_repos),
    )];

    if summary.dirty_repos > 0 {
        let n = summary.dirty_repos;
        lines.push(format!(
            "  {YELLOW}⚠ {n} repo{} with uncommitted changes{RESET}",
            plural(n)
        ));
    }
    if summary.repos_with_recent_commits > 0 {
        let n = summary.repos_with_recent_commits;
        lines.push(format!(
            "  {GREEN}✓ {n} repo{} with commits in last 24h{RESET}",
            plural(n)
        ));
    }

    let interesting: Vec<_> = summary.repos.iter().filter(|r| r.is_interesting()).collect();
    if !interesting.is_empty() {
        lines.push(String::new());
        for repo in &interesting {
            let flags = repo_flags(repo, |kind, text| {
                let color = match kind {
                    FlagKind::Dirty => YELLOW,
                    FlagKind::Ahead => GREEN,
                    FlagKind::Behind => RED,
                    FlagKind::Recent => CYAN,
                };
                format!("{color}{text}{RESET}")
            });
            lines.push(format!(
                "  {BOLD}{}{RESET} ({}) — {flags}",
                repo.name, repo.branch
            ));
        }
    }

    for error in &summary.errors {
        lines.push(format!("  {RED}{error}{RESET}"));
    }

    if interesting.is_empty() && summary.dirty_repos == 0 {
        lines.push(format!("  {GREEN}All clean!{RESET}"));
    }
    lines.join("\n")
}

fn system(health: &SystemHealth) -> String {
    let memory = &health.memory;
    let mem_color = match memory.percent_value().unwrap_or(0) {
        pct if pct > 80 => RED,
        pct if pct > 60 => YELLOW,
        _ => GREEN,
    };

    let mut lines = vec![
        header("🖥️", "System Health"),
        format!("  ⏱️  Uptime: {}  |  CPUs: {}", health.uptime, health.cpus),
        format!(
            "  📊 Load: {} / {} / {}",
            health.load.one, health.load.five, health.load.fifteen
        ),
        format!(
            "  🧠 Memory: {mem_color}{}%{RESET} ({}/{} GB)",
            memory.percent, memory.used_gb, memory.total_gb
        ),
    ];

    if let Some(disks) = health.disks.as_ref().filter(|disks| !disks.is_empty()) {
        lines.push("  💾 Disks:".to_string());
        for disk in disks {
            let color = if disk.warning { RED } else { GREEN };
            let warn = if disk.warning { " ⚠️" } else { "" };
            lines.push(format!(
                "     {}: {color}{}%{RESET} ({}/{}){warn}",
                disk.mount, disk.percent, disk.used, disk.size
            ));
        }
    }
    lines.join("\n")
}

fn kubernetes(cluster: &ClusterHealth) -> String {
    let mut lines = vec![header("☸️", "Kubernetes")];

    if let (Some(ready), Some(total)) = (cluster.nodes_ready, cluster.node_count) {
        if total > 0 {
            let color = if ready == total { GREEN } else { RED };
            lines.push(format!("  🖧  Nodes: {color}{ready}/{total} ready{RESET}"));
        }
    }

    lines.push(format!("  📦 Pods: {} total", cluster.total_pods));

    if cluster.unhealthy_count > 0 {
        let n = cluster.unhealthy_count;
        lines.push(format!("  {RED}⚠ {n} unhealthy pod{}:{RESET}", plural(n)));
        for pod in cluster.unhealthy_pods.iter().take(LIST_LIMIT) {
            lines.push(format!(
                "     {RED}{}/{} ({}){RESET}",
                pod.namespace.as_deref().unwrap_or("-"),
                pod.name.as_deref().unwrap_or("-"),
                pod.phase.as_deref().unwrap_or("Unknown")
            ));
        }
    } else {
        lines.push(format!("  {GREEN}✓ All pods healthy{RESET}"));
    }

    if cluster.restart_issue_count > 0 {
        let n = cluster.restart_issue_count;
        lines.push(format!(
            "  {YELLOW}🔄 {n} container{} with restart loops:{RESET}",
            plural(n)
        ));
        for issue in cluster.restart_issues.iter().take(LIST_LIMIT) {
            lines.push(format!(
                "     {YELLOW}{}/{}:{} ({} restarts){RESET}",
                issue.namespace.as_deref().unwrap_or("-"),
                issue.pod.as_deref().unwrap_or("-"),
                issue.container.as_deref().unwrap_or("-"),
                issue.restarts
            ));
        }
    }
    lines.join("\n")
}
