//! Host health: uptime, load, memory and disk usage.
use crate::briefing::{SectionPayload, SectionResult};
use crate::config::BriefingConfig;
use crate::process::run_command;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

const DF_TIMEOUT: Duration = Duration::from_secs(5);
const DF_ARGS: [&str; 8] = [
    "-h",
    "--output=target,size,used,avail,pcent",
    "-x",
    "tmpfs",
    "-x",
    "devtmpfs",
    "-x",
    "overlay",
];
const DISK_WARNING_PERCENT: u32 = 80;
const UNKNOWN: &str = "?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadAverage {
    #[serde(rename = "1m")]
    pub one: String,
    #[serde(rename = "5m")]
    pub five: String,
    #[serde(rename = "15m")]
    pub fifteen: String,
}

impl LoadAverage {
    fn unknown() -> Self {
        Self {
            one: UNKNOWN.to_string(),
            five: UNKNOWN.to_string(),
            fifteen: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub total_gb: String,
    pub used_gb: String,
    pub free_gb: String,
    pub percent: String,
}

impl MemoryUsage {
    fn unknown() -> Self {
        Self {
            total_gb: UNKNOWN.to_string(),
            used_gb: UNKNOWN.to_string(),
            free_gb: UNKNOWN.to_string(),
            percent: UNKNOWN.to_string(),
        }
    }

    /// Numeric percent, when known.
    pub fn percent_value(&self) -> Option<u32> {
        self.percent.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub mount: String,
    pub size: String,
    pub used: String,
    pub avail: String,
    pub percent: u32,
    pub warning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub uptime: String,
    pub cpus: usize,
    pub load: LoadAverage,
    pub memory: MemoryUsage,
    /// `None` when `df` could not be run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disks: Option<Vec<DiskUsage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_warnings: Option<usize>,
}

pub fn gather(_config: &BriefingConfig) -> Result<SectionResult> {
    let uptime = fs::read_to_string("/proc/uptime")
        .context("read /proc/uptime")
        .and_then(|raw| parse_uptime(&raw))
        .map(format_uptime)
        .unwrap_or_else(|err| {
            tracing::debug!(error = %err, "uptime unavailable");
            "unknown".to_string()
        });

    let load = load_average().unwrap_or_else(LoadAverage::unknown);

    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(0);

    let memory = fs::read_to_string("/proc/meminfo")
        .map(|raw| memory_usage(&parse_meminfo(&raw)))
        .unwrap_or_else(|err| {
            tracing::debug!(error = %err, "meminfo unavailable");
            MemoryUsage::unknown()
        });

    let disks = match run_command("df", &DF_ARGS, None, DF_TIMEOUT) {
        Ok(output) if !output.stdout.trim().is_empty() => Some(parse_df(&output.stdout)),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "df unavailable");
            None
        }
    };
    let disk_warnings = disks
        .as_ref()
        .map(|disks| disks.iter().filter(|d| d.warning).count());

    Ok(SectionResult::Ready(SectionPayload::System(SystemHealth {
        uptime,
        cpus,
        load,
        memory,
        disks,
        disk_warnings,
    })))
}

fn parse_uptime(raw: &str) -> Result<f64> {
    raw.split_whitespace()
        .next()
        .ok_or_else(|| anyhow!("empty /proc/uptime"))?
        .parse()
        .context("parse /proc/uptime")
}

/// `3d 4h 12m`, or `4h 12m` under a day.
fn format_uptime(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let mins = (total % 3_600) / 60;
    if days > 0 {
        format!("{days}d {hours}h {mins}m")
    } else {
        format!("{hours}h {mins}m")
    }
}

fn load_average() -> Option<LoadAverage> {
    let mut loads = [0f64; 3];
    // SAFETY: `loads` has room for the three samples requested.
    let filled = unsafe { libc::getloadavg(loads.as_mut_ptr(), 3) };
    (filled == 3).then(|| LoadAverage {
        one: format!("{:.2}", loads[0]),
        five: format!("{:.2}", loads[1]),
        fifteen: format!("{:.2}", loads[2]),
    })
}

/// `/proc/meminfo` values in bytes, keyed by field name.
fn parse_meminfo(raw: &str) -> BTreeMap<String, u64> {
    raw.lines()
        .filter_map(|line| {
            let (key, rest) = line.split_once(':')?;
            let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
            Some((key.trim().to_string(), kb * 1024))
        })
        .collect()
}

fn memory_usage(meminfo: &BTreeMap<String, u64>) -> MemoryUsage {
    let total = meminfo.get("MemTotal").copied().unwrap_or(0);
    let available = meminfo.get("MemAvailable").copied().unwrap_or(0);
    let used = total.saturating_sub(available);
    let percent = if total > 0 { used * 100 / total } else { 0 };
    let gb = |bytes: u64| format!("{:.1}", bytes as f64 / 1e9);
    MemoryUsage {
        total_gb: gb(total),
        used_gb: gb(used),
        free_gb: gb(available),
        percent: percent.to_string(),
    }
}

fn parse_df(out: &str) -> Vec<DiskUsage> {
    out.lines()
        .skip(1)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 5 {
                return None;
            }
            let percent = parts[4].trim_end_matches('%').parse().unwrap_or(0);
            Some(DiskUsage {
                mount: parts[0].to_string(),
                size: parts[1].to_string(),
                used: parts[2].to_string(),
                avail: parts[3].to_string(),
                percent,
                warning: percent > DISK_WARNING_PERCENT,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_uptime_with_and_without_days() {
        assert_eq!(format_uptime(3.0 * 86_400.0 + 4.0 * 3_600.0 + 12.0 * 60.0 + 5.0), "3d 4h 12m");
        assert_eq!(format_uptime(59.0 * 60.0), "0h 59m");
        assert_eq!(parse_uptime("12345.67 54321.00\n").unwrap(), 12345.67);
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn computes_memory_from_meminfo() {
        let raw = "MemTotal:       16000000 kB\nMemFree:         1000000 kB\nMemAvailable:    4000000 kB\nHugePages_Total:       0\n";
        let meminfo = parse_meminfo(raw);
        assert_eq!(meminfo["MemTotal"], 16_000_000 * 1024);
        let memory = memory_usage(&meminfo);
        assert_eq!(memory.percent, "75");
        assert_eq!(memory.total_gb, "16.4");
        assert_eq!(memory.free_gb, "4.1");
        assert_eq!(memory.percent_value(), Some(75));
    }

    #[test]
    fn empty_meminfo_reports_zero_percent() {
        let memory = memory_usage(&BTreeMap::new());
        assert_eq!(memory.percent, "0");
        assert_eq!(MemoryUsage::unknown().percent_value(), None);
    }

    #[test]
    fn parses_df_and_flags_full_disks() {
        let out = "Mounted on  Size  Used Avail Use%\n/           100G   85G   15G  85%\n/boot       1.0G  200M  800M  20%\n\nbad line\n";
        let disks = parse_df(out);
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].mount, "/");
        assert_eq!(disks[0].percent, 85);
        assert!(disks[0].warning);
        assert!(!disks[1].warning);
    }

    #[test]
    fn load_average_serializes_with_window_keys() {
        let value = serde_json::to_value(LoadAverage::unknown()).unwrap();
        assert_eq!(value["1m"], "?");
        assert_eq!(value["15m"], "?");
    }

    #[test]
    fn gather_always_reports_cpu_count() {
        let SectionResult::Ready(SectionPayload::System(health)) =
            gather(&BriefingConfig::default()).unwrap()
        else {
            panic!("expected system payload");
        };
        assert!(health.cpus > 0);
        assert!(!health.uptime.is_empty());
    }
}
