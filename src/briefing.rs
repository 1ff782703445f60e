//! Section registry and the concurrent briefing runner.
//!
//! Each requested section runs on its own worker thread. Whatever a provider
//! does (returns an error, panics, names an unknown section) is folded into
//! that section's [`SectionResult`]; siblings never observe it.
use crate::config::BriefingConfig;
use crate::sections::{
    calendar, git, kubernetes, system, weather, CalendarAgenda, ClusterHealth, GitSummary,
    SystemHealth, WeatherReport,
};
use crate::util::millis;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe, PanicHookInfo};
use std::sync::{mpsc, Once};
use std::thread;
use std::time::Instant;

const WORKER_PREFIX: &str = "section-";

static QUIET_WORKER_PANICS: Once = Once::new();

/// A section provider: one blocking gather of one category of data.
pub type Provider = fn(&BriefingConfig) -> Result<SectionResult>;

/// Typed payload of a section that produced data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionPayload {
    Weather(WeatherReport),
    Calendar(CalendarAgenda),
    Git(GitSummary),
    System(SystemHealth),
    Kubernetes(ClusterHealth),
}

impl SectionPayload {
    /// Sections with prerequisites also report `available: true` on success.
    fn reports_availability(&self) -> bool {
        matches!(self, Self::Calendar(_) | Self::Kubernetes(_))
    }
}

/// Outcome of one section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionResult {
    /// The provider gathered its data.
    Ready(SectionPayload),
    /// Prerequisites (credentials, external binary) are missing.
    Unavailable { note: String },
    /// The provider failed, panicked, or the section name is unknown.
    Failed { error: String },
}

impl SectionResult {
    pub fn unavailable(note: impl Into<String>) -> Self {
        Self::Unavailable { note: note.into() }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            error: error.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ready(_) => "ready",
            Self::Unavailable { .. } => "unavailable",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }
}

// All three outcomes share one JSON container: payload fields, or
// `available: false` + `note`, or `error`.
impl Serialize for SectionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ready(payload) => {
                let value = serde_json::to_value(payload).map_err(serde::ser::Error::custom)?;
                let serde_json::Value::Object(fields) = value else {
                    return value.serialize(serializer);
                };
                let mut map = serializer.serialize_map(None)?;
                if payload.reports_availability() {
                    map.serialize_entry("available", &true)?;
                }
                for (key, value) in &fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Unavailable { note } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("available", &false)?;
                map.serialize_entry("note", note)?;
                map.end()
            }
            Self::Failed { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}

/// Ordered section names plus the configuration every provider reads.
#[derive(Debug, Clone)]
pub struct BriefingRequest {
    pub sections: Vec<String>,
    pub config: BriefingConfig,
}

/// Aggregate of every requested section, stamped once all have finished.
#[derive(Debug, Clone, Serialize)]
pub struct BriefingResult {
    pub sections: BTreeMap<String, SectionResult>,
    pub timestamp: String,
}

/// Name to provider lookup table.
#[derive(Clone)]
pub struct Registry {
    providers: BTreeMap<&'static str, Provider>,
}

impl Registry {
    pub fn new(providers: impl IntoIterator<Item = (&'static str, Provider)>) -> Self {
        Self {
            providers: providers.into_iter().collect(),
        }
    }

    /// The five built-in sections.
    pub fn builtin() -> Self {
        Self::new([
            ("weather", weather::gather as Provider),
            ("calendar", calendar::gather as Provider),
            ("git", git::gather as Provider),
            ("system", system::gather as Provider),
            ("kubernetes", kubernetes::gather as Provider),
        ])
    }

    pub fn lookup(&self, name: &str) -> Option<Provider> {
        self.providers.get(name).copied()
    }
}

/// Run the built-in providers for `request`.
pub fn run(request: &BriefingRequest) -> Result<BriefingResult> {
    run_with(&Registry::builtin(), request)
}

/// Fan every requested section out to its own worker and fold the results.
///
/// Per-section failures are data; the only error is failing to start a worker.
pub fn run_with(registry: &Registry, request: &BriefingRequest) -> Result<BriefingResult> {
    install_panic_hook();
    let mut sections = BTreeMap::new();
    let config = &request.config;

    thread::scope(|scope| -> Result<()> {
        let (tx, rx) = mpsc::channel();
        for name in &request.sections {
            let tx = tx.clone();
            let provider = registry.lookup(name);
            thread::Builder::new()
                .name(format!("{WORKER_PREFIX}{name}"))
                .spawn_scoped(scope, move || {
                    let result = run_section(name, provider, config);
                    // The receiver outlives every worker in this scope.
                    let _ = tx.send((name.clone(), result));
                })
                .with_context(|| format!("start worker for section {name}"))?;
        }
        drop(tx);

        // Completion order; placement into the map is what callers rely on.
        for (name, result) in rx {
            sections.insert(name, result);
        }
        Ok(())
    })?;

    Ok(BriefingResult {
        sections,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
    })
}

fn run_section(name: &str, provider: Option<Provider>, config: &BriefingConfig) -> SectionResult {
    let Some(provider) = provider else {
        tracing::warn!(section = name, "unknown section");
        return SectionResult::failed(format!("Unknown section: {name}"));
    };

    let start = Instant::now();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| provider(config))) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => SectionResult::failed(err.to_string()),
        Err(payload) => SectionResult::failed(panic_message(payload.as_ref())),
    };

    let elapsed_ms = millis(start.elapsed());
    match result.error() {
        Some(error) => tracing::warn!(section = name, elapsed_ms, error, "section failed"),
        None => tracing::debug!(section = name, elapsed_ms, outcome = result.kind(), "section done"),
    }
    result
}

/// Keep provider panics off stderr; they already surface as `Failed`.
///
/// Panics on any other thread still reach the previous hook.
fn install_panic_hook() {
    QUIET_WORKER_PANICS.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            let current = thread::current();
            match current.name().filter(|name| is_section_worker(name)) {
                Some(name) => tracing::debug!(
                    thread = name,
                    message = %panic_message(info.payload()),
                    "section panicked"
                ),
                None => original_hook(info),
            }
        }));
    });
}

fn is_section_worker(thread_name: &str) -> bool {
    thread_name.starts_with(WORKER_PREFIX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "briefing_tests.rs"]
mod tests;
