//! Briefing renderers.
//!
//! Renderers are pure functions of a [`BriefingResult`]; every section outcome
//! (ready, unavailable, failed) renders inline in its own block.

use crate::briefing::{BriefingResult, SectionResult};
use crate::config::{OutputFormat, ALL_SECTIONS};
use anyhow::Result;
use chrono::Local;

mod format;
mod json;
mod plain;
mod terminal;

/// Render `result` in the selected format, stamping the header with local time.
pub fn render(format: OutputFormat, result: &BriefingResult) -> Result<String> {
    let now = Local::now();
    match format {
        OutputFormat::Terminal => Ok(terminal::render(result, &now)),
        OutputFormat::Plain => Ok(plain::render(result, &now)),
        OutputFormat::Json => json::render(result),
    }
}

/// Sections in display order: known sections first, then anything else.
pub(crate) fn ordered_sections(result: &BriefingResult) -> Vec<(&str, &SectionResult)> {
    let mut ordered: Vec<(&str, &SectionResult)> = ALL_SECTIONS
        .iter()
        .filter_map(|name| {
            result
                .sections
                .get_key_value(*name)
                .map(|(name, section)| (name.as_str(), section))
        })
        .collect();
    ordered.extend(
        result
            .sections
            .iter()
            .filter(|(name, _)| !ALL_SECTIONS.contains(&name.as_str()))
            .map(|(name, section)| (name.as_str(), section)),
    );
    ordered
}

/// Icon and title used in a section's heading.
pub(crate) fn section_label(name: &str) -> (&'static str, String) {
    match name {
        "weather" => ("🌤️", "Weather".to_string()),
        "calendar" => ("📅", "Calendar".to_string()),
        "git" => ("📦", "Git Status".to_string()),
        "system" => ("🖥️", "System".to_string()),
        "kubernetes" => ("☸️", "Kubernetes".to_string()),
        other => ("❔", other.to_string()),
    }
}
