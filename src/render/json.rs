use crate::briefing::BriefingResult;
use anyhow::{Context, Result};

/// Pretty-printed `{"sections": {...}, "timestamp": "..."}` for piping.
pub(super) fn render(result: &BriefingResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("serialize briefing")
}
