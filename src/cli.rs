//! CLI argument parsing for the briefing.
//!
//! Arguments are kept raw here; defaults that depend on the environment are
//! resolved once in [`crate::config::BriefingConfig::resolve`].
use clap::Parser;

/// Root CLI entrypoint.
#[derive(Parser, Debug, Default)]
#[command(
    name = "daily-briefing",
    version,
    about = "Your morning briefing, one command away.",
    after_help = "Environment:\n  BRIEFING_LOCATION        Default weather location\n  BRIEFING_GIT_DIRS        Comma-separated git directories to scan\n  GOOGLE_SA_KEY            Calendar credential file\n  BRIEFING_CALENDAR_IDS    Comma-separated calendar IDs\n  BRIEFING_CALENDAR_CONFIG JSON file listing calendar IDs\n\nExamples:\n  daily-briefing\n  daily-briefing --format plain\n  daily-briefing --sections weather,git --location \"New York\"\n  daily-briefing --format json | jq '.sections.weather'"
)]
pub struct RootArgs {
    /// Output format: terminal, plain or json
    #[arg(long, value_name = "FMT", default_value = "terminal")]
    pub format: String,

    /// Comma-separated sections to include (weather,calendar,git,system,kubernetes)
    #[arg(long, value_name = "LIST")]
    pub sections: Option<String>,

    /// Weather location (default: $BRIEFING_LOCATION or a built-in location)
    #[arg(long, value_name = "PLACE")]
    pub location: Option<String>,

    /// Comma-separated directories to scan for git repos (default: $BRIEFING_GIT_DIRS or ~/git)
    #[arg(long, value_name = "DIRS")]
    pub git_dirs: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_terminal() {
        let args = RootArgs::try_parse_from(["daily-briefing"]).expect("parse");
        assert_eq!(args.format, "terminal");
        assert!(args.sections.is_none());
    }

    #[test]
    fn unknown_format_is_accepted_for_later_validation() {
        let args = RootArgs::try_parse_from(["daily-briefing", "--format", "xml"]).expect("parse");
        assert_eq!(args.format, "xml");
    }

    #[test]
    fn list_flags_stay_raw() {
        let args = RootArgs::try_parse_from([
            "daily-briefing",
            "--sections",
            "git, system",
            "--git-dirs",
            "/a,/b",
        ])
        .expect("parse");
        assert_eq!(args.sections.as_deref(), Some("git, system"));
        assert_eq!(args.git_dirs.as_deref(), Some("/a,/b"));
    }
}
