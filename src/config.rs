//! Briefing configuration, resolved once at startup.
//!
//! Every environment lookup the briefing needs happens here; providers only
//! ever see the finished [`BriefingConfig`].
use crate::cli::RootArgs;
use crate::util::{expand_home, split_list};
use anyhow::{anyhow, Error};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_LOCATION: &str = "Jeffersonton, VA 22724";
pub const DEFAULT_GIT_DIRS: &str = "~/git";
pub const DEFAULT_CREDENTIALS_REL: &str = ".config/daily-briefing/service-account.json";
pub const DEFAULT_CALENDAR_CONFIG_REL: &str = ".config/daily-briefing/calendars.json";

pub const ENV_LOCATION: &str = "BRIEFING_LOCATION";
pub const ENV_GIT_DIRS: &str = "BRIEFING_GIT_DIRS";
pub const ENV_CREDENTIALS: &str = "GOOGLE_SA_KEY";
pub const ENV_CALENDAR_IDS: &str = "BRIEFING_CALENDAR_IDS";
pub const ENV_CALENDAR_CONFIG: &str = "BRIEFING_CALENDAR_CONFIG";

/// Every section the registry knows about, in display order.
pub const ALL_SECTIONS: [&str; 5] = ["weather", "calendar", "git", "system", "kubernetes"];

/// Renderer selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Plain,
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "terminal" => Ok(Self::Terminal),
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("Unknown format: {other}")),
        }
    }
}

/// Where calendar credentials and calendar IDs come from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Credential file; `None` when nothing usable was found.
    pub credentials: Option<PathBuf>,
    /// Explicit calendar IDs from the environment.
    pub calendar_ids: Vec<String>,
    /// JSON file listing calendar IDs, consulted when `calendar_ids` is empty.
    pub calendar_config: Option<PathBuf>,
}

/// Read-only configuration shared by every section provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefingConfig {
    pub location: String,
    pub git_dirs: Vec<PathBuf>,
    pub calendar: CalendarConfig,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            git_dirs: Vec::new(),
            calendar: CalendarConfig::default(),
        }
    }
}

impl BriefingConfig {
    /// Resolve from CLI arguments and the process environment.
    pub fn resolve(args: &RootArgs) -> Self {
        let home = dirs::home_dir();
        Self::resolve_with(args, |key| std::env::var(key).ok(), home.as_deref())
    }

    /// Resolve from CLI arguments and an explicit environment lookup.
    pub fn resolve_with<F>(args: &RootArgs, lookup: F, home: Option<&Path>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let location = args
            .location
            .clone()
            .or_else(|| non_empty(ENV_LOCATION))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let git_dirs_raw = args
            .git_dirs
            .clone()
            .or_else(|| non_empty(ENV_GIT_DIRS))
            .unwrap_or_else(|| DEFAULT_GIT_DIRS.to_string());
        let git_dirs = split_list(&git_dirs_raw)
            .iter()
            .map(|dir| expand_home(dir, home))
            .collect();

        let calendar = CalendarConfig {
            credentials: resolve_credentials(non_empty(ENV_CREDENTIALS).as_deref(), home),
            calendar_ids: non_empty(ENV_CALENDAR_IDS)
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            calendar_config: non_empty(ENV_CALENDAR_CONFIG)
                .map(|raw| expand_home(raw.trim(), home))
                .or_else(|| home.map(|home| home.join(DEFAULT_CALENDAR_CONFIG_REL))),
        };

        Self {
            location,
            git_dirs,
            calendar,
        }
    }
}

/// Requested section names, from `--sections` or every known section.
pub fn requested_sections(args: &RootArgs) -> Vec<String> {
    match args.sections.as_deref() {
        Some(raw) => split_list(raw),
        None => ALL_SECTIONS.iter().map(|name| name.to_string()).collect(),
    }
}

fn resolve_credentials(env_path: Option<&str>, home: Option<&Path>) -> Option<PathBuf> {
    if let Some(raw) = env_path {
        let path = expand_home(raw.trim(), home);
        if path.exists() {
            return Some(path);
        }
        tracing::debug!(path = %path.display(), "{ENV_CREDENTIALS} does not exist");
    }
    let default = home?.join(DEFAULT_CREDENTIALS_REL);
    default.exists().then_some(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn resolve(args: &RootArgs, env: &[(&str, &str)], home: &Path) -> BriefingConfig {
        let env: BTreeMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BriefingConfig::resolve_with(args, |key| env.get(key).cloned(), Some(home))
    }

    #[test]
    fn parses_known_formats() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("plain".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert_eq!(
            "terminal".parse::<OutputFormat>().unwrap(),
            OutputFormat::Terminal
        );
    }

    #[test]
    fn unknown_format_names_the_value() {
        let err = "xml".parse::<OutputFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown format: xml");
    }

    #[test]
    fn defaults_apply_without_flags_or_env() {
        let home = tempfile::tempdir().expect("tempdir");
        let config = resolve(&RootArgs::default(), &[], home.path());
        assert_eq!(config.location, DEFAULT_LOCATION);
        assert_eq!(config.git_dirs, vec![home.path().join("git")]);
        assert!(config.calendar.credentials.is_none());
        assert!(config.calendar.calendar_ids.is_empty());
        assert_eq!(
            config.calendar.calendar_config,
            Some(home.path().join(DEFAULT_CALENDAR_CONFIG_REL))
        );
    }

    #[test]
    fn env_overrides_defaults_and_flags_override_env() {
        let home = tempfile::tempdir().expect("tempdir");
        let env = [
            (ENV_LOCATION, "Richmond, VA"),
            (ENV_GIT_DIRS, "~/src, /opt/repos"),
        ];
        let config = resolve(&RootArgs::default(), &env, home.path());
        assert_eq!(config.location, "Richmond, VA");
        assert_eq!(
            config.git_dirs,
            vec![home.path().join("src"), PathBuf::from("/opt/repos")]
        );

        let args = RootArgs {
            location: Some("Austin, TX".to_string()),
            git_dirs: Some("/work".to_string()),
            ..RootArgs::default()
        };
        let config = resolve(&args, &env, home.path());
        assert_eq!(config.location, "Austin, TX");
        assert_eq!(config.git_dirs, vec![PathBuf::from("/work")]);
    }

    #[test]
    fn credential_override_must_exist() {
        let home = tempfile::tempdir().expect("tempdir");
        let key = home.path().join("key.json");
        let config = resolve(
            &RootArgs::default(),
            &[(ENV_CREDENTIALS, key.to_str().unwrap())],
            home.path(),
        );
        assert!(config.calendar.credentials.is_none());

        std::fs::write(&key, "{}").expect("write key");
        let config = resolve(
            &RootArgs::default(),
            &[(ENV_CREDENTIALS, key.to_str().unwrap())],
            home.path(),
        );
        assert_eq!(config.calendar.credentials, Some(key));
    }

    #[test]
    fn default_credential_location_is_used_when_present() {
        let home = tempfile::tempdir().expect("tempdir");
        let default = home.path().join(DEFAULT_CREDENTIALS_REL);
        std::fs::create_dir_all(default.parent().unwrap()).expect("mkdir");
        std::fs::write(&default, "{}").expect("write key");
        let config = resolve(&RootArgs::default(), &[], home.path());
        assert_eq!(config.calendar.credentials, Some(default));
    }

    #[test]
    fn calendar_ids_come_from_env_list() {
        let home = tempfile::tempdir().expect("tempdir");
        let config = resolve(
            &RootArgs::default(),
            &[(ENV_CALENDAR_IDS, "primary, team@example.com")],
            home.path(),
        );
        assert_eq!(
            config.calendar.calendar_ids,
            vec!["primary".to_string(), "team@example.com".to_string()]
        );
    }

    #[test]
    fn requested_sections_default_to_all() {
        assert_eq!(requested_sections(&RootArgs::default()), ALL_SECTIONS);
        let args = RootArgs {
            sections: Some("git, bogus".to_string()),
            ..RootArgs::default()
        };
        assert_eq!(requested_sections(&args), vec!["git", "bogus"]);
    }
}
