use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{HoistError, HoistResult};

/// Output chunks scanned at emission: `index*.js` (or `.mjs`/`.cjs`),
/// optionally under an output directory.
pub const DEFAULT_INDEX_PATTERN: &str = r"(?:^|/)index[^/]*\.[cm]?js$";

/// Host pattern when serving without a configured host: every id matches.
const MATCH_ALL: &str = "";

/// Plugin options as supplied by the bundler configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoistOptions {
    /// Regex matched against module ids to find the host component.
    /// Required for builds; when serving, every module is a host if unset.
    #[serde(default)]
    pub host_component: Option<String>,
    #[serde(default)]
    pub index_pattern: Option<String>,
}

impl HoistOptions {
    pub fn new(host_component: &str) -> Self {
        HoistOptions {
            host_component: Some(host_component.to_string()),
            index_pattern: None,
        }
    }

    pub fn with_index_pattern(mut self, pattern: &str) -> Self {
        self.index_pattern = Some(pattern.to_string());
        self
    }

    pub fn resolve(&self, command: Command) -> HoistResult<ResolvedOptions> {
        let host_pattern = match (self.host_component.as_deref(), command) {
            (Some(pattern), _) => pattern,
            (None, Command::Serve) => MATCH_ALL,
            (None, Command::Build) => return Err(HoistError::MissingHostComponent),
        };
        let host = compile("hostComponent", host_pattern)?;
        let index = compile(
            "indexPattern",
            self.index_pattern.as_deref().unwrap_or(DEFAULT_INDEX_PATTERN),
        )?;
        Ok(ResolvedOptions { host, index })
    }
}

fn compile(field: &'static str, pattern: &str) -> HoistResult<Regex> {
    Regex::new(pattern).map_err(|source| HoistError::InvalidPattern {
        field,
        pattern: pattern.to_string(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    host: Regex,
    index: Regex,
}

impl ResolvedOptions {
    /// Host/guest classification. Pure function of the module id.
    pub fn is_host(&self, id: &str) -> bool {
        self.host.is_match(id)
    }

    pub fn is_entry_index(&self, file_name: &str) -> bool {
        self.index.is_match(file_name)
    }
}

/// Which pipeline the host is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Serve,
    Build,
}

impl FromStr for Command {
    type Err = HoistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "serve" => Ok(Command::Serve),
            "build" => Ok(Command::Build),
            other => Err(HoistError::UnknownCommand(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_index_pattern() {
        let opts = HoistOptions::new("Host").resolve(Command::Build).unwrap();
        assert!(opts.is_entry_index("index.js"));
        assert!(opts.is_entry_index("assets/index.4f2a91c3.js"));
        assert!(opts.is_entry_index("assets/index-Bx1e.mjs"));
        assert!(!opts.is_entry_index("assets/vendor.4f2a91c3.js"));
        assert!(!opts.is_entry_index("assets/index.4f2a91c3.css"));
        assert!(!opts.is_entry_index("assets/myindex.js"));
    }

    #[test]
    fn test_index_pattern_override() {
        let opts = HoistOptions::new("Host")
            .with_index_pattern(r"^main\.js$")
            .resolve(Command::Build)
            .unwrap();
        assert!(opts.is_entry_index("main.js"));
        assert!(!opts.is_entry_index("index.js"));
    }

    #[test]
    fn test_host_classification() {
        let opts = HoistOptions::new("AppShell").resolve(Command::Build).unwrap();
        assert!(opts.is_host("/src/AppShell.ce.vue?vue&type=style&index=0&lang.css"));
        assert!(!opts.is_host("/src/Button.ce.vue?vue&type=style&index=0&lang.css"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = HoistOptions::new("(unclosed").resolve(Command::Build).unwrap_err();
        assert!(matches!(
            err,
            HoistError::InvalidPattern {
                field: "hostComponent",
                ..
            }
        ));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let opts: HoistOptions =
            serde_json::from_str(r#"{"hostComponent":"Host","indexPattern":"^entry"}"#).unwrap();
        assert_eq!(opts.host_component.as_deref(), Some("Host"));
        assert_eq!(opts.index_pattern.as_deref(), Some("^entry"));
    }

    #[test]
    fn test_missing_host_matches_everything_when_serving() {
        let opts: HoistOptions = serde_json::from_str("{}").unwrap();
        let resolved = opts.resolve(Command::Serve).unwrap();
        assert!(resolved.is_host("/src/Anything.ce.vue?vue&type=style&index=0&lang.css"));
        assert!(resolved.is_entry_index("index.js"));
    }

    #[test]
    fn test_missing_host_fails_build() {
        let err = HoistOptions::default().resolve(Command::Build).unwrap_err();
        assert!(matches!(err, HoistError::MissingHostComponent));
    }

    #[test]
    fn test_command_from_str() {
        assert_eq!("serve".parse::<Command>().unwrap(), Command::Serve);
        assert_eq!("build".parse::<Command>().unwrap(), Command::Build);
        assert!("preview".parse::<Command>().is_err());
    }
}
