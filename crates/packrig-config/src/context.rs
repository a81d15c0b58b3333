//! Deployment context and crash-reporting metadata.
//!
//! Both are read from the environment once, by the caller, and handed to the
//! factory as plain values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Market the application is deployed for. Selects region-specific assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Au,
    Nz,
}

/// Whether the build runs on a developer machine or in a deployment pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Execution {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub region: Region,
    pub execution: Execution,
}

impl DeploymentContext {
    pub fn new(region: Region, execution: Execution) -> Self {
        Self { region, execution }
    }

    /// Classify the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Classify using an arbitrary variable lookup.
    ///
    /// `COUNTRY=NZ` selects [`Region::Nz`], anything else [`Region::Au`].
    /// A missing, empty or `local` `STAGE` means [`Execution::Local`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let region = match lookup("COUNTRY").as_deref() {
            Some("NZ") => Region::Nz,
            _ => Region::Au,
        };

        let execution = match lookup("STAGE") {
            Some(stage) if !stage.trim().is_empty() && !stage.trim().eq_ignore_ascii_case("local") => {
                Execution::Remote
            }
            _ => Execution::Local,
        };

        Self { region, execution }
    }

    pub fn is_local(&self) -> bool {
        self.execution == Execution::Local
    }
}

/// A path that may differ per [`Region`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionalPath {
    Shared(PathBuf),
    PerRegion { au: PathBuf, nz: PathBuf },
}

impl RegionalPath {
    pub fn for_region(&self, region: Region) -> &Path {
        match (self, region) {
            (RegionalPath::Shared(path), _) => path,
            (RegionalPath::PerRegion { au, .. }, Region::Au) => au,
            (RegionalPath::PerRegion { nz, .. }, Region::Nz) => nz,
        }
    }

    pub(crate) fn rebase(self, root: &Path) -> Self {
        match self {
            RegionalPath::Shared(path) => RegionalPath::Shared(root.join(path)),
            RegionalPath::PerRegion { au, nz } => RegionalPath::PerRegion {
                au: root.join(au),
                nz: root.join(nz),
            },
        }
    }
}

impl From<PathBuf> for RegionalPath {
    fn from(path: PathBuf) -> Self {
        RegionalPath::Shared(path)
    }
}

/// Crash-reporting integration metadata. Only consulted for remote builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySettings {
    pub org: Option<String>,
    pub project: Option<String>,
    pub auth_token: Option<String>,
    pub dsn: Option<String>,
    pub stage: Option<String>,
}

impl TelemetrySettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            org: lookup("SENTRY_ORG"),
            project: lookup("PROJECT_NAME"),
            auth_token: lookup("SENTRY_AUTH_TOKEN"),
            dsn: lookup("SENTRY_DSN"),
            stage: lookup("STAGE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_is_local_au() {
        let ctx = DeploymentContext::from_lookup(lookup(&[]));
        assert_eq!(ctx, DeploymentContext::new(Region::Au, Execution::Local));
        assert!(ctx.is_local());
    }

    #[test]
    fn nz_and_deployed_stage() {
        let ctx = DeploymentContext::from_lookup(lookup(&[("COUNTRY", "NZ"), ("STAGE", "prod")]));
        assert_eq!(ctx.region, Region::Nz);
        assert_eq!(ctx.execution, Execution::Remote);
    }

    #[test]
    fn local_stage_is_case_insensitive() {
        let ctx = DeploymentContext::from_lookup(lookup(&[("STAGE", " Local ")]));
        assert!(ctx.is_local());
    }

    #[test]
    fn country_match_is_exact() {
        let ctx = DeploymentContext::from_lookup(lookup(&[("COUNTRY", "nz")]));
        assert_eq!(ctx.region, Region::Au);
    }

    #[test]
    fn regional_path_picks_variant() {
        let path = RegionalPath::PerRegion {
            au: PathBuf::from("email-au"),
            nz: PathBuf::from("email-nz"),
        };
        assert_eq!(path.for_region(Region::Nz), Path::new("email-nz"));
        assert_eq!(path.for_region(Region::Au), Path::new("email-au"));

        let shared = RegionalPath::from(PathBuf::from("robots.txt"));
        assert_eq!(shared.for_region(Region::Nz), Path::new("robots.txt"));
    }

    #[test]
    fn telemetry_reads_all_keys() {
        let settings = TelemetrySettings::from_lookup(lookup(&[
            ("SENTRY_ORG", "acme"),
            ("PROJECT_NAME", "portal"),
            ("SENTRY_AUTH_TOKEN", "secret"),
            ("SENTRY_DSN", "https://dsn"),
            ("STAGE", "uat"),
        ]));
        assert_eq!(settings.org.as_deref(), Some("acme"));
        assert_eq!(settings.project.as_deref(), Some("portal"));
        assert_eq!(settings.auth_token.as_deref(), Some("secret"));
        assert_eq!(settings.dsn.as_deref(), Some("https://dsn"));
        assert_eq!(settings.stage.as_deref(), Some("uat"));
    }
}
