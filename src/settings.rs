use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::security::baseline::BaselineDefinitions;
use crate::security::pattern::DEFAULT_MAX_PATTERNS;
use crate::security::types::Repository;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub patterns: Patterns,
    /// Destination repositories; each gets a synthetic view privilege
    #[serde(default)]
    pub repositories: Vec<Repository>,
    /// Built-in targets, privileges and roles layered under the document
    #[serde(default)]
    pub baseline: BaselineDefinitions,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Source {
    /// Nexus work directory, e.g. /opt/sonatype-work/nexus
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patterns {
    /// Maximum number of patterns accepted per repository target
    pub max_patterns: usize,
}

impl Default for Patterns {
    fn default() -> Self {
        Self {
            max_patterns: DEFAULT_MAX_PATTERNS,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("patterns.max_patterns", Patterns::default().max_patterns as u64)
            .into_diagnostic()?;

        // Optional file
        if Path::new(path).exists() {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment overrides: SECURITY_RESOLVER__SOURCE__PATH=/nexus, etc.
        builder = builder
            .add_source(config::Environment::with_prefix("SECURITY_RESOLVER").separator("__"));

        let cfg = builder.build().into_diagnostic()?;
        let mut s: Settings = cfg.try_deserialize().into_diagnostic()?;

        if let Some(source) = &s.source.path {
            if source.is_relative() {
                s.source.path = Some(std::env::current_dir().into_diagnostic()?.join(source));
            }
        }

        Ok(s)
    }
}
