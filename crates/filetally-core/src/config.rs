//! Scan and classifier configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::record::Architecture;

/// Configuration for walking a tree.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to walk.
    pub root: PathBuf,

    /// Maximum depth to descend (None = unlimited). The root is depth 0.
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Include hidden entries (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Glob patterns matched against entry names; matches are skipped
    /// along with everything beneath them.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.root {
            Some(ref root) if root.as_os_str().is_empty() => {
                return Err("Root path cannot be empty".to_string());
            }
            None => return Err("Root path is required".to_string()),
            Some(_) => {}
        }
        if let Some(ref patterns) = self.ignore_patterns {
            for pattern in patterns {
                Glob::new(pattern).map_err(|e| format!("Invalid ignore pattern {pattern:?}: {e}"))?;
            }
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for walking a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: None,
            include_hidden: true,
            ignore_patterns: Vec::new(),
        }
    }

    /// Compile the ignore patterns.
    pub fn ignore_set(&self) -> Result<GlobSet, ScanError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
                message: format!("invalid ignore pattern {pattern:?}: {e}"),
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| ScanError::InvalidConfig {
            message: e.to_string(),
        })
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Configuration for the classification engine.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ClassifierConfig {
    /// Turn on the debug-info, strip-status and linkage markers. When set,
    /// those segments are dropped from descriptions and recorded as flags.
    #[builder(default = "false")]
    #[serde(default)]
    pub extended_markers: bool,

    /// Architectures whose detection is reported on the event channel.
    #[builder(default = "default_audited()")]
    #[serde(default = "default_audited")]
    pub audit_architectures: Vec<Architecture>,
}

fn default_audited() -> Vec<Architecture> {
    vec![Architecture::I386, Architecture::X86_64]
}

impl ClassifierConfig {
    /// Create a new classifier config builder.
    pub fn builder() -> ClassifierConfigBuilder {
        ClassifierConfigBuilder::default()
    }

    /// Whether detections of `architecture` are reported.
    pub fn audits(&self, architecture: Architecture) -> bool {
        self.audit_architectures.contains(&architecture)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            extended_markers: false,
            audit_architectures: default_audited(),
        }
    }
}
