//! Rendering configuration for SIGMA Lucene output.
//!
//! [`RenderOptions`] controls the deployment-specific parts of the generated
//! envelopes: which indices a rule searches, how often it runs, and which
//! metadata lists are carried over from the rule. Everything else in an
//! envelope is a fixed scaffold expected by the Kibana import APIs.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Index patterns searched by detection rules unless overridden.
pub const DEFAULT_INDEX: &[&str] = &[
    "apm-*-transaction*",
    "auditbeat-*",
    "endgame-*",
    "filebeat-*",
    "logs-*",
    "packetbeat-*",
    "traces-apm*",
    "winlogbeat-*",
    "-*elastic-cloud-logs-*",
];

/// Index pattern referenced by saved searches unless overridden.
pub const DEFAULT_SAVED_SEARCH_INDEX: &str = "beats-*";

/// Detection rule schedule unless overridden.
pub const DEFAULT_SCHEDULE_INTERVAL: &str = "5m";

/// Options applied to every envelope rendered by a backend.
///
/// # Examples
///
/// ```rust
/// use sigma_lucene::RenderOptions;
///
/// let options = RenderOptions::from_yaml(
///     r#"
/// index: ["logs-endpoint.events.*"]
/// schedule_interval: 10m
/// include_tags: false
/// "#,
/// )?;
///
/// assert_eq!(options.index, vec!["logs-endpoint.events.*"]);
/// assert_eq!(options.lookback_from(), "now-10m");
/// assert!(options.include_author);
/// # Ok::<(), sigma_lucene::SigmaError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Index patterns searched by detection rules.
    ///
    /// **Default**: [`DEFAULT_INDEX`]
    pub index: Vec<String>,

    /// Index pattern the saved search points at.
    ///
    /// **Default**: `beats-*`
    pub saved_search_index: String,

    /// How often a detection rule runs, in Kibana interval notation.
    ///
    /// The rule looks back over the same span (`from: now-<interval>`).
    ///
    /// **Default**: `5m`
    pub schedule_interval: String,

    /// Carry the rule author into detection rules.
    pub include_author: bool,
    /// Carry the rule references into detection rules.
    pub include_references: bool,
    /// Carry the rule false positives into detection rules.
    pub include_false_positives: bool,
    /// Carry the rule tags into detection rules.
    pub include_tags: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            index: DEFAULT_INDEX.iter().map(|s| s.to_string()).collect(),
            saved_search_index: DEFAULT_SAVED_SEARCH_INDEX.to_string(),
            schedule_interval: DEFAULT_SCHEDULE_INTERVAL.to_string(),
            include_author: true,
            include_references: true,
            include_false_positives: true,
            include_tags: true,
        }
    }
}

impl RenderOptions {
    /// Parse options from YAML; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load options from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Start of the window a scheduled run searches.
    pub fn lookback_from(&self) -> String {
        format!("now-{}", self.schedule_interval)
    }
}
