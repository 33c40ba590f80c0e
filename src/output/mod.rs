//! Output envelopes for compiled Lucene queries.
//!
//! Every renderer takes the compiled query, the rule metadata and the render
//! options, and produces one [`Document`]:
//! - [`OutputFormat::Plain`] - the query string itself
//! - [`OutputFormat::SavedSearch`] - Kibana saved search object ([`kibana`])
//! - [`OutputFormat::QueryObject`] - Elasticsearch query DSL ([`dsl`])
//! - [`OutputFormat::DetectionRule`] - Kibana alerting rule ([`siem`])
//! - [`OutputFormat::DetectionRuleFlat`] - Detection engine rule for NDJSON
//!   import ([`siem`])
//!
//! The JSON envelopes are built from typed structs so key order matches what
//! the import APIs export.

pub mod dsl;
pub mod kibana;
pub mod siem;

use crate::config::RenderOptions;
use crate::error::{Result, SigmaError};
use crate::ir::RuleMetadata;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Envelope format selected for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    #[serde(alias = "default")]
    Plain,
    #[serde(alias = "kibana_ndjson")]
    SavedSearch,
    #[serde(alias = "dsl_lucene")]
    QueryObject,
    #[serde(alias = "siem_rule")]
    DetectionRule,
    #[serde(alias = "siem_rule_ndjson")]
    DetectionRuleFlat,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Plain,
        OutputFormat::SavedSearch,
        OutputFormat::QueryObject,
        OutputFormat::DetectionRule,
        OutputFormat::DetectionRuleFlat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Plain => "default",
            OutputFormat::SavedSearch => "kibana_ndjson",
            OutputFormat::QueryObject => "dsl_lucene",
            OutputFormat::DetectionRule => "siem_rule",
            OutputFormat::DetectionRuleFlat => "siem_rule_ndjson",
        }
    }

    /// Whether the rendered envelope carries a risk score.
    pub fn needs_severity(self) -> bool {
        matches!(
            self,
            OutputFormat::DetectionRule | OutputFormat::DetectionRuleFlat
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = SigmaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" | "plain" => Ok(OutputFormat::Plain),
            "kibana_ndjson" | "saved_search" => Ok(OutputFormat::SavedSearch),
            "dsl_lucene" | "query_object" => Ok(OutputFormat::QueryObject),
            "siem_rule" | "detection_rule" => Ok(OutputFormat::DetectionRule),
            "siem_rule_ndjson" | "detection_rule_flat" => Ok(OutputFormat::DetectionRuleFlat),
            other => Err(SigmaError::Config(format!("unknown output format '{other}'"))),
        }
    }
}

/// One rendered envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Query(String),
    Json(Value),
}

impl Document {
    pub fn as_query(&self) -> Option<&str> {
        match self {
            Document::Query(q) => Some(q),
            Document::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Document::Query(_) => None,
            Document::Json(v) => Some(v),
        }
    }

    /// Single-line text form: the query itself or compact JSON.
    pub fn to_line(&self) -> Result<String> {
        match self {
            Document::Query(q) => Ok(q.clone()),
            Document::Json(v) => Ok(serde_json::to_string(v)?),
        }
    }
}

/// Wrap a compiled query into the envelope for `format`.
pub fn render(
    format: OutputFormat,
    query: &str,
    metadata: &RuleMetadata,
    options: &RenderOptions,
) -> Result<Document> {
    let document = match format {
        OutputFormat::Plain => Document::Query(query.to_string()),
        OutputFormat::SavedSearch => {
            Document::Json(serde_json::to_value(kibana::saved_search(query, metadata, options)?)?)
        }
        OutputFormat::QueryObject => Document::Json(serde_json::to_value(dsl::query_object(query))?),
        OutputFormat::DetectionRule => {
            Document::Json(serde_json::to_value(siem::detection_rule(query, metadata, options)?)?)
        }
        OutputFormat::DetectionRuleFlat => Document::Json(serde_json::to_value(
            siem::detection_rule_flat(query, metadata, options)?,
        )?),
    };
    debug!(format = %format, title = %metadata.title, "rendered envelope");
    Ok(document)
}

/// Join documents into newline-delimited text, one document per line.
///
/// Suitable for the saved-object and detection-rule bulk import endpoints.
pub fn finalize_ndjson(documents: &[Document]) -> Result<String> {
    let lines = documents
        .iter()
        .map(Document::to_line)
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

pub(crate) const NO_DESCRIPTION: &str = "No description";

/// Title prefix marking objects generated from SIGMA rules.
pub(crate) const TITLE_PREFIX: &str = "SIGMA - ";

pub(crate) fn prefixed_title(metadata: &RuleMetadata) -> String {
    format!("{TITLE_PREFIX}{}", metadata.title)
}

pub(crate) fn description_or_default(metadata: &RuleMetadata) -> String {
    metadata
        .description
        .clone()
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}
