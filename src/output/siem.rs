//! Kibana detection rule envelopes.
//!
//! Two shapes carry the same rule:
//! - [`DetectionRule`] - alerting-framework object with the rule body nested
//!   under `params` and camelCase keys
//! - [`DetectionRuleFlat`] - detection-engine NDJSON import object, flat with
//!   snake_case keys and an explicit `throttle`
//!
//! Both derive `severity` and `risk_score` from the rule level through
//! [`SEVERITY_RISK_SCORES`].

use super::{description_or_default, prefixed_title};
use crate::config::RenderOptions;
use crate::error::{Result, SigmaError};
use crate::ir::RuleMetadata;
use serde::Serialize;
use serde_json::Value;

/// Rule level → (Kibana severity, risk score).
pub const SEVERITY_RISK_SCORES: &[(&str, &str, u8)] = &[
    ("informational", "low", 1),
    ("low", "low", 21),
    ("medium", "medium", 47),
    ("high", "high", 73),
    ("critical", "critical", 99),
];

/// Level assumed for rules that do not declare one.
pub const DEFAULT_LEVEL: &str = "low";

const LICENSE: &str = "DRL";
const RULE_TYPE: &str = "query";
const LANGUAGE: &str = "lucene";
const META_FROM: &str = "1m";
const MAX_SIGNALS: u32 = 100;
const RULE_VERSION: u32 = 1;

/// Look up severity and risk score for a rule level (case-insensitive).
///
/// ```rust
/// use sigma_lucene::output::siem::risk_score;
///
/// assert_eq!(risk_score(None)?, ("low", 21));
/// assert_eq!(risk_score(Some("High"))?, ("high", 73));
/// assert!(risk_score(Some("urgent")).is_err());
/// # Ok::<(), sigma_lucene::SigmaError>(())
/// ```
pub fn risk_score(level: Option<&str>) -> Result<(&'static str, u8)> {
    let level = level.unwrap_or(DEFAULT_LEVEL);
    SEVERITY_RISK_SCORES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(level))
        .map(|&(_, severity, score)| (severity, score))
        .ok_or_else(|| SigmaError::UnmappedSeverity(level.to_string()))
}

/// `attack.t1059` → `attack-t1059`.
fn kibana_tag(tag: &str) -> String {
    match tag.split_once('.') {
        Some((namespace, name)) => format!("{namespace}-{name}"),
        None => tag.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub interval: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookbackMeta {
    pub from: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRule {
    pub name: String,
    pub tags: Vec<String>,
    pub consumer: &'static str,
    pub enabled: bool,
    pub throttle: Option<String>,
    pub schedule: Schedule,
    pub params: DetectionRuleParams,
    pub rule_type_id: &'static str,
    pub notify_when: &'static str,
    pub actions: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRuleParams {
    pub author: Vec<String>,
    pub description: String,
    pub rule_id: Option<String>,
    pub false_positives: Vec<String>,
    pub from: String,
    pub immutable: bool,
    pub license: &'static str,
    pub output_index: &'static str,
    pub meta: LookbackMeta,
    pub max_signals: u32,
    pub risk_score: u8,
    pub risk_score_mapping: Vec<Value>,
    pub severity: &'static str,
    pub severity_mapping: Vec<Value>,
    pub threat: Vec<Value>,
    pub to: &'static str,
    pub references: Vec<String>,
    pub version: u32,
    pub exceptions_list: Vec<Value>,
    pub related_integrations: Vec<Value>,
    pub required_fields: Vec<Value>,
    pub setup: &'static str,
    #[serde(rename = "type")]
    pub rule_type: &'static str,
    pub language: &'static str,
    pub index: Vec<String>,
    pub query: String,
    pub filters: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRuleFlat {
    pub id: Option<String>,
    pub name: String,
    pub tags: Vec<String>,
    pub interval: String,
    pub enabled: bool,
    pub description: String,
    pub risk_score: u8,
    pub severity: &'static str,
    pub license: &'static str,
    pub output_index: &'static str,
    pub meta: LookbackMeta,
    pub author: Vec<String>,
    pub false_positives: Vec<String>,
    pub from: String,
    pub rule_id: Option<String>,
    pub max_signals: u32,
    pub risk_score_mapping: Vec<Value>,
    pub severity_mapping: Vec<Value>,
    pub threat: Vec<Value>,
    pub to: &'static str,
    pub references: Vec<String>,
    pub version: u32,
    pub exceptions_list: Vec<Value>,
    pub immutable: bool,
    pub related_integrations: Vec<Value>,
    pub required_fields: Vec<Value>,
    pub setup: &'static str,
    #[serde(rename = "type")]
    pub rule_type: &'static str,
    pub language: &'static str,
    pub index: Vec<String>,
    pub query: String,
    pub filters: Vec<Value>,
    pub throttle: &'static str,
    pub actions: Vec<Value>,
}

/// Metadata-derived fields shared by both rule shapes.
struct RuleFields {
    name: String,
    description: String,
    rule_id: Option<String>,
    tags: Vec<String>,
    author: Vec<String>,
    false_positives: Vec<String>,
    references: Vec<String>,
    severity: &'static str,
    risk_score: u8,
}

impl RuleFields {
    fn collect(metadata: &RuleMetadata, options: &RenderOptions) -> Result<Self> {
        let (severity, risk_score) = risk_score(metadata.level.as_deref())?;

        let tags = if options.include_tags {
            metadata.tags.iter().map(|t| kibana_tag(t)).collect()
        } else {
            Vec::new()
        };
        let author = match &metadata.author {
            Some(author) if options.include_author => vec![author.clone()],
            _ => Vec::new(),
        };
        let false_positives = if options.include_false_positives {
            metadata.falsepositives.clone()
        } else {
            Vec::new()
        };
        let references = if options.include_references {
            metadata.references.clone()
        } else {
            Vec::new()
        };

        Ok(Self {
            name: prefixed_title(metadata),
            description: description_or_default(metadata),
            rule_id: metadata.id.clone(),
            tags,
            author,
            false_positives,
            references,
            severity,
            risk_score,
        })
    }
}

/// Build the alerting-framework rule (nested `params`).
pub fn detection_rule(
    query: &str,
    metadata: &RuleMetadata,
    options: &RenderOptions,
) -> Result<DetectionRule> {
    let fields = RuleFields::collect(metadata, options)?;

    Ok(DetectionRule {
        name: fields.name,
        tags: fields.tags,
        consumer: "siem",
        enabled: true,
        throttle: None,
        schedule: Schedule {
            interval: options.schedule_interval.clone(),
        },
        params: DetectionRuleParams {
            author: fields.author,
            description: fields.description,
            rule_id: fields.rule_id,
            false_positives: fields.false_positives,
            from: options.lookback_from(),
            immutable: false,
            license: LICENSE,
            output_index: "",
            meta: LookbackMeta { from: META_FROM },
            max_signals: MAX_SIGNALS,
            risk_score: fields.risk_score,
            risk_score_mapping: Vec::new(),
            severity: fields.severity,
            severity_mapping: Vec::new(),
            threat: Vec::new(),
            to: "now",
            references: fields.references,
            version: RULE_VERSION,
            exceptions_list: Vec::new(),
            related_integrations: Vec::new(),
            required_fields: Vec::new(),
            setup: "",
            rule_type: RULE_TYPE,
            language: LANGUAGE,
            index: options.index.clone(),
            query: query.to_string(),
            filters: Vec::new(),
        },
        rule_type_id: "siem.queryRule",
        notify_when: "onActiveAlert",
        actions: Vec::new(),
    })
}

/// Build the flat detection-engine rule used for NDJSON import.
pub fn detection_rule_flat(
    query: &str,
    metadata: &RuleMetadata,
    options: &RenderOptions,
) -> Result<DetectionRuleFlat> {
    let fields = RuleFields::collect(metadata, options)?;

    Ok(DetectionRuleFlat {
        id: fields.rule_id.clone(),
        name: fields.name,
        tags: fields.tags,
        interval: options.schedule_interval.clone(),
        enabled: true,
        description: fields.description,
        risk_score: fields.risk_score,
        severity: fields.severity,
        license: LICENSE,
        output_index: "",
        meta: LookbackMeta { from: META_FROM },
        author: fields.author,
        false_positives: fields.false_positives,
        from: options.lookback_from(),
        rule_id: fields.rule_id,
        max_signals: MAX_SIGNALS,
        risk_score_mapping: Vec::new(),
        severity_mapping: Vec::new(),
        threat: Vec::new(),
        to: "now",
        references: fields.references,
        version: RULE_VERSION,
        exceptions_list: Vec::new(),
        immutable: false,
        related_integrations: Vec::new(),
        required_fields: Vec::new(),
        setup: "",
        rule_type: RULE_TYPE,
        language: LANGUAGE,
        index: options.index.clone(),
        query: query.to_string(),
        filters: Vec::new(),
        throttle: "no_actions",
        actions: Vec::new(),
    })
}
