//! Golden-document tests for every output format.
//!
//! The fixtures under `tests/rules/` supply the rule metadata; the condition
//! is the compiled form of their `sel` block.

use serde_json::json;
use sigma_lucene::{
    AtomicMatch, ConditionNode, Document, LuceneBackend, OutputFormat, RenderOptions,
    RuleMetadata, SigmaError, SigmaRule,
};
use std::fs;

fn load_metadata(path: &str) -> RuleMetadata {
    let rule_yaml = fs::read_to_string(path).expect("Failed to read rule fixture");
    RuleMetadata::from_yaml(&rule_yaml).expect("Failed to parse rule metadata")
}

fn test_rule(metadata: RuleMetadata) -> SigmaRule {
    SigmaRule::new(
        metadata,
        ConditionNode::and([
            AtomicMatch::equals("fieldA", "valueA").into(),
            AtomicMatch::equals("fieldB", "valueB").into(),
        ]),
    )
}

fn convert(rule: &SigmaRule, format: OutputFormat) -> serde_json::Value {
    LuceneBackend::new()
        .convert_rule(rule, format)
        .expect("conversion failed")
        .as_json()
        .expect("expected a JSON document")
        .clone()
}

#[test]
fn test_default_output() {
    let rule = test_rule(RuleMetadata::new("Test"));
    let document = LuceneBackend::new()
        .convert_rule(&rule, OutputFormat::Plain)
        .unwrap();
    assert_eq!(
        document,
        Document::Query("fieldA:valueA AND fieldB:valueB".to_string())
    );
}

#[test]
fn test_kibana_ndjson_lucene() {
    let mut metadata = load_metadata("tests/rules/test_rule.yml");
    metadata.id = None;
    let rule = test_rule(metadata);

    assert_eq!(
        convert(&rule, OutputFormat::SavedSearch),
        json!({
            "id": "None",
            "type": "search",
            "attributes": {
                "title": "SIGMA - Test",
                "description": "No description",
                "hits": 0,
                "columns": [],
                "sort": [
                    "@timestamp",
                    "desc"
                ],
                "version": 1,
                "kibanaSavedObjectMeta": {
                    "searchSourceJSON": "{\"index\": \"beats-*\", \"filter\": [], \"highlight\": {\"pre_tags\": [\"@kibana-highlighted-field@\"], \"post_tags\": [\"@/kibana-highlighted-field@\"], \"fields\": {\"*\": {}}, \"require_field_match\": false, \"fragment_size\": 2147483647}, \"query\": {\"query_string\": {\"query\": \"fieldA:valueA AND fieldB:valueB\", \"analyze_wildcard\": true}}}"
                }
            },
            "references": [{
                "id": "beats-*",
                "name": "kibanaSavedObjectMeta.searchSourceJSON.index",
                "type": "index-pattern"
            }]
        })
    );
}

#[test]
fn test_siem_rule_lucene() {
    let rule = test_rule(load_metadata("tests/rules/test_rule.yml"));

    assert_eq!(
        convert(&rule, OutputFormat::DetectionRule),
        json!({
            "name": "SIGMA - Test",
            "tags": [],
            "consumer": "siem",
            "enabled": true,
            "throttle": null,
            "schedule": {
                "interval": "5m"
            },
            "params": {
                "author": [],
                "description": "No description",
                "ruleId": "c277adc0-f0c4-42e1-af9d-fab062992156",
                "falsePositives": [],
                "from": "now-5m",
                "immutable": false,
                "license": "DRL",
                "outputIndex": "",
                "meta": {
                    "from": "1m",
                },
                "maxSignals": 100,
                "riskScore": 21,
                "riskScoreMapping": [],
                "severity": "low",
                "severityMapping": [],
                "threat": [],
                "to": "now",
                "references": [],
                "version": 1,
                "exceptionsList": [],
                "relatedIntegrations": [],
                "requiredFields": [],
                "setup": "",
                "type": "query",
                "language": "lucene",
                "index": [
                    "apm-*-transaction*",
                    "auditbeat-*",
                    "endgame-*",
                    "filebeat-*",
                    "logs-*",
                    "packetbeat-*",
                    "traces-apm*",
                    "winlogbeat-*",
                    "-*elastic-cloud-logs-*"
                ],
                "query": "fieldA:valueA AND fieldB:valueB",
                "filters": []
            },
            "rule_type_id": "siem.queryRule",
            "notify_when": "onActiveAlert",
            "actions": []
        })
    );
}

#[test]
fn test_siem_rule_ndjson_lucene() {
    let rule = test_rule(load_metadata("tests/rules/test_rule.yml"));

    assert_eq!(
        convert(&rule, OutputFormat::DetectionRuleFlat),
        json!({
            "id": "c277adc0-f0c4-42e1-af9d-fab062992156",
            "name": "SIGMA - Test",
            "tags": [],
            "interval": "5m",
            "enabled": true,
            "description": "No description",
            "risk_score": 21,
            "severity": "low",
            "license": "DRL",
            "output_index": "",
            "meta": {
                "from": "1m",
            },
            "author": [],
            "false_positives": [],
            "from": "now-5m",
            "rule_id": "c277adc0-f0c4-42e1-af9d-fab062992156",
            "max_signals": 100,
            "risk_score_mapping": [],
            "severity_mapping": [],
            "threat": [],
            "to": "now",
            "references": [],
            "version": 1,
            "exceptions_list": [],
            "immutable": false,
            "related_integrations": [],
            "required_fields": [],
            "setup": "",
            "type": "query",
            "language": "lucene",
            "index": [
                "apm-*-transaction*",
                "auditbeat-*",
                "endgame-*",
                "filebeat-*",
                "logs-*",
                "packetbeat-*",
                "traces-apm*",
                "winlogbeat-*",
                "-*elastic-cloud-logs-*"
            ],
            "query": "fieldA:valueA AND fieldB:valueB",
            "filters": [],
            "throttle": "no_actions",
            "actions": []
        })
    );
}

#[test]
fn test_dsl_lucene() {
    let rule = test_rule(load_metadata("tests/rules/test_rule.yml"));

    assert_eq!(
        convert(&rule, OutputFormat::QueryObject),
        json!({
            "query": {
                "bool": {
                    "must": [
                        {
                            "query_string": {
                                "query": "fieldA:valueA AND fieldB:valueB",
                                "analyze_wildcard": true
                            }
                        }
                    ]
                }
            }
        })
    );
}

#[test]
fn test_siem_rule_key_order_matches_export() {
    let rule = test_rule(load_metadata("tests/rules/test_rule.yml"));
    let document = LuceneBackend::new()
        .convert_rule(&rule, OutputFormat::DetectionRuleFlat)
        .unwrap();
    let line = document.to_line().unwrap();

    assert!(line.starts_with(
        r#"{"id":"c277adc0-f0c4-42e1-af9d-fab062992156","name":"SIGMA - Test","tags":[],"interval":"5m""#
    ));
    assert!(line.ends_with(r#""filters":[],"throttle":"no_actions","actions":[]}"#));
}

#[test]
fn test_documented_rule_metadata_carried_over() {
    let rule = test_rule(load_metadata("tests/rules/documented_rule.yml"));
    let document = convert(&rule, OutputFormat::DetectionRuleFlat);

    assert_eq!(document["name"], "SIGMA - Encoded PowerShell Command Line");
    assert_eq!(
        document["description"],
        "Detects PowerShell started with an encoded command"
    );
    assert_eq!(document["severity"], "high");
    assert_eq!(document["risk_score"], 73);
    assert_eq!(document["author"], json!(["Detection Engineering"]));
    assert_eq!(
        document["references"],
        json!(["https://attack.mitre.org/techniques/T1059/001/"])
    );
    assert_eq!(document["false_positives"], json!(["Administrative scripts"]));
    assert_eq!(
        document["tags"],
        json!(["attack-execution", "attack-t1059.001"])
    );

    let saved = convert(&rule, OutputFormat::SavedSearch);
    assert_eq!(saved["id"], "5b4f6e2a-8f3c-4d2e-9a1b-7c6d5e4f3a2b");
    assert_eq!(
        saved["attributes"]["description"],
        "Detects PowerShell started with an encoded command"
    );
}

#[test]
fn test_unmapped_severity_only_affects_scored_formats() {
    let mut metadata = RuleMetadata::new("Test");
    metadata.level = Some("urgent".to_string());
    let rule = test_rule(metadata);
    let backend = LuceneBackend::new();

    for format in OutputFormat::ALL {
        let result = backend.convert_rule(&rule, format);
        if format.needs_severity() {
            assert_eq!(
                result,
                Err(SigmaError::UnmappedSeverity("urgent".to_string()))
            );
        } else {
            assert!(result.is_ok(), "{format} should not need a severity");
        }
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let rule = test_rule(load_metadata("tests/rules/documented_rule.yml"));
    let backend = LuceneBackend::new();

    for format in OutputFormat::ALL {
        let first = backend.convert_rule(&rule, format).unwrap();
        let second = backend.convert_rule(&rule, format).unwrap();
        assert_eq!(first.to_line().unwrap(), second.to_line().unwrap());
    }
}

#[test]
fn test_options_from_yaml_applied() {
    let options = RenderOptions::from_yaml(
        r#"
index:
    - logs-windows.*
saved_search_index: winlogbeat-*
schedule_interval: 10m
include_author: false
"#,
    )
    .unwrap();
    let backend = LuceneBackend::with_options(options);
    let rule = test_rule(load_metadata("tests/rules/documented_rule.yml"));

    let document = backend
        .convert_rule(&rule, OutputFormat::DetectionRule)
        .unwrap();
    let json = document.as_json().unwrap();
    assert_eq!(json["schedule"]["interval"], "10m");
    assert_eq!(json["params"]["from"], "now-10m");
    assert_eq!(json["params"]["index"], json!(["logs-windows.*"]));
    assert_eq!(json["params"]["author"], json!([]));

    let saved = backend
        .convert_rule(&rule, OutputFormat::SavedSearch)
        .unwrap();
    assert_eq!(saved.as_json().unwrap()["references"][0]["id"], "winlogbeat-*");
}
