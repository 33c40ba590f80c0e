//! Kibana saved search envelope.
//!
//! A saved search stores its query inside `searchSourceJSON`, which is itself
//! a JSON document encoded as a string. Kibana exports that string with
//! `", "` and `": "` separators and ASCII-only escapes; [`SpacedFormatter`]
//! reproduces that layout so generated objects diff cleanly against exports.

use super::dsl::{QueryStringClause, QueryStringQuery};
use super::{description_or_default, prefixed_title};
use crate::config::RenderOptions;
use crate::error::{Result, SigmaError};
use crate::ir::RuleMetadata;
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

const HIGHLIGHT_PRE_TAG: &str = "@kibana-highlighted-field@";
const HIGHLIGHT_POST_TAG: &str = "@/kibana-highlighted-field@";
const INDEX_REFERENCE_NAME: &str = "kibanaSavedObjectMeta.searchSourceJSON.index";
/// Saved object id written for rules without an `id`. Kibana's import API
/// requires a string.
pub const MISSING_ID: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedSearch {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: &'static str,
    pub attributes: SavedSearchAttributes,
    pub references: Vec<SavedObjectReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedSearchAttributes {
    pub title: String,
    pub description: String,
    pub hits: u32,
    pub columns: Vec<String>,
    pub sort: [&'static str; 2],
    pub version: u32,
    #[serde(rename = "kibanaSavedObjectMeta")]
    pub saved_object_meta: SavedObjectMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedObjectMeta {
    #[serde(rename = "searchSourceJSON")]
    pub search_source_json: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedObjectReference {
    pub id: String,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub reference_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct SearchSource<'a> {
    index: &'a str,
    filter: Vec<serde_json::Value>,
    highlight: Highlight,
    query: QueryStringClause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Highlight {
    pre_tags: [&'static str; 1],
    post_tags: [&'static str; 1],
    fields: HighlightFields,
    require_field_match: bool,
    fragment_size: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct HighlightFields {
    #[serde(rename = "*")]
    all: EmptyObject,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct EmptyObject {}

/// Build the saved search object for one rule.
pub fn saved_search(
    query: &str,
    metadata: &RuleMetadata,
    options: &RenderOptions,
) -> Result<SavedSearch> {
    let index = options.saved_search_index.as_str();
    let source = SearchSource {
        index,
        filter: Vec::new(),
        highlight: Highlight {
            pre_tags: [HIGHLIGHT_PRE_TAG],
            post_tags: [HIGHLIGHT_POST_TAG],
            fields: HighlightFields { all: EmptyObject {} },
            require_field_match: false,
            fragment_size: i32::MAX,
        },
        query: QueryStringClause {
            query_string: QueryStringQuery::new(query),
        },
    };

    Ok(SavedSearch {
        id: metadata
            .id
            .clone()
            .unwrap_or_else(|| MISSING_ID.to_string()),
        object_type: "search",
        attributes: SavedSearchAttributes {
            title: prefixed_title(metadata),
            description: description_or_default(metadata),
            hits: 0,
            columns: Vec::new(),
            sort: ["@timestamp", "desc"],
            version: 1,
            saved_object_meta: SavedObjectMeta {
                search_source_json: to_spaced_json(&source)?,
            },
        },
        references: vec![SavedObjectReference {
            id: index.to_string(),
            name: INDEX_REFERENCE_NAME,
            reference_type: "index-pattern",
        }],
    })
}

/// Encode `value` with `", "` / `": "` separators and `\uXXXX` for non-ASCII.
pub fn to_spaced_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| SigmaError::Serialization(e.to_string()))
}

/// Single-line JSON formatter with spaced separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.is_ascii() {
            return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spaced_json_layout() {
        let value = json!({"a": [1, 2], "b": {}, "c": [], "d": {"e": null}});
        assert_eq!(
            to_spaced_json(&value).unwrap(),
            r#"{"a": [1, 2], "b": {}, "c": [], "d": {"e": null}}"#
        );
    }

    #[test]
    fn test_spaced_json_escapes_non_ascii() {
        assert_eq!(to_spaced_json("café").unwrap(), r#""caf\u00e9""#);
        assert_eq!(to_spaced_json("😀").unwrap(), r#""\ud83d\ude00""#);
        assert_eq!(to_spaced_json("a\"b\\c").unwrap(), r#""a\"b\\c""#);
    }

    #[test]
    fn test_search_source_json() {
        let search = saved_search(
            r"fieldA:valueA AND fieldB:C\:\\Windows",
            &RuleMetadata::new("Test"),
            &RenderOptions::default(),
        )
        .unwrap();

        assert_eq!(
            search.attributes.saved_object_meta.search_source_json,
            r#"{"index": "beats-*", "filter": [], "highlight": {"pre_tags": ["@kibana-highlighted-field@"], "post_tags": ["@/kibana-highlighted-field@"], "fields": {"*": {}}, "require_field_match": false, "fragment_size": 2147483647}, "query": {"query_string": {"query": "fieldA:valueA AND fieldB:C\\:\\\\Windows", "analyze_wildcard": true}}}"#
        );
    }

    #[test]
    fn test_saved_search_id_is_always_a_string() {
        let options = RenderOptions::default();
        let search = saved_search("a:b", &RuleMetadata::new("Test"), &options).unwrap();
        assert_eq!(search.id, MISSING_ID);
        assert_eq!(serde_json::to_value(&search).unwrap()["id"], "None");

        let mut metadata = RuleMetadata::new("Test");
        metadata.id = Some("c277adc0-f0c4-42e1-af9d-fab062992156".to_string());
        let search = saved_search("a:b", &metadata, &options).unwrap();
        assert_eq!(search.id, "c277adc0-f0c4-42e1-af9d-fab062992156");
    }

    #[test]
    fn test_saved_search_index_override() {
        let options = RenderOptions {
            saved_search_index: "winlogbeat-*".to_string(),
            ..RenderOptions::default()
        };
        let search = saved_search("a:b", &RuleMetadata::new("Test"), &options).unwrap();

        assert_eq!(search.references[0].id, "winlogbeat-*");
        assert!(search
            .attributes
            .saved_object_meta
            .search_source_json
            .starts_with(r#"{"index": "winlogbeat-*", "#));
    }
}
