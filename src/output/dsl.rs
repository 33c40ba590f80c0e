//! Elasticsearch query DSL envelope.

use serde::Serialize;

/// `query_string` clause carrying a Lucene query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStringQuery {
    pub query: String,
    pub analyze_wildcard: bool,
}

impl QueryStringQuery {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            analyze_wildcard: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStringClause {
    pub query_string: QueryStringQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolQuery {
    pub must: Vec<QueryStringClause>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoolClause {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

/// `{ "query": { "bool": { "must": [ { "query_string": ... } ] } } }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryObject {
    pub query: BoolClause,
}

pub fn query_object(query: &str) -> QueryObject {
    QueryObject {
        query: BoolClause {
            bool_query: BoolQuery {
                must: vec![QueryStringClause {
                    query_string: QueryStringQuery::new(query),
                }],
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_object_shape() {
        let value = serde_json::to_value(query_object("fieldA:valueA AND fieldB:valueB")).unwrap();
        assert_eq!(
            value,
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
}
